//! 页面控制器
//!
//! 组件只调用这里的函数。每个函数编排一到多个 Store 操作，
//! 把结果归一化为 [`Outcome`]，错误消息取自 `ClientError` 的显示文本。

use campus_shared::protocol::{CreateCourseRequest, CreateLectureRequest, RegisterRequest};
use campus_shared::{
    AccountStatus, Course, CourseId, Enrollment, EnrollmentId, EnrollmentStatus, Lecture, Role,
    Teacher, User,
};

use crate::access::home_route_for;
use crate::context::AppContext;
use crate::error::ClientResult;

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> Outcome<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

impl<T> From<ClientResult<T>> for Outcome<T> {
    fn from(result: ClientResult<T>) -> Self {
        match result {
            Ok(data) => Outcome::ok(data),
            Err(e) => Outcome::failed(e.to_string()),
        }
    }
}

// ===== 认证 =====

/// 登录成功时返回要跳转的角色首页
pub async fn login(ctx: &AppContext, email: &str, password: &str) -> Outcome<&'static str> {
    ctx.user
        .login(email, password)
        .await
        .map(|session| home_route_for(Some(session.role())))
        .into()
}

pub async fn register(
    ctx: &AppContext,
    email: &str,
    password: &str,
    display_name: &str,
    role: Role,
) -> Outcome<AccountStatus> {
    if role == Role::Admin {
        return Outcome::failed("Admin accounts cannot be self-registered");
    }
    ctx.user
        .register(RegisterRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
            display_name: display_name.trim().to_string(),
            role,
        })
        .await
        .into()
}

pub async fn logout(ctx: &AppContext) -> Outcome<()> {
    ctx.user.logout().await;
    ctx.reset_data();
    Outcome::ok(())
}

pub async fn refresh_profile(ctx: &AppContext) -> Outcome<User> {
    ctx.user.refresh_profile().await.into()
}

// ===== 学生 =====

pub async fn load_student_dashboard(ctx: &AppContext) -> Outcome<()> {
    ctx.my_courses.refresh_all().await.into()
}

pub async fn enroll(ctx: &AppContext, course_id: CourseId) -> Outcome<Enrollment> {
    let already = ctx
        .my_courses
        .view()
        .enrollment_for_course(course_id)
        .map(|e| e.status);
    if let Some(status) = already {
        if status != EnrollmentStatus::Rejected {
            return Outcome::failed(format!("Already enrolled ({})", status));
        }
    }
    ctx.my_courses.enroll(course_id).await.into()
}

pub async fn course_lectures(ctx: &AppContext, course_id: CourseId) -> Outcome<Vec<Lecture>> {
    ctx.my_courses.load_lectures(course_id).await.into()
}

// ===== 教师 =====

pub async fn load_teacher_dashboard(ctx: &AppContext) -> Outcome<Vec<Course>> {
    ctx.teacher.refresh_courses().await.into()
}

pub async fn open_course(ctx: &AppContext, course_id: CourseId) -> Outcome<()> {
    ctx.teacher.select_course(course_id).await.into()
}

pub async fn create_course(
    ctx: &AppContext,
    title: &str,
    description: Option<String>,
    capacity: Option<u32>,
) -> Outcome<Course> {
    ctx.teacher
        .create_course(CreateCourseRequest {
            title: title.trim().to_string(),
            description: description.filter(|d| !d.trim().is_empty()),
            capacity,
        })
        .await
        .into()
}

pub async fn add_lecture(
    ctx: &AppContext,
    course_id: CourseId,
    title: &str,
    content: Option<String>,
) -> Outcome<Lecture> {
    ctx.teacher
        .add_lecture(CreateLectureRequest {
            course_id,
            title: title.trim().to_string(),
            content: content.filter(|c| !c.trim().is_empty()),
            scheduled_at: None,
        })
        .await
        .into()
}

pub async fn set_grade(
    ctx: &AppContext,
    enrollment_id: EnrollmentId,
    grade: f32,
) -> Outcome<Enrollment> {
    ctx.teacher.set_grade(enrollment_id, grade).await.into()
}

pub async fn review_enrollment(
    ctx: &AppContext,
    enrollment_id: EnrollmentId,
    approve: bool,
) -> Outcome<Enrollment> {
    let status = if approve {
        EnrollmentStatus::Approved
    } else {
        EnrollmentStatus::Rejected
    };
    ctx.teacher.review_enrollment(enrollment_id, status).await.into()
}

// ===== 管理员 =====

pub async fn load_admin_dashboard(ctx: &AppContext) -> Outcome<()> {
    ctx.admin.refresh_all().await.into()
}

pub async fn approve_teacher(ctx: &AppContext, teacher_id: &str) -> Outcome<Teacher> {
    ctx.admin.approve_teacher(teacher_id).await.into()
}

/// 管理员不能修改或删除自己
pub async fn change_role(ctx: &AppContext, user_id: &str, role: Role) -> Outcome<User> {
    if is_self(ctx, user_id) {
        return Outcome::failed("You cannot change your own role");
    }
    ctx.admin.change_role(user_id, role).await.into()
}

pub async fn delete_user(ctx: &AppContext, user_id: &str) -> Outcome<()> {
    if is_self(ctx, user_id) {
        return Outcome::failed("You cannot delete your own account");
    }
    ctx.admin.delete_user(user_id).await.into()
}

pub async fn set_enrollment_status(
    ctx: &AppContext,
    enrollment_id: EnrollmentId,
    status: EnrollmentStatus,
) -> Outcome<Enrollment> {
    ctx.admin
        .set_enrollment_status(enrollment_id, status)
        .await
        .into()
}

fn is_self(ctx: &AppContext, user_id: &str) -> bool {
    ctx.user
        .state()
        .session
        .session()
        .is_some_and(|s| s.user_id() == user_id)
}
