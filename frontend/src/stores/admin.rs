use std::rc::Rc;

use campus_shared::{
    Course, Enrollment, EnrollmentId, EnrollmentStatus, Role, Teacher, User, UserId,
};

use super::resource::{Action, Resource, track, track_action};
use super::upsert_by;
use crate::aggregate::StatusSummary;
use crate::error::{ClientError, ClientResult};
use crate::listing::count_by_role;
use crate::observable::{Observable, Subscription};
use crate::services::AdminService;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminState {
    pub users: Resource<Vec<User>>,
    pub pending_teachers: Resource<Vec<Teacher>>,
    pub courses: Resource<Vec<Course>>,
    pub enrollments: Resource<Vec<Enrollment>>,
    selected_user: Option<UserId>,
    /// 审批、改角色、删除与改选课状态共用的提交状态
    pub action: Action,
}

impl AdminState {
    pub fn selected_user(&self) -> Option<&User> {
        let id = self.selected_user.as_deref()?;
        self.users.items().iter().find(|u| u.id == id)
    }

    pub fn status_summary(&self) -> StatusSummary {
        StatusSummary::from_enrollments(self.enrollments.items())
    }

    pub fn role_counts(&self) -> [(Role, usize); 3] {
        count_by_role(self.users.items())
    }

    pub fn course_title(&self, course_id: u64) -> Option<&str> {
        self.courses
            .items()
            .iter()
            .find(|c| c.id == course_id)
            .map(|c| c.title.as_str())
    }
}

fn users(s: &mut AdminState) -> &mut Resource<Vec<User>> {
    &mut s.users
}

fn pending_teachers(s: &mut AdminState) -> &mut Resource<Vec<Teacher>> {
    &mut s.pending_teachers
}

fn courses(s: &mut AdminState) -> &mut Resource<Vec<Course>> {
    &mut s.courses
}

fn enrollments(s: &mut AdminState) -> &mut Resource<Vec<Enrollment>> {
    &mut s.enrollments
}

fn action(s: &mut AdminState) -> &mut Action {
    &mut s.action
}

/// 管理员用例
pub struct AdminUsecasesStore {
    state: Observable<AdminState>,
    service: AdminService,
}

impl AdminUsecasesStore {
    pub fn new(service: AdminService) -> Self {
        Self {
            state: Observable::new(AdminState::default()),
            service,
        }
    }

    pub fn state(&self) -> Rc<AdminState> {
        self.state.snapshot()
    }

    pub fn subscribe(&self, f: impl Fn(&AdminState) + 'static) -> Subscription {
        self.state.subscribe(f)
    }

    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.state.unsubscribe(subscription)
    }

    // ===== 加载 =====

    pub async fn refresh_users(&self) -> ClientResult<Vec<User>> {
        let result = track(&self.state, users, self.service.users()).await;
        // 选中的用户已不存在时取消选中
        self.state.update(|s| {
            if s.selected_user.is_some() && s.selected_user().is_none() {
                s.selected_user = None;
            }
        });
        result
    }

    pub async fn refresh_pending_teachers(&self) -> ClientResult<Vec<Teacher>> {
        track(&self.state, pending_teachers, self.service.pending_teachers()).await
    }

    pub async fn refresh_courses(&self) -> ClientResult<Vec<Course>> {
        track(&self.state, courses, self.service.courses()).await
    }

    pub async fn refresh_enrollments(&self) -> ClientResult<Vec<Enrollment>> {
        track(&self.state, enrollments, self.service.enrollments()).await
    }

    pub async fn refresh_all(&self) -> ClientResult<()> {
        let results = [
            self.refresh_users().await.map(drop),
            self.refresh_pending_teachers().await.map(drop),
            self.refresh_courses().await.map(drop),
            self.refresh_enrollments().await.map(drop),
        ];
        results.into_iter().collect()
    }

    // ===== 选中 =====

    /// 只能选中已加载列表中的用户
    pub fn select_user(&self, user_id: &str) -> bool {
        self.state.update(|s| {
            let exists = s.users.items().iter().any(|u| u.id == user_id);
            if exists {
                s.selected_user = Some(user_id.to_string());
            }
            exists
        })
    }

    pub fn clear_selection(&self) {
        self.state.update(|s| s.selected_user = None);
    }

    // ===== 写操作 =====

    pub async fn approve_teacher(&self, teacher_id: &str) -> ClientResult<Teacher> {
        let teacher = track_action(
            &self.state,
            action,
            (),
            self.service.approve_teacher(teacher_id),
        )
        .await?;
        let id = teacher.id.clone();
        self.state
            .update(|s| s.pending_teachers.modify(|list| list.retain(|t| t.id != id)));
        log::info!("[Admin] Approved teacher {}", teacher.id);
        Ok(teacher)
    }

    pub async fn change_role(&self, user_id: &str, role: Role) -> ClientResult<User> {
        let user = track_action(
            &self.state,
            action,
            (),
            self.service.change_role(user_id, role),
        )
        .await?;
        let updated = user.clone();
        self.state
            .update(|s| s.users.modify(|list| upsert_by(list, updated, |u| u.id.clone())));
        log::info!("[Admin] Changed role of {} to {}", user.id, role);
        Ok(user)
    }

    pub async fn delete_user(&self, user_id: &str) -> ClientResult<()> {
        track_action(&self.state, action, (), self.service.delete_user(user_id)).await?;
        self.state.update(|s| {
            s.users.modify(|list| list.retain(|u| u.id != user_id));
            if s.selected_user.as_deref() == Some(user_id) {
                s.selected_user = None;
            }
        });
        log::info!("[Admin] Deleted user {}", user_id);
        Ok(())
    }

    pub async fn set_enrollment_status(
        &self,
        enrollment_id: EnrollmentId,
        status: EnrollmentStatus,
    ) -> ClientResult<Enrollment> {
        let known = self.state.with(|s| {
            !s.enrollments.has_loaded()
                || s.enrollments.items().iter().any(|e| e.id == enrollment_id)
        });
        if !known {
            let err = ClientError::InvalidInput(format!("unknown enrollment {}", enrollment_id));
            let message = err.to_string();
            self.state.update(|s| s.action.fail(message));
            return Err(err);
        }

        let enrollment = track_action(
            &self.state,
            action,
            (),
            self.service.set_enrollment_status(enrollment_id, status),
        )
        .await?;
        let updated = enrollment.clone();
        self.state
            .update(|s| s.enrollments.modify(|list| upsert_by(list, updated, |e| e.id)));
        Ok(enrollment)
    }

    pub fn reset(&self) {
        self.state.update(|s| {
            s.users.reset();
            s.pending_teachers.reset();
            s.courses.reset();
            s.enrollments.reset();
            s.selected_user = None;
            s.action.reset();
        });
    }
}
