use crate::{
    Course, CourseId, Enrollment, EnrollmentId, EnrollmentStatus, Lecture, LoginResponse,
    RegisterResponse, Role, RoleCode, Teacher, User, UserId,
};
use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use std::borrow::Cow;

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Only reads are safe to repeat without an idempotency key.
    pub fn is_retryable(&self) -> bool {
        matches!(self, HttpMethod::Get)
    }

    pub fn carries_body(&self) -> bool {
        !matches!(self, HttpMethod::Get | HttpMethod::Delete)
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
///
/// Path parameters are `#[serde(skip)]` fields on the request struct and are
/// substituted by [`ApiRequest::path`]; the remaining fields form the JSON body.
pub trait ApiRequest: Serialize {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The URL path template, relative to the API base.
    const PATH: &'static str;
    /// The HTTP method.
    const METHOD: HttpMethod;

    /// The concrete path for this request.
    fn path(&self) -> Cow<'static, str> {
        Cow::Borrowed(Self::PATH)
    }
}

macro_rules! api_request {
    ($ty:ty, $resp:ty, $method:ident, $path:literal) => {
        impl ApiRequest for $ty {
            type Response = $resp;
            const PATH: &'static str = $path;
            const METHOD: HttpMethod = HttpMethod::$method;
        }
    };
    ($ty:ty, $resp:ty, $method:ident, $path:literal, |$this:ident| $fmt:expr) => {
        impl ApiRequest for $ty {
            type Response = $resp;
            const PATH: &'static str = $path;
            const METHOD: HttpMethod = HttpMethod::$method;

            fn path(&self) -> Cow<'static, str> {
                let $this = self;
                Cow::Owned($fmt)
            }
        }
    };
}

// =========================================================
// /auth
// =========================================================

/// Exchange an identity-provider ID token for a backend session token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendLoginRequest {
    pub id_token: String,
}

api_request!(BackendLoginRequest, LoginResponse, Post, "/auth/login");

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub role: Role,
}

api_request!(RegisterRequest, RegisterResponse, Post, "/auth/register");

#[derive(Debug, Serialize)]
pub struct CurrentUserRequest;

api_request!(CurrentUserRequest, User, Get, "/auth/me");

#[derive(Debug, Serialize)]
pub struct LogoutRequest;

api_request!(LogoutRequest, (), Post, "/auth/logout");

// =========================================================
// /student
// =========================================================

#[derive(Debug, Serialize)]
pub struct ListAvailableCoursesRequest;

api_request!(ListAvailableCoursesRequest, Vec<Course>, Get, "/student/courses");

#[derive(Debug, Serialize)]
pub struct ListMyEnrollmentsRequest;

api_request!(ListMyEnrollmentsRequest, Vec<Enrollment>, Get, "/student/enrollments");

#[derive(Debug, Serialize)]
pub struct EnrollCourseRequest {
    #[serde(skip)]
    pub course_id: CourseId,
}

api_request!(
    EnrollCourseRequest,
    Enrollment,
    Post,
    "/student/courses/{id}/enroll",
    |r| format!("/student/courses/{}/enroll", r.course_id)
);

#[derive(Debug, Serialize)]
pub struct ListCourseLecturesRequest {
    #[serde(skip)]
    pub course_id: CourseId,
}

api_request!(
    ListCourseLecturesRequest,
    Vec<Lecture>,
    Get,
    "/student/courses/{id}/lectures",
    |r| format!("/student/courses/{}/lectures", r.course_id)
);

// =========================================================
// /teacher
// =========================================================

#[derive(Debug, Serialize)]
pub struct ListTeacherCoursesRequest;

api_request!(ListTeacherCoursesRequest, Vec<Course>, Get, "/teacher/courses");

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
}

api_request!(CreateCourseRequest, Course, Post, "/teacher/courses");

#[derive(Debug, Serialize)]
pub struct ListCourseEnrollmentsRequest {
    #[serde(skip)]
    pub course_id: CourseId,
}

api_request!(
    ListCourseEnrollmentsRequest,
    Vec<Enrollment>,
    Get,
    "/teacher/courses/{id}/enrollments",
    |r| format!("/teacher/courses/{}/enrollments", r.course_id)
);

#[derive(Debug, Serialize)]
pub struct ListTeacherLecturesRequest {
    #[serde(skip)]
    pub course_id: CourseId,
}

api_request!(
    ListTeacherLecturesRequest,
    Vec<Lecture>,
    Get,
    "/teacher/courses/{id}/lectures",
    |r| format!("/teacher/courses/{}/lectures", r.course_id)
);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLectureRequest {
    #[serde(skip)]
    pub course_id: CourseId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
}

api_request!(
    CreateLectureRequest,
    Lecture,
    Post,
    "/teacher/courses/{id}/lectures",
    |r| format!("/teacher/courses/{}/lectures", r.course_id)
);

#[derive(Debug, Serialize)]
pub struct SetGradeRequest {
    #[serde(skip)]
    pub enrollment_id: EnrollmentId,
    pub grade: f32,
}

api_request!(
    SetGradeRequest,
    Enrollment,
    Put,
    "/teacher/enrollments/{id}/grade",
    |r| format!("/teacher/enrollments/{}/grade", r.enrollment_id)
);

/// Teacher approves or rejects a pending enrollment in one of their courses.
#[derive(Debug, Serialize)]
pub struct ReviewEnrollmentRequest {
    #[serde(skip)]
    pub enrollment_id: EnrollmentId,
    pub status: EnrollmentStatus,
}

api_request!(
    ReviewEnrollmentRequest,
    Enrollment,
    Put,
    "/teacher/enrollments/{id}/status",
    |r| format!("/teacher/enrollments/{}/status", r.enrollment_id)
);

// =========================================================
// /admin
// =========================================================

#[derive(Debug, Serialize)]
pub struct ListUsersRequest;

api_request!(ListUsersRequest, Vec<User>, Get, "/admin/users");

/// The admin endpoints encode roles numerically.
#[derive(Debug, Serialize)]
pub struct ChangeRoleRequest {
    #[serde(skip)]
    pub user_id: UserId,
    pub role: RoleCode,
}

api_request!(
    ChangeRoleRequest,
    User,
    Put,
    "/admin/users/{id}/role",
    |r| format!("/admin/users/{}/role", r.user_id)
);

#[derive(Debug, Serialize)]
pub struct DeleteUserRequest {
    #[serde(skip)]
    pub user_id: UserId,
}

api_request!(
    DeleteUserRequest,
    (),
    Delete,
    "/admin/users/{id}",
    |r| format!("/admin/users/{}", r.user_id)
);

#[derive(Debug, Serialize)]
pub struct ListPendingTeachersRequest;

api_request!(ListPendingTeachersRequest, Vec<Teacher>, Get, "/admin/teachers/pending");

#[derive(Debug, Serialize)]
pub struct ApproveTeacherRequest {
    #[serde(skip)]
    pub teacher_id: UserId,
}

api_request!(
    ApproveTeacherRequest,
    Teacher,
    Post,
    "/admin/teachers/{id}/approve",
    |r| format!("/admin/teachers/{}/approve", r.teacher_id)
);

#[derive(Debug, Serialize)]
pub struct ListAllCoursesRequest;

api_request!(ListAllCoursesRequest, Vec<Course>, Get, "/admin/courses");

#[derive(Debug, Serialize)]
pub struct ListAllEnrollmentsRequest;

api_request!(ListAllEnrollmentsRequest, Vec<Enrollment>, Get, "/admin/enrollments");

#[derive(Debug, Serialize)]
pub struct SetEnrollmentStatusRequest {
    #[serde(skip)]
    pub enrollment_id: EnrollmentId,
    pub status: EnrollmentStatus,
}

api_request!(
    SetEnrollmentStatusRequest,
    Enrollment,
    Put,
    "/admin/enrollments/{id}/status",
    |r| format!("/admin/enrollments/{}/status", r.enrollment_id)
);
