//! 培训中心系统的线上数据模型
//!
//! 字段名与外部后端保持一致（camelCase），前端只做镜像，不携带业务逻辑。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod protocol;
mod role;
mod status;

pub use role::{Role, RoleCode, UnknownRole};
pub use status::EnrollmentStatus;

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const BEARER_PREFIX: &str = "Bearer ";

pub type CourseId = u64;
pub type EnrollmentId = u64;
pub type LectureId = u64;
pub type UserId = String;

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub teacher_id: Option<UserId>,
    #[serde(default)]
    pub teacher_name: Option<String>,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub student_id: UserId,
    #[serde(default)]
    pub student_name: Option<String>,
    pub course_id: CourseId,
    pub status: EnrollmentStatus,
    #[serde(default)]
    pub grade: Option<f32>,
    #[serde(default)]
    pub enrolled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lecture {
    pub id: LectureId,
    pub course_id: CourseId,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// 教师账号（管理端审批视图）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// =========================================================
// 认证载荷 (Auth Payloads)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// 注册后的账号状态：学生直接激活，教师需要管理员审批
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub status: AccountStatus,
    #[serde(default)]
    pub user: Option<User>,
}

/// 后端错误响应体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.error)
    }
}
