//! 领域服务
//!
//! 对网关客户端的类型化封装，不包含业务逻辑。

mod admin;
mod auth;
mod course;
mod teacher;

pub use admin::AdminService;
pub use auth::AuthService;
pub use course::CourseService;
pub use teacher::TeacherService;
