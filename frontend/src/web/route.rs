//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由、访问规则，以及导航判定。

use std::fmt::Display;

use campus_shared::Role;

use crate::access::{self, Access, RenderDecision};
use crate::session::SessionState;

const ADMIN: &[Role] = &[Role::Admin];
const TEACHER: &[Role] = &[Role::Teacher];
const STUDENT: &[Role] = &[Role::Student];

/// 应用路由枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 根路径，转到当前角色的首页
    #[default]
    Home,
    Login,
    Register,
    AdminDashboard,
    AdminUsers,
    AdminEnrollments,
    TeacherDashboard,
    TeacherCourses,
    StudentDashboard,
    StudentCourses,
    Profile,
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    pub const ALL: [AppRoute; 12] = [
        AppRoute::Home,
        AppRoute::Login,
        AppRoute::Register,
        AppRoute::AdminDashboard,
        AppRoute::AdminUsers,
        AppRoute::AdminEnrollments,
        AppRoute::TeacherDashboard,
        AppRoute::TeacherCourses,
        AppRoute::StudentDashboard,
        AppRoute::StudentCourses,
        AppRoute::Profile,
        AppRoute::NotFound,
    ];

    /// 将 URL path 解析为路由枚举（忽略查询串、锚点和末尾斜杠）
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or("/");
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        match path {
            "/" => Self::Home,
            "/login" => Self::Login,
            "/register" => Self::Register,
            "/admin-dashboard" => Self::AdminDashboard,
            "/admin-dashboard/users" => Self::AdminUsers,
            "/admin-dashboard/enrollments" => Self::AdminEnrollments,
            "/teacher-dashboard" => Self::TeacherDashboard,
            "/teacher-dashboard/courses" => Self::TeacherCourses,
            "/dashboard-overview-3" => Self::StudentDashboard,
            "/my-courses" => Self::StudentCourses,
            "/profile" => Self::Profile,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => access::LOGIN_PATH,
            Self::Register => "/register",
            Self::AdminDashboard => access::ADMIN_HOME,
            Self::AdminUsers => "/admin-dashboard/users",
            Self::AdminEnrollments => "/admin-dashboard/enrollments",
            Self::TeacherDashboard => access::TEACHER_HOME,
            Self::TeacherCourses => "/teacher-dashboard/courses",
            Self::StudentDashboard => access::STUDENT_HOME,
            Self::StudentCourses => "/my-courses",
            Self::Profile => "/profile",
            Self::NotFound => "/404",
        }
    }

    /// 嵌套路由的父路由
    pub fn parent(&self) -> Option<AppRoute> {
        match self {
            Self::AdminUsers | Self::AdminEnrollments => Some(Self::AdminDashboard),
            Self::TeacherCourses => Some(Self::TeacherDashboard),
            Self::StudentCourses => Some(Self::StudentDashboard),
            _ => None,
        }
    }

    /// 路由自身声明的规则；`None` 表示沿用父路由
    fn own_access(&self) -> Option<Access> {
        match self {
            Self::Home | Self::NotFound => Some(Access::Public),
            Self::Login | Self::Register => Some(Access::GuestOnly),
            Self::AdminDashboard => Some(Access::only(ADMIN)),
            Self::TeacherDashboard => Some(Access::only(TEACHER)),
            Self::StudentDashboard => Some(Access::only(STUDENT)),
            Self::Profile => Some(Access::any_user()),
            Self::AdminUsers
            | Self::AdminEnrollments
            | Self::TeacherCourses
            | Self::StudentCourses => None,
        }
    }

    /// **核心守卫逻辑：路由的访问规则**
    pub fn access(&self) -> Access {
        match self.parent() {
            Some(parent) => parent.access().nest(self.own_access()),
            None => self.own_access().unwrap_or(Access::Public),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Login => "Sign in",
            Self::Register => "Create account",
            Self::AdminDashboard => "Admin dashboard",
            Self::AdminUsers => "Users",
            Self::AdminEnrollments => "Enrollments",
            Self::TeacherDashboard => "Teacher dashboard",
            Self::TeacherCourses => "My courses",
            Self::StudentDashboard => "Overview",
            Self::StudentCourses => "Courses",
            Self::Profile => "Profile",
            Self::NotFound => "Not found",
        }
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

/// 一次导航的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// 会话尚未确定，先显示加载状态
    Pending,
    Render(AppRoute),
    /// 重定向（替换历史记录）
    Redirect(AppRoute),
}

impl Navigation {
    /// 最终展示的路由；`Pending` 时为 `None`
    pub fn route(&self) -> Option<AppRoute> {
        match self {
            Navigation::Pending => None,
            Navigation::Render(r) | Navigation::Redirect(r) => Some(*r),
        }
    }
}

/// 计算访问 `target` 时的导航结果
pub fn resolve_navigation(target: AppRoute, session: &SessionState) -> Navigation {
    if !session.is_resolved() {
        return Navigation::Pending;
    }
    if target == AppRoute::Home {
        let home = AppRoute::from_path(access::home_route_for(session.role()));
        return Navigation::Redirect(home);
    }
    match access::guard(session, target.access()) {
        None => Navigation::Pending,
        Some(RenderDecision::RenderChildren) => Navigation::Render(target),
        Some(RenderDecision::RedirectTo(path)) => Navigation::Redirect(AppRoute::from_path(path)),
    }
}
