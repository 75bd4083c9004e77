//! 访问控制
//!
//! 纯函数：输入会话状态与路由的访问规则，输出"渲染"或"重定向到某路径"。
//! 不读写会话，也不依赖 DOM，路由服务和测试共用同一套判定。

use campus_shared::Role;

use crate::session::SessionState;

pub const LOGIN_PATH: &str = "/login";
pub const ADMIN_HOME: &str = "/admin-dashboard";
pub const TEACHER_HOME: &str = "/teacher-dashboard";
pub const STUDENT_HOME: &str = "/dashboard-overview-3";

/// 角色首页；没有会话时为登录页
pub fn home_route_for(role: Option<Role>) -> &'static str {
    match role {
        Some(Role::Admin) => ADMIN_HOME,
        Some(Role::Teacher) => TEACHER_HOME,
        Some(Role::Student) => STUDENT_HOME,
        None => LOGIN_PATH,
    }
}

/// 允许访问的角色集合
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowedRoles {
    Any,
    Only(&'static [Role]),
}

impl AllowedRoles {
    pub fn permits(&self, role: Role) -> bool {
        match self {
            AllowedRoles::Any => true,
            AllowedRoles::Only(roles) => roles.contains(&role),
        }
    }
}

/// 路由的访问规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// 任何人可访问
    Public,
    /// 只对未登录用户开放（登录、注册）
    GuestOnly,
    Authenticated(AllowedRoles),
}

impl Access {
    pub const fn any_user() -> Self {
        Access::Authenticated(AllowedRoles::Any)
    }

    pub const fn only(roles: &'static [Role]) -> Self {
        Access::Authenticated(AllowedRoles::Only(roles))
    }

    /// 嵌套路由的组合：子路由的规则覆盖父路由
    pub fn nest(self, child: Option<Access>) -> Access {
        child.unwrap_or(self)
    }
}

/// 一次导航的判定状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// 会话尚未从存储读出
    Unresolved,
    Unauthenticated,
    AuthenticatedUnauthorized(Role),
    Authorized,
}

impl GuardState {
    pub fn evaluate(session: &SessionState, access: Access) -> Self {
        let role = match session {
            SessionState::Unresolved => return GuardState::Unresolved,
            SessionState::Absent => None,
            SessionState::Present(s) => Some(s.role()),
        };

        match (access, role) {
            (Access::Public, _) => GuardState::Authorized,
            (Access::GuestOnly, None) => GuardState::Authorized,
            (Access::GuestOnly, Some(role)) => GuardState::AuthenticatedUnauthorized(role),
            (Access::Authenticated(_), None) => GuardState::Unauthenticated,
            (Access::Authenticated(allowed), Some(role)) if allowed.permits(role) => {
                GuardState::Authorized
            }
            (Access::Authenticated(_), Some(role)) => GuardState::AuthenticatedUnauthorized(role),
        }
    }

    /// 已确定的状态对应唯一的渲染决定；`Unresolved` 返回 `None`
    pub fn decision(self) -> Option<RenderDecision> {
        match self {
            GuardState::Unresolved => None,
            GuardState::Authorized => Some(RenderDecision::RenderChildren),
            GuardState::Unauthenticated => Some(RenderDecision::RedirectTo(LOGIN_PATH)),
            GuardState::AuthenticatedUnauthorized(role) => {
                Some(RenderDecision::RedirectTo(home_route_for(Some(role))))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderDecision {
    RenderChildren,
    RedirectTo(&'static str),
}

/// 守卫入口
pub fn guard(session: &SessionState, access: Access) -> Option<RenderDecision> {
    GuardState::evaluate(session, access).decision()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use crate::testing::user;

    const ADMIN_ONLY: Access = Access::only(&[Role::Admin]);
    const TEACHER_ONLY: Access = Access::only(&[Role::Teacher]);
    const STAFF: Access = Access::only(&[Role::Admin, Role::Teacher]);

    fn present(role: Role) -> SessionState {
        SessionState::Present(Session::new(user("u", role), "tok"))
    }

    fn all_states() -> Vec<SessionState> {
        let mut states = vec![SessionState::Absent];
        states.extend(Role::ALL.iter().map(|r| present(*r)));
        states
    }

    fn all_access() -> Vec<Access> {
        vec![
            Access::Public,
            Access::GuestOnly,
            Access::any_user(),
            ADMIN_ONLY,
            TEACHER_ONLY,
            STAFF,
            Access::only(&[]),
        ]
    }

    #[test]
    fn test_home_route_is_total() {
        let homes: Vec<&str> = Role::ALL.iter().map(|r| home_route_for(Some(*r))).collect();
        assert_eq!(homes, vec![ADMIN_HOME, TEACHER_HOME, STUDENT_HOME]);
        assert_eq!(home_route_for(None), LOGIN_PATH);
    }

    #[test]
    fn test_every_resolved_pair_yields_one_decision() {
        for state in all_states() {
            for access in all_access() {
                let decision = guard(&state, access)
                    .unwrap_or_else(|| panic!("unresolved for {:?} / {:?}", state, access));

                match decision {
                    RenderDecision::RenderChildren => {
                        // 受保护内容只渲染给已登录且角色允许的用户
                        if let Access::Authenticated(allowed) = access {
                            let role = state.role().expect("rendered without session");
                            assert!(allowed.permits(role));
                        }
                    }
                    RenderDecision::RedirectTo(path) => {
                        assert_eq!(path, home_route_for(state.role()));
                    }
                }
            }
        }
    }

    #[test]
    fn test_unresolved_session_defers_decision() {
        for access in all_access() {
            assert_eq!(guard(&SessionState::Unresolved, access), None);
        }
    }

    #[test]
    fn test_student_visiting_admin_dashboard() {
        assert_eq!(
            guard(&present(Role::Student), ADMIN_ONLY),
            Some(RenderDecision::RedirectTo("/dashboard-overview-3"))
        );
    }

    #[test]
    fn test_anonymous_visiting_teacher_dashboard() {
        assert_eq!(
            guard(&SessionState::Absent, TEACHER_ONLY),
            Some(RenderDecision::RedirectTo("/login"))
        );
    }

    #[test]
    fn test_guest_only_redirects_signed_in_users_home() {
        assert_eq!(
            guard(&present(Role::Teacher), Access::GuestOnly),
            Some(RenderDecision::RedirectTo(TEACHER_HOME))
        );
        assert_eq!(
            guard(&SessionState::Absent, Access::GuestOnly),
            Some(RenderDecision::RenderChildren)
        );
    }

    #[test]
    fn test_child_access_overrides_parent() {
        let parent = STAFF;
        assert_eq!(parent.nest(Some(ADMIN_ONLY)), ADMIN_ONLY);
        assert_eq!(parent.nest(None), STAFF);
        assert_eq!(
            guard(&present(Role::Teacher), parent.nest(Some(ADMIN_ONLY))),
            Some(RenderDecision::RedirectTo(TEACHER_HOME))
        );
    }
}
