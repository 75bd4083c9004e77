use std::rc::Rc;

use campus_shared::protocol::RegisterRequest;
use campus_shared::{AccountStatus, Role, User};

use super::resource::{Action, Resource, track, track_action};
use crate::error::{ClientError, ClientResult};
use crate::observable::{Observable, Subscription};
use crate::services::AuthService;
use crate::session::{Session, SessionState, SessionStore};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserState {
    pub session: SessionState,
    /// `/auth/me` 的结果
    pub profile: Resource<User>,
    /// 登录/注册提交；错误在登录表单展示
    pub auth: Action,
    pub last_registration: Option<AccountStatus>,
}

impl UserState {
    pub fn role(&self) -> Option<Role> {
        self.session.role()
    }

    pub fn is_submitting(&self) -> bool {
        self.auth.is_running()
    }
}

fn profile(s: &mut UserState) -> &mut Resource<User> {
    &mut s.profile
}

fn auth_action(s: &mut UserState) -> &mut Action {
    &mut s.auth
}

/// 当前用户与会话
pub struct UserStore {
    state: Observable<UserState>,
    auth: AuthService,
    sessions: SessionStore,
}

impl UserStore {
    pub fn new(auth: AuthService, sessions: SessionStore) -> Self {
        Self {
            state: Observable::new(UserState::default()),
            auth,
            sessions,
        }
    }

    pub fn state(&self) -> Rc<UserState> {
        self.state.snapshot()
    }

    pub fn subscribe(&self, f: impl Fn(&UserState) + 'static) -> Subscription {
        self.state.subscribe(f)
    }

    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.state.unsubscribe(subscription)
    }

    /// 启动时从存储恢复会话，之后状态不再是 `Unresolved`
    pub fn bootstrap(&self) {
        let loaded = SessionState::from_loaded(self.sessions.load());
        log::info!(
            "[Auth] Session restored: {}",
            if loaded.is_authenticated() { "present" } else { "absent" }
        );
        self.state.update(|s| s.session = loaded);
    }

    /// 存储在外部被修改后（其他标签页登录/登出、手动清除）重新对齐内存中的会话
    ///
    /// 返回会话身份（用户或 token）是否改变
    pub fn resync(&self) -> bool {
        let loaded = SessionState::from_loaded(self.sessions.load());
        let changed = self.state.update(|s| {
            let identity = |state: &SessionState| {
                state
                    .session()
                    .map(|session| (session.user_id().to_string(), session.token.clone()))
            };
            let changed = identity(&s.session) != identity(&loaded);
            if changed {
                s.profile.reset();
            }
            s.session = loaded;
            changed
        });
        if changed {
            log::info!("[Auth] Session changed in storage, re-synced.");
        }
        changed
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<Session> {
        let result = track_action(
            &self.state,
            auth_action,
            (),
            self.establish_session(email, password),
        )
        .await;

        match &result {
            Ok(session) => {
                log::info!("[Auth] Signed in as {} ({})", session.email(), session.role());
                let session = session.clone();
                self.state.update(|s| {
                    s.session = SessionState::Present(session);
                    s.profile.reset();
                });
            }
            Err(e) => log::info!("[Auth] Sign-in failed: {}", e),
        }
        result
    }

    async fn establish_session(&self, email: &str, password: &str) -> ClientResult<Session> {
        let resp = self.auth.login(email, password).await?;
        let session = Session::new(resp.user, resp.token);
        self.sessions.save(&session)?;
        Ok(session)
    }

    /// 注册不建立会话；教师账号返回 `Pending`，等待管理员审批
    pub async fn register(&self, req: RegisterRequest) -> ClientResult<AccountStatus> {
        if req.email.trim().is_empty() || req.password.is_empty() {
            let err = ClientError::InvalidInput("email and password are required".into());
            self.state.update(|s| s.auth.fail(err.to_string()));
            return Err(err);
        }

        self.state.update(|s| s.last_registration = None);
        let status = track_action(&self.state, auth_action, (), self.auth.register(req))
            .await?
            .status;

        log::info!("[Auth] Registration accepted with status {:?}", status);
        self.state.update(|s| s.last_registration = Some(status));
        Ok(status)
    }

    pub async fn logout(&self) {
        self.auth.logout().await;
        self.sessions.clear();
        log::info!("[Auth] Signed out.");
        self.state.update(|s| {
            s.session = SessionState::Absent;
            s.profile.reset();
            s.auth.reset();
        });
    }

    /// 刷新个人资料，成功后同步到会话
    pub async fn refresh_profile(&self) -> ClientResult<User> {
        let user = track(&self.state, profile, self.auth.current_user()).await?;

        let refreshed = self.state.update(|s| match &mut s.session {
            SessionState::Present(session) => {
                session.user = user.clone();
                Some(session.clone())
            }
            _ => None,
        });
        if let Some(session) = refreshed {
            if let Err(e) = self.sessions.save(&session) {
                log::warn!("[Auth] Failed to persist refreshed profile: {}", e);
            }
        }
        Ok(user)
    }

    /// 会话在外部失效（后端 401）
    pub fn invalidate(&self) {
        self.sessions.clear();
        let was_present = self.state.update(|s| {
            let was_present = s.session.is_authenticated();
            s.session = SessionState::Absent;
            s.profile.reset();
            was_present
        });
        if was_present {
            log::info!("[Auth] Session invalidated by the server.");
        }
    }
}
