use std::rc::Rc;

use campus_shared::protocol::{
    BackendLoginRequest, CurrentUserRequest, LogoutRequest, RegisterRequest,
};
use campus_shared::{LoginResponse, RegisterResponse, User};

use crate::error::ClientResult;
use crate::gateway::ApiClient;
use crate::identity::IdentityProvider;

#[derive(Clone)]
pub struct AuthService {
    api: Rc<ApiClient>,
    identity: Rc<dyn IdentityProvider>,
}

impl AuthService {
    pub fn new(api: Rc<ApiClient>, identity: Rc<dyn IdentityProvider>) -> Self {
        Self { api, identity }
    }

    /// 身份提供方登录，再用 ID token 换取后端会话 token
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<LoginResponse> {
        let id_token = self.identity.sign_in(email, password).await?;
        self.api.call(&BackendLoginRequest { id_token }).await
    }

    pub async fn register(&self, req: RegisterRequest) -> ClientResult<RegisterResponse> {
        self.api.call(&req).await
    }

    pub async fn current_user(&self) -> ClientResult<User> {
        self.api.call(&CurrentUserRequest).await
    }

    /// 尽力通知后端并登出身份提供方，失败只记录日志
    pub async fn logout(&self) {
        if let Err(e) = self.api.call(&LogoutRequest).await {
            log::warn!("[Auth] Backend logout failed: {}", e);
        }
        if let Err(e) = self.identity.sign_out().await {
            log::warn!("[Auth] Identity provider sign-out failed: {}", e);
        }
    }
}
