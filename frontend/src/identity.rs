//! 第三方身份提供方
//!
//! 核心只依赖两个能力：用邮箱密码换取 ID token，以及登出。
//! 生产实现走身份提供方的 REST 接口（密码登录），与网关共用同一个传输层。

use std::rc::Rc;
use std::time::Duration;

use campus_shared::protocol::HttpMethod;
use serde::{Deserialize, Serialize};

use crate::config::IdentityConfig;
use crate::error::{ClientError, ClientResult};
use crate::gateway::{HttpRequest, Transport};

#[async_trait::async_trait(?Send)]
pub trait IdentityProvider {
    /// 返回身份提供方签发的 ID token
    async fn sign_in(&self, email: &str, password: &str) -> ClientResult<String>;
    async fn sign_out(&self) -> ClientResult<()>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordSignIn<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    id_token: String,
}

#[derive(Deserialize)]
struct ProviderErrorEnvelope {
    error: ProviderError,
}

#[derive(Deserialize)]
struct ProviderError {
    #[serde(default)]
    message: String,
}

/// 把身份提供方的错误码翻译为可读消息
fn describe_provider_error(code: &str) -> String {
    // 错误码可能带后缀，例如 "TOO_MANY_ATTEMPTS_TRY_LATER : ..."
    let code = code.split(':').next().unwrap_or(code).trim();
    match code {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            "Invalid email or password".to_string()
        }
        "USER_DISABLED" => "This account has been disabled".to_string(),
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "Too many attempts, try again later".to_string(),
        "INVALID_EMAIL" => "Invalid email address".to_string(),
        "" => "Sign-in failed".to_string(),
        other => other.to_string(),
    }
}

pub struct PasswordIdentityProvider {
    transport: Rc<dyn Transport>,
    config: IdentityConfig,
    /// 与后端请求共用同一个超时
    timeout: Duration,
}

impl PasswordIdentityProvider {
    pub fn new(transport: Rc<dyn Transport>, config: IdentityConfig, timeout: Duration) -> Self {
        Self {
            transport,
            config,
            timeout,
        }
    }

    fn sign_in_url(&self) -> String {
        format!(
            "{}/accounts:signInWithPassword?key={}",
            self.config.endpoint, self.config.api_key
        )
    }
}

#[async_trait::async_trait(?Send)]
impl IdentityProvider for PasswordIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> ClientResult<String> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ClientError::Authentication(
                "Email and password are required".into(),
            ));
        }

        let body = serde_json::to_string(&PasswordSignIn {
            email: email.trim(),
            password,
            return_secure_token: true,
        })?;
        let req = HttpRequest::new(&self.sign_in_url(), HttpMethod::Post)
            .with_header("Content-Type", "application/json")
            .with_body(body)
            .with_timeout(self.timeout);

        let resp = self.transport.send(req).await?;
        if !resp.ok() {
            let code = serde_json::from_str::<ProviderErrorEnvelope>(&resp.body)
                .map(|e| e.error.message)
                .unwrap_or_default();
            log::info!("[Identity] Sign-in rejected: {}", code);
            return Err(ClientError::Authentication(describe_provider_error(&code)));
        }

        let parsed: SignInResponse = resp.json()?;
        Ok(parsed.id_token)
    }

    async fn sign_out(&self) -> ClientResult<()> {
        // REST 登录不在本地保留提供方状态
        Ok(())
    }
}
