//! 客户端错误类型
//!
//! 服务层返回 `ClientResult<T>`，Store 把错误记录为字符串，
//! Controller 再把它归一化为 `Outcome`。

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// 凭据错误、身份提供方拒绝等（登录表单上展示）
    #[error("Authentication failed: {0}")]
    Authentication(String),
    /// 后端返回 401，会话已被清除
    #[error("Session expired, please sign in again")]
    Unauthorized,
    /// 401 以外的 4xx/5xx
    #[error("Request failed ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Malformed response: {0}")]
    Decode(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ClientError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        ClientError::Http {
            status,
            message: message.into(),
        }
    }

    /// 是否属于瞬时故障（仅对幂等请求重试）
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Network(_) | ClientError::Timeout => true,
            ClientError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Decode(e.to_string())
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
