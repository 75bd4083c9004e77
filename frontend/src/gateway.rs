//! API 网关客户端
//!
//! 所有后端请求的唯一出口：
//! - 请求拦截：附加 `Authorization: Bearer <token>`
//! - 响应拦截：带 token 的请求收到 401 时清除会话并通知订阅者（路由随后跳转登录页）；
//!   未带 token 的 401（例如登录被拒）是认证失败，原样带回后端消息
//! - 每个请求都有超时；只有幂等的 GET 会在瞬时故障时退避重试

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use campus_shared::protocol::{ApiRequest, HttpMethod};
use campus_shared::{BEARER_PREFIX, ErrorBody, HEADER_AUTHORIZATION};
use serde::de::DeserializeOwned;

use crate::error::{ClientError, ClientResult};
use crate::session::SessionStore;

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: HashMap::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 解析 JSON，空响应体按 `null` 处理（对应 `()` 响应）
    pub fn json<T: DeserializeOwned>(&self) -> ClientResult<T> {
        let body = if self.body.trim().is_empty() {
            "null"
        } else {
            self.body.as_str()
        };
        serde_json::from_str(body).map_err(ClientError::from)
    }

    /// 从错误响应体中提取可读消息
    pub fn error_message(&self) -> String {
        serde_json::from_str::<ErrorBody>(&self.body)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| {
                let text = self.body.trim();
                if text.is_empty() || text.len() > 200 {
                    format!("HTTP {}", self.status)
                } else {
                    text.to_string()
                }
            })
    }
}

/// HTTP 传输层特性
/// (?Send) 是因为浏览器环境下 fetch 相关类型不是 Send 的
#[async_trait::async_trait(?Send)]
pub trait Transport {
    async fn send(&self, req: HttpRequest) -> ClientResult<HttpResponse>;

    /// 重试退避时的等待
    async fn sleep(&self, delay: Duration);
}

// =========================================================
// 重试策略
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// 最大尝试次数（包含第一次）
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_multiplier: f64,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(200),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(3),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// 第 `attempt` 次失败后的等待时间（attempt 从 1 开始）
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = self
            .backoff_multiplier
            .powi(attempt.saturating_sub(1) as i32);
        let secs = (self.initial_delay.as_secs_f64() * factor).min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(secs.max(0.0))
    }
}

// =========================================================
// 网关客户端
// =========================================================

type UnauthorizedHook = Rc<dyn Fn()>;

pub struct ApiClient {
    base_url: String,
    transport: Rc<dyn Transport>,
    session: SessionStore,
    timeout: Duration,
    retry: RetryPolicy,
    on_unauthorized: RefCell<Vec<UnauthorizedHook>>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        transport: Rc<dyn Transport>,
        session: SessionStore,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            session,
            timeout,
            retry,
            on_unauthorized: RefCell::new(Vec::new()),
        }
    }

    #[cfg(test)]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// 注册 401 回调
    pub fn on_unauthorized(&self, hook: impl Fn() + 'static) {
        self.on_unauthorized.borrow_mut().push(Rc::new(hook));
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// 请求拦截器
    fn build_request<R: ApiRequest>(&self, req: &R) -> ClientResult<HttpRequest> {
        let path = req.path();
        let mut http = HttpRequest::new(&self.url(&path), R::METHOD)
            .with_header("Accept", "application/json")
            .with_timeout(self.timeout);

        if R::METHOD.carries_body() {
            let body = serde_json::to_string(req)
                .map_err(|e| ClientError::InvalidInput(e.to_string()))?;
            http = http
                .with_header("Content-Type", "application/json")
                .with_body(body);
        }

        if let Some(token) = self.session.token() {
            http = http.with_header(
                HEADER_AUTHORIZATION,
                &format!("{}{}", BEARER_PREFIX, token),
            );
        }
        Ok(http)
    }

    /// 响应拦截器
    fn intercept(&self, req: &HttpRequest, resp: HttpResponse) -> ClientResult<HttpResponse> {
        if resp.status == 401 {
            if req.header(HEADER_AUTHORIZATION).is_none() {
                return Err(ClientError::Authentication(resp.error_message()));
            }
            log::info!("[Gateway] 401 received, clearing session.");
            self.session.clear();
            // 先复制一份，避免回调中再注册时重复借用
            let hooks: Vec<UnauthorizedHook> = self.on_unauthorized.borrow().clone();
            for hook in hooks {
                hook();
            }
            return Err(ClientError::Unauthorized);
        }
        if !resp.ok() {
            return Err(ClientError::http(resp.status, resp.error_message()));
        }
        Ok(resp)
    }

    /// 发送一个类型化请求
    pub async fn call<R: ApiRequest>(&self, req: &R) -> ClientResult<R::Response> {
        let http = self.build_request(req)?;
        let max_attempts = if R::METHOD.is_retryable() {
            self.retry.max_attempts.max(1)
        } else {
            1
        };

        let mut attempt = 1;
        loop {
            log::debug!(
                "[Gateway] {} {} (attempt {}/{})",
                http.method.as_str(),
                http.url,
                attempt,
                max_attempts
            );

            let result = match self.transport.send(http.clone()).await {
                Ok(resp) => self.intercept(&http, resp),
                Err(e) => Err(e),
            };

            match result {
                Ok(resp) => return resp.json::<R::Response>(),
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    let delay = self.retry.delay_after(attempt);
                    log::warn!(
                        "[Gateway] {} {} failed ({}), retrying in {}ms",
                        http.method.as_str(),
                        http.url,
                        err,
                        delay.as_millis()
                    );
                    self.transport.sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    if attempt > 1 {
                        log::warn!(
                            "[Gateway] {} {} failed permanently after {} attempts: {}",
                            http.method.as_str(),
                            http.url,
                            attempt,
                            err
                        );
                    }
                    return Err(err);
                }
            }
        }
    }
}
