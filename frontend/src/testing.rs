//! 测试用的共享 Mock 组件

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use campus_shared::{Course, Enrollment, EnrollmentStatus, Role, User};
use chrono::{TimeZone, Utc};

use crate::error::{ClientError, ClientResult};
use crate::gateway::{HttpRequest, HttpResponse, Transport};
use crate::identity::IdentityProvider;
use crate::session::KeyValueStore;

// =========================================================
// Storage
// =========================================================

/// 内存键值存储
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
    /// 写入这些键时模拟失败
    failing_keys: RefCell<Vec<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes_to(&self, key: &str) {
        self.failing_keys.borrow_mut().push(key.to_string());
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        if self.failing_keys.borrow().iter().any(|k| k == key) {
            return false;
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        true
    }

    fn delete(&self, key: &str) -> bool {
        self.entries.borrow_mut().remove(key);
        true
    }
}

// =========================================================
// Scripted transport
// =========================================================

#[derive(Clone)]
pub enum Reply {
    Json(u16, String),
    Fail(ClientError),
    /// 永不返回，用于模拟页面离开时仍在途中的请求
    Hang,
}

impl Reply {
    pub fn ok(body: impl Into<String>) -> Self {
        Reply::Json(200, body.into())
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Reply::Json(status, body.into())
    }
}

/// 按 "METHOD url" 编排响应；队列只剩一个时重复使用最后一个
#[derive(Default)]
pub struct MockTransport {
    routes: RefCell<HashMap<String, VecDeque<Reply>>>,
    /// Every request that reached the transport, in order.
    pub requests: RefCell<Vec<HttpRequest>>,
    pub sleeps: RefCell<Vec<Duration>>,
}

impl MockTransport {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn on(&self, method: &str, url: &str, reply: Reply) -> &Self {
        self.routes
            .borrow_mut()
            .entry(format!("{} {}", method, url))
            .or_default()
            .push_back(reply);
        self
    }

    pub fn count(&self, method: &str, url: &str) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.method.as_str() == method && r.url == url)
            .count()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.borrow().last().cloned()
    }
}

#[async_trait(?Send)]
impl Transport for MockTransport {
    async fn send(&self, req: HttpRequest) -> ClientResult<HttpResponse> {
        let key = format!("{} {}", req.method.as_str(), req.url);
        self.requests.borrow_mut().push(req);

        let reply = {
            let mut routes = self.routes.borrow_mut();
            match routes.get_mut(&key) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match reply {
            Some(Reply::Json(status, body)) => Ok(HttpResponse { status, body }),
            Some(Reply::Fail(err)) => Err(err),
            Some(Reply::Hang) => std::future::pending().await,
            None => Ok(HttpResponse {
                status: 404,
                body: format!(r#"{{"message":"no route for {}"}}"#, key),
            }),
        }
    }

    async fn sleep(&self, delay: Duration) {
        self.sleeps.borrow_mut().push(delay);
    }
}

// =========================================================
// Fake identity provider
// =========================================================

#[derive(Default)]
pub struct FakeIdentity {
    /// (email, password) -> id token
    pub accounts: RefCell<HashMap<(String, String), String>>,
    pub sign_outs: RefCell<u32>,
}

impl FakeIdentity {
    pub fn with_account(email: &str, password: &str, id_token: &str) -> Rc<Self> {
        let fake = Self::default();
        fake.accounts.borrow_mut().insert(
            (email.to_string(), password.to_string()),
            id_token.to_string(),
        );
        Rc::new(fake)
    }
}

#[async_trait(?Send)]
impl IdentityProvider for FakeIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> ClientResult<String> {
        self.accounts
            .borrow()
            .get(&(email.to_string(), password.to_string()))
            .cloned()
            .ok_or_else(|| ClientError::Authentication("Invalid email or password".into()))
    }

    async fn sign_out(&self) -> ClientResult<()> {
        *self.sign_outs.borrow_mut() += 1;
        Ok(())
    }
}

// =========================================================
// Fixtures
// =========================================================

pub fn user(id: &str, role: Role) -> User {
    User {
        id: id.to_string(),
        email: format!("{}@campus.io", id),
        display_name: id.to_uppercase(),
        role,
        created_at: Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap(),
        last_login: None,
    }
}

pub fn course(id: u64) -> Course {
    Course {
        id,
        title: format!("Course {}", id),
        description: None,
        teacher_id: Some("t-1".into()),
        teacher_name: None,
        capacity: Some(30),
        created_at: None,
    }
}

pub fn enrollment(id: u64, course_id: u64, status: EnrollmentStatus) -> Enrollment {
    Enrollment {
        id,
        student_id: "s-1".into(),
        student_name: None,
        course_id,
        status,
        grade: None,
        enrolled_at: None,
    }
}

pub fn json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap()
}
