//! 会话持久化
//!
//! 会话 = 序列化的用户记录 + bearer token，两者成对存放在键值存储中。
//! `SessionStore` 是判断"是否存在会话"的唯一来源：
//! - 读取失败、数据损坏或只有一半数据时一律视为没有会话，从不抛给 UI
//! - 写入要么两个键都成功，要么回滚到没有会话

use std::rc::Rc;

use campus_shared::{Role, User};
use crate::error::{ClientError, ClientResult};

pub const STORAGE_USER_KEY: &str = "user";
pub const STORAGE_TOKEN_KEY: &str = "token";

// =========================================================
// 会话模型
// =========================================================

/// 当前标签页的已认证身份
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: User,
    pub token: String,
}

impl Session {
    pub fn new(user: User, token: impl Into<String>) -> Self {
        Self {
            user,
            token: token.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn email(&self) -> &str {
        &self.user.email
    }

    pub fn display_name(&self) -> &str {
        &self.user.display_name
    }

    pub fn role(&self) -> Role {
        self.user.role
    }
}

/// 内存中的会话状态
///
/// `Unresolved` 只存在于启动阶段读取存储之前。
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    #[default]
    Unresolved,
    Absent,
    Present(Session),
}

impl SessionState {
    pub fn from_loaded(session: Option<Session>) -> Self {
        match session {
            Some(s) => SessionState::Present(s),
            None => SessionState::Absent,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, SessionState::Unresolved)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Present(_))
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Present(s) => Some(s),
            _ => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.session().map(Session::role)
    }
}

// =========================================================
// 键值存储抽象
// =========================================================

/// 同步键值存储（浏览器 LocalStorage 的抽象）
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    /// 返回是否写入成功
    fn set(&self, key: &str, value: &str) -> bool;
    /// 返回是否删除成功
    fn delete(&self, key: &str) -> bool;
}

// =========================================================
// 会话持久化适配器
// =========================================================

#[derive(Clone)]
pub struct SessionStore {
    storage: Rc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(storage: Rc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// 读取会话，任何异常都返回 `None`
    pub fn load(&self) -> Option<Session> {
        let raw_user = self.storage.get(STORAGE_USER_KEY);
        let token = self.storage.get(STORAGE_TOKEN_KEY);

        let (raw_user, token) = match (raw_user, token) {
            (Some(u), Some(t)) => (u, t),
            (None, None) => return None,
            _ => {
                log::warn!("[Session] Half-written session found in storage, ignoring.");
                return None;
            }
        };

        if token.trim().is_empty() {
            log::warn!("[Session] Empty token in storage, ignoring.");
            return None;
        }

        match serde_json::from_str::<User>(&raw_user) {
            Ok(user) => Some(Session::new(user, token)),
            Err(e) => {
                log::warn!("[Session] Stored user record is malformed: {}", e);
                None
            }
        }
    }

    /// 只读取 token（请求拦截器使用）
    ///
    /// 与 `load` 一致：没有完整会话时不返回 token。
    pub fn token(&self) -> Option<String> {
        self.load().map(|s| s.token)
    }

    /// 写入会话，两个键要么都写入，要么都不写入
    pub fn save(&self, session: &Session) -> ClientResult<()> {
        if session.token.trim().is_empty() {
            return Err(ClientError::InvalidInput("empty session token".into()));
        }
        let raw_user = serde_json::to_string(&session.user)
            .map_err(|e| ClientError::Storage(e.to_string()))?;

        if !self.storage.set(STORAGE_USER_KEY, &raw_user) {
            self.clear();
            return Err(ClientError::Storage("failed to persist user record".into()));
        }
        if !self.storage.set(STORAGE_TOKEN_KEY, &session.token) {
            self.clear();
            return Err(ClientError::Storage("failed to persist token".into()));
        }
        Ok(())
    }

    /// 清除会话（token 先删，避免残留可用 token）
    pub fn clear(&self) {
        let token_removed = self.storage.delete(STORAGE_TOKEN_KEY);
        let user_removed = self.storage.delete(STORAGE_USER_KEY);
        if !(token_removed && user_removed) {
            log::warn!("[Session] Failed to fully clear session from storage.");
        }
    }

    /// 浏览器 `storage` 事件中变化的键是否属于会话（`None` 表示整个存储被清空）
    pub fn is_session_key(key: Option<&str>) -> bool {
        key.is_none_or(|k| k == STORAGE_USER_KEY || k == STORAGE_TOKEN_KEY)
    }
}
