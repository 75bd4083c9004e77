//! LocalStorage 封装模块
//!
//! 使用 `web_sys::Storage` 替代 `gloo-storage`，并实现会话层使用的
//! [`KeyValueStore`]。

use wasm_bindgen::prelude::*;
use web_sys::StorageEvent;

use crate::session::{KeyValueStore, SessionStore};

/// 浏览器 LocalStorage
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserStorage;

impl BrowserStorage {
    /// 获取 LocalStorage 实例
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

impl KeyValueStore for BrowserStorage {
    /// 键不存在或发生错误时返回 `None`
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    /// 配额超限或存储不可用时返回 `false`
    fn set(&self, key: &str, value: &str) -> bool {
        Self::storage()
            .and_then(|s| s.set_item(key, value).ok())
            .is_some()
    }

    fn delete(&self, key: &str) -> bool {
        Self::storage()
            .and_then(|s| s.remove_item(key).ok())
            .is_some()
    }
}

/// 监听会话键在本标签页之外的修改（其他标签页登录/登出、开发者工具手动清除）
///
/// 浏览器只在其他文档修改存储时派发 `storage` 事件，本页自己的写入不会触发。
pub fn on_session_change(callback: impl Fn() + 'static) {
    let closure = Closure::<dyn Fn(StorageEvent)>::new(move |event: StorageEvent| {
        if SessionStore::is_session_key(event.key().as_deref()) {
            log::debug!("[Storage] Session keys changed outside this tab.");
            callback();
        }
    });

    if let Some(window) = web_sys::window() {
        if window
            .add_event_listener_with_callback("storage", closure.as_ref().unchecked_ref())
            .is_err()
        {
            log::warn!("[Storage] Failed to listen for storage events.");
        }
    }

    // 泄漏闭包以保持监听器存活
    closure.forget();
}
