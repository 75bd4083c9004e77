//! 定时器封装模块
//!
//! 使用 `web_sys` 的原生定时器 API 替代 `gloo-timers`。

use std::time::Duration;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

/// 等待指定时长（`setTimeout` 包装成 Promise）
///
/// 无法获取 window 时立即返回。
pub async fn sleep(delay: Duration) {
    let millis = delay.as_millis().min(i32::MAX as u128) as i32;
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        if let Some(window) = web_sys::window() {
            if window
                .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis)
                .is_ok()
            {
                return;
            }
        }
        let _ = resolve.call0(&JsValue::UNDEFINED);
    });
    let _ = JsFuture::from(promise).await;
}
