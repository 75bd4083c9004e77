//! HTTP 传输层
//!
//! 使用 `web_sys::fetch` 实现 [`Transport`]，替代 `gloo-net`。
//! 超时通过 `AbortController` + `setTimeout` 实现：到期后中止 fetch，
//! 并把中止错误映射为 `ClientError::Timeout`。

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, Headers, Request, RequestInit, Response};

use super::timer;
use crate::error::{ClientError, ClientResult};
use crate::gateway::{HttpRequest, HttpResponse, Transport};

fn js_error(e: JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{:?}", e))
}

/// 到期后中止请求的定时器；drop 时清除
struct AbortTimer {
    handle: i32,
    fired: Rc<Cell<bool>>,
    _closure: Closure<dyn Fn()>,
}

impl AbortTimer {
    fn start(controller: AbortController, timeout: Duration) -> Option<Self> {
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        let closure = Closure::<dyn Fn()>::new(move || {
            flag.set(true);
            controller.abort();
        });

        let handle = web_sys::window()?
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                timeout.as_millis().min(i32::MAX as u128) as i32,
            )
            .ok()?;

        Some(Self {
            handle,
            fired,
            _closure: closure,
        })
    }

    fn fired(&self) -> bool {
        self.fired.get()
    }
}

impl Drop for AbortTimer {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            window.clear_timeout_with_handle(self.handle);
        }
    }
}

/// 基于 fetch 的传输层
#[derive(Debug, Default, Clone, Copy)]
pub struct FetchTransport;

impl FetchTransport {
    fn build(req: &HttpRequest) -> ClientResult<(Request, Option<AbortController>)> {
        let headers = Headers::new().map_err(|e| ClientError::InvalidInput(js_error(e)))?;
        for (key, value) in &req.headers {
            headers.set(key, value).map_err(|e| {
                ClientError::InvalidInput(format!("header {}: {}", key, js_error(e)))
            })?;
        }

        let opts = RequestInit::new();
        opts.set_method(req.method.as_str());
        opts.set_headers(&headers.into());
        if let Some(body) = &req.body {
            opts.set_body(&JsValue::from_str(body));
        }

        let controller = match req.timeout {
            Some(_) => {
                let controller = AbortController::new()
                    .map_err(|e| ClientError::Network(js_error(e)))?;
                opts.set_signal(Some(&controller.signal()));
                Some(controller)
            }
            None => None,
        };

        let request = Request::new_with_str_and_init(&req.url, &opts)
            .map_err(|e| ClientError::InvalidInput(js_error(e)))?;
        Ok((request, controller))
    }

    async fn read_body(response: &Response) -> ClientResult<String> {
        let promise = response
            .text()
            .map_err(|e| ClientError::Decode(js_error(e)))?;
        let text = JsFuture::from(promise)
            .await
            .map_err(|e| ClientError::Network(js_error(e)))?;
        text.as_string()
            .ok_or_else(|| ClientError::Decode("response body is not text".into()))
    }
}

#[async_trait::async_trait(?Send)]
impl Transport for FetchTransport {
    async fn send(&self, req: HttpRequest) -> ClientResult<HttpResponse> {
        let (request, controller) = Self::build(&req)?;
        let window = web_sys::window()
            .ok_or_else(|| ClientError::Network("window is not available".into()))?;

        let abort_timer = match (controller, req.timeout) {
            (Some(controller), Some(timeout)) => AbortTimer::start(controller, timeout),
            _ => None,
        };

        let fetched = JsFuture::from(window.fetch_with_request(&request)).await;
        let timed_out = abort_timer.as_ref().is_some_and(AbortTimer::fired);

        let value = match fetched {
            Ok(value) => value,
            Err(_) if timed_out => return Err(ClientError::Timeout),
            Err(e) => return Err(ClientError::Network(js_error(e))),
        };
        let response: Response = value
            .dyn_into()
            .map_err(|e| ClientError::Decode(js_error(e)))?;

        let body = match Self::read_body(&response).await {
            Err(_) if abort_timer.as_ref().is_some_and(AbortTimer::fired) => {
                return Err(ClientError::Timeout);
            }
            other => other?,
        };

        Ok(HttpResponse {
            status: response.status(),
            body,
        })
    }

    async fn sleep(&self, delay: Duration) {
        timer::sleep(delay).await;
    }
}
