//! 加载状态原语
//!
//! 把"请求开始前置 loading、成功写数据、失败写 error、任何出口都清 loading"
//! 收敛为两个组合子：读取用 [`track`]，写操作用 [`track_action`]。
//!
//! 每次请求都会拿到一个递增的 generation 作为票据：
//! 只有票据仍是最新的响应才会被写入，较早发出但较晚返回的响应被丢弃。
//! 失败时保留上一次成功的数据（stale-but-available）。

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::error::ClientResult;
use crate::observable::Observable;

#[derive(Debug, Clone, PartialEq)]
pub struct Resource<T> {
    data: Option<T>,
    loading: bool,
    error: Option<String>,
    generation: u64,
    loaded_at: Option<DateTime<Utc>>,
}

impl<T> Default for Resource<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
            generation: 0,
            loaded_at: None,
        }
    }
}

/// 请求票据
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl<T> Resource<T> {
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    pub fn has_loaded(&self) -> bool {
        self.data.is_some()
    }

    /// 开始一次请求
    fn begin(&mut self) -> Ticket {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        Ticket(self.generation)
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation
    }

    /// 写入成功结果，过期票据返回 `false`
    fn resolve(&mut self, ticket: Ticket, value: T) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.data = Some(value);
        self.loading = false;
        self.error = None;
        self.loaded_at = Some(Utc::now());
        true
    }

    /// 记录失败，数据保持不变
    fn reject(&mut self, ticket: Ticket, error: impl Into<String>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.loading = false;
        self.error = Some(error.into());
        true
    }

    /// 请求被放弃（future 被丢弃）
    fn abandon(&mut self, ticket: Ticket) {
        if self.is_current(ticket) {
            self.loading = false;
        }
    }

    /// 在已有数据上就地修改（例如乐观合并单条更新）
    pub fn modify(&mut self, f: impl FnOnce(&mut T)) {
        if let Some(data) = self.data.as_mut() {
            f(data);
        }
    }

    /// 清空数据（用于登出等场景），并使所有在途请求失效
    pub fn reset(&mut self) {
        self.generation += 1;
        self.data = None;
        self.loading = false;
        self.error = None;
        self.loaded_at = None;
    }
}

impl<T> Resource<Vec<T>> {
    /// 尚未加载时返回空切片
    pub fn items(&self) -> &[T] {
        self.data.as_deref().unwrap_or(&[])
    }
}

/// 写操作状态：进行中的目标（`K`，例如正在选课的课程）与最近一次失败
#[derive(Debug, Clone, PartialEq)]
pub struct Action<K = ()> {
    running: Option<K>,
    error: Option<String>,
    generation: u64,
}

impl<K> Default for Action<K> {
    fn default() -> Self {
        Self {
            running: None,
            error: None,
            generation: 0,
        }
    }
}

impl<K> Action<K> {
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn running(&self) -> Option<&K> {
        self.running.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// 记录一次未发出请求的失败（本地校验）
    pub fn fail(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
    }

    pub fn reset(&mut self) {
        self.generation += 1;
        self.running = None;
        self.error = None;
    }

    fn begin(&mut self, key: K) -> Ticket {
        self.generation += 1;
        self.running = Some(key);
        self.error = None;
        Ticket(self.generation)
    }

    fn finish(&mut self, ticket: Ticket, error: Option<String>) -> bool {
        if ticket.0 != self.generation {
            return false;
        }
        self.running = None;
        self.error = error;
        true
    }

    fn abandon(&mut self, ticket: Ticket) {
        if ticket.0 == self.generation {
            self.running = None;
        }
    }
}

/// 字段选择器：从 Store 状态中取出某个 `Resource`
pub type Lens<S, T> = fn(&mut S) -> &mut Resource<T>;

/// 字段选择器：从 Store 状态中取出某个 `Action`
pub type ActionLens<S, K> = fn(&mut S) -> &mut Action<K>;

/// 在 drop 时执行清理，覆盖 future 被中途丢弃的出口
struct LoadingGuard<'a, S: Clone, F: FnOnce(&mut S)> {
    state: &'a Observable<S>,
    on_drop: Option<F>,
}

impl<'a, S: Clone, F: FnOnce(&mut S)> LoadingGuard<'a, S, F> {
    fn new(state: &'a Observable<S>, on_drop: F) -> Self {
        Self {
            state,
            on_drop: Some(on_drop),
        }
    }

    /// 操作已正常结束，不再需要清理
    fn disarm(&mut self) {
        self.on_drop = None;
    }
}

impl<S: Clone, F: FnOnce(&mut S)> Drop for LoadingGuard<'_, S, F> {
    fn drop(&mut self) {
        if let Some(on_drop) = self.on_drop.take() {
            self.state.update(on_drop);
        }
    }
}

/// 执行异步操作并维护加载状态
///
/// 返回操作本身的结果；过期的成功结果不会写入状态，但仍会返回给调用方。
pub async fn track<S, T, Fut>(state: &Observable<S>, lens: Lens<S, T>, op: Fut) -> ClientResult<T>
where
    S: Clone,
    T: Clone,
    Fut: Future<Output = ClientResult<T>>,
{
    let ticket = state.update(|s| lens(s).begin());
    let mut guard = LoadingGuard::new(state, move |s: &mut S| lens(s).abandon(ticket));

    let result = op.await;
    guard.disarm();

    let applied = match &result {
        Ok(value) => state.update(|s| lens(s).resolve(ticket, value.clone())),
        Err(e) => state.update(|s| lens(s).reject(ticket, e.to_string())),
    };
    if !applied {
        log::debug!("[Store] Discarding stale response (ticket {:?}).", ticket);
    }
    result
}

/// 执行一次写操作并维护 `Action`：开始时记录目标并清除旧错误，
/// 结束或被丢弃时清除进行中标记，失败时记录错误。
pub async fn track_action<S, K, T, Fut>(
    state: &Observable<S>,
    lens: ActionLens<S, K>,
    key: K,
    op: Fut,
) -> ClientResult<T>
where
    S: Clone,
    Fut: Future<Output = ClientResult<T>>,
{
    let ticket = state.update(|s| lens(s).begin(key));
    let mut guard = LoadingGuard::new(state, move |s: &mut S| lens(s).abandon(ticket));

    let result = op.await;
    guard.disarm();

    let error = result.as_ref().err().map(ToString::to_string);
    if !state.update(|s| lens(s).finish(ticket, error)) {
        log::debug!("[Store] Superseded action finished (ticket {:?}).", ticket);
    }
    result
}
