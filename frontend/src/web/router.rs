//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，实现高内聚：
//! 所有对 window.history 的操作都集中在此模块。
//! 实现了"监听 -> 验证 -> 处理 -> 加载"的导航流程，
//! 验证本身由 [`resolve_navigation`] 完成。

use leptos::prelude::*;
use wasm_bindgen::prelude::*;

use super::route::{AppRoute, Navigation, resolve_navigation};
use crate::session::SessionState;

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// 推送 History 状态（内部工具函数）
fn push_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 替换 History 状态（内部工具函数，用于重定向）
fn replace_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 同步浏览器标签页标题
fn set_document_title(route: AppRoute) {
    if let Some(document) = web_sys::window().and_then(|w| w.document()) {
        document.set_title(&format!("{} | Campus", route.title()));
    }
}

fn write_history(path: &str, use_push: bool) {
    if use_push {
        push_history_state(path);
    } else {
        replace_history_state(path);
    }
}

/// 路由器服务
///
/// 封装所有路由操作，通过 Signal 驱动界面更新。
/// 通过注入会话信号实现与认证系统的解耦。
#[derive(Clone, Copy)]
pub struct RouterService {
    /// 当前导航结果（只读信号）
    current: ReadSignal<Navigation>,
    set_current: WriteSignal<Navigation>,
    /// 用户请求的路由；会话未确定时保留，确定后再判定
    requested: StoredValue<AppRoute>,
    /// 会话状态（注入的信号，实现解耦）
    session: Signal<SessionState>,
}

impl RouterService {
    fn new(session: Signal<SessionState>) -> Self {
        let initial_route = AppRoute::from_path(&current_path());
        let initial = resolve_navigation(initial_route, &session.get_untracked());
        let (current, set_current) = signal(initial);

        Self {
            current,
            set_current,
            requested: StoredValue::new(initial_route),
            session,
        }
    }

    pub fn current(&self) -> ReadSignal<Navigation> {
        self.current
    }

    /// **核心方法：导航与守卫**
    pub fn navigate(&self, path: &str) {
        self.navigate_to_route(AppRoute::from_path(path), true);
    }

    /// 导航到指定路由
    ///
    /// # Arguments
    /// * `target` - 目标路由
    /// * `use_push` - true 使用 pushState, false 使用 replaceState
    fn navigate_to_route(&self, target: AppRoute, use_push: bool) {
        let navigation = resolve_navigation(target, &self.session.get_untracked());

        match navigation {
            Navigation::Pending => {
                log::debug!("[Router] Session not resolved yet, holding {}", target);
                self.requested.set_value(target);
                write_history(target.to_path(), use_push);
            }
            Navigation::Render(route) => {
                self.requested.set_value(route);
                write_history(route.to_path(), use_push);
            }
            Navigation::Redirect(route) => {
                log::info!("[Router] {} is not accessible, redirecting to {}", target, route);
                self.requested.set_value(route);
                write_history(route.to_path(), use_push);
            }
        }
        if let Some(route) = navigation.route() {
            set_document_title(route);
        }
        self.set_current.set(navigation);
    }

    /// 初始化浏览器后退/前进按钮监听
    fn init_popstate_listener(&self) {
        let router = *self;

        let closure = Closure::<dyn Fn()>::new(move || {
            // popstate 时也执行守卫逻辑
            let target = AppRoute::from_path(&current_path());
            router.navigate_to_route(target, false);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 会话变化（启动恢复、登录、登出、服务端 401）时重新判定当前路由
    fn setup_session_redirect(&self) {
        let router = *self;
        let session = self.session;

        Effect::new(move |_| {
            let state = session.get();
            let target = router.requested.get_value();
            log::debug!(
                "[Router] Session changed (authenticated: {}), re-checking {}",
                state.is_authenticated(),
                target
            );
            router.navigate_to_route(target, false);
        });
    }
}

/// 提供路由服务到 Context 并初始化
fn provide_router(session: Signal<SessionState>) -> RouterService {
    let router = RouterService::new(session);

    // 初始化监听器
    router.init_popstate_listener();
    router.setup_session_redirect();

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
///
/// 提供路由上下文，应在 App 根部使用。
#[component]
pub fn Router(
    /// 会话状态信号
    session: Signal<SessionState>,
    /// 子组件
    children: Children,
) -> impl IntoView {
    provide_router(session);

    children()
}

/// 路由出口组件
///
/// 根据当前路由状态渲染对应的组件；会话未确定时显示加载占位。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || match router.current().get().route() {
        Some(route) => matcher(route),
        None => view! { <div class="route-pending">"Loading..."</div> }.into_any(),
    }
}

/// 站内链接，拦截点击并走路由守卫
#[component]
pub fn Link(
    /// 目标路径
    #[prop(into)]
    to: String,
    children: Children,
) -> impl IntoView {
    let router = use_router();

    let target = to.clone();
    let on_click = move |ev: web_sys::MouseEvent| {
        ev.prevent_default();
        router.navigate(&target);
    };

    view! {
        <a href=to on:click=on_click>
            {children()}
        </a>
    }
}
