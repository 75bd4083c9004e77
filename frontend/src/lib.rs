//! Campus 前端应用
//!
//! 分层结构：
//! - `gateway` / `services`: HTTP 网关与按角色划分的后端接口
//! - `stores`: 可观察的状态容器，所有异步状态都经由 `Resource` 追踪
//! - `access` / `web::route`: 访问控制与路由决策（纯函数，可在原生环境测试）
//! - `context` / `controller`: 组合根与页面调用的用例
//! - `bridge` / `components`: Leptos 信号桥与 UI 组件层

mod access;
mod aggregate;
mod bridge;
mod components {
    pub mod admin;
    pub mod layout;
    pub mod login;
    pub mod register;
    pub mod student;
    pub mod teacher;
}
mod config;
mod context;
mod controller;
mod error;
mod gateway;
mod identity;
mod listing;
mod observable;
mod services;
mod session;
mod stores;
#[cfg(test)]
pub(crate) mod testing;

// 原生 Web API 封装模块
// 此模块提供对浏览器原生 API 的轻量级封装，替代 gloo-* 系列 crate，
// 以减小 WASM 二进制体积。
pub(crate) mod web {
    pub mod console;
    pub mod http;
    pub mod route;
    pub mod router;
    pub mod storage;
    pub mod timer;

    pub use http::FetchTransport;
    pub use storage::BrowserStorage;
}

use std::rc::Rc;

use leptos::prelude::*;

use crate::components::admin::{AdminDashboard, AdminEnrollmentsPage, AdminUsersPage};
use crate::components::layout::{NotFoundPage, ProfilePage};
use crate::components::login::LoginPage;
use crate::components::register::RegisterPage;
use crate::components::student::{StudentCoursesPage, StudentDashboard};
use crate::components::teacher::{TeacherCoursesPage, TeacherDashboard};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::gateway::Transport;
use crate::identity::PasswordIdentityProvider;
use crate::session::KeyValueStore;
use web::route::AppRoute;
use web::router::{Router, RouterOutlet};
use web::{BrowserStorage, FetchTransport};

/// 初始化浏览器控制台日志
pub fn init_logging() {
    web::console::init(AppConfig::from_build_env().log_level);
}

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。访问控制已在路由服务中完成，
/// 这里只负责渲染。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Register => view! { <RegisterPage /> }.into_any(),
        AppRoute::AdminDashboard => view! { <AdminDashboard /> }.into_any(),
        AppRoute::AdminUsers => view! { <AdminUsersPage /> }.into_any(),
        AppRoute::AdminEnrollments => view! { <AdminEnrollmentsPage /> }.into_any(),
        AppRoute::TeacherDashboard => view! { <TeacherDashboard /> }.into_any(),
        AppRoute::TeacherCourses => view! { <TeacherCoursesPage /> }.into_any(),
        AppRoute::StudentDashboard => view! { <StudentDashboard /> }.into_any(),
        AppRoute::StudentCourses => view! { <StudentCoursesPage /> }.into_any(),
        AppRoute::Profile => view! { <ProfilePage /> }.into_any(),
        // Home 总会被重定向到角色首页，不会到达这里
        AppRoute::Home | AppRoute::NotFound => view! { <NotFoundPage /> }.into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 组装网关、会话存储与身份提供方
    let config = AppConfig::from_build_env();
    let transport: Rc<dyn Transport> = Rc::new(FetchTransport);
    let storage: Rc<dyn KeyValueStore> = Rc::new(BrowserStorage);
    let identity = Rc::new(PasswordIdentityProvider::new(
        transport.clone(),
        config.identity.clone(),
        config.request_timeout,
    ));
    let ctx = AppContext::new(config, transport, storage, identity);

    // 2. 建立信号桥并放入 Context
    log::info!("[App] api base = {}", ctx.config.api_base);
    let signals = bridge::provide_app(ctx.clone());

    // 3. 从 LocalStorage 恢复会话，并跟随其他标签页的登录/登出
    ctx.user.bootstrap();
    let weak = Rc::downgrade(&ctx);
    web::storage::on_session_change(move || {
        if let Some(ctx) = weak.upgrade() {
            ctx.sync_session();
        }
    });

    view! {
        // 4. 路由器组件：注入会话信号实现守卫
        <Router session=signals.session()>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}
