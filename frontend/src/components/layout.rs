use campus_shared::Role;
use leptos::prelude::*;

use crate::bridge::use_app;
use crate::controller;
use crate::web::router::{Link, use_router};

/// 已登录页面的外壳：导航栏、当前用户、登出
#[component]
pub fn Shell(#[prop(into)] title: String, children: Children) -> impl IntoView {
    let app = use_app();
    let router = use_router();

    let display_name = move || {
        app.user.with(|s| {
            s.session
                .session()
                .map(|s| s.display_name().to_string())
                .unwrap_or_default()
        })
    };
    let role = move || app.user.with(|s| s.role());

    let on_logout = move |_| {
        app.spawn(move |ctx| async move {
            controller::logout(&ctx).await;
            router.navigate("/login");
        });
    };

    view! {
        <div class="min-h-screen bg-base-200">
            <div class="navbar bg-base-100 shadow">
                <div class="flex-1 gap-4">
                    <Link to="/">"Campus"</Link>
                    {move || match role() {
                        Some(Role::Admin) => view! {
                            <Link to="/admin-dashboard/users">"Users"</Link>
                            <Link to="/admin-dashboard/enrollments">"Enrollments"</Link>
                        }.into_any(),
                        Some(Role::Teacher) => view! {
                            <Link to="/teacher-dashboard/courses">"My courses"</Link>
                        }.into_any(),
                        Some(Role::Student) => view! {
                            <Link to="/my-courses">"Courses"</Link>
                        }.into_any(),
                        None => ().into_any(),
                    }}
                </div>
                <div class="flex-none gap-2">
                    <Link to="/profile">{display_name}</Link>
                    <button class="btn btn-ghost btn-sm" on:click=on_logout>"Sign out"</button>
                </div>
            </div>
            <main class="max-w-6xl mx-auto p-4 md:p-8 space-y-6">
                <h1 class="text-2xl font-bold">{title}</h1>
                {children()}
            </main>
        </div>
    }
}

/// 错误提示条
#[component]
pub fn ErrorBanner(#[prop(into)] error: Signal<Option<String>>) -> impl IntoView {
    move || {
        error.get().map(|e| {
            view! {
                <div role="alert" class="alert alert-error text-sm">
                    <span>{e}</span>
                </div>
            }
        })
    }
}

#[component]
pub fn ProfilePage() -> impl IntoView {
    let app = use_app();

    app.spawn(|ctx| async move {
        controller::refresh_profile(&ctx).await;
    });

    // 优先展示 `/auth/me` 的最新结果，尚未返回时用会话中的副本
    let profile = move || {
        app.user.with(|s| {
            s.profile
                .data()
                .cloned()
                .or_else(|| s.session.session().map(|session| session.user.clone()))
        })
    };
    let error = Signal::derive(move || app.user.with(|s| s.profile.error().map(str::to_string)));

    view! {
        <Shell title="Profile">
            <ErrorBanner error=error />
            {move || profile().map(|user| view! {
                <div class="card bg-base-100 shadow">
                    <div class="card-body">
                        <p><b>"Name: "</b>{user.display_name}</p>
                        <p><b>"Email: "</b>{user.email}</p>
                        <p><b>"Role: "</b>{user.role.to_string()}</p>
                        <p><b>"Member since: "</b>{user.created_at.format("%Y-%m-%d").to_string()}</p>
                    </div>
                </div>
            })}
        </Shell>
    }
}

#[component]
pub fn NotFoundPage() -> impl IntoView {
    view! {
        <div class="flex items-center justify-center min-h-screen bg-base-200">
            <div class="text-center">
                <h1 class="text-6xl font-bold text-error">"404"</h1>
                <p class="text-xl mt-4">"Page not found"</p>
                <Link to="/">"Back to home"</Link>
            </div>
        </div>
    }
}
