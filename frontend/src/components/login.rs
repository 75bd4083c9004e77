use leptos::ev::SubmitEvent;
use leptos::prelude::*;

use crate::bridge::use_app;
use crate::controller;
use crate::web::router::{Link, use_router};

#[component]
pub fn LoginPage() -> impl IntoView {
    let app = use_app();
    let router = use_router();

    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (error_msg, set_error_msg) = signal(Option::<String>::None);
    let is_submitting = move || app.user.with(|s| s.is_submitting());

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let (email, password) = (email.get_untracked(), password.get_untracked());
        if email.trim().is_empty() || password.is_empty() {
            set_error_msg.set(Some("Please fill in all fields".to_string()));
            return;
        }
        set_error_msg.set(None);

        app.spawn(move |ctx| async move {
            let outcome = controller::login(&ctx, &email, &password).await;
            match outcome.data {
                Some(home) => router.navigate(home),
                None => set_error_msg.set(outcome.error),
            }
        });
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <h1 class="text-3xl font-bold">"Campus"</h1>
                    <p class="text-base-content/70">"Sign in to continue"</p>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <Show when=move || error_msg.get().is_some()>
                            <div role="alert" class="alert alert-error text-sm py-2">
                                <span>{move || error_msg.get().unwrap_or_default()}</span>
                            </div>
                        </Show>

                        <div class="form-control">
                            <label class="label" for="email">
                                <span class="label-text">"Email"</span>
                            </label>
                            <input
                                id="email"
                                type="email"
                                on:input=move |ev| set_email.set(event_target_value(&ev))
                                prop:value=email
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control">
                            <label class="label" for="password">
                                <span class="label-text">"Password"</span>
                            </label>
                            <input
                                id="password"
                                type="password"
                                on:input=move |ev| set_password.set(event_target_value(&ev))
                                prop:value=password
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=is_submitting>
                                {move || if is_submitting() {
                                    view! { <span class="loading loading-spinner"></span> "Signing in..." }.into_any()
                                } else {
                                    "Sign in".into_any()
                                }}
                            </button>
                        </div>
                        <p class="text-sm text-center">
                            "No account? " <Link to="/register">"Register"</Link>
                        </p>
                    </form>
                </div>
            </div>
        </div>
    }
}
