use campus_shared::{AccountStatus, Role};
use leptos::ev::SubmitEvent;
use leptos::prelude::*;

use crate::bridge::use_app;
use crate::controller;
use crate::web::router::Link;

#[component]
pub fn RegisterPage() -> impl IntoView {
    let app = use_app();

    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (display_name, set_display_name) = signal(String::new());
    let (role, set_role) = signal(Role::Student);
    let (result, set_result) = signal(Option::<Result<AccountStatus, String>>::None);

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let (email, password, name, role) = (
            email.get_untracked(),
            password.get_untracked(),
            display_name.get_untracked(),
            role.get_untracked(),
        );
        app.spawn(move |ctx| async move {
            let outcome = controller::register(&ctx, &email, &password, &name, role).await;
            set_result.set(Some(outcome.data.ok_or(outcome.error.unwrap_or_default())));
        });
    };

    let message = move || {
        result.get().map(|r| match r {
            Ok(AccountStatus::Active) => (
                "alert alert-success",
                "Account created. You can sign in now.".to_string(),
            ),
            Ok(AccountStatus::Pending) => (
                "alert alert-info",
                "Account created. An administrator must approve it before you can sign in."
                    .to_string(),
            ),
            Err(e) => ("alert alert-error", e),
        })
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="card w-full max-w-md shadow-2xl bg-base-100">
                <form class="card-body" on:submit=on_submit>
                    <h1 class="text-2xl font-bold">"Create account"</h1>

                    {move || message().map(|(class, text)| view! { <div role="alert" class=class>{text}</div> })}

                    <input
                        type="text"
                        placeholder="Display name"
                        class="input input-bordered"
                        on:input=move |ev| set_display_name.set(event_target_value(&ev))
                        prop:value=display_name
                        required
                    />
                    <input
                        type="email"
                        placeholder="Email"
                        class="input input-bordered"
                        on:input=move |ev| set_email.set(event_target_value(&ev))
                        prop:value=email
                        required
                    />
                    <input
                        type="password"
                        placeholder="Password"
                        class="input input-bordered"
                        on:input=move |ev| set_password.set(event_target_value(&ev))
                        prop:value=password
                        required
                    />
                    <select
                        class="select select-bordered"
                        on:change=move |ev| {
                            let picked = event_target_value(&ev).parse().unwrap_or(Role::Student);
                            set_role.set(picked);
                        }
                    >
                        <option value="Student" selected=move || role.get() == Role::Student>"Student"</option>
                        <option value="Teacher" selected=move || role.get() == Role::Teacher>"Teacher"</option>
                    </select>

                    <button class="btn btn-primary mt-4" disabled=move || app.user.with(|s| s.is_submitting())>
                        "Register"
                    </button>
                    <p class="text-sm text-center">
                        "Already registered? " <Link to="/login">"Sign in"</Link>
                    </p>
                </form>
            </div>
        </div>
    }
}
