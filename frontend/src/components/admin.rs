use campus_shared::{EnrollmentId, EnrollmentStatus, Role, User};
use leptos::prelude::*;

use super::layout::{ErrorBanner, Shell};
use crate::bridge::{AppSignals, use_app};
use crate::controller;
use crate::listing::{UserFilter, paginate};
use crate::web::router::Link;

const USERS_PER_PAGE: usize = 20;

fn load(app: AppSignals) {
    app.spawn(|ctx| async move {
        controller::load_admin_dashboard(&ctx).await;
    });
}

#[component]
pub fn AdminDashboard() -> impl IntoView {
    let app = use_app();
    load(app);

    let (message, set_message) = signal(Option::<String>::None);
    let summary = move || app.admin.with(|s| s.status_summary());
    let role_counts = move || app.admin.with(|s| s.role_counts());
    let pending = move || app.admin.with(|s| s.pending_teachers.items().to_vec());

    let approve = move |teacher_id: String| {
        app.spawn(move |ctx| async move {
            set_message.set(controller::approve_teacher(&ctx, &teacher_id).await.error);
        });
    };
    let error = Signal::derive(move || {
        message
            .get()
            .or_else(|| app.admin.with(|s| s.users.error().map(str::to_string)))
    });

    view! {
        <Shell title="Administration">
            <ErrorBanner error=error />
            <div class="stats shadow bg-base-100">
                {move || role_counts().into_iter().map(|(role, n)| view! {
                    <div class="stat">
                        <div class="stat-title">{format!("{role}s")}</div>
                        <div class="stat-value">{n}</div>
                    </div>
                }).collect_view()}
            </div>
            <div class="stats shadow bg-base-100">
                {move || {
                    let summary = summary();
                    let total = summary.total();
                    let per_status = EnrollmentStatus::ALL.into_iter().map(|status| view! {
                        <div class="stat">
                            <div class="stat-title">{status.to_string()}</div>
                            <div class="stat-value">{summary.get(status)}</div>
                        </div>
                    }).collect_view();
                    view! {
                        <div class="stat">
                            <div class="stat-title">"Enrollments"</div>
                            <div class="stat-value">{total}</div>
                        </div>
                        {per_status}
                    }
                }}
            </div>
            <div class="card bg-base-100 shadow card-body">
                <h2 class="card-title">"Teachers awaiting approval"</h2>
                <Show
                    when=move || !pending().is_empty()
                    fallback=|| view! { <p class="opacity-60">"No pending teachers."</p> }
                >
                    <For each=pending key=|t| t.id.clone() let:teacher>
                        {
                            let id = teacher.id.clone();
                            view! {
                                <div class="flex items-center gap-2">
                                    <span class="flex-1">{teacher.display_name} " (" {teacher.email} ")"</span>
                                    <button class="btn btn-sm btn-success" on:click=move |_| approve(id.clone())>
                                        "Approve"
                                    </button>
                                </div>
                            }
                        }
                    </For>
                </Show>
            </div>
            <div class="flex gap-4">
                <Link to="/admin-dashboard/users">"Manage users"</Link>
                <Link to="/admin-dashboard/enrollments">"Manage enrollments"</Link>
            </div>
        </Shell>
    }
}

#[component]
pub fn AdminUsersPage() -> impl IntoView {
    let app = use_app();
    load(app);

    let (filter, set_filter) = signal(UserFilter::default());
    let (page, set_page) = signal(1usize);
    let (message, set_message) = signal(Option::<String>::None);

    let current = Memo::new(move |_| {
        let matched = app.admin.with(|s| filter.with(|f| f.apply(s.users.items())));
        paginate(&matched, page.get(), USERS_PER_PAGE)
    });

    let change_role = move |user_id: String, role: Role| {
        app.spawn(move |ctx| async move {
            set_message.set(controller::change_role(&ctx, &user_id, role).await.error);
        });
    };
    let delete = move |user_id: String| {
        app.spawn(move |ctx| async move {
            set_message.set(controller::delete_user(&ctx, &user_id).await.error);
        });
    };
    let select = move |user_id: String| {
        app.context().admin.select_user(&user_id);
    };
    let selected = move || app.admin.with(|s| s.selected_user().cloned());
    let error = Signal::derive(move || {
        message.get().or_else(|| {
            app.admin.with(|s| {
                s.action
                    .error()
                    .or(s.users.error())
                    .map(str::to_string)
            })
        })
    });

    view! {
        <Shell title="Users">
            <ErrorBanner error=error />
            <div class="flex gap-2">
                <input
                    class="input input-bordered flex-1"
                    placeholder="Search by name or email"
                    on:input=move |ev| {
                        let query = event_target_value(&ev);
                        set_filter.update(|f| f.query = query);
                        set_page.set(1);
                    }
                />
                <select
                    class="select select-bordered"
                    on:change=move |ev| {
                        let role = event_target_value(&ev).parse::<Role>().ok();
                        set_filter.update(|f| f.role = role);
                        set_page.set(1);
                    }
                >
                    <option value="">"All roles"</option>
                    {Role::ALL.into_iter().map(|r| view! { <option value=r.as_str()>{r.as_str()}</option> }).collect_view()}
                </select>
            </div>
            <table class="table bg-base-100">
                <thead><tr><th>"Name"</th><th>"Email"</th><th>"Role"</th><th></th></tr></thead>
                <tbody>
                    <For each=move || current.get().items key=|u| (u.id.clone(), u.role) let:user>
                        <UserRow user=user on_select=select on_role=change_role on_delete=delete />
                    </For>
                </tbody>
            </table>
            {move || selected().map(|user| view! {
                <div class="card bg-base-100 shadow card-body">
                    <h2 class="card-title">{user.display_name}</h2>
                    <p>{user.email}</p>
                    <p>{format!("Role: {}", user.role)}</p>
                    <p>{format!("Member since {}", user.created_at.format("%Y-%m-%d"))}</p>
                    <div class="card-actions justify-end">
                        <button class="btn btn-sm btn-ghost" on:click=move |_| app.context().admin.clear_selection()>
                            "Close"
                        </button>
                    </div>
                </div>
            })}
            <div class="join">
                <button
                    class="join-item btn btn-sm"
                    disabled=move || !current.with(|p| p.has_prev())
                    on:click=move |_| set_page.update(|p| *p = p.saturating_sub(1).max(1))
                >"«"</button>
                <span class="join-item btn btn-sm btn-disabled">
                    {move || current.with(|p| format!("{} / {} ({} users)", p.page, p.total_pages, p.total))}
                </span>
                <button
                    class="join-item btn btn-sm"
                    disabled=move || !current.with(|p| p.has_next())
                    on:click=move |_| set_page.update(|p| *p += 1)
                >"»"</button>
            </div>
        </Shell>
    }
}

#[component]
fn UserRow(
    user: User,
    on_select: impl Fn(String) + Copy + 'static,
    on_role: impl Fn(String, Role) + Copy + 'static,
    on_delete: impl Fn(String) + Copy + 'static,
) -> impl IntoView {
    let id = user.id.clone();
    let select_id = user.id.clone();
    let delete_id = user.id.clone();
    let current = user.role;

    view! {
        <tr>
            <td>
                <a class="link link-hover" on:click=move |_| on_select(select_id.clone())>{user.display_name}</a>
            </td>
            <td>{user.email}</td>
            <td>
                <select
                    class="select select-bordered select-sm"
                    on:change=move |ev| {
                        if let Ok(role) = event_target_value(&ev).parse::<Role>() {
                            if role != current {
                                on_role(id.clone(), role);
                            }
                        }
                    }
                >
                    {Role::ALL.into_iter().map(|r| view! {
                        <option value=r.as_str() selected=r == current>{r.as_str()}</option>
                    }).collect_view()}
                </select>
            </td>
            <td>
                <button class="btn btn-sm btn-error btn-outline" on:click=move |_| on_delete(delete_id.clone())>
                    "Delete"
                </button>
            </td>
        </tr>
    }
}

#[component]
pub fn AdminEnrollmentsPage() -> impl IntoView {
    let app = use_app();
    load(app);

    let (message, set_message) = signal(Option::<String>::None);
    let rows = move || {
        app.admin.with(|s| {
            s.enrollments
                .items()
                .iter()
                .map(|e| {
                    let course = s
                        .course_title(e.course_id)
                        .unwrap_or("Unknown course")
                        .to_string();
                    (e.clone(), course)
                })
                .collect::<Vec<_>>()
        })
    };

    let set_status = move |enrollment_id: EnrollmentId, status: EnrollmentStatus| {
        app.spawn(move |ctx| async move {
            set_message.set(
                controller::set_enrollment_status(&ctx, enrollment_id, status)
                    .await
                    .error,
            );
        });
    };
    let error = Signal::derive(move || {
        message
            .get()
            .or_else(|| app.admin.with(|s| s.enrollments.error().map(str::to_string)))
    });

    view! {
        <Shell title="Enrollments">
            <ErrorBanner error=error />
            <table class="table bg-base-100">
                <thead><tr><th>"Student"</th><th>"Course"</th><th>"Grade"</th><th>"Status"</th></tr></thead>
                <tbody>
                    <For each=rows key=|(e, _)| (e.id, e.status) let:row>
                        {
                            let (enrollment, course) = row;
                            let id = enrollment.id;
                            let current = enrollment.status;
                            view! {
                                <tr>
                                    <td>{enrollment.student_name.unwrap_or(enrollment.student_id)}</td>
                                    <td>{course}</td>
                                    <td>{enrollment.grade.map(|g| g.to_string()).unwrap_or_else(|| "-".into())}</td>
                                    <td>
                                        <select
                                            class="select select-bordered select-sm"
                                            on:change=move |ev| {
                                                if let Ok(status) = event_target_value(&ev).parse::<EnrollmentStatus>() {
                                                    if status != current {
                                                        set_status(id, status);
                                                    }
                                                }
                                            }
                                        >
                                            {EnrollmentStatus::ALL.into_iter().map(|s| view! {
                                                <option value=s.as_str() selected=s == current>{s.as_str()}</option>
                                            }).collect_view()}
                                        </select>
                                    </td>
                                </tr>
                            }
                        }
                    </For>
                </tbody>
            </table>
        </Shell>
    }
}
