use campus_shared::{CourseId, Enrollment, EnrollmentId};
use leptos::ev::SubmitEvent;
use leptos::prelude::*;

use super::layout::{ErrorBanner, Shell};
use crate::bridge::{AppSignals, use_app};
use crate::controller;
use crate::listing::filter_courses;
use crate::web::router::Link;

fn load(app: AppSignals) {
    app.spawn(|ctx| async move {
        controller::load_teacher_dashboard(&ctx).await;
    });
}

fn action_error(app: AppSignals) -> Signal<Option<String>> {
    Signal::derive(move || {
        app.teacher.with(|s| {
            s.action
                .error()
                .or(s.courses.error())
                .map(str::to_string)
        })
    })
}

#[component]
pub fn TeacherDashboard() -> impl IntoView {
    let app = use_app();
    load(app);

    let course_count = move || app.teacher.with(|s| s.courses.items().len());
    let loading = move || app.teacher.with(|s| s.courses.is_loading());

    view! {
        <Shell title="Teaching">
            <ErrorBanner error=action_error(app) />
            <div class="stats shadow bg-base-100">
                <div class="stat">
                    <div class="stat-title">"Courses"</div>
                    <div class="stat-value">{course_count}</div>
                </div>
            </div>
            <Show when=loading>
                <span class="loading loading-spinner"></span>
            </Show>
            <CreateCourseForm />
            <Link to="/teacher-dashboard/courses">"Manage courses"</Link>
        </Shell>
    }
}

#[component]
fn CreateCourseForm() -> impl IntoView {
    let app = use_app();
    let (title, set_title) = signal(String::new());
    let (description, set_description) = signal(String::new());

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let (t, d) = (title.get_untracked(), description.get_untracked());
        app.spawn(move |ctx| async move {
            if controller::create_course(&ctx, &t, Some(d), None).await.success {
                set_title.set(String::new());
                set_description.set(String::new());
            }
        });
    };

    view! {
        <form class="card bg-base-100 shadow card-body gap-2" on:submit=on_submit>
            <h2 class="card-title">"New course"</h2>
            <input
                class="input input-bordered"
                placeholder="Title"
                on:input=move |ev| set_title.set(event_target_value(&ev))
                prop:value=title
            />
            <textarea
                class="textarea textarea-bordered"
                placeholder="Description"
                on:input=move |ev| set_description.set(event_target_value(&ev))
                prop:value=description
            ></textarea>
            <button class="btn btn-primary" disabled=move || app.teacher.with(|s| s.action.is_running())>
                "Create"
            </button>
        </form>
    }
}

#[component]
pub fn TeacherCoursesPage() -> impl IntoView {
    let app = use_app();
    load(app);

    let (query, set_query) = signal(String::new());
    let courses = move || {
        app.teacher
            .with(|s| filter_courses(s.courses.items(), &query.get()))
    };
    let selected = move || app.teacher.with(|s| s.selected_course);
    let selected_title = move || app.teacher.with(|s| s.selected().map(|c| c.title.clone()));

    let open = move |course_id: CourseId| {
        app.spawn(move |ctx| async move {
            controller::open_course(&ctx, course_id).await;
        });
    };

    view! {
        <Shell title="My courses">
            <ErrorBanner error=action_error(app) />
            <div class="grid md:grid-cols-3 gap-6">
                <div class="space-y-2">
                    <input
                        class="input input-bordered w-full"
                        placeholder="Search"
                        on:input=move |ev| set_query.set(event_target_value(&ev))
                        prop:value=query
                    />
                    <ul class="menu bg-base-100 rounded-box">
                        <For each=courses key=|c| c.id let:course>
                            {
                                let id = course.id;
                                view! {
                                    <li>
                                        <a class:active=move || selected() == Some(id) on:click=move |_| open(id)>
                                            {course.title}
                                        </a>
                                    </li>
                                }
                            }
                        </For>
                    </ul>
                </div>
                <div class="md:col-span-2 space-y-6">
                    <Show
                        when=move || selected().is_some()
                        fallback=|| view! { <p class="opacity-60">"Select a course."</p> }
                    >
                        <div class="flex items-center">
                            <h2 class="text-xl font-semibold flex-1">{selected_title}</h2>
                            <button class="btn btn-sm btn-ghost" on:click=move |_| app.context().teacher.clear_selection()>
                                "Close"
                            </button>
                        </div>
                        <Roster />
                        <Lectures />
                    </Show>
                </div>
            </div>
        </Shell>
    }
}

#[component]
fn Roster() -> impl IntoView {
    let app = use_app();
    let pending = move || app.teacher.with(|s| s.pending_enrollments());
    let gradable = move || {
        app.teacher
            .with(|s| s.roster_view().gradable().cloned().collect::<Vec<_>>())
    };

    let review = move |enrollment_id: EnrollmentId, approve: bool| {
        app.spawn(move |ctx| async move {
            controller::review_enrollment(&ctx, enrollment_id, approve).await;
        });
    };

    view! {
        <div class="card bg-base-100 shadow card-body">
            <h2 class="card-title">"Awaiting review"</h2>
            <For each=pending key=|e| e.id let:enrollment>
                {
                    let id = enrollment.id;
                    view! {
                        <div class="flex items-center gap-2">
                            <span class="flex-1">{student_label(&enrollment)}</span>
                            <button class="btn btn-sm btn-success" on:click=move |_| review(id, true)>"Approve"</button>
                            <button class="btn btn-sm btn-error" on:click=move |_| review(id, false)>"Reject"</button>
                        </div>
                    }
                }
            </For>
            <h2 class="card-title mt-4">"Students"</h2>
            <For each=gradable key=|e| (e.id, e.grade.map(f32::to_bits)) let:enrollment>
                <GradeRow enrollment=enrollment />
            </For>
        </div>
    }
}

fn student_label(e: &Enrollment) -> String {
    e.student_name.clone().unwrap_or_else(|| e.student_id.clone())
}

#[component]
fn GradeRow(enrollment: Enrollment) -> impl IntoView {
    let app = use_app();
    let id = enrollment.id;
    let initial = enrollment.grade.map(|g| g.to_string()).unwrap_or_default();
    let (grade, set_grade) = signal(initial);
    let (error, set_error) = signal(Option::<String>::None);

    let save = move |_| {
        let Ok(value) = grade.get_untracked().trim().parse::<f32>() else {
            set_error.set(Some("Grade must be a number".to_string()));
            return;
        };
        app.spawn(move |ctx| async move {
            set_error.set(controller::set_grade(&ctx, id, value).await.error);
        });
    };

    view! {
        <div class="flex items-center gap-2">
            <span class="flex-1">{student_label(&enrollment)}</span>
            <span class="badge">{enrollment.status.to_string()}</span>
            <input
                class="input input-bordered input-sm w-24"
                on:input=move |ev| set_grade.set(event_target_value(&ev))
                prop:value=grade
            />
            <button class="btn btn-sm" on:click=save>"Save"</button>
            {move || error.get().map(|e| view! { <span class="text-error text-sm">{e}</span> })}
        </div>
    }
}

#[component]
fn Lectures() -> impl IntoView {
    let app = use_app();
    let (title, set_title) = signal(String::new());
    let lectures = move || app.teacher.with(|s| s.lectures.items().to_vec());

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let Some(course_id) = app.teacher.with_untracked(|s| s.selected_course) else {
            return;
        };
        let t = title.get_untracked();
        app.spawn(move |ctx| async move {
            if controller::add_lecture(&ctx, course_id, &t, None).await.success {
                set_title.set(String::new());
            }
        });
    };

    view! {
        <div class="card bg-base-100 shadow card-body">
            <h2 class="card-title">"Lectures"</h2>
            <ol class="list-decimal ml-6">
                <For each=lectures key=|l| l.id let:lecture>
                    <li>{lecture.title}</li>
                </For>
            </ol>
            <form class="flex gap-2" on:submit=on_submit>
                <input
                    class="input input-bordered input-sm flex-1"
                    placeholder="Lecture title"
                    on:input=move |ev| set_title.set(event_target_value(&ev))
                    prop:value=title
                />
                <button class="btn btn-sm btn-primary">"Add"</button>
            </form>
        </div>
    }
}
