use campus_shared::{Course, CourseId, EnrollmentStatus};
use leptos::prelude::*;

use super::layout::{ErrorBanner, Shell};
use crate::bridge::use_app;
use crate::controller;

fn load(app: crate::bridge::AppSignals) {
    app.spawn(|ctx| async move {
        controller::load_student_dashboard(&ctx).await;
    });
}

#[component]
fn Stat(#[prop(into)] label: String, value: Signal<usize>) -> impl IntoView {
    view! {
        <div class="stat">
            <div class="stat-title">{label}</div>
            <div class="stat-value">{move || value.get()}</div>
        </div>
    }
}

#[component]
fn CourseList(
    #[prop(into)] courses: Signal<Vec<Course>>,
    #[prop(into)] empty: String,
) -> impl IntoView {
    view! {
        <Show when=move || !courses.with(Vec::is_empty) fallback=move || view! { <p class="opacity-60">{empty.clone()}</p> }>
            <ul class="menu bg-base-100 rounded-box">
                <For each=move || courses.get() key=|c| c.id let:course>
                    <li><span>{course.title}</span></li>
                </For>
            </ul>
        </Show>
    }
}

#[component]
pub fn StudentDashboard() -> impl IntoView {
    let app = use_app();
    load(app);

    let view_of = move || app.my_courses.with(|s| s.view());
    let count = move |status: EnrollmentStatus| {
        Signal::derive(move || view_of().summary().get(status))
    };
    let available = Signal::derive(move || view_of().available_courses_count());
    let approved = Signal::derive(move || {
        view_of()
            .approved_courses()
            .into_iter()
            .cloned()
            .collect::<Vec<_>>()
    });
    let pending = Signal::derive(move || {
        view_of()
            .pending_courses()
            .into_iter()
            .cloned()
            .collect::<Vec<_>>()
    });
    let rejected = Signal::derive(move || {
        view_of()
            .rejected_courses()
            .into_iter()
            .cloned()
            .collect::<Vec<_>>()
    });
    // 已结课的课程与成绩
    let grades = move || {
        let view = view_of();
        view.enrollments_with(EnrollmentStatus::Completed)
            .into_iter()
            .map(|e| {
                let title = view
                    .course_for_enrollment(e.id)
                    .map(|c| c.title.clone())
                    .unwrap_or_else(|| format!("Course #{}", e.course_id));
                (e.id, title, e.grade)
            })
            .collect::<Vec<_>>()
    };
    let has_completed = move || !view_of().completed_courses().is_empty();
    let orphans = move || view_of().orphan_enrollments().len();
    let conflicting = move || {
        let view = view_of();
        view.conflicts()
            .iter()
            .map(|c| {
                view.course(c.course_id)
                    .map(|course| course.title.clone())
                    .unwrap_or_else(|| format!("Course #{}", c.course_id))
            })
            .collect::<Vec<_>>()
            .join(", ")
    };
    let error = Signal::derive(move || {
        app.my_courses
            .with(|s| s.courses.error().or(s.enrollments.error()).map(str::to_string))
    });
    let updated = move || {
        app.my_courses.with(|s| {
            s.enrollments
                .loaded_at()
                .map(|t| format!("Updated {} UTC", t.format("%H:%M")))
        })
    };

    view! {
        <Shell title="Overview">
            <ErrorBanner error=error />
            <div class="stats shadow bg-base-100">
                <Stat label="Pending" value=count(EnrollmentStatus::Pending) />
                <Stat label="Approved" value=count(EnrollmentStatus::Approved) />
                <Stat label="Completed" value=count(EnrollmentStatus::Completed) />
                <Stat label="Available" value=available />
            </div>
            <p class="text-xs opacity-60">{updated}</p>
            <Show when=move || view_of().has_conflicts()>
                <div role="alert" class="alert alert-warning text-sm">
                    {move || format!(
                        "Conflicting enrollment records for {}. Contact an administrator.",
                        conflicting()
                    )}
                </div>
            </Show>
            <Show when=move || { orphans() > 0 }>
                <div role="alert" class="alert alert-info text-sm">
                    {move || format!("{} enrollment(s) refer to courses that are no longer offered.", orphans())}
                </div>
            </Show>
            <h2 class="text-xl font-semibold">"Approved courses"</h2>
            <CourseList courses=approved empty="No approved courses yet." />
            <h2 class="text-xl font-semibold">"Awaiting approval"</h2>
            <CourseList courses=pending empty="Nothing pending." />
            <h2 class="text-xl font-semibold">"Completed"</h2>
            <Show when=has_completed fallback=|| view! { <p class="opacity-60">"No completed courses yet."</p> }>
                <table class="table bg-base-100">
                    <thead><tr><th>"Course"</th><th>"Grade"</th></tr></thead>
                    <tbody>
                        <For each=grades key=|(id, _, grade)| (*id, grade.map(f32::to_bits)) let:row>
                            <tr>
                                <td>{row.1}</td>
                                <td>{row.2.map(|g| g.to_string()).unwrap_or_else(|| "-".into())}</td>
                            </tr>
                        </For>
                    </tbody>
                </table>
            </Show>
            <Show when=move || !rejected.with(Vec::is_empty)>
                <h2 class="text-xl font-semibold">"Not accepted"</h2>
                <CourseList courses=rejected empty="" />
            </Show>
        </Shell>
    }
}

#[component]
pub fn StudentCoursesPage() -> impl IntoView {
    let app = use_app();
    load(app);

    let (message, set_message) = signal(Option::<String>::None);
    let rows = move || {
        app.my_courses.with(|s| {
            let view = s.view();
            s.courses
                .items()
                .iter()
                .map(|c| (c.clone(), view.status_of_course(c.id)))
                .collect::<Vec<_>>()
        })
    };
    let enrolling = move |id: CourseId| app.my_courses.with(|s| s.enroll.running() == Some(&id));

    let enroll = move |course_id: CourseId| {
        app.spawn(move |ctx| async move {
            let outcome = controller::enroll(&ctx, course_id).await;
            set_message.set(outcome.error);
        });
    };
    let show_lectures = move |course_id: CourseId| {
        app.spawn(move |ctx| async move {
            set_message.set(controller::course_lectures(&ctx, course_id).await.error);
        });
    };
    let lectures = move || app.my_courses.with(|s| s.lectures.items().to_vec());
    let lectures_title = move || {
        app.my_courses.with(|s| {
            let id = s.lectures_course?;
            s.courses.items().iter().find(|c| c.id == id).map(|c| c.title.clone())
        })
    };

    let error = Signal::derive(move || {
        message.get().or_else(|| {
            app.my_courses.with(|s| {
                s.enroll
                    .error()
                    .or(s.courses.error())
                    .map(str::to_string)
            })
        })
    });

    view! {
        <Shell title="Courses">
            <ErrorBanner error=error />
            <table class="table bg-base-100">
                <thead><tr><th>"Course"</th><th>"Teacher"</th><th>"Status"</th><th></th></tr></thead>
                <tbody>
                    <For each=rows key=|(c, status)| (c.id, *status) let:row>
                        {
                            let (course, status) = row;
                            let id = course.id;
                            view! {
                                <tr>
                                    <td>{course.title}</td>
                                    <td>{course.teacher_name.unwrap_or_default()}</td>
                                    <td>{status.map(|s| s.to_string()).unwrap_or_else(|| "Not enrolled".into())}</td>
                                    <td>
                                        <Show when=move || status.is_none() || status == Some(EnrollmentStatus::Rejected)>
                                            <button class="btn btn-sm btn-primary" disabled=move || enrolling(id) on:click=move |_| enroll(id)>
                                                "Enroll"
                                            </button>
                                        </Show>
                                        <Show when=move || matches!(status, Some(EnrollmentStatus::Approved | EnrollmentStatus::Completed))>
                                            <button class="btn btn-sm btn-ghost" on:click=move |_| show_lectures(id)>
                                                "Lectures"
                                            </button>
                                        </Show>
                                    </td>
                                </tr>
                            }
                        }
                    </For>
                </tbody>
            </table>
            {move || lectures_title().map(|title| view! {
                <div class="card bg-base-100 shadow card-body">
                    <h2 class="card-title">{title}</h2>
                    <ol class="list-decimal ml-6">
                        <For each=lectures key=|l| l.id let:lecture>
                            <li>
                                {lecture.title}
                                {lecture.scheduled_at.map(|t| format!(" ({})", t.format("%Y-%m-%d %H:%M")))}
                            </li>
                        </For>
                    </ol>
                </div>
            })}
        </Shell>
    }
}
