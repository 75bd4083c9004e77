use std::rc::Rc;

use campus_shared::{EnrollmentStatus, LoginResponse, Role};

use super::*;
use crate::controller;
use crate::gateway::RetryPolicy;
use crate::session::{Session, SessionState};
use crate::testing::{
    FakeIdentity, MemoryStorage, MockTransport, Reply, course, enrollment, json, user,
};
use crate::web::route::{AppRoute, Navigation, resolve_navigation};

struct World {
    transport: Rc<MockTransport>,
    storage: Rc<MemoryStorage>,
    ctx: Rc<AppContext>,
}

fn world() -> World {
    let transport = MockTransport::new();
    let storage = Rc::new(MemoryStorage::new());
    let identity = FakeIdentity::with_account("s-1@campus.io", "pw", "id-s1");
    identity.accounts.borrow_mut().insert(
        ("a-1@campus.io".to_string(), "pw".to_string()),
        "id-a1".to_string(),
    );
    let config = AppConfig {
        retry: RetryPolicy::none(),
        ..AppConfig::default()
    };
    let ctx = AppContext::new(config, transport.clone(), storage.clone(), identity);
    World {
        transport,
        storage,
        ctx,
    }
}

fn backend_login(w: &World, id: &str, role: Role) {
    w.transport.on(
        "POST",
        "/api/auth/login",
        Reply::ok(json(&LoginResponse {
            token: format!("tok-{}", id),
            user: user(id, role),
        })),
    );
}

fn navigate(w: &World, route: AppRoute) -> Navigation {
    resolve_navigation(route, &w.ctx.user.state().session)
}

#[tokio::test]
async fn test_student_login_lands_on_student_home_and_is_kept_out_of_admin() {
    let w = world();
    w.ctx.user.bootstrap();
    backend_login(&w, "s-1", Role::Student);

    let outcome = controller::login(&w.ctx, "s-1@campus.io", "pw").await;
    assert!(outcome.success);
    assert_eq!(outcome.data, Some("/dashboard-overview-3"));

    assert_eq!(
        navigate(&w, AppRoute::AdminDashboard),
        Navigation::Redirect(AppRoute::StudentDashboard)
    );
    assert_eq!(
        navigate(&w, AppRoute::Login),
        Navigation::Redirect(AppRoute::StudentDashboard)
    );
    assert_eq!(
        navigate(&w, AppRoute::StudentCourses),
        Navigation::Render(AppRoute::StudentCourses)
    );
}

#[tokio::test]
async fn test_anonymous_visitor_is_sent_to_login() {
    let w = world();
    assert_eq!(navigate(&w, AppRoute::TeacherDashboard), Navigation::Pending);

    w.ctx.user.bootstrap();
    assert_eq!(
        navigate(&w, AppRoute::TeacherDashboard),
        Navigation::Redirect(AppRoute::Login)
    );
}

#[tokio::test]
async fn test_failed_login_reports_error_and_keeps_guest_routes() {
    let w = world();
    w.ctx.user.bootstrap();

    let outcome = controller::login(&w.ctx, "s-1@campus.io", "wrong").await;
    assert!(!outcome.success);
    assert_eq!(
        outcome.error.as_deref(),
        Some("Authentication failed: Invalid email or password")
    );
    assert_eq!(navigate(&w, AppRoute::Login), Navigation::Render(AppRoute::Login));
}

#[tokio::test]
async fn test_server_401_ends_session_and_clears_data() {
    let w = world();
    SessionStore::new(w.storage.clone())
        .save(&Session::new(user("s-1", Role::Student), "tok-s-1"))
        .unwrap();
    w.ctx.user.bootstrap();

    w.transport
        .on(
            "GET",
            "/api/student/courses",
            Reply::ok(json(&vec![course(1), course(2)])),
        )
        .on(
            "GET",
            "/api/student/enrollments",
            Reply::ok(json(&vec![enrollment(1, 1, EnrollmentStatus::Approved)])),
        )
        .on("GET", "/api/student/enrollments", Reply::status(401, ""));

    assert!(controller::load_student_dashboard(&w.ctx).await.success);
    assert_eq!(w.ctx.my_courses.view().approved_courses().len(), 1);

    let outcome = w.ctx.my_courses.refresh_enrollments().await;
    assert!(outcome.is_err());

    assert_eq!(w.ctx.user.state().session, SessionState::Absent);
    assert!(w.storage.is_empty());
    let courses = w.ctx.my_courses.state();
    assert!(courses.courses.data().is_none());
    assert!(!courses.enrollments.is_loading());
    assert_eq!(
        navigate(&w, AppRoute::StudentDashboard),
        Navigation::Redirect(AppRoute::Login)
    );
}

#[tokio::test]
async fn test_logout_resets_every_store() {
    let w = world();
    w.ctx.user.bootstrap();
    backend_login(&w, "a-1", Role::Admin);
    w.transport.on(
        "GET",
        "/api/admin/users",
        Reply::ok(json(&vec![user("a-1", Role::Admin), user("s-1", Role::Student)])),
    );

    let outcome = controller::login(&w.ctx, "a-1@campus.io", "pw").await;
    assert_eq!(outcome.data, Some("/admin-dashboard"));
    w.ctx.admin.refresh_users().await.unwrap();
    assert_eq!(w.ctx.admin.state().users.items().len(), 2);

    assert!(controller::logout(&w.ctx).await.success);

    assert_eq!(w.ctx.user.state().session, SessionState::Absent);
    assert!(w.ctx.admin.state().users.data().is_none());
    assert!(w.storage.is_empty());
}

#[tokio::test]
async fn test_admin_cannot_delete_self() {
    let w = world();
    SessionStore::new(w.storage.clone())
        .save(&Session::new(user("a-1", Role::Admin), "tok-a-1"))
        .unwrap();
    w.ctx.user.bootstrap();

    let outcome = controller::delete_user(&w.ctx, "a-1").await;
    assert!(!outcome.success);
    assert_eq!(w.transport.count("DELETE", "/api/admin/users/a-1"), 0);
}

#[tokio::test]
async fn test_enrolling_twice_is_refused_locally() {
    let w = world();
    SessionStore::new(w.storage.clone())
        .save(&Session::new(user("s-1", Role::Student), "tok-s-1"))
        .unwrap();
    w.ctx.user.bootstrap();
    w.transport
        .on("GET", "/api/student/courses", Reply::ok(json(&vec![course(4)])))
        .on(
            "GET",
            "/api/student/enrollments",
            Reply::ok(json(&vec![enrollment(9, 4, EnrollmentStatus::Pending)])),
        );
    controller::load_student_dashboard(&w.ctx).await;

    let outcome = controller::enroll(&w.ctx, 4).await;
    assert!(!outcome.success);
    assert_eq!(outcome.error.as_deref(), Some("Already enrolled (Pending)"));
    assert_eq!(w.transport.count("POST", "/api/student/courses/4/enroll"), 0);
}

#[tokio::test]
async fn test_admin_self_registration_is_refused() {
    let w = world();
    let outcome = controller::register(&w.ctx, "x@campus.io", "pw", "X", Role::Admin).await;
    assert!(!outcome.success);
    assert!(w.transport.requests.borrow().is_empty());
}

#[tokio::test]
async fn test_rejected_login_shows_backend_message_instead_of_expiry() {
    let w = world();
    w.ctx.user.bootstrap();
    w.transport.on(
        "POST",
        "/api/auth/login",
        Reply::status(401, r#"{"message":"account pending approval"}"#),
    );

    let expired = Rc::new(std::cell::Cell::new(false));
    let flag = expired.clone();
    w.ctx.api.on_unauthorized(move || flag.set(true));

    let outcome = controller::login(&w.ctx, "s-1@campus.io", "pw").await;
    assert!(!outcome.success);
    assert_eq!(
        outcome.error.as_deref(),
        Some("Authentication failed: account pending approval")
    );
    assert!(!expired.get());
    assert_eq!(w.ctx.user.state().session, SessionState::Absent);
    assert_eq!(navigate(&w, AppRoute::Login), Navigation::Render(AppRoute::Login));
}

#[tokio::test]
async fn test_session_written_by_another_tab_is_picked_up() {
    let w = world();
    w.ctx.user.bootstrap();
    backend_login(&w, "a-1", Role::Admin);
    w.transport.on(
        "GET",
        "/api/admin/users",
        Reply::ok(json(&vec![user("a-1", Role::Admin)])),
    );
    controller::login(&w.ctx, "a-1@campus.io", "pw").await;
    w.ctx.admin.refresh_users().await.unwrap();

    // 存储未变：数据保留
    w.ctx.sync_session();
    assert_eq!(w.ctx.admin.state().users.items().len(), 1);

    // 另一个标签页换了账号
    SessionStore::new(w.storage.clone())
        .save(&Session::new(user("s-1", Role::Student), "tok-s-1"))
        .unwrap();
    w.ctx.sync_session();
    let state = w.ctx.user.state();
    assert_eq!(
        state.session.session().map(|s| s.user_id().to_string()),
        Some("s-1".to_string())
    );
    assert!(w.ctx.admin.state().users.data().is_none());
    assert_eq!(
        navigate(&w, AppRoute::AdminDashboard),
        Navigation::Redirect(AppRoute::StudentDashboard)
    );

    // 另一个标签页登出
    SessionStore::new(w.storage.clone()).clear();
    w.ctx.sync_session();
    assert_eq!(w.ctx.user.state().session, SessionState::Absent);
    assert_eq!(
        navigate(&w, AppRoute::StudentDashboard),
        Navigation::Redirect(AppRoute::Login)
    );
}

#[tokio::test]
async fn test_abandoned_course_creation_does_not_leave_form_busy() {
    use std::future::Future;
    use std::task::{Context, Waker};

    let w = world();
    SessionStore::new(w.storage.clone())
        .save(&Session::new(user("t-1", Role::Teacher), "tok-t-1"))
        .unwrap();
    w.ctx.user.bootstrap();
    w.transport.on("POST", "/api/teacher/courses", Reply::Hang);

    {
        let fut = controller::create_course(&w.ctx, "Compilers", None, Some(30));
        let mut fut = std::pin::pin!(fut);
        let mut cx = Context::from_waker(Waker::noop());
        assert!(fut.as_mut().poll(&mut cx).is_pending());
        assert!(w.ctx.teacher.state().action.is_running());
    }

    let state = w.ctx.teacher.state();
    assert!(!state.action.is_running());
    assert_eq!(state.action.error(), None);
    assert_eq!(w.transport.count("POST", "/api/teacher/courses"), 1);
}
