use std::rc::Rc;
use std::time::Duration;

use campus_shared::protocol::{CreateCourseRequest, RegisterRequest};
use campus_shared::{
    AccountStatus, EnrollmentStatus, LoginResponse, RegisterResponse, Role, Teacher,
};

use super::*;
use crate::error::ClientError;
use crate::gateway::{ApiClient, RetryPolicy};
use crate::services::{AdminService, AuthService, CourseService, TeacherService};
use crate::session::{Session, SessionState, SessionStore};
use crate::testing::{
    FakeIdentity, MemoryStorage, MockTransport, Reply, course, enrollment, json, user,
};

struct Harness {
    transport: Rc<MockTransport>,
    storage: Rc<MemoryStorage>,
    identity: Rc<FakeIdentity>,
    api: Rc<ApiClient>,
}

impl Harness {
    fn new() -> Self {
        let transport = MockTransport::new();
        let storage = Rc::new(MemoryStorage::new());
        let identity = FakeIdentity::with_account("s-1@campus.io", "pw", "id-tok");
        let api = Rc::new(ApiClient::new(
            "/api",
            transport.clone(),
            SessionStore::new(storage.clone()),
            Duration::from_secs(5),
            RetryPolicy::none(),
        ));
        Self {
            transport,
            storage,
            identity,
            api,
        }
    }

    fn sessions(&self) -> SessionStore {
        SessionStore::new(self.storage.clone())
    }

    fn user_store(&self) -> UserStore {
        UserStore::new(
            AuthService::new(self.api.clone(), self.identity.clone()),
            self.sessions(),
        )
    }

    fn sign_in_as(&self, id: &str, role: Role) {
        self.sessions()
            .save(&Session::new(user(id, role), "tok"))
            .unwrap();
    }
}

// =========================================================
// UserStore
// =========================================================

#[tokio::test]
async fn test_login_persists_session_and_publishes_it() {
    let h = Harness::new();
    h.transport.on(
        "POST",
        "/api/auth/login",
        Reply::ok(json(&LoginResponse {
            token: "backend-tok".into(),
            user: user("s-1", Role::Student),
        })),
    );
    let store = h.user_store();
    store.bootstrap();
    assert_eq!(store.state().session, SessionState::Absent);

    let session = store.login("s-1@campus.io", "pw").await.unwrap();
    assert_eq!(session.token, "backend-tok");
    assert_eq!(store.state().role(), Some(Role::Student));
    assert!(!store.state().is_submitting());
    assert_eq!(h.sessions().token().as_deref(), Some("backend-tok"));

    let sent: serde_json::Value =
        serde_json::from_str(h.transport.last_request().unwrap().body.as_deref().unwrap())
            .unwrap();
    assert_eq!(sent["idToken"], "id-tok");
}

#[test]
fn test_resync_follows_storage_written_elsewhere() {
    let h = Harness::new();
    let store = h.user_store();
    h.sign_in_as("s-1", Role::Student);
    store.bootstrap();

    // 同一身份：只刷新快照
    assert!(!store.resync());
    assert_eq!(store.state().role(), Some(Role::Student));

    h.sessions()
        .save(&Session::new(user("t-1", Role::Teacher), "tok-2"))
        .unwrap();
    assert!(store.resync());
    assert_eq!(store.state().role(), Some(Role::Teacher));

    h.sessions().clear();
    assert!(store.resync());
    assert_eq!(store.state().session, SessionState::Absent);
    assert!(!store.resync());
}

#[tokio::test]
async fn test_bad_credentials_set_auth_error_without_backend_call() {
    let h = Harness::new();
    let store = h.user_store();
    store.bootstrap();

    let err = store.login("s-1@campus.io", "wrong").await.unwrap_err();
    assert!(matches!(err, ClientError::Authentication(_)));

    let state = store.state();
    assert_eq!(state.session, SessionState::Absent);
    assert_eq!(
        state.auth.error(),
        Some("Authentication failed: Invalid email or password")
    );
    assert!(h.transport.requests.borrow().is_empty());
    assert!(h.storage.is_empty());
}

#[tokio::test]
async fn test_bootstrap_restores_stored_session() {
    let h = Harness::new();
    h.sign_in_as("t-1", Role::Teacher);
    let store = h.user_store();
    assert!(!store.state().session.is_resolved());

    store.bootstrap();
    assert_eq!(store.state().role(), Some(Role::Teacher));
}

#[tokio::test]
async fn test_teacher_registration_is_pending_and_creates_no_session() {
    let h = Harness::new();
    h.transport.on(
        "POST",
        "/api/auth/register",
        Reply::ok(json(&RegisterResponse {
            status: AccountStatus::Pending,
            user: None,
        })),
    );
    let store = h.user_store();
    store.bootstrap();

    let status = store
        .register(RegisterRequest {
            email: "new@campus.io".into(),
            password: "pw".into(),
            display_name: "New".into(),
            role: Role::Teacher,
        })
        .await
        .unwrap();

    assert_eq!(status, AccountStatus::Pending);
    assert_eq!(store.state().last_registration, Some(AccountStatus::Pending));
    assert_eq!(store.state().session, SessionState::Absent);
    assert!(h.storage.is_empty());
}

#[tokio::test]
async fn test_logout_clears_everything_even_if_backend_fails() {
    let h = Harness::new();
    h.sign_in_as("s-1", Role::Student);
    h.transport
        .on("POST", "/api/auth/logout", Reply::status(500, r#"{"message":"boom"}"#));
    let store = h.user_store();
    store.bootstrap();

    store.logout().await;

    assert_eq!(store.state().session, SessionState::Absent);
    assert!(h.storage.is_empty());
    assert_eq!(*h.identity.sign_outs.borrow(), 1);
}

#[tokio::test]
async fn test_refresh_profile_updates_session_user() {
    let h = Harness::new();
    h.sign_in_as("s-1", Role::Student);
    let mut renamed = user("s-1", Role::Student);
    renamed.display_name = "Renamed".into();
    h.transport
        .on("GET", "/api/auth/me", Reply::ok(json(&renamed)));
    let store = h.user_store();
    store.bootstrap();

    store.refresh_profile().await.unwrap();

    let state = store.state();
    assert_eq!(state.profile.data().map(|u| u.display_name.as_str()), Some("Renamed"));
    assert_eq!(
        state.session.session().map(|s| s.display_name()),
        Some("Renamed")
    );
    assert_eq!(h.sessions().load().unwrap().user.display_name, "Renamed");
}

#[tokio::test]
async fn test_server_401_invalidates_user_store() {
    let h = Harness::new();
    h.sign_in_as("s-1", Role::Student);
    h.transport.on("GET", "/api/auth/me", Reply::status(401, ""));
    let store = Rc::new(h.user_store());
    store.bootstrap();

    let weak = Rc::downgrade(&store);
    h.api.on_unauthorized(move || {
        if let Some(store) = weak.upgrade() {
            store.invalidate();
        }
    });

    let err = store.refresh_profile().await.unwrap_err();
    assert_eq!(err, ClientError::Unauthorized);
    let state = store.state();
    assert_eq!(state.session, SessionState::Absent);
    assert!(!state.profile.is_loading());
    assert!(h.storage.is_empty());
}

// =========================================================
// MyCoursesStore
// =========================================================

#[tokio::test]
async fn test_failed_refresh_keeps_last_good_enrollments() {
    let h = Harness::new();
    let list = vec![
        enrollment(1, 10, EnrollmentStatus::Approved),
        enrollment(2, 11, EnrollmentStatus::Pending),
    ];
    h.transport
        .on("GET", "/api/student/enrollments", Reply::ok(json(&list)))
        .on(
            "GET",
            "/api/student/enrollments",
            Reply::status(503, r#"{"message":"maintenance"}"#),
        );
    let store = MyCoursesStore::new(CourseService::new(h.api.clone()));

    store.refresh_enrollments().await.unwrap();
    assert!(store.refresh_enrollments().await.is_err());

    let state = store.state();
    assert_eq!(state.enrollments.items(), list.as_slice());
    assert_eq!(
        state.enrollments.error(),
        Some("Request failed (503): maintenance")
    );
    assert!(!state.enrollments.is_loading());
}

#[tokio::test]
async fn test_enroll_merges_then_refreshes() {
    let h = Harness::new();
    let created = enrollment(5, 3, EnrollmentStatus::Pending);
    h.transport
        .on("GET", "/api/student/courses", Reply::ok(json(&vec![course(3), course(4)])))
        .on("GET", "/api/student/enrollments", Reply::ok("[]"))
        .on(
            "GET",
            "/api/student/enrollments",
            Reply::ok(json(&vec![created.clone()])),
        )
        .on("POST", "/api/student/courses/3/enroll", Reply::ok(json(&created)));
    let store = MyCoursesStore::new(CourseService::new(h.api.clone()));
    store.refresh_all().await.unwrap();
    assert_eq!(store.view().available_courses_count(), 2);

    let result = store.enroll(3).await.unwrap();
    assert_eq!(result.id, 5);
    assert_eq!(h.transport.count("GET", "/api/student/enrollments"), 2);

    let view = store.view();
    assert_eq!(view.pending_courses().len(), 1);
    assert_eq!(view.available_courses_count(), 1);
    assert_eq!(store.state().enroll.running(), None);
}

#[tokio::test]
async fn test_enroll_failure_is_recorded() {
    let h = Harness::new();
    h.transport.on(
        "POST",
        "/api/student/courses/9/enroll",
        Reply::status(409, r#"{"message":"already enrolled"}"#),
    );
    let store = MyCoursesStore::new(CourseService::new(h.api.clone()));

    assert!(store.enroll(9).await.is_err());
    assert_eq!(
        store.state().enroll.error(),
        Some("Request failed (409): already enrolled")
    );
    assert_eq!(h.transport.count("GET", "/api/student/enrollments"), 0);
}

#[tokio::test]
async fn test_switching_lecture_course_drops_old_lectures() {
    let h = Harness::new();
    h.transport
        .on("GET", "/api/student/courses/1/lectures", Reply::ok(r#"[{"id":1,"courseId":1,"title":"Intro"}]"#))
        .on("GET", "/api/student/courses/2/lectures", Reply::status(500, ""));
    let store = MyCoursesStore::new(CourseService::new(h.api.clone()));

    store.load_lectures(1).await.unwrap();
    assert_eq!(store.state().lectures.items().len(), 1);

    assert!(store.load_lectures(2).await.is_err());
    let state = store.state();
    assert_eq!(state.lectures_course, Some(2));
    assert!(state.lectures.items().is_empty());
}

// =========================================================
// TeacherCoursesStore
// =========================================================

fn teacher_store(h: &Harness) -> TeacherCoursesStore {
    TeacherCoursesStore::new(TeacherService::new(h.api.clone()))
}

#[tokio::test]
async fn test_select_course_loads_roster_and_lectures() {
    let h = Harness::new();
    let roster = vec![
        enrollment(1, 7, EnrollmentStatus::Pending),
        enrollment(2, 7, EnrollmentStatus::Approved),
    ];
    h.transport
        .on("GET", "/api/teacher/courses/7/enrollments", Reply::ok(json(&roster)))
        .on("GET", "/api/teacher/courses/7/lectures", Reply::ok("[]"));
    let store = teacher_store(&h);

    store.select_course(7).await.unwrap();

    assert_eq!(store.state().selected_course, Some(7));
    assert_eq!(store.state().roster_view().len(), 2);
    assert_eq!(store.state().pending_enrollments().len(), 1);
}

#[tokio::test]
async fn test_refresh_roster_without_selection_is_rejected() {
    let h = Harness::new();
    let store = teacher_store(&h);
    assert!(matches!(
        store.refresh_roster().await,
        Err(ClientError::InvalidInput(_))
    ));
    assert!(h.transport.requests.borrow().is_empty());
}

#[tokio::test]
async fn test_review_enrollment_updates_roster() {
    let h = Harness::new();
    let mut approved = enrollment(1, 7, EnrollmentStatus::Approved);
    approved.student_name = Some("Sam".into());
    h.transport
        .on(
            "GET",
            "/api/teacher/courses/7/enrollments",
            Reply::ok(json(&vec![enrollment(1, 7, EnrollmentStatus::Pending)])),
        )
        .on("GET", "/api/teacher/courses/7/lectures", Reply::ok("[]"))
        .on("PUT", "/api/teacher/enrollments/1/status", Reply::ok(json(&approved)));
    let store = teacher_store(&h);
    store.select_course(7).await.unwrap();

    store
        .review_enrollment(1, EnrollmentStatus::Approved)
        .await
        .unwrap();

    let roster = store.state().roster_view();
    assert!(roster.pending.is_empty());
    assert_eq!(roster.approved.len(), 1);

    let sent = h.transport.last_request().unwrap();
    assert_eq!(sent.body.as_deref(), Some(r#"{"status":1}"#));
}

#[tokio::test]
async fn test_review_cannot_mark_completed() {
    let h = Harness::new();
    let store = teacher_store(&h);
    let err = store
        .review_enrollment(1, EnrollmentStatus::Completed)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidInput(_)));
    assert!(store.state().action.error().is_some());
}

#[tokio::test]
async fn test_grade_validation() {
    let h = Harness::new();
    h.transport
        .on(
            "GET",
            "/api/teacher/courses/7/enrollments",
            Reply::ok(json(&vec![enrollment(1, 7, EnrollmentStatus::Pending)])),
        )
        .on("GET", "/api/teacher/courses/7/lectures", Reply::ok("[]"));
    let store = teacher_store(&h);
    store.select_course(7).await.unwrap();
    let before = h.transport.requests.borrow().len();

    assert!(store.set_grade(1, 120.0).await.is_err());
    assert!(store.set_grade(1, f32::NAN).await.is_err());
    // 待审批的选课不能打分
    assert!(store.set_grade(1, 80.0).await.is_err());
    assert_eq!(h.transport.requests.borrow().len(), before);
}

#[tokio::test]
async fn test_create_course_appends_to_list() {
    let h = Harness::new();
    h.transport
        .on("GET", "/api/teacher/courses", Reply::ok(json(&vec![course(1)])))
        .on("POST", "/api/teacher/courses", Reply::ok(json(&course(2))));
    let store = teacher_store(&h);
    store.refresh_courses().await.unwrap();

    store
        .create_course(CreateCourseRequest {
            title: "Course 2".into(),
            description: None,
            capacity: Some(30),
        })
        .await
        .unwrap();

    assert_eq!(store.state().courses.items().len(), 2);
    assert!(!store.state().action.is_running());

    let blank = store
        .create_course(CreateCourseRequest {
            title: "  ".into(),
            description: None,
            capacity: None,
        })
        .await;
    assert!(blank.is_err());
    assert_eq!(h.transport.count("POST", "/api/teacher/courses"), 1);
}

// =========================================================
// AdminUsecasesStore
// =========================================================

fn admin_store(h: &Harness) -> AdminUsecasesStore {
    AdminUsecasesStore::new(AdminService::new(h.api.clone()))
}

fn pending_teacher(id: &str) -> Teacher {
    Teacher {
        id: id.into(),
        email: format!("{}@campus.io", id),
        display_name: id.into(),
        approved: false,
        created_at: None,
    }
}

#[tokio::test]
async fn test_selection_only_targets_loaded_users() {
    let h = Harness::new();
    h.transport.on(
        "GET",
        "/api/admin/users",
        Reply::ok(json(&vec![user("a", Role::Admin), user("b", Role::Student)])),
    );
    let store = admin_store(&h);

    assert!(!store.select_user("b"));
    store.refresh_users().await.unwrap();
    assert!(store.select_user("b"));
    assert_eq!(store.state().selected_user().map(|u| u.id.as_str()), Some("b"));
    assert!(!store.select_user("ghost"));
    assert_eq!(
        store.state().selected_user().map(|u| u.id.as_str()),
        Some("b")
    );

    store.clear_selection();
    assert!(store.state().selected_user().is_none());
}

#[tokio::test]
async fn test_delete_user_clears_selection() {
    let h = Harness::new();
    h.transport
        .on(
            "GET",
            "/api/admin/users",
            Reply::ok(json(&vec![user("a", Role::Admin), user("b", Role::Student)])),
        )
        .on("DELETE", "/api/admin/users/b", Reply::Json(204, String::new()));
    let store = admin_store(&h);
    store.refresh_users().await.unwrap();
    store.select_user("b");

    store.delete_user("b").await.unwrap();

    let state = store.state();
    assert_eq!(state.users.items().len(), 1);
    assert!(state.selected_user().is_none());
}

#[tokio::test]
async fn test_change_role_sends_numeric_code_and_updates_list() {
    let h = Harness::new();
    h.transport
        .on("GET", "/api/admin/users", Reply::ok(json(&vec![user("b", Role::Student)])))
        .on("PUT", "/api/admin/users/b/role", Reply::ok(json(&user("b", Role::Teacher))));
    let store = admin_store(&h);
    store.refresh_users().await.unwrap();

    store.change_role("b", Role::Teacher).await.unwrap();

    assert_eq!(
        h.transport.last_request().unwrap().body.as_deref(),
        Some(r#"{"role":1}"#)
    );
    assert_eq!(
        store.state().role_counts(),
        [(Role::Admin, 0), (Role::Teacher, 1), (Role::Student, 0)]
    );
}

#[tokio::test]
async fn test_approve_teacher_removes_from_pending() {
    let h = Harness::new();
    let mut approved = pending_teacher("t-9");
    approved.approved = true;
    h.transport
        .on(
            "GET",
            "/api/admin/teachers/pending",
            Reply::ok(json(&vec![pending_teacher("t-9"), pending_teacher("t-8")])),
        )
        .on("POST", "/api/admin/teachers/t-9/approve", Reply::ok(json(&approved)));
    let store = admin_store(&h);
    store.refresh_pending_teachers().await.unwrap();

    store.approve_teacher("t-9").await.unwrap();

    let pending = store.state().pending_teachers.items().to_vec();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, "t-8");
}

#[tokio::test]
async fn test_enrollment_status_change_and_summary() {
    let h = Harness::new();
    let all = vec![
        enrollment(1, 1, EnrollmentStatus::Pending),
        enrollment(2, 1, EnrollmentStatus::Approved),
        enrollment(3, 2, EnrollmentStatus::Pending),
    ];
    h.transport
        .on("GET", "/api/admin/enrollments", Reply::ok(json(&all)))
        .on(
            "PUT",
            "/api/admin/enrollments/3/status",
            Reply::ok(json(&enrollment(3, 2, EnrollmentStatus::Rejected))),
        );
    let store = admin_store(&h);
    store.refresh_enrollments().await.unwrap();
    assert_eq!(store.state().status_summary().pending, 2);

    store
        .set_enrollment_status(3, EnrollmentStatus::Rejected)
        .await
        .unwrap();
    let summary = store.state().status_summary();
    assert_eq!(summary.pending, 1);
    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.total(), 3);

    let unknown = store
        .set_enrollment_status(42, EnrollmentStatus::Approved)
        .await;
    assert!(matches!(unknown, Err(ClientError::InvalidInput(_))));
}

#[tokio::test]
async fn test_admin_action_failure_is_recorded_and_data_kept() {
    let h = Harness::new();
    h.transport
        .on("GET", "/api/admin/users", Reply::ok(json(&vec![user("b", Role::Student)])))
        .on(
            "DELETE",
            "/api/admin/users/b",
            Reply::status(403, r#"{"message":"cannot delete"}"#),
        );
    let store = admin_store(&h);
    store.refresh_users().await.unwrap();

    assert!(store.delete_user("b").await.is_err());
    let state = store.state();
    assert_eq!(state.users.items().len(), 1);
    assert_eq!(
        state.action.error(),
        Some("Request failed (403): cannot delete")
    );
    assert!(!state.action.is_running());
}
