use std::rc::Rc;

use campus_shared::{Course, CourseId, Enrollment, Lecture};

use super::resource::{Action, Resource, track, track_action};
use super::upsert_by;
use crate::aggregate::EnrollmentView;
use crate::error::ClientResult;
use crate::observable::{Observable, Subscription};
use crate::services::CourseService;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MyCoursesState {
    pub courses: Resource<Vec<Course>>,
    pub enrollments: Resource<Vec<Enrollment>>,
    pub lectures: Resource<Vec<Lecture>>,
    /// `lectures` 对应的课程
    pub lectures_course: Option<CourseId>,
    /// 选课提交：进行中的课程与最近一次错误
    pub enroll: Action<CourseId>,
}

impl MyCoursesState {
    pub fn view(&self) -> EnrollmentView {
        EnrollmentView::build(self.enrollments.items(), self.courses.items())
    }
}

fn courses(s: &mut MyCoursesState) -> &mut Resource<Vec<Course>> {
    &mut s.courses
}

fn enrollments(s: &mut MyCoursesState) -> &mut Resource<Vec<Enrollment>> {
    &mut s.enrollments
}

fn lectures(s: &mut MyCoursesState) -> &mut Resource<Vec<Lecture>> {
    &mut s.lectures
}

fn enroll_action(s: &mut MyCoursesState) -> &mut Action<CourseId> {
    &mut s.enroll
}

/// 学生的课程与选课
pub struct MyCoursesStore {
    state: Observable<MyCoursesState>,
    service: CourseService,
}

impl MyCoursesStore {
    pub fn new(service: CourseService) -> Self {
        Self {
            state: Observable::new(MyCoursesState::default()),
            service,
        }
    }

    pub fn state(&self) -> Rc<MyCoursesState> {
        self.state.snapshot()
    }

    pub fn subscribe(&self, f: impl Fn(&MyCoursesState) + 'static) -> Subscription {
        self.state.subscribe(f)
    }

    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.state.unsubscribe(subscription)
    }

    /// 基于当前快照的派生视图
    pub fn view(&self) -> EnrollmentView {
        self.state.with(MyCoursesState::view)
    }

    pub async fn refresh_courses(&self) -> ClientResult<Vec<Course>> {
        track(&self.state, courses, self.service.list_courses()).await
    }

    pub async fn refresh_enrollments(&self) -> ClientResult<Vec<Enrollment>> {
        track(&self.state, enrollments, self.service.my_enrollments()).await
    }

    /// 两个列表分别记录各自的错误，任一失败都返回错误
    pub async fn refresh_all(&self) -> ClientResult<()> {
        let courses = self.refresh_courses().await;
        let enrollments = self.refresh_enrollments().await;
        courses?;
        enrollments?;
        Ok(())
    }

    /// 选课成功后立即合并结果，再从后端刷新选课列表
    pub async fn enroll(&self, course_id: CourseId) -> ClientResult<Enrollment> {
        let enrollment = track_action(
            &self.state,
            enroll_action,
            course_id,
            self.service.enroll(course_id),
        )
        .await?;

        let merged = enrollment.clone();
        self.state
            .update(|s| s.enrollments.modify(|list| upsert_by(list, merged, |e| e.id)));
        if let Err(e) = self.refresh_enrollments().await {
            log::warn!("[Courses] Refresh after enrolling failed: {}", e);
        }
        Ok(enrollment)
    }

    pub async fn load_lectures(&self, course_id: CourseId) -> ClientResult<Vec<Lecture>> {
        self.state.update(|s| {
            if s.lectures_course != Some(course_id) {
                s.lectures.reset();
                s.lectures_course = Some(course_id);
            }
        });
        track(&self.state, lectures, self.service.lectures(course_id)).await
    }

    /// 登出时清空
    pub fn reset(&self) {
        self.state.update(|s| {
            s.courses.reset();
            s.enrollments.reset();
            s.lectures.reset();
            s.lectures_course = None;
            s.enroll.reset();
        });
    }
}

