use std::rc::Rc;

use campus_shared::protocol::{CreateCourseRequest, CreateLectureRequest};
use campus_shared::{Course, CourseId, Enrollment, EnrollmentId, EnrollmentStatus, Lecture};

use super::resource::{Action, Resource, track, track_action};
use super::upsert_by;
use crate::aggregate::RosterView;
use crate::error::{ClientError, ClientResult};
use crate::observable::{Observable, Subscription};
use crate::services::TeacherService;

pub const MAX_GRADE: f32 = 100.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeacherCoursesState {
    pub courses: Resource<Vec<Course>>,
    pub selected_course: Option<CourseId>,
    /// 选中课程的选课记录
    pub roster: Resource<Vec<Enrollment>>,
    /// 选中课程的课时
    pub lectures: Resource<Vec<Lecture>>,
    /// 建课、加课时、打分与审批共用的提交状态
    pub action: Action,
}

impl TeacherCoursesState {
    pub fn selected(&self) -> Option<&Course> {
        let id = self.selected_course?;
        self.courses.items().iter().find(|c| c.id == id)
    }

    pub fn roster_view(&self) -> RosterView {
        RosterView::build(self.roster.items())
    }

    pub fn pending_enrollments(&self) -> Vec<Enrollment> {
        self.roster
            .items()
            .iter()
            .filter(|e| e.status == EnrollmentStatus::Pending)
            .cloned()
            .collect()
    }
}

fn courses(s: &mut TeacherCoursesState) -> &mut Resource<Vec<Course>> {
    &mut s.courses
}

fn roster(s: &mut TeacherCoursesState) -> &mut Resource<Vec<Enrollment>> {
    &mut s.roster
}

fn lectures(s: &mut TeacherCoursesState) -> &mut Resource<Vec<Lecture>> {
    &mut s.lectures
}

fn action(s: &mut TeacherCoursesState) -> &mut Action {
    &mut s.action
}

/// 教师的课程管理
pub struct TeacherCoursesStore {
    state: Observable<TeacherCoursesState>,
    service: TeacherService,
}

impl TeacherCoursesStore {
    pub fn new(service: TeacherService) -> Self {
        Self {
            state: Observable::new(TeacherCoursesState::default()),
            service,
        }
    }

    pub fn state(&self) -> Rc<TeacherCoursesState> {
        self.state.snapshot()
    }

    pub fn subscribe(&self, f: impl Fn(&TeacherCoursesState) + 'static) -> Subscription {
        self.state.subscribe(f)
    }

    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.state.unsubscribe(subscription)
    }

    pub async fn refresh_courses(&self) -> ClientResult<Vec<Course>> {
        track(&self.state, courses, self.service.my_courses()).await
    }

    /// 选中课程并加载其花名册与课时；切换课程时丢弃旧课程的数据
    pub async fn select_course(&self, course_id: CourseId) -> ClientResult<()> {
        self.state.update(|s| {
            if s.selected_course != Some(course_id) {
                s.selected_course = Some(course_id);
                s.roster.reset();
                s.lectures.reset();
            }
        });
        let roster = self.refresh_roster().await;
        let lectures = self.refresh_lectures().await;
        roster?;
        lectures?;
        Ok(())
    }

    pub fn clear_selection(&self) {
        self.state.update(|s| {
            s.selected_course = None;
            s.roster.reset();
            s.lectures.reset();
        });
    }

    pub async fn refresh_roster(&self) -> ClientResult<Vec<Enrollment>> {
        let course_id = self.require_selection()?;
        track(&self.state, roster, self.service.course_enrollments(course_id)).await
    }

    pub async fn refresh_lectures(&self) -> ClientResult<Vec<Lecture>> {
        let course_id = self.require_selection()?;
        track(&self.state, lectures, self.service.lectures(course_id)).await
    }

    pub async fn create_course(&self, req: CreateCourseRequest) -> ClientResult<Course> {
        if req.title.trim().is_empty() {
            return self.fail(ClientError::InvalidInput("course title is required".into()));
        }
        let course = track_action(&self.state, action, (), self.service.create_course(req)).await?;
        let created = course.clone();
        self.state
            .update(|s| s.courses.modify(|list| upsert_by(list, created, |c| c.id)));
        log::info!("[Teacher] Created course {}", course.id);
        Ok(course)
    }

    pub async fn add_lecture(&self, req: CreateLectureRequest) -> ClientResult<Lecture> {
        if req.title.trim().is_empty() {
            return self.fail(ClientError::InvalidInput("lecture title is required".into()));
        }
        let lecture = track_action(&self.state, action, (), self.service.add_lecture(req)).await?;
        let added = lecture.clone();
        self.state.update(|s| {
            if s.selected_course == Some(added.course_id) {
                s.lectures.modify(|list| upsert_by(list, added, |l| l.id));
            }
        });
        Ok(lecture)
    }

    /// 成绩范围 0..=100，只能给已通过或已结课的学生打分
    pub async fn set_grade(
        &self,
        enrollment_id: EnrollmentId,
        grade: f32,
    ) -> ClientResult<Enrollment> {
        if !grade.is_finite() || !(0.0..=MAX_GRADE).contains(&grade) {
            return self.fail(ClientError::InvalidInput(format!(
                "grade must be between 0 and {}",
                MAX_GRADE
            )));
        }
        let status = self.state.with(|s| {
            s.roster
                .items()
                .iter()
                .find(|e| e.id == enrollment_id)
                .map(|e| e.status)
        });
        if let Some(status) = status {
            if !matches!(status, EnrollmentStatus::Approved | EnrollmentStatus::Completed) {
                return self.fail(ClientError::InvalidInput(format!(
                    "cannot grade a {} enrollment",
                    status
                )));
            }
        }

        let updated = track_action(
            &self.state,
            action,
            (),
            self.service.set_grade(enrollment_id, grade),
        )
        .await?;
        self.merge_roster(updated.clone());
        Ok(updated)
    }

    /// 审批待定选课：只能改为 Approved 或 Rejected
    pub async fn review_enrollment(
        &self,
        enrollment_id: EnrollmentId,
        status: EnrollmentStatus,
    ) -> ClientResult<Enrollment> {
        if !matches!(status, EnrollmentStatus::Approved | EnrollmentStatus::Rejected) {
            return self.fail(ClientError::InvalidInput(format!(
                "an enrollment cannot be reviewed as {}",
                status
            )));
        }
        let updated = track_action(
            &self.state,
            action,
            (),
            self.service.review_enrollment(enrollment_id, status),
        )
        .await?;
        self.merge_roster(updated.clone());
        Ok(updated)
    }

    pub fn reset(&self) {
        self.state.update(|s| {
            s.courses.reset();
            s.roster.reset();
            s.lectures.reset();
            s.selected_course = None;
            s.action.reset();
        });
    }

    // ===== 内部辅助 =====

    fn require_selection(&self) -> ClientResult<CourseId> {
        self.state
            .with(|s| s.selected_course)
            .ok_or_else(|| ClientError::InvalidInput("no course selected".into()))
    }

    fn merge_roster(&self, enrollment: Enrollment) {
        self.state.update(|s| {
            if s.selected_course == Some(enrollment.course_id) {
                s.roster.modify(|list| upsert_by(list, enrollment, |e| e.id));
            }
        });
    }

    fn fail<T>(&self, err: ClientError) -> ClientResult<T> {
        let message = err.to_string();
        self.state.update(|s| s.action.fail(message));
        Err(err)
    }
}
