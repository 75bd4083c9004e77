use std::rc::Rc;

use campus_shared::protocol::{
    CreateCourseRequest, CreateLectureRequest, ListCourseEnrollmentsRequest,
    ListTeacherCoursesRequest, ListTeacherLecturesRequest, ReviewEnrollmentRequest,
    SetGradeRequest,
};
use campus_shared::{Course, CourseId, Enrollment, EnrollmentId, EnrollmentStatus, Lecture};

use crate::error::ClientResult;
use crate::gateway::ApiClient;

#[derive(Clone)]
pub struct TeacherService {
    api: Rc<ApiClient>,
}

impl TeacherService {
    pub fn new(api: Rc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn my_courses(&self) -> ClientResult<Vec<Course>> {
        self.api.call(&ListTeacherCoursesRequest).await
    }

    pub async fn create_course(&self, req: CreateCourseRequest) -> ClientResult<Course> {
        self.api.call(&req).await
    }

    pub async fn course_enrollments(&self, course_id: CourseId) -> ClientResult<Vec<Enrollment>> {
        self.api.call(&ListCourseEnrollmentsRequest { course_id }).await
    }

    pub async fn lectures(&self, course_id: CourseId) -> ClientResult<Vec<Lecture>> {
        self.api.call(&ListTeacherLecturesRequest { course_id }).await
    }

    pub async fn add_lecture(&self, req: CreateLectureRequest) -> ClientResult<Lecture> {
        self.api.call(&req).await
    }

    pub async fn set_grade(
        &self,
        enrollment_id: EnrollmentId,
        grade: f32,
    ) -> ClientResult<Enrollment> {
        self.api
            .call(&SetGradeRequest {
                enrollment_id,
                grade,
            })
            .await
    }

    pub async fn review_enrollment(
        &self,
        enrollment_id: EnrollmentId,
        status: EnrollmentStatus,
    ) -> ClientResult<Enrollment> {
        self.api
            .call(&ReviewEnrollmentRequest {
                enrollment_id,
                status,
            })
            .await
    }
}
