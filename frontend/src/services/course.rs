use std::rc::Rc;

use campus_shared::protocol::{
    EnrollCourseRequest, ListAvailableCoursesRequest, ListCourseLecturesRequest,
    ListMyEnrollmentsRequest,
};
use campus_shared::{Course, CourseId, Enrollment, Lecture};

use crate::error::ClientResult;
use crate::gateway::ApiClient;

/// 学生端课程服务
#[derive(Clone)]
pub struct CourseService {
    api: Rc<ApiClient>,
}

impl CourseService {
    pub fn new(api: Rc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn list_courses(&self) -> ClientResult<Vec<Course>> {
        self.api.call(&ListAvailableCoursesRequest).await
    }

    pub async fn my_enrollments(&self) -> ClientResult<Vec<Enrollment>> {
        self.api.call(&ListMyEnrollmentsRequest).await
    }

    pub async fn enroll(&self, course_id: CourseId) -> ClientResult<Enrollment> {
        self.api.call(&EnrollCourseRequest { course_id }).await
    }

    pub async fn lectures(&self, course_id: CourseId) -> ClientResult<Vec<Lecture>> {
        self.api.call(&ListCourseLecturesRequest { course_id }).await
    }
}
