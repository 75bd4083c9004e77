use std::rc::Rc;

use campus_shared::protocol::{
    ApproveTeacherRequest, ChangeRoleRequest, DeleteUserRequest, ListAllCoursesRequest,
    ListAllEnrollmentsRequest, ListPendingTeachersRequest, ListUsersRequest,
    SetEnrollmentStatusRequest,
};
use campus_shared::{
    Course, Enrollment, EnrollmentId, EnrollmentStatus, Role, RoleCode, Teacher, User,
};

use crate::error::ClientResult;
use crate::gateway::ApiClient;

#[derive(Clone)]
pub struct AdminService {
    api: Rc<ApiClient>,
}

impl AdminService {
    pub fn new(api: Rc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn users(&self) -> ClientResult<Vec<User>> {
        self.api.call(&ListUsersRequest).await
    }

    pub async fn change_role(&self, user_id: &str, role: Role) -> ClientResult<User> {
        self.api
            .call(&ChangeRoleRequest {
                user_id: user_id.to_string(),
                role: RoleCode(role),
            })
            .await
    }

    pub async fn delete_user(&self, user_id: &str) -> ClientResult<()> {
        self.api
            .call(&DeleteUserRequest {
                user_id: user_id.to_string(),
            })
            .await
    }

    pub async fn pending_teachers(&self) -> ClientResult<Vec<Teacher>> {
        self.api.call(&ListPendingTeachersRequest).await
    }

    pub async fn approve_teacher(&self, teacher_id: &str) -> ClientResult<Teacher> {
        self.api
            .call(&ApproveTeacherRequest {
                teacher_id: teacher_id.to_string(),
            })
            .await
    }

    pub async fn courses(&self) -> ClientResult<Vec<Course>> {
        self.api.call(&ListAllCoursesRequest).await
    }

    pub async fn enrollments(&self) -> ClientResult<Vec<Enrollment>> {
        self.api.call(&ListAllEnrollmentsRequest).await
    }

    pub async fn set_enrollment_status(
        &self,
        enrollment_id: EnrollmentId,
        status: EnrollmentStatus,
    ) -> ClientResult<Enrollment> {
        self.api
            .call(&SetEnrollmentStatusRequest {
                enrollment_id,
                status,
            })
            .await
    }
}
