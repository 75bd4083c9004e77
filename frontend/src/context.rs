//! 组合根
//!
//! 在这里创建网关客户端、服务与全部 Store，并接好 401 回调。
//! 浏览器里由 App 根组件创建一次；测试里每个用例各建一份。

use std::rc::{Rc, Weak};

use crate::config::AppConfig;
use crate::gateway::{ApiClient, Transport};
use crate::identity::IdentityProvider;
use crate::services::{AdminService, AuthService, CourseService, TeacherService};
use crate::session::{KeyValueStore, SessionStore};
use crate::stores::{AdminUsecasesStore, MyCoursesStore, TeacherCoursesStore, UserStore};

pub struct AppContext {
    pub config: AppConfig,
    pub api: Rc<ApiClient>,
    pub user: Rc<UserStore>,
    pub my_courses: Rc<MyCoursesStore>,
    pub teacher: Rc<TeacherCoursesStore>,
    pub admin: Rc<AdminUsecasesStore>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        transport: Rc<dyn Transport>,
        storage: Rc<dyn KeyValueStore>,
        identity: Rc<dyn IdentityProvider>,
    ) -> Rc<Self> {
        let sessions = SessionStore::new(storage);
        let api = Rc::new(ApiClient::new(
            &config.api_base,
            transport,
            sessions.clone(),
            config.request_timeout,
            config.retry.clone(),
        ));

        let ctx = Rc::new(Self {
            user: Rc::new(UserStore::new(
                AuthService::new(api.clone(), identity),
                sessions,
            )),
            my_courses: Rc::new(MyCoursesStore::new(CourseService::new(api.clone()))),
            teacher: Rc::new(TeacherCoursesStore::new(TeacherService::new(api.clone()))),
            admin: Rc::new(AdminUsecasesStore::new(AdminService::new(api.clone()))),
            api,
            config,
        });

        // ApiClient 持有回调，回调只能弱引用 Store
        let weak: Weak<Self> = Rc::downgrade(&ctx);
        ctx.api.on_unauthorized(move || {
            if let Some(ctx) = weak.upgrade() {
                ctx.end_session();
            }
        });

        ctx
    }

    /// 会话结束（登出或 401）：清除用户状态和所有业务数据
    pub fn end_session(&self) {
        self.user.invalidate();
        self.reset_data();
    }

    /// 存储中的会话被外部修改：身份变化时丢弃旧身份的业务数据
    pub fn sync_session(&self) {
        if self.user.resync() {
            self.reset_data();
        }
    }

    pub fn reset_data(&self) {
        self.my_courses.reset();
        self.teacher.reset();
        self.admin.reset();
    }
}

#[cfg(test)]
mod tests;
