//! Store 与 Leptos 信号的桥接
//!
//! 每个 Store 的状态在 App 根部各映射为一个只读信号，订阅只建立一次，
//! 根 Owner 清理时取消订阅。
//! 组件通过 [`use_app`] 读取信号，通过 [`AppSignals::spawn`] 调用控制器。

use std::future::Future;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::context::AppContext;
use crate::session::SessionState;
use crate::stores::{AdminState, MyCoursesState, TeacherCoursesState, UserState};

/// 应用上下文
///
/// 包含各 Store 状态的只读信号，通过 Context 在组件间共享。
#[derive(Clone, Copy)]
pub struct AppSignals {
    pub user: ReadSignal<UserState>,
    pub my_courses: ReadSignal<MyCoursesState>,
    pub teacher: ReadSignal<TeacherCoursesState>,
    pub admin: ReadSignal<AdminState>,
    ctx: StoredValue<Rc<AppContext>, LocalStorage>,
}

impl AppSignals {
    fn new(ctx: Rc<AppContext>) -> Self {
        let (user, set_user) = signal((*ctx.user.state()).clone());
        let user_sub = ctx.user.subscribe(move |s| set_user.set(s.clone()));

        let (my_courses, set_my_courses) = signal((*ctx.my_courses.state()).clone());
        let my_courses_sub = ctx.my_courses.subscribe(move |s| set_my_courses.set(s.clone()));

        let (teacher, set_teacher) = signal((*ctx.teacher.state()).clone());
        let teacher_sub = ctx.teacher.subscribe(move |s| set_teacher.set(s.clone()));

        let (admin, set_admin) = signal((*ctx.admin.state()).clone());
        let admin_sub = ctx.admin.subscribe(move |s| set_admin.set(s.clone()));

        let ctx = StoredValue::new_local(ctx);
        on_cleanup(move || {
            ctx.try_with_value(|ctx| {
                ctx.user.unsubscribe(user_sub);
                ctx.my_courses.unsubscribe(my_courses_sub);
                ctx.teacher.unsubscribe(teacher_sub);
                ctx.admin.unsubscribe(admin_sub);
                log::debug!("[Bridge] Store subscriptions released.");
            });
        });

        Self {
            user,
            my_courses,
            teacher,
            admin,
            ctx,
        }
    }

    /// 会话信号（用于路由服务注入）
    pub fn session(&self) -> Signal<SessionState> {
        let user = self.user;
        Signal::derive(move || user.with(|s| s.session.clone()))
    }

    pub fn context(&self) -> Rc<AppContext> {
        self.ctx.get_value()
    }

    /// 在浏览器事件循环中执行一个控制器调用
    pub fn spawn<F, Fut>(&self, task: F)
    where
        F: FnOnce(Rc<AppContext>) -> Fut,
        Fut: Future<Output = ()> + 'static,
    {
        spawn_local(task(self.context()));
    }
}

/// 创建信号桥并放入 Context
pub fn provide_app(ctx: Rc<AppContext>) -> AppSignals {
    let signals = AppSignals::new(ctx);
    provide_context(signals);
    signals
}

/// 从 Context 获取应用上下文
pub fn use_app() -> AppSignals {
    use_context::<AppSignals>().expect("AppSignals should be provided")
}
