//! 可观察 Store
//!
//! 每个 Store 持有一个 `Observable<State>`，字段只能通过 Store 的方法修改，
//! 外部只能读取快照或订阅变化。Store 由 `AppContext` 创建并长期持有。

mod admin;
mod my_courses;
pub mod resource;
mod teacher_courses;
mod user;

pub use admin::{AdminState, AdminUsecasesStore};
pub use my_courses::{MyCoursesState, MyCoursesStore};
pub use teacher_courses::{TeacherCoursesState, TeacherCoursesStore};
pub use user::{UserState, UserStore};

/// 按 key 替换列表中的同一条记录，不存在时追加
fn upsert_by<T, K: PartialEq>(list: &mut Vec<T>, item: T, key: impl Fn(&T) -> K) {
    let id = key(&item);
    match list.iter_mut().find(|existing| key(existing) == id) {
        Some(existing) => *existing = item,
        None => list.push(item),
    }
}

#[cfg(test)]
mod tests;
