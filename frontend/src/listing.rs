//! 客户端分页与过滤

use campus_shared::{Course, Role, User};

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    /// 从 1 开始
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// 分页；页码越界时夹到最后一页，`per_page` 为 0 时按 1 处理
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * per_page;
    let end = (start + per_page).min(total);

    Page {
        items: items.get(start..end).map(<[T]>::to_vec).unwrap_or_default(),
        total,
        page,
        per_page,
        total_pages,
    }
}

/// 用户列表过滤条件
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    pub query: String,
    pub role: Option<Role>,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        if let Some(role) = self.role {
            if user.role != role {
                return false;
            }
        }
        let query = self.query.trim().to_lowercase();
        query.is_empty()
            || user.display_name.to_lowercase().contains(&query)
            || user.email.to_lowercase().contains(&query)
    }

    pub fn apply(&self, users: &[User]) -> Vec<User> {
        users.iter().filter(|u| self.matches(u)).cloned().collect()
    }
}

/// 按标题或教师姓名过滤课程
pub fn filter_courses(courses: &[Course], query: &str) -> Vec<Course> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return courses.to_vec();
    }
    courses
        .iter()
        .filter(|c| {
            c.title.to_lowercase().contains(&query)
                || c
                    .teacher_name
                    .as_deref()
                    .is_some_and(|t| t.to_lowercase().contains(&query))
        })
        .cloned()
        .collect()
}

/// 各角色人数
pub fn count_by_role(users: &[User]) -> [(Role, usize); 3] {
    Role::ALL.map(|role| (role, users.iter().filter(|u| u.role == role).count()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{course, user};

    #[test]
    fn test_paginate_slices_and_clamps() {
        let items: Vec<u32> = (1..=23).collect();
        let p = paginate(&items, 3, 10);
        assert_eq!(p.items, vec![21, 22, 23]);
        assert_eq!(p.total_pages, 3);
        assert!(!p.has_next());
        assert!(p.has_prev());

        let clamped = paginate(&items, 99, 10);
        assert_eq!(clamped.page, 3);
        let first = paginate(&items, 0, 10);
        assert_eq!(first.page, 1);
        assert_eq!(first.items.len(), 10);
    }

    #[test]
    fn test_paginate_empty() {
        let p = paginate::<u32>(&[], 1, 10);
        assert!(p.items.is_empty());
        assert_eq!(p.total_pages, 1);
        assert_eq!(p.total, 0);
    }

    #[test]
    fn test_user_filter() {
        let users = vec![
            user("alice", Role::Student),
            user("bob", Role::Teacher),
            user("carol", Role::Student),
        ];
        let filter = UserFilter {
            query: "AL".into(),
            role: None,
        };
        assert_eq!(filter.apply(&users).len(), 1);

        let students = UserFilter {
            query: String::new(),
            role: Some(Role::Student),
        };
        assert_eq!(students.apply(&users).len(), 2);
        assert_eq!(
            count_by_role(&users),
            [(Role::Admin, 0), (Role::Teacher, 1), (Role::Student, 2)]
        );
    }

    #[test]
    fn test_filter_courses_by_title() {
        let mut c = course(1);
        c.title = "Rust Basics".into();
        let courses = vec![c, course(2)];
        assert_eq!(filter_courses(&courses, "rust").len(), 1);
        assert_eq!(filter_courses(&courses, " ").len(), 2);
    }
}
