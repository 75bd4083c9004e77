//! 选课派生视图
//!
//! 从扁平的选课列表和课程列表计算状态分区与连接索引，只读、不持久化，
//! 每次底层列表变化后重新计算。
//!
//! 不变量：
//! - 选课按状态划分为四个互不相交的分区，并集就是完整列表
//! - 课程级分区两两不相交；同一课程出现多个不同状态的选课时记为冲突，
//!   该课程不进入任何状态分区

use std::collections::{BTreeMap, BTreeSet, HashMap};

use campus_shared::{Course, CourseId, Enrollment, EnrollmentId, EnrollmentStatus};

/// 同一课程存在状态互相矛盾的多条选课
#[derive(Debug, Clone, PartialEq)]
pub struct EnrollmentConflict {
    pub course_id: CourseId,
    pub enrollment_ids: Vec<EnrollmentId>,
    pub statuses: Vec<EnrollmentStatus>,
}

/// 各状态数量
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusSummary {
    pub pending: usize,
    pub approved: usize,
    pub completed: usize,
    pub rejected: usize,
}

impl StatusSummary {
    pub fn from_enrollments<'a>(enrollments: impl IntoIterator<Item = &'a Enrollment>) -> Self {
        let mut summary = Self::default();
        for e in enrollments {
            *summary.slot(e.status) += 1;
        }
        summary
    }

    fn slot(&mut self, status: EnrollmentStatus) -> &mut usize {
        match status {
            EnrollmentStatus::Pending => &mut self.pending,
            EnrollmentStatus::Approved => &mut self.approved,
            EnrollmentStatus::Completed => &mut self.completed,
            EnrollmentStatus::Rejected => &mut self.rejected,
        }
    }

    pub fn get(&self, status: EnrollmentStatus) -> usize {
        match status {
            EnrollmentStatus::Pending => self.pending,
            EnrollmentStatus::Approved => self.approved,
            EnrollmentStatus::Completed => self.completed,
            EnrollmentStatus::Rejected => self.rejected,
        }
    }

    pub fn total(&self) -> usize {
        self.pending + self.approved + self.completed + self.rejected
    }
}

/// 学生视角的选课/课程聚合
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrollmentView {
    courses: Vec<Course>,
    enrollments: Vec<Enrollment>,
    course_index: HashMap<CourseId, usize>,
    enrollment_index: HashMap<EnrollmentId, usize>,
    /// 课程 -> 该课程的选课下标（按出现顺序）
    by_course: HashMap<CourseId, Vec<usize>>,
    /// 课程级状态分区，冲突课程不在其中
    partitions: BTreeMap<EnrollmentStatus, BTreeSet<CourseId>>,
    conflicts: Vec<EnrollmentConflict>,
    summary: StatusSummary,
}

impl EnrollmentView {
    pub fn build(enrollments: &[Enrollment], courses: &[Course]) -> Self {
        let course_index: HashMap<CourseId, usize> = courses
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id, i))
            .collect();
        let enrollment_index: HashMap<EnrollmentId, usize> = enrollments
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id, i))
            .collect();

        let mut by_course: HashMap<CourseId, Vec<usize>> = HashMap::new();
        for (i, e) in enrollments.iter().enumerate() {
            by_course.entry(e.course_id).or_default().push(i);
        }

        let mut partitions: BTreeMap<EnrollmentStatus, BTreeSet<CourseId>> = EnrollmentStatus::ALL
            .iter()
            .map(|s| (*s, BTreeSet::new()))
            .collect();
        let mut conflicts = Vec::new();

        // 按课程 id 排序遍历，冲突列表顺序稳定
        let mut course_ids: Vec<&CourseId> = by_course.keys().collect();
        course_ids.sort();
        for course_id in course_ids {
            let indices = &by_course[course_id];
            let statuses: BTreeSet<EnrollmentStatus> =
                indices.iter().map(|i| enrollments[*i].status).collect();

            if statuses.len() == 1 {
                if let Some(status) = statuses.iter().next() {
                    partitions.entry(*status).or_default().insert(*course_id);
                }
            } else {
                log::warn!(
                    "[Enrollments] Course {} has conflicting statuses {:?}",
                    course_id,
                    statuses
                );
                conflicts.push(EnrollmentConflict {
                    course_id: *course_id,
                    enrollment_ids: indices.iter().map(|i| enrollments[*i].id).collect(),
                    statuses: statuses.into_iter().collect(),
                });
            }
        }

        Self {
            courses: courses.to_vec(),
            enrollments: enrollments.to_vec(),
            course_index,
            enrollment_index,
            by_course,
            partitions,
            conflicts,
            summary: StatusSummary::from_enrollments(enrollments),
        }
    }

    // --- 选课分区 ---

    /// 某状态下的全部选课（选课级分区，包含冲突课程的选课）
    pub fn enrollments_with(&self, status: EnrollmentStatus) -> Vec<&Enrollment> {
        self.enrollments.iter().filter(|e| e.status == status).collect()
    }

    pub fn summary(&self) -> StatusSummary {
        self.summary
    }

    // --- 课程分区 ---

    /// 某状态分区中的课程 id
    pub fn course_ids_with(&self, status: EnrollmentStatus) -> Vec<CourseId> {
        self.partitions
            .get(&status)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// 某状态分区中的课程（只包含课程列表中存在的课程）
    pub fn courses_with(&self, status: EnrollmentStatus) -> Vec<&Course> {
        self.course_ids_with(status)
            .into_iter()
            .filter_map(|id| self.course(id))
            .collect()
    }

    pub fn pending_courses(&self) -> Vec<&Course> {
        self.courses_with(EnrollmentStatus::Pending)
    }

    pub fn approved_courses(&self) -> Vec<&Course> {
        self.courses_with(EnrollmentStatus::Approved)
    }

    pub fn completed_courses(&self) -> Vec<&Course> {
        self.courses_with(EnrollmentStatus::Completed)
    }

    pub fn rejected_courses(&self) -> Vec<&Course> {
        self.courses_with(EnrollmentStatus::Rejected)
    }

    /// 没有任何选课记录的课程
    pub fn available_courses(&self) -> Vec<&Course> {
        self.courses
            .iter()
            .filter(|c| !self.by_course.contains_key(&c.id))
            .collect()
    }

    pub fn available_courses_count(&self) -> usize {
        self.available_courses().len()
    }

    pub fn conflicts(&self) -> &[EnrollmentConflict] {
        &self.conflicts
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// 引用了课程列表中不存在的课程的选课 id
    pub fn orphan_enrollments(&self) -> Vec<EnrollmentId> {
        self.enrollments
            .iter()
            .filter(|e| !self.course_index.contains_key(&e.course_id))
            .map(|e| e.id)
            .collect()
    }

    // --- 连接索引 ---

    pub fn course(&self, course_id: CourseId) -> Option<&Course> {
        self.course_index.get(&course_id).map(|i| &self.courses[*i])
    }

    /// 课程对应的选课；冲突课程返回 `None`
    pub fn enrollment_for_course(&self, course_id: CourseId) -> Option<&Enrollment> {
        if self.conflicts.iter().any(|c| c.course_id == course_id) {
            return None;
        }
        self.by_course
            .get(&course_id)
            .and_then(|indices| indices.last())
            .map(|i| &self.enrollments[*i])
    }

    pub fn course_for_enrollment(&self, enrollment_id: EnrollmentId) -> Option<&Course> {
        self.enrollment_index
            .get(&enrollment_id)
            .and_then(|i| self.course(self.enrollments[*i].course_id))
    }

    pub fn status_of_course(&self, course_id: CourseId) -> Option<EnrollmentStatus> {
        self.partitions
            .iter()
            .find(|(_, ids)| ids.contains(&course_id))
            .map(|(status, _)| *status)
    }
}

/// 教师视角：单门课程的花名册
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterView {
    pub pending: Vec<Enrollment>,
    pub approved: Vec<Enrollment>,
    pub completed: Vec<Enrollment>,
    pub rejected: Vec<Enrollment>,
}

impl RosterView {
    pub fn build(enrollments: &[Enrollment]) -> Self {
        let mut roster = Self::default();
        for e in enrollments {
            let bucket = match e.status {
                EnrollmentStatus::Pending => &mut roster.pending,
                EnrollmentStatus::Approved => &mut roster.approved,
                EnrollmentStatus::Completed => &mut roster.completed,
                EnrollmentStatus::Rejected => &mut roster.rejected,
            };
            bucket.push(e.clone());
        }
        roster
    }

    pub fn len(&self) -> usize {
        self.pending.len() + self.approved.len() + self.completed.len() + self.rejected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 可以打分的学生：已通过或已结课
    pub fn gradable(&self) -> impl Iterator<Item = &Enrollment> {
        self.approved.iter().chain(self.completed.iter())
    }
}
