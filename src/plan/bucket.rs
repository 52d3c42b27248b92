//! Level bucketing and backfill
//!
//! Courses are partitioned into beginner/intermediate/advanced buckets, one
//! per milestone. Empty buckets borrow a neighbour's list so no milestone is
//! left bare while the scope has any course at all: intermediate borrows from
//! beginner then advanced, advanced from intermediate then beginner, beginner
//! from intermediate. Borrowing is sequential, so advanced can see an
//! intermediate list that was itself just backfilled. When every bucket is
//! empty, the full scoped list splits into three contiguous thirds; the
//! thirds may overlap in subject, which matches the platform's last-resort
//! behavior.

use crate::domain::{Course, CourseLevel};

/// The three per-level course lists, already deduplicated by the caller.
#[derive(Clone, Debug, Default)]
pub struct LevelBuckets {
    pub beginner: Vec<Course>,
    pub intermediate: Vec<Course>,
    pub advanced: Vec<Course>,
}

impl LevelBuckets {
    pub fn get(&self, level: CourseLevel) -> &[Course] {
        match level {
            CourseLevel::Beginner => &self.beginner,
            CourseLevel::Intermediate => &self.intermediate,
            CourseLevel::Advanced => &self.advanced,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.beginner.is_empty() && self.intermediate.is_empty() && self.advanced.is_empty()
    }
}

/// Split `courses` by level, preserving input order inside each bucket.
pub fn partition(courses: Vec<Course>) -> LevelBuckets {
    let mut buckets = LevelBuckets::default();
    for course in courses {
        match course.level {
            CourseLevel::Beginner => buckets.beginner.push(course),
            CourseLevel::Intermediate => buckets.intermediate.push(course),
            CourseLevel::Advanced => buckets.advanced.push(course),
        }
    }
    buckets
}

/// Fill empty buckets from neighbours; `scope` is the full deduplicated list
/// used for the even-split last resort.
pub fn backfill(mut buckets: LevelBuckets, scope: &[Course]) -> LevelBuckets {
    if buckets.is_empty() {
        if scope.is_empty() {
            return buckets;
        }
        let third = scope.len().div_ceil(3);
        buckets.beginner = scope.iter().take(third).cloned().collect();
        buckets.intermediate = scope.iter().skip(third).take(third).cloned().collect();
        buckets.advanced = scope.iter().skip(third * 2).cloned().collect();
        return buckets;
    }

    if buckets.intermediate.is_empty() {
        buckets.intermediate = if !buckets.beginner.is_empty() {
            buckets.beginner.clone()
        } else {
            buckets.advanced.clone()
        };
    }
    if buckets.advanced.is_empty() {
        buckets.advanced = if !buckets.intermediate.is_empty() {
            buckets.intermediate.clone()
        } else {
            buckets.beginner.clone()
        };
    }
    if buckets.beginner.is_empty() {
        buckets.beginner = buckets.intermediate.clone();
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn course(id: &str, level: CourseLevel) -> Course {
        Course {
            id: id.into(),
            title: id.into(),
            description: String::new(),
            ai_description: None,
            level,
            category_id: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            total_lesson_hours: 10.0,
            enrollment_count: 0,
        }
    }

    fn ids(courses: &[Course]) -> Vec<&str> {
        courses.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn empty_advanced_borrows_whole_intermediate_bucket() {
        let scope = vec![
            course("b1", CourseLevel::Beginner),
            course("b2", CourseLevel::Beginner),
            course("i1", CourseLevel::Intermediate),
            course("i2", CourseLevel::Intermediate),
            course("i3", CourseLevel::Intermediate),
            course("i4", CourseLevel::Intermediate),
        ];
        let buckets = backfill(partition(scope.clone()), &scope);
        assert_eq!(ids(&buckets.advanced), vec!["i1", "i2", "i3", "i4"]);
        assert_eq!(ids(&buckets.beginner), vec!["b1", "b2"]);
    }

    #[test]
    fn single_level_catalog_fills_all_three_buckets() {
        let scope = vec![
            course("a1", CourseLevel::Advanced),
            course("a2", CourseLevel::Advanced),
        ];
        let buckets = backfill(partition(scope.clone()), &scope);
        // intermediate borrows advanced, then beginner borrows intermediate
        assert_eq!(ids(&buckets.intermediate), vec!["a1", "a2"]);
        assert_eq!(ids(&buckets.beginner), vec!["a1", "a2"]);
        assert_eq!(ids(&buckets.advanced), vec!["a1", "a2"]);
    }

    #[test]
    fn all_empty_buckets_split_scope_into_contiguous_thirds() {
        // Levels stripped out of scope entirely cannot happen through
        // partition, so drive backfill with empty buckets directly.
        let scope: Vec<Course> = (0..7)
            .map(|i| course(&format!("c{i}"), CourseLevel::Beginner))
            .collect();
        let buckets = backfill(LevelBuckets::default(), &scope);
        assert_eq!(ids(&buckets.beginner), vec!["c0", "c1", "c2"]);
        assert_eq!(ids(&buckets.intermediate), vec!["c3", "c4", "c5"]);
        assert_eq!(ids(&buckets.advanced), vec!["c6"]);
    }

    #[test]
    fn empty_scope_stays_empty() {
        let buckets = backfill(LevelBuckets::default(), &[]);
        assert!(buckets.is_empty());
    }
}
