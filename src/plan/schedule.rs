//! Time scheduler
//!
//! Pure function: given an ordered course list and a weekly-hour budget,
//! annotate each course with estimated weeks and a start/end week. One
//! monotonic week cursor runs across the whole plan, so consecutive courses
//! never overlap or leave gaps.

use crate::domain::{Course, CourseRef};

/// `max(1, ceil(total_hours / weekly_hours))`. A course with no recorded
/// duration still occupies one week so the schedule never stalls on missing
/// metadata.
pub fn estimated_weeks(total_hours: f64, weekly_hours: f64) -> u32 {
    if total_hours <= 0.0 || weekly_hours <= 0.0 {
        return 1;
    }
    (total_hours / weekly_hours).ceil().max(1.0) as u32
}

/// Annotate `courses` in order, starting at week 1.
pub fn schedule(courses: &[Course], weekly_hours: f64) -> Vec<CourseRef> {
    let mut cursor: u32 = 1;
    courses
        .iter()
        .map(|course| {
            let weeks = estimated_weeks(course.total_lesson_hours, weekly_hours);
            let start_week = cursor;
            let end_week = start_week + weeks - 1;
            cursor = end_week + 1;
            CourseRef {
                id: course.id.clone(),
                title: course.title.clone(),
                level: course.level,
                total_hours: course.total_lesson_hours,
                estimated_weeks: weeks,
                start_week,
                end_week,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CourseLevel;
    use chrono::{TimeZone, Utc};

    fn course(id: &str, hours: f64) -> Course {
        Course {
            id: id.into(),
            title: id.into(),
            description: String::new(),
            ai_description: None,
            level: CourseLevel::Beginner,
            category_id: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            total_lesson_hours: hours,
            enrollment_count: 0,
        }
    }

    #[test]
    fn week_estimate_rounds_up_and_never_hits_zero() {
        assert_eq!(estimated_weeks(25.0, 10.0), 3);
        assert_eq!(estimated_weeks(10.0, 10.0), 1);
        assert_eq!(estimated_weeks(0.0, 10.0), 1);
        assert_eq!(estimated_weeks(5.0, 0.0), 1);
    }

    #[test]
    fn cursor_is_contiguous_across_the_whole_list() {
        let refs = schedule(&[course("a", 25.0), course("b", 0.0), course("c", 12.0)], 10.0);
        assert_eq!(refs[0].start_week, 1);
        assert_eq!(refs[0].end_week, 3);
        assert_eq!(refs[1].start_week, 4);
        assert_eq!(refs[1].end_week, 4);
        assert_eq!(refs[2].start_week, 5);
        assert_eq!(refs[2].end_week, 6);
        for pair in refs.windows(2) {
            assert_eq!(pair[0].end_week + 1, pair[1].start_week);
        }
    }
}
