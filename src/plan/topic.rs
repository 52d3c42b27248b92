//! Topic canonicalization and deduplication
//!
//! The catalog accumulates near-duplicate imports of the same subject and
//! level; one roadmap milestone must not list three "React basics" courses.
//! A course maps to a canonical topic key by scanning a fixed keyword
//! vocabulary against its title, then AI description, then description, on
//! normalized text; the first match wins. Keyword-less courses fall back to
//! the first two normalized title words, a deliberately coarse grouping.

use std::collections::HashMap;

use crate::domain::Course;

/// Subject vocabulary, multi-word phrases before their single-word prefixes
/// so "react native" never collapses into "react".
const TOPIC_KEYWORDS: &[&str] = &[
    "react native",
    "machine learning",
    "deep learning",
    "data science",
    "data analysis",
    "node js",
    "javascript",
    "typescript",
    "react",
    "vue",
    "angular",
    "node",
    "python",
    "django",
    "flask",
    "laravel",
    "php",
    "java",
    "kotlin",
    "swift",
    "flutter",
    "html",
    "css",
    "sql",
    "mongodb",
    "database",
    "wordpress",
    "docker",
    "kubernetes",
    "devops",
    "linux",
    "git",
    "security",
    "excel",
    "photoshop",
    "illustrator",
    "figma",
    "seo",
    "marketing",
    "ui",
    "ux",
    "جافا سكريبت",
    "رياكت",
    "بايثون",
    "فلاتر",
    "قواعد البيانات",
    "الذكاء الاصطناعي",
    "تعلم الآلة",
    "أمن المعلومات",
    "التسويق",
    "التصميم",
    "المحاسبة",
];

/// Lowercase, punctuation to spaces, collapsed whitespace. Arabic letters are
/// alphanumeric and pass through unchanged.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
        } else {
            out.push(' ');
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whole-word phrase containment on normalized text.
fn contains_phrase(words: &[&str], phrase: &str) -> bool {
    let phrase_words: Vec<&str> = phrase.split_whitespace().collect();
    if phrase_words.is_empty() || phrase_words.len() > words.len() {
        return false;
    }
    words
        .windows(phrase_words.len())
        .any(|w| w == phrase_words.as_slice())
}

fn keyword_in(text: &str) -> Option<&'static str> {
    let normalized = normalize(text);
    let words: Vec<&str> = normalized.split_whitespace().collect();
    TOPIC_KEYWORDS
        .iter()
        .find(|kw| contains_phrase(&words, kw))
        .copied()
}

/// Canonical topic key for a course: vocabulary match on
/// title -> ai_description -> description, else the first two normalized
/// title words.
pub fn topic_key(course: &Course) -> String {
    let fields = [
        Some(course.title.as_str()),
        course.ai_description.as_deref(),
        Some(course.description.as_str()),
    ];
    for field in fields.into_iter().flatten() {
        if let Some(kw) = keyword_in(field) {
            return kw.to_string();
        }
    }
    let normalized = normalize(&course.title);
    normalized
        .split_whitespace()
        .take(2)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keep one representative per topic key: highest enrollment wins, ties go to
/// the oldest course. Output preserves the first-seen order of keys, which
/// keeps materialization deterministic for a given catalog snapshot.
pub fn dedup_by_topic(courses: Vec<Course>) -> Vec<Course> {
    let mut order: Vec<String> = Vec::new();
    let mut best: HashMap<String, Course> = HashMap::new();
    for course in courses {
        let key = topic_key(&course);
        match best.get(&key) {
            None => {
                order.push(key.clone());
                best.insert(key, course);
            }
            Some(current) => {
                let wins = course.enrollment_count > current.enrollment_count
                    || (course.enrollment_count == current.enrollment_count
                        && course.created_at < current.created_at);
                if wins {
                    best.insert(key, course);
                }
            }
        }
    }
    order
        .into_iter()
        .filter_map(|key| best.remove(&key))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CourseLevel;
    use chrono::{TimeZone, Utc};

    fn course(id: &str, title: &str, enrollments: i64, year: i32) -> Course {
        Course {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            ai_description: None,
            level: CourseLevel::Beginner,
            category_id: None,
            created_at: Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap(),
            total_lesson_hours: 10.0,
            enrollment_count: enrollments,
        }
    }

    #[test]
    fn normalization_strips_case_and_punctuation() {
        assert_eq!(normalize("React.js - للمبتدئين!"), "react js للمبتدئين");
    }

    #[test]
    fn title_beats_description_and_phrases_beat_prefixes() {
        let mut c = course("c1", "دورة React Native الشاملة", 0, 2024);
        c.description = "python for everyone".into();
        assert_eq!(topic_key(&c), "react native");
    }

    #[test]
    fn falls_back_to_first_two_title_words() {
        let c = course("c1", "فن الخطابة أمام الجمهور", 0, 2024);
        assert_eq!(topic_key(&c), "فن الخطابة");
    }

    #[test]
    fn higher_enrollment_wins_ties_go_to_oldest() {
        let kept = dedup_by_topic(vec![
            course("old-popular", "React أساسيات", 500, 2023),
            course("new-quiet", "دورة React كاملة", 10, 2024),
        ]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "old-popular");

        let kept = dedup_by_topic(vec![
            course("newer", "Python متقدم", 50, 2024),
            course("older", "Python عملي", 50, 2022),
        ]);
        assert_eq!(kept[0].id, "older");
    }

    #[test]
    fn unrelated_topics_are_not_merged() {
        let kept = dedup_by_topic(vec![
            course("c1", "أساسيات React", 10, 2024),
            course("c2", "أساسيات Python", 10, 2024),
        ]);
        assert_eq!(kept.len(), 2);
    }
}
