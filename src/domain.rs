//! Core domain types: catalog courses, learner preferences, study plans.
//!
//! Wire-facing structs use camelCase field names because the tool-calling
//! contract and the stored plan blobs share them with the rest of the
//! platform.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Course difficulty level; also the identity of the three plan milestones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CourseLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl CourseLevel {
    /// Milestone order: beginner -> intermediate -> advanced.
    pub const ALL: [CourseLevel; 3] = [
        CourseLevel::Beginner,
        CourseLevel::Intermediate,
        CourseLevel::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CourseLevel::Beginner => "beginner",
            CourseLevel::Intermediate => "intermediate",
            CourseLevel::Advanced => "advanced",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Some(CourseLevel::Beginner),
            "intermediate" => Some(CourseLevel::Intermediate),
            "advanced" => Some(CourseLevel::Advanced),
            _ => None,
        }
    }

    /// Arabic display name used in canonical milestone titles.
    pub fn arabic_name(&self) -> &'static str {
        match self {
            CourseLevel::Beginner => "مبتدئ",
            CourseLevel::Intermediate => "متوسط",
            CourseLevel::Advanced => "متقدم",
        }
    }
}

/// A published catalog course with its derived aggregates already joined in.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: String,
    pub ai_description: Option<String>,
    pub level: CourseLevel,
    pub category_id: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Sum of lesson durations, hours with 1 decimal.
    pub total_lesson_hours: f64,
    /// Popularity signal, drives dedup representative selection.
    pub enrollment_count: i64,
}

impl Course {
    /// Short description for tool results: prefers the AI-generated summary.
    pub fn summary_text(&self) -> &str {
        self.ai_description
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&self.description)
    }
}

/// Per-user preference blob. Mutated only by the `set_learning_goals` tool
/// through a non-destructive merge.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LearnerPreferences {
    pub goal: Option<String>,
    pub deadline: Option<String>,
    pub interests: Vec<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Fields the `set_learning_goals` tool may set. Absent fields are preserved.
#[derive(Clone, Debug, Default)]
pub struct PreferencesPatch {
    pub goal: Option<String>,
    pub deadline: Option<String>,
    pub interests: Vec<String>,
}

impl LearnerPreferences {
    /// Merge semantics: specified fields overwrite, interests are unioned,
    /// everything unspecified is preserved. Stamps `last_updated`.
    pub fn apply(&mut self, patch: PreferencesPatch, now: DateTime<Utc>) {
        if let Some(goal) = patch.goal {
            self.goal = Some(goal);
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = Some(deadline);
        }
        for interest in patch.interests {
            let interest = interest.trim().to_string();
            if !interest.is_empty() && !self.interests.contains(&interest) {
                self.interests.push(interest);
            }
        }
        self.last_updated = Some(now);
    }
}

/// One phase of an abstract plan as authored by the model.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanMilestone {
    pub title: String,
    pub description: String,
    /// Course ids the model chose to embed, if any. Used for category
    /// inference and for merging overflow milestones.
    #[serde(default)]
    pub course_ids: Vec<String>,
}

/// The abstract study plan persisted by `create_study_plan`. Immutable after
/// creation; concrete courses are attached only at read time.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlan {
    pub title: String,
    pub description: String,
    /// Free-text duration label, e.g. "3 months" or "3 أشهر".
    pub duration: String,
    pub total_hours: f64,
    /// Explicit category scope hint, when known.
    #[serde(default)]
    pub category_id: Option<String>,
    pub milestones: Vec<PlanMilestone>,
}

/// A persisted plan row, keyed by (user, session).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredPlan {
    pub id: String,
    pub user_id: String,
    pub session_id: String,
    pub plan: StudyPlan,
    pub created_at: DateTime<Utc>,
}

/// A concrete course slot inside a materialized milestone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRef {
    pub id: String,
    pub title: String,
    pub level: CourseLevel,
    pub total_hours: f64,
    pub estimated_weeks: u32,
    pub start_week: u32,
    pub end_week: u32,
}

/// One of exactly three rendered milestones.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneView {
    pub title: String,
    pub description: String,
    pub level: CourseLevel,
    pub courses: Vec<CourseRef>,
}

/// A display-ready plan, recomputed on every read and never persisted.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterializedPlan {
    pub title: String,
    pub description: String,
    pub duration: String,
    pub total_hours: f64,
    pub weekly_hours: f64,
    pub milestones: Vec<MilestoneView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn preferences_merge_preserves_unspecified_fields() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let mut prefs = LearnerPreferences {
            goal: Some("تعلم تطوير الويب".into()),
            deadline: None,
            interests: vec!["البرمجة".into()],
            last_updated: None,
        };
        prefs.apply(
            PreferencesPatch {
                goal: None,
                deadline: Some("6 أشهر".into()),
                interests: vec!["البرمجة".into(), "قواعد البيانات".into()],
            },
            now,
        );
        assert_eq!(prefs.goal.as_deref(), Some("تعلم تطوير الويب"));
        assert_eq!(prefs.deadline.as_deref(), Some("6 أشهر"));
        assert_eq!(prefs.interests, vec!["البرمجة", "قواعد البيانات"]);
        assert_eq!(prefs.last_updated, Some(now));
    }

    #[test]
    fn level_parse_round_trip() {
        for level in CourseLevel::ALL {
            assert_eq!(CourseLevel::parse(level.as_str()), Some(level));
        }
        assert_eq!(CourseLevel::parse("expert"), None);
    }
}
