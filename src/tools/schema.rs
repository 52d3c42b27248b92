//! Tool argument schemas
//!
//! The four tools are a fixed contract with the model. Argument structs carry
//! both the serde shape (camelCase, unknown fields rejected) and a schemars
//! derive, so the JSON Schema attached to completion requests can never drift
//! from what the executor actually accepts. The discovery instructions in
//! `discovery::system_instructions` change in lockstep with this file.

use schemars::{schema_for, JsonSchema};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::CourseLevel;
use crate::llm::ToolSpec;

pub const SEARCH_PLATFORM_COURSES: &str = "search_platform_courses";
pub const ENROLL_STUDENT: &str = "enroll_student";
pub const SET_LEARNING_GOALS: &str = "set_learning_goals";
pub const CREATE_STUDY_PLAN: &str = "create_study_plan";

/// `search_platform_courses`: read-only catalog search.
#[derive(Clone, Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SearchCoursesArgs {
    /// Free-text match against title and descriptions.
    pub query: Option<String>,
    /// Category id to scope the search to.
    pub category: Option<String>,
    pub level: Option<CourseLevel>,
}

/// `enroll_student`: idempotent enrollment of the current user.
#[derive(Clone, Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EnrollStudentArgs {
    pub course_id: String,
    /// Echoed back in the confirmation, not trusted for lookups.
    pub course_title: String,
}

/// `set_learning_goals`: non-destructive merge into the preference blob.
#[derive(Clone, Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SetLearningGoalsArgs {
    pub goal: String,
    pub deadline: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
}

/// One abstract milestone inside `create_study_plan`.
#[derive(Clone, Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MilestoneArgs {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub course_ids: Vec<String>,
}

/// `create_study_plan`: persist the abstract plan for this session.
#[derive(Clone, Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateStudyPlanArgs {
    pub title: String,
    pub description: String,
    /// Duration label, e.g. "3 months" or "3 أشهر".
    pub duration: String,
    pub total_hours: f64,
    #[serde(default)]
    pub category_id: Option<String>,
    pub milestones: Vec<MilestoneArgs>,
}

fn schema_value<T: JsonSchema>() -> Value {
    serde_json::to_value(schema_for!(T)).unwrap_or_else(|_| Value::Null)
}

/// The four tool schemas attached to every completion request.
pub fn tool_specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: SEARCH_PLATFORM_COURSES,
            description:
                "Search the platform's published courses by free text, category and level. \
                 Returns up to 10 compact course summaries.",
            parameters: schema_value::<SearchCoursesArgs>(),
        },
        ToolSpec {
            name: ENROLL_STUDENT,
            description:
                "Enroll the current student in a course by id. Reports success:false when \
                 the student is already enrolled.",
            parameters: schema_value::<EnrollStudentArgs>(),
        },
        ToolSpec {
            name: SET_LEARNING_GOALS,
            description:
                "Record the student's goal, optional deadline and interests. Merges into \
                 existing preferences without erasing unspecified fields.",
            parameters: schema_value::<SetLearningGoalsArgs>(),
        },
        ToolSpec {
            name: CREATE_STUDY_PLAN,
            description:
                "Persist the abstract study plan (title, description, duration, totalHours, \
                 milestones). Concrete courses are attached later by the platform.",
            parameters: schema_value::<CreateStudyPlanArgs>(),
        },
    ]
}
