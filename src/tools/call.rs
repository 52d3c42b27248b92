//! Tool invocation parsing
//!
//! Model-produced tool arguments are duck-typed JSON; nothing side-effecting
//! runs before they pass a strict parse into this tagged union. Parse errors
//! are plain strings so the executor can hand them back to the model as a
//! structured failure instead of aborting the turn.

use crate::tools::schema::{
    CreateStudyPlanArgs, EnrollStudentArgs, SearchCoursesArgs, SetLearningGoalsArgs,
    CREATE_STUDY_PLAN, ENROLL_STUDENT, SEARCH_PLATFORM_COURSES, SET_LEARNING_GOALS,
};

/// A schema-validated tool call, ready to execute.
#[derive(Clone, Debug)]
pub enum ToolInvocation {
    SearchCourses(SearchCoursesArgs),
    EnrollStudent(EnrollStudentArgs),
    SetLearningGoals(SetLearningGoalsArgs),
    CreateStudyPlan(CreateStudyPlanArgs),
}

impl ToolInvocation {
    /// Strict parse-or-reject: unknown tool names and malformed or
    /// extra-field arguments all fail with a message for the model.
    pub fn parse(name: &str, arguments: &str) -> Result<Self, String> {
        // Models occasionally send no arguments for the optional-only tool.
        let raw = if arguments.trim().is_empty() {
            "{}"
        } else {
            arguments
        };
        match name {
            SEARCH_PLATFORM_COURSES => serde_json::from_str(raw)
                .map(ToolInvocation::SearchCourses)
                .map_err(|e| format!("invalid arguments for {name}: {e}")),
            ENROLL_STUDENT => serde_json::from_str(raw)
                .map(ToolInvocation::EnrollStudent)
                .map_err(|e| format!("invalid arguments for {name}: {e}")),
            SET_LEARNING_GOALS => serde_json::from_str(raw)
                .map(ToolInvocation::SetLearningGoals)
                .map_err(|e| format!("invalid arguments for {name}: {e}")),
            CREATE_STUDY_PLAN => serde_json::from_str(raw)
                .map(ToolInvocation::CreateStudyPlan)
                .map_err(|e| format!("invalid arguments for {name}: {e}")),
            other => Err(format!("unknown tool: {other}")),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolInvocation::SearchCourses(_) => SEARCH_PLATFORM_COURSES,
            ToolInvocation::EnrollStudent(_) => ENROLL_STUDENT,
            ToolInvocation::SetLearningGoals(_) => SET_LEARNING_GOALS,
            ToolInvocation::CreateStudyPlan(_) => CREATE_STUDY_PLAN,
        }
    }
}
