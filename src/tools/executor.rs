//! Tool executor
//!
//! Runs a validated invocation against the stores and always produces a JSON
//! result string for the model: `{"success": true, ...}` or
//! `{"success": false, "error"|"message": ...}`. Store failures are logged
//! and reported to the model as structured failures, never raised. Every
//! execution emits a `tool_audit` tracing event.

use std::sync::Arc;
use std::time::Instant;

use serde_json::json;

use crate::domain::{Course, PreferencesPatch, PlanMilestone, StudyPlan};
use crate::llm::RawToolCall;
use crate::plan::topic::normalize;
use crate::store::EngineStore;
use crate::tools::call::ToolInvocation;
use crate::tools::schema::{
    CreateStudyPlanArgs, EnrollStudentArgs, SearchCoursesArgs, SetLearningGoalsArgs,
};

const SUMMARY_CHARS: usize = 160;
const PREVIEW_CHARS: usize = 120;

/// Executes the four platform tools for one (user, session) pair.
pub struct ToolExecutor {
    store: Arc<dyn EngineStore>,
    search_limit: usize,
}

impl ToolExecutor {
    pub fn new(store: Arc<dyn EngineStore>, search_limit: usize) -> Self {
        Self {
            store,
            search_limit,
        }
    }

    /// Parse and run one model-requested call. Infallible by design: every
    /// outcome, including bad arguments, becomes a JSON string the model can
    /// read on its next turn.
    pub fn execute(&self, user_id: &str, session_id: &str, call: &RawToolCall) -> String {
        let start = Instant::now();
        let result = match ToolInvocation::parse(&call.name, &call.arguments) {
            Ok(invocation) => self.dispatch(user_id, session_id, invocation),
            Err(e) => Err(e),
        };

        let (ok, outcome) = match &result {
            Ok(_) => (true, "ok"),
            Err(_) => (false, "error"),
        };
        let audit = json!({
            "event": "tool_audit",
            "tool": call.name,
            "ok": ok,
            "outcome": outcome,
            "duration_ms": start.elapsed().as_millis() as u64,
            "args_preview": args_preview(&call.arguments),
        });
        tracing::info!(audit = %audit.to_string(), "tool");

        match result {
            Ok(value) => value,
            Err(e) => json!({"success": false, "error": e}).to_string(),
        }
    }

    fn dispatch(
        &self,
        user_id: &str,
        session_id: &str,
        invocation: ToolInvocation,
    ) -> Result<String, String> {
        match invocation {
            ToolInvocation::SearchCourses(args) => self.search_courses(args),
            ToolInvocation::EnrollStudent(args) => self.enroll_student(user_id, args),
            ToolInvocation::SetLearningGoals(args) => self.set_learning_goals(user_id, args),
            ToolInvocation::CreateStudyPlan(args) => {
                self.create_study_plan(user_id, session_id, args)
            }
        }
    }

    fn search_courses(&self, args: SearchCoursesArgs) -> Result<String, String> {
        let courses = self.store.published_courses().map_err(internal)?;
        let query = args.query.as_deref().map(normalize).filter(|q| !q.is_empty());
        let summaries: Vec<String> = courses
            .iter()
            .filter(|c| match &args.category {
                Some(cat) => c.category_id.as_deref() == Some(cat.as_str()),
                None => true,
            })
            .filter(|c| match args.level {
                Some(level) => c.level == level,
                None => true,
            })
            .filter(|c| match &query {
                Some(q) => {
                    normalize(&c.title).contains(q)
                        || normalize(c.summary_text()).contains(q)
                        || normalize(&c.description).contains(q)
                }
                None => true,
            })
            .take(self.search_limit)
            .map(summarize)
            .collect();
        Ok(json!({
            "success": true,
            "count": summaries.len(),
            "courses": summaries,
        })
        .to_string())
    }

    fn enroll_student(&self, user_id: &str, args: EnrollStudentArgs) -> Result<String, String> {
        let already = self
            .store
            .is_enrolled(user_id, &args.course_id)
            .map_err(internal)?;
        if already {
            return Ok(json!({
                "success": false,
                "message": format!("الطالب مسجل مسبقا في دورة {}", args.course_title),
            })
            .to_string());
        }
        let inserted = self
            .store
            .enroll(user_id, &args.course_id)
            .map_err(internal)?;
        if inserted {
            Ok(json!({
                "success": true,
                "message": format!("تم تسجيل الطالب في دورة {}", args.course_title),
            })
            .to_string())
        } else {
            // Lost a duplicate race; same benign answer as the pre-check.
            Ok(json!({
                "success": false,
                "message": format!("الطالب مسجل مسبقا في دورة {}", args.course_title),
            })
            .to_string())
        }
    }

    fn set_learning_goals(
        &self,
        user_id: &str,
        args: SetLearningGoalsArgs,
    ) -> Result<String, String> {
        let merged = self
            .store
            .merge_preferences(
                user_id,
                PreferencesPatch {
                    goal: Some(args.goal),
                    deadline: args.deadline,
                    interests: args.interests,
                },
            )
            .map_err(internal)?;
        Ok(json!({
            "success": true,
            "preferences": merged,
        })
        .to_string())
    }

    fn create_study_plan(
        &self,
        user_id: &str,
        session_id: &str,
        args: CreateStudyPlanArgs,
    ) -> Result<String, String> {
        let plan = StudyPlan {
            title: args.title,
            description: args.description,
            duration: args.duration,
            total_hours: args.total_hours,
            category_id: args.category_id,
            milestones: args
                .milestones
                .into_iter()
                .map(|m| PlanMilestone {
                    title: m.title,
                    description: m.description,
                    course_ids: m.course_ids,
                })
                .collect(),
        };
        let plan_id = self
            .store
            .create_plan(user_id, session_id, &plan)
            .map_err(internal)?;
        Ok(json!({
            "success": true,
            "planId": plan_id,
            "title": plan.title,
        })
        .to_string())
    }
}

fn internal(e: crate::error::EngineError) -> String {
    tracing::error!(error = %e, "tool store failure");
    "internal storage error".to_string()
}

/// Truncated copy of the raw argument string for the audit event. Char-based,
/// so multi-byte Arabic text never splits mid-character.
fn args_preview(arguments: &str) -> String {
    let trimmed = arguments.trim();
    if trimmed.chars().count() > PREVIEW_CHARS {
        trimmed.chars().take(PREVIEW_CHARS).collect::<String>() + "..."
    } else {
        trimmed.to_string()
    }
}

fn summarize(course: &Course) -> String {
    let mut text = course.summary_text().trim().to_string();
    if text.chars().count() > SUMMARY_CHARS {
        text = text.chars().take(SUMMARY_CHARS).collect::<String>() + "...";
    }
    format!(
        "{} (id: {}) [{}]: {}",
        course.title,
        course.id,
        course.level.as_str(),
        text
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CourseLevel;
    use crate::store::SqliteStore;
    use chrono::{TimeZone, Utc};

    fn seeded() -> ToolExecutor {
        let store = SqliteStore::open_in_memory().unwrap();
        for (id, title, level, year) in [
            ("c1", "أساسيات رياكت", CourseLevel::Beginner, 2023),
            ("c2", "رياكت المتقدم", CourseLevel::Advanced, 2024),
            ("c3", "مقدمة بايثون", CourseLevel::Beginner, 2024),
        ] {
            store
                .insert_course(
                    id,
                    title,
                    "وصف الدورة",
                    Some("ملخص آلي"),
                    level,
                    Some("cat-web"),
                    Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap(),
                )
                .unwrap();
        }
        ToolExecutor::new(Arc::new(store), 10)
    }

    fn call(name: &str, arguments: &str) -> RawToolCall {
        RawToolCall {
            id: "t1".into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    #[test]
    fn search_filters_by_query_and_level() {
        let executor = seeded();
        let out = executor.execute(
            "u1",
            "s1",
            &call(
                "search_platform_courses",
                r#"{"query":"رياكت","level":"beginner"}"#,
            ),
        );
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["success"], true);
        assert_eq!(parsed["count"], 1);
        assert!(parsed["courses"][0].as_str().unwrap().contains("c1"));
    }

    #[test]
    fn enroll_twice_reports_failure_second_time() {
        let executor = seeded();
        let args = r#"{"courseId":"c1","courseTitle":"أساسيات رياكت"}"#;
        let first: serde_json::Value =
            serde_json::from_str(&executor.execute("u1", "s1", &call("enroll_student", args)))
                .unwrap();
        let second: serde_json::Value =
            serde_json::from_str(&executor.execute("u1", "s1", &call("enroll_student", args)))
                .unwrap();
        assert_eq!(first["success"], true);
        assert_eq!(second["success"], false);
    }

    #[test]
    fn malformed_arguments_become_structured_failure() {
        let executor = seeded();
        let out = executor.execute("u1", "s1", &call("enroll_student", r#"{"courseId":42}"#));
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["success"], false);
        assert!(parsed["error"].as_str().unwrap().contains("enroll_student"));
    }

    #[test]
    fn args_preview_truncates_on_char_boundaries() {
        assert_eq!(args_preview("  {\"q\":\"react\"}  "), "{\"q\":\"react\"}");
        let long = "م".repeat(PREVIEW_CHARS + 30);
        let preview = args_preview(&long);
        assert_eq!(preview.chars().count(), PREVIEW_CHARS + 3);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn unknown_tool_is_reported_not_thrown() {
        let executor = seeded();
        let out = executor.execute("u1", "s1", &call("wipe_everything", "{}"));
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["success"], false);
    }
}
