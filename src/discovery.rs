//! Discovery state machine
//!
//! The onboarding interview is a fixed script:
//! SectorSelection -> SpecialtySelection -> TimeCommitment -> PlanReady.
//! The flow lives here as an explicit transition table with per-state
//! suggestion sets so it is unit-testable without the model; the system
//! instructions handed to the model are generated from the same table.
//!
//! Every reply during discovery must end with a machine-parseable suggestion
//! line (the client renders buttons, not a text box, at this stage):
//!
//! ```text
//! اقتراحات: ["البرمجة وتطوير الويب", "التصميم"]
//! ```

use crate::domain::LearnerPreferences;

/// Marker prefix of the trailing suggestion line.
pub const SUGGESTION_MARKER: &str = "اقتراحات:";

/// Stages of the discovery interview, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiscoveryStage {
    SectorSelection,
    SpecialtySelection,
    TimeCommitment,
    PlanReady,
}

impl DiscoveryStage {
    /// Transition table. `PlanReady` is terminal.
    pub fn next(self) -> Self {
        match self {
            DiscoveryStage::SectorSelection => DiscoveryStage::SpecialtySelection,
            DiscoveryStage::SpecialtySelection => DiscoveryStage::TimeCommitment,
            DiscoveryStage::TimeCommitment => DiscoveryStage::PlanReady,
            DiscoveryStage::PlanReady => DiscoveryStage::PlanReady,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == DiscoveryStage::PlanReady
    }

    /// Default button set for this stage. Non-empty for every stage.
    pub fn suggestions(self) -> &'static [&'static str] {
        match self {
            DiscoveryStage::SectorSelection => &[
                "البرمجة وتطوير الويب",
                "علوم البيانات والذكاء الاصطناعي",
                "التصميم",
                "التسويق الرقمي",
                "إدارة الأعمال",
            ],
            DiscoveryStage::SpecialtySelection => &[
                "تطوير الواجهات الأمامية",
                "تطوير الواجهات الخلفية",
                "تطبيقات الجوال",
                "تحليل البيانات",
            ],
            DiscoveryStage::TimeCommitment => &[
                "5 ساعات أسبوعيا",
                "10 ساعات أسبوعيا",
                "15 ساعة أسبوعيا",
                "20 ساعة أسبوعيا",
            ],
            DiscoveryStage::PlanReady => &["عرض خطتي", "تصفح الدورات"],
        }
    }

    /// What the model is expected to collect or do at this stage.
    fn script_line(self) -> &'static str {
        match self {
            DiscoveryStage::SectorSelection => {
                "SectorSelection: ask which broad sector the student wants to work in."
            }
            DiscoveryStage::SpecialtySelection => {
                "SpecialtySelection: ask for the specialty inside the chosen sector, then record it with set_learning_goals (sector and specialty go into interests/goal)."
            }
            DiscoveryStage::TimeCommitment => {
                "TimeCommitment: ask how many hours per week the student can study and any deadline, then record them with set_learning_goals."
            }
            DiscoveryStage::PlanReady => {
                "PlanReady: specialty and time budget are known; you MUST call create_study_plan now (three milestones, one per level), then summarise the plan."
            }
        }
    }
}

/// Derive the current stage from what has been collected so far. The table is
/// total over profile states, so the interview resumes correctly after any
/// interruption.
pub fn stage_for(prefs: &LearnerPreferences, has_plan: bool) -> DiscoveryStage {
    if has_plan {
        DiscoveryStage::PlanReady
    } else if prefs.interests.is_empty() {
        DiscoveryStage::SectorSelection
    } else if prefs.goal.is_none() {
        DiscoveryStage::SpecialtySelection
    } else if prefs.deadline.is_none() {
        DiscoveryStage::TimeCommitment
    } else {
        DiscoveryStage::PlanReady
    }
}

/// Render the trailing suggestion line.
pub fn render_suggestions(items: &[&str]) -> String {
    let json = serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string());
    format!("{SUGGESTION_MARKER} {json}")
}

/// Parse the suggestion line out of a reply, if present.
pub fn parse_suggestions(reply: &str) -> Option<Vec<String>> {
    let line = reply
        .lines()
        .rev()
        .find(|l| l.trim_start().starts_with(SUGGESTION_MARKER))?;
    let json = line.trim_start().trim_start_matches(SUGGESTION_MARKER).trim();
    serde_json::from_str(json).ok()
}

/// Guarantee the suggestion-line contract: a reply without one gets the
/// stage's default set appended.
pub fn ensure_suggestions(reply: String, stage: DiscoveryStage) -> String {
    if parse_suggestions(&reply).is_some() {
        return reply;
    }
    if reply.is_empty() {
        render_suggestions(stage.suggestions())
    } else {
        format!("{}\n{}", reply.trim_end(), render_suggestions(stage.suggestions()))
    }
}

/// System instructions for the model: the discovery script, the suggestion
/// contract, and tool usage rules. Changes here go in lockstep with the tool
/// schemas in `tools::schema`.
pub fn system_instructions(stage: DiscoveryStage) -> String {
    let mut out = String::new();
    out.push_str(
        "You are the learning-path advisor of an Arabic e-learning platform. \
         Always answer in Arabic.\n\n\
         You run a fixed discovery interview with four stages:\n",
    );
    for s in [
        DiscoveryStage::SectorSelection,
        DiscoveryStage::SpecialtySelection,
        DiscoveryStage::TimeCommitment,
        DiscoveryStage::PlanReady,
    ] {
        out.push_str("- ");
        out.push_str(s.script_line());
        out.push('\n');
    }
    out.push_str(&format!(
        "\nCurrent stage: {:?}.\n\n\
         Rules:\n\
         - End EVERY reply with one line of the exact form `{} [\"option\", ...]` \
           listing 3-5 short Arabic options. The client renders only these \
           buttons; never use free-form bullet lists for choices.\n\
         - Use search_platform_courses before recommending specific courses and \
           only recommend courses it returns.\n\
         - Use enroll_student only when the student explicitly asks to enroll.\n\
         - Record collected answers with set_learning_goals; never overwrite \
           information the student did not change.\n",
        stage, SUGGESTION_MARKER
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table_is_total_and_terminal() {
        let mut stage = DiscoveryStage::SectorSelection;
        for expected in [
            DiscoveryStage::SpecialtySelection,
            DiscoveryStage::TimeCommitment,
            DiscoveryStage::PlanReady,
            DiscoveryStage::PlanReady,
        ] {
            stage = stage.next();
            assert_eq!(stage, expected);
        }
        assert!(DiscoveryStage::PlanReady.is_terminal());
    }

    #[test]
    fn every_stage_has_suggestions() {
        for stage in [
            DiscoveryStage::SectorSelection,
            DiscoveryStage::SpecialtySelection,
            DiscoveryStage::TimeCommitment,
            DiscoveryStage::PlanReady,
        ] {
            assert!(!stage.suggestions().is_empty());
        }
    }

    #[test]
    fn suggestion_line_round_trips() {
        let line = render_suggestions(&["التقنية", "التصميم"]);
        let reply = format!("ما المجال الذي يهمك؟\n{line}");
        assert_eq!(
            parse_suggestions(&reply),
            Some(vec!["التقنية".to_string(), "التصميم".to_string()])
        );
    }

    #[test]
    fn ensure_suggestions_appends_defaults_once() {
        let reply = ensure_suggestions("اختر مجالا".to_string(), DiscoveryStage::SectorSelection);
        assert!(parse_suggestions(&reply).is_some());
        // Idempotent: already-tagged replies are left untouched.
        assert_eq!(ensure_suggestions(reply.clone(), DiscoveryStage::SectorSelection), reply);
    }

    #[test]
    fn stage_follows_collected_profile() {
        let mut prefs = LearnerPreferences::default();
        assert_eq!(stage_for(&prefs, false), DiscoveryStage::SectorSelection);
        prefs.interests.push("البرمجة".into());
        assert_eq!(stage_for(&prefs, false), DiscoveryStage::SpecialtySelection);
        prefs.goal = Some("تطوير الواجهات".into());
        assert_eq!(stage_for(&prefs, false), DiscoveryStage::TimeCommitment);
        prefs.deadline = Some("6 أشهر".into());
        assert_eq!(stage_for(&prefs, false), DiscoveryStage::PlanReady);
        assert_eq!(
            stage_for(&LearnerPreferences::default(), true),
            DiscoveryStage::PlanReady
        );
    }
}
