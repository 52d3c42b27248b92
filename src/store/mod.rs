//! External collaborator seams
//!
//! The engine reaches the rest of the platform only through these traits:
//! catalog reads (with duration and popularity aggregates joined in),
//! idempotent enrollment writes, merge-on-write preferences, and the abstract
//! plan store. `SqliteStore` is the bundled reference implementation used by
//! the demo binary and the tests.

pub mod sqlite;

pub use sqlite::SqliteStore;

use crate::domain::{Course, LearnerPreferences, PreferencesPatch, StoredPlan, StudyPlan};
use crate::error::EngineError;

/// Read access to published courses, aggregates already derived.
pub trait CatalogProvider: Send + Sync {
    /// All published courses, oldest first. Deterministic order is part of
    /// the contract: materialization must be reproducible from a snapshot.
    fn published_courses(&self) -> Result<Vec<Course>, EngineError>;
}

/// Enrollment existence check and idempotent insert.
pub trait EnrollmentStore: Send + Sync {
    fn is_enrolled(&self, user_id: &str, course_id: &str) -> Result<bool, EngineError>;

    /// Insert-if-absent with progress 0. Returns false when the row already
    /// existed (including a lost duplicate race), never an error.
    fn enroll(&self, user_id: &str, course_id: &str) -> Result<bool, EngineError>;
}

/// Per-user preference blob, merge-on-write.
pub trait PreferencesStore: Send + Sync {
    fn preferences(&self, user_id: &str) -> Result<LearnerPreferences, EngineError>;

    /// Apply a non-destructive merge and return the stored result.
    fn merge_preferences(
        &self,
        user_id: &str,
        patch: PreferencesPatch,
    ) -> Result<LearnerPreferences, EngineError>;
}

/// Abstract study plans keyed by (user, session).
pub trait PlanStore: Send + Sync {
    fn create_plan(
        &self,
        user_id: &str,
        session_id: &str,
        plan: &StudyPlan,
    ) -> Result<String, EngineError>;

    /// A user's plans, most recent first.
    fn plans_for(&self, user_id: &str) -> Result<Vec<StoredPlan>, EngineError>;
}

/// Everything the tool executor and orchestrator need from the platform.
pub trait EngineStore: CatalogProvider + EnrollmentStore + PreferencesStore + PlanStore {}

impl<T: CatalogProvider + EnrollmentStore + PreferencesStore + PlanStore> EngineStore for T {}
