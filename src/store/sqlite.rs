//! SQLite reference store
//!
//! One rusqlite connection behind a mutex; plan reads are plain synchronous
//! aggregation queries. Lesson durations are stored in seconds and summed
//! through sections; enrollment counts come from a grouped join. Preference
//! and plan payloads are JSON blobs, matching the platform's storage shape.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::domain::{
    Course, CourseLevel, LearnerPreferences, PreferencesPatch, StoredPlan, StudyPlan,
};
use crate::error::EngineError;
use crate::store::{CatalogProvider, EnrollmentStore, PlanStore, PreferencesStore};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS courses (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    ai_description TEXT,
    level TEXT NOT NULL,
    category_id TEXT,
    published INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS sections (
    id TEXT PRIMARY KEY,
    course_id TEXT NOT NULL REFERENCES courses(id)
);
CREATE TABLE IF NOT EXISTS lessons (
    id TEXT PRIMARY KEY,
    section_id TEXT NOT NULL REFERENCES sections(id),
    duration_seconds INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS enrollments (
    user_id TEXT NOT NULL,
    course_id TEXT NOT NULL,
    progress INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    PRIMARY KEY (user_id, course_id)
);
CREATE TABLE IF NOT EXISTS preferences (
    user_id TEXT PRIMARY KEY,
    data TEXT NOT NULL,
    last_updated TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS study_plans (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    session_id TEXT NOT NULL,
    data TEXT NOT NULL,
    created_at TEXT NOT NULL
);
";

/// SQLite-backed implementation of all four store traits.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, EngineError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, EngineError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        // A poisoned lock only happens after a panic mid-query; propagating
        // the panic is the right behavior for this process-local store.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Catalog seeding, used by the demo binary and tests.
    pub fn insert_course(
        &self,
        id: &str,
        title: &str,
        description: &str,
        ai_description: Option<&str>,
        level: CourseLevel,
        category_id: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        self.lock().execute(
            "INSERT INTO courses (id, title, description, ai_description, level, category_id, published, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7)",
            params![id, title, description, ai_description, level.as_str(), category_id, created_at],
        )?;
        Ok(())
    }

    /// Attach one lesson to a course through a synthetic section.
    pub fn insert_lesson(
        &self,
        course_id: &str,
        lesson_id: &str,
        duration_seconds: i64,
    ) -> Result<(), EngineError> {
        let conn = self.lock();
        let section_id = format!("sec-{course_id}");
        conn.execute(
            "INSERT OR IGNORE INTO sections (id, course_id) VALUES (?1, ?2)",
            params![section_id, course_id],
        )?;
        conn.execute(
            "INSERT INTO lessons (id, section_id, duration_seconds) VALUES (?1, ?2, ?3)",
            params![lesson_id, section_id, duration_seconds],
        )?;
        Ok(())
    }

    pub fn course_count(&self) -> Result<i64, EngineError> {
        let n = self
            .lock()
            .query_row("SELECT COUNT(*) FROM courses", [], |r| r.get(0))?;
        Ok(n)
    }
}

impl CatalogProvider for SqliteStore {
    fn published_courses(&self) -> Result<Vec<Course>, EngineError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT c.id, c.title, c.description, c.ai_description, c.level, c.category_id, c.created_at,
                    COALESCE(d.seconds, 0), COALESCE(e.cnt, 0)
             FROM courses c
             LEFT JOIN (
                 SELECT s.course_id AS course_id, SUM(l.duration_seconds) AS seconds
                 FROM sections s JOIN lessons l ON l.section_id = s.id
                 GROUP BY s.course_id
             ) d ON d.course_id = c.id
             LEFT JOIN (
                 SELECT course_id, COUNT(*) AS cnt FROM enrollments GROUP BY course_id
             ) e ON e.course_id = c.id
             WHERE c.published = 1
             ORDER BY c.created_at, c.id",
        )?;
        let rows = stmt.query_map([], |row| {
            let level_raw: String = row.get(4)?;
            let seconds: i64 = row.get(7)?;
            Ok(Course {
                id: row.get(0)?,
                title: row.get(1)?,
                description: row.get(2)?,
                ai_description: row.get(3)?,
                level: CourseLevel::parse(&level_raw).unwrap_or(CourseLevel::Beginner),
                category_id: row.get(5)?,
                created_at: row.get(6)?,
                total_lesson_hours: (seconds as f64 / 3600.0 * 10.0).round() / 10.0,
                enrollment_count: row.get(8)?,
            })
        })?;
        let mut courses = Vec::new();
        for row in rows {
            courses.push(row?);
        }
        Ok(courses)
    }
}

impl EnrollmentStore for SqliteStore {
    fn is_enrolled(&self, user_id: &str, course_id: &str) -> Result<bool, EngineError> {
        let found: Option<i64> = self
            .lock()
            .query_row(
                "SELECT 1 FROM enrollments WHERE user_id = ?1 AND course_id = ?2",
                params![user_id, course_id],
                |r| r.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn enroll(&self, user_id: &str, course_id: &str) -> Result<bool, EngineError> {
        let changed = self.lock().execute(
            "INSERT OR IGNORE INTO enrollments (user_id, course_id, progress, created_at)
             VALUES (?1, ?2, 0, ?3)",
            params![user_id, course_id, Utc::now()],
        )?;
        Ok(changed == 1)
    }
}

impl PreferencesStore for SqliteStore {
    fn preferences(&self, user_id: &str) -> Result<LearnerPreferences, EngineError> {
        let data: Option<String> = self
            .lock()
            .query_row(
                "SELECT data FROM preferences WHERE user_id = ?1",
                params![user_id],
                |r| r.get(0),
            )
            .optional()?;
        match data {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(LearnerPreferences::default()),
        }
    }

    fn merge_preferences(
        &self,
        user_id: &str,
        patch: PreferencesPatch,
    ) -> Result<LearnerPreferences, EngineError> {
        let mut prefs = self.preferences(user_id)?;
        let now = Utc::now();
        prefs.apply(patch, now);
        let json = serde_json::to_string(&prefs)?;
        self.lock().execute(
            "INSERT INTO preferences (user_id, data, last_updated) VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id) DO UPDATE SET data = ?2, last_updated = ?3",
            params![user_id, json, now],
        )?;
        Ok(prefs)
    }
}

impl PlanStore for SqliteStore {
    fn create_plan(
        &self,
        user_id: &str,
        session_id: &str,
        plan: &StudyPlan,
    ) -> Result<String, EngineError> {
        let id = Uuid::new_v4().to_string();
        let json = serde_json::to_string(plan)?;
        self.lock().execute(
            "INSERT INTO study_plans (id, user_id, session_id, data, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, user_id, session_id, json, Utc::now()],
        )?;
        Ok(id)
    }

    fn plans_for(&self, user_id: &str) -> Result<Vec<StoredPlan>, EngineError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, session_id, data, created_at
             FROM study_plans WHERE user_id = ?1
             ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            let data: String = row.get(3)?;
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                data,
                row.get::<_, DateTime<Utc>>(4)?,
            ))
        })?;
        let mut plans = Vec::new();
        for row in rows {
            let (id, user_id, session_id, data, created_at) = row?;
            plans.push(StoredPlan {
                id,
                user_id,
                session_id,
                plan: serde_json::from_str(&data)?,
                created_at,
            });
        }
        Ok(plans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn store_with_course(hours_in_seconds: i64) -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_course(
                "c1",
                "أساسيات جافا سكريبت",
                "مقدمة في البرمجة",
                None,
                CourseLevel::Beginner,
                Some("cat-web"),
                Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            )
            .unwrap();
        store.insert_lesson("c1", "l1", hours_in_seconds).unwrap();
        store
    }

    #[test]
    fn catalog_derives_hours_and_enrollment_count() {
        let store = store_with_course(9000); // 2.5h
        store.enroll("u1", "c1").unwrap();
        store.enroll("u2", "c1").unwrap();
        let courses = store.published_courses().unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].total_lesson_hours, 2.5);
        assert_eq!(courses[0].enrollment_count, 2);
    }

    #[test]
    fn enroll_is_insert_if_absent() {
        let store = store_with_course(3600);
        assert!(store.enroll("u1", "c1").unwrap());
        assert!(!store.enroll("u1", "c1").unwrap());
        assert!(store.is_enrolled("u1", "c1").unwrap());
        let courses = store.published_courses().unwrap();
        assert_eq!(courses[0].enrollment_count, 1);
    }

    #[test]
    fn preferences_merge_on_write() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .merge_preferences(
                "u1",
                PreferencesPatch {
                    goal: Some("تطوير الويب".into()),
                    deadline: None,
                    interests: vec!["البرمجة".into()],
                },
            )
            .unwrap();
        let merged = store
            .merge_preferences(
                "u1",
                PreferencesPatch {
                    goal: None,
                    deadline: Some("3 أشهر".into()),
                    interests: vec![],
                },
            )
            .unwrap();
        assert_eq!(merged.goal.as_deref(), Some("تطوير الويب"));
        assert_eq!(merged.deadline.as_deref(), Some("3 أشهر"));
        assert_eq!(merged.interests, vec!["البرمجة"]);
        assert!(merged.last_updated.is_some());
    }

    #[test]
    fn file_backed_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("masar.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .insert_course(
                    "c1",
                    "أساسيات HTML",
                    "",
                    None,
                    CourseLevel::Beginner,
                    None,
                    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                )
                .unwrap();
        }
        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.course_count().unwrap(), 1);
    }

    #[test]
    fn plans_come_back_most_recent_first() {
        let store = SqliteStore::open_in_memory().unwrap();
        let plan = StudyPlan {
            title: "خطة تطوير الويب".into(),
            description: "من الصفر".into(),
            duration: "3 months".into(),
            total_hours: 120.0,
            category_id: None,
            milestones: vec![],
        };
        let first = store.create_plan("u1", "s1", &plan).unwrap();
        let second = store.create_plan("u1", "s2", &plan).unwrap();
        let plans = store.plans_for("u1").unwrap();
        assert_eq!(plans.len(), 2);
        // Same-timestamp rows fall back to id ordering; both ids must be there
        // with the later session among them.
        assert!(plans.iter().any(|p| p.id == first));
        assert!(plans.iter().any(|p| p.id == second));
        assert!(store.plans_for("u2").unwrap().is_empty());
    }
}
