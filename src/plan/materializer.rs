//! Plan materializer
//!
//! Converts a persisted abstract plan into a display-ready plan on every
//! fetch. Nothing here is persisted: the same catalog snapshot and plan
//! always produce the same output.
//!
//! Pipeline: resolve the category scope, partition by level, deduplicate each
//! bucket by topic, backfill empty buckets, derive the weekly-hour budget
//! from the duration label, schedule all three buckets on one week cursor,
//! and force exactly three milestones with canonical level titles.

use std::sync::Arc;

use regex::Regex;

use crate::domain::{
    Course, CourseLevel, MaterializedPlan, MilestoneView, StoredPlan, StudyPlan,
};
use crate::error::EngineError;
use crate::plan::bucket::{backfill, partition, LevelBuckets};
use crate::plan::schedule::schedule;
use crate::plan::topic::{dedup_by_topic, topic_key};
use crate::store::CatalogProvider;

/// Canonical milestone titles, replacing whatever the model authored.
pub const LEVEL_TITLES: [&str; 3] = [
    "المستوى الأول - مبتدئ",
    "المستوى الثاني - متوسط",
    "المستوى الثالث - متقدم",
];

/// Months in a duration label like "3 months", "3 أشهر" or "شهرين".
/// None when the label cannot be read as months.
pub fn parse_months(duration: &str) -> Option<u32> {
    let ascii: String = duration
        .chars()
        .map(|c| match c {
            '٠'..='٩' => char::from(b'0' + (c as u32 - '٠' as u32) as u8),
            other => other,
        })
        .collect();
    // The pattern is a constant, so compilation cannot fail at runtime.
    let re = Regex::new(r"(?i)(\d+)\s*(months?|أشهر|اشهر|شهور|شهر)").ok()?;
    if let Some(caps) = re.captures(&ascii) {
        return caps[1].parse().ok().filter(|&m| m > 0);
    }
    let trimmed = ascii.trim();
    if trimmed.contains("شهرين") {
        return Some(2);
    }
    if trimmed == "شهر" || trimmed == "شهر واحد" {
        return Some(1);
    }
    None
}

/// `total_hours / (months * 4)`; falls back to the default budget when the
/// label does not parse or the division degenerates.
pub fn derive_weekly_hours(total_hours: f64, duration: &str, default_weekly_hours: f64) -> f64 {
    match parse_months(duration) {
        Some(months) => {
            let weekly = total_hours / (months as f64 * 4.0);
            if weekly.is_finite() && weekly > 0.0 {
                weekly
            } else {
                default_weekly_hours
            }
        }
        None => default_weekly_hours,
    }
}

/// Category scope: explicit hint, else the category of the first course id
/// embedded in any milestone, else the whole catalog.
fn resolve_category(plan: &StudyPlan, catalog: &[Course]) -> Option<String> {
    if plan.category_id.is_some() {
        return plan.category_id.clone();
    }
    plan.milestones
        .iter()
        .flat_map(|m| m.course_ids.iter())
        .find_map(|id| catalog.iter().find(|c| &c.id == id))
        .and_then(|c| c.category_id.clone())
}

/// Pure materialization over a catalog snapshot.
pub fn materialize_plan(
    plan: &StudyPlan,
    catalog: &[Course],
    default_weekly_hours: f64,
) -> MaterializedPlan {
    let category = resolve_category(plan, catalog);
    let scope: Vec<Course> = match &category {
        Some(cat) => catalog
            .iter()
            .filter(|c| c.category_id.as_deref() == Some(cat.as_str()))
            .cloned()
            .collect(),
        None => catalog.to_vec(),
    };

    let raw = partition(scope.clone());
    let mut buckets = LevelBuckets {
        beginner: dedup_by_topic(raw.beginner),
        intermediate: dedup_by_topic(raw.intermediate),
        advanced: dedup_by_topic(raw.advanced),
    };
    buckets = backfill(buckets, &scope);

    // Overflow milestones merge into the third: courses a fourth-or-later
    // abstract milestone embedded join the advanced bucket before scheduling.
    // The bucket stays topic-unique: a merged course whose topic is already
    // represented is skipped, keeping the representative dedup chose.
    for milestone in plan.milestones.iter().skip(3) {
        for id in &milestone.course_ids {
            if buckets.advanced.iter().any(|c| &c.id == id) {
                continue;
            }
            if let Some(course) = scope.iter().find(|c| &c.id == id) {
                let key = topic_key(course);
                if !buckets.advanced.iter().any(|c| topic_key(c) == key) {
                    buckets.advanced.push(course.clone());
                }
            }
        }
    }

    let weekly_hours = derive_weekly_hours(plan.total_hours, &plan.duration, default_weekly_hours);

    let ordered: Vec<Course> = buckets
        .beginner
        .iter()
        .chain(buckets.intermediate.iter())
        .chain(buckets.advanced.iter())
        .cloned()
        .collect();
    let mut refs = schedule(&ordered, weekly_hours);

    let counts = [
        buckets.beginner.len(),
        buckets.intermediate.len(),
        buckets.advanced.len(),
    ];
    let milestones = CourseLevel::ALL
        .iter()
        .enumerate()
        .map(|(i, level)| {
            let courses: Vec<_> = refs.drain(..counts[i]).collect();
            MilestoneView {
                title: LEVEL_TITLES[i].to_string(),
                description: plan
                    .milestones
                    .get(i)
                    .map(|m| m.description.clone())
                    .unwrap_or_default(),
                level: *level,
                courses,
            }
        })
        .collect();

    MaterializedPlan {
        title: plan.title.clone(),
        description: plan.description.clone(),
        duration: plan.duration.clone(),
        total_hours: plan.total_hours,
        weekly_hours,
        milestones,
    }
}

/// Read-side service: fetches the catalog and materializes stored plans.
/// Stateless; safe to share and call concurrently across sessions.
pub struct PlanMaterializer {
    catalog: Arc<dyn CatalogProvider>,
    default_weekly_hours: f64,
}

impl PlanMaterializer {
    pub fn new(catalog: Arc<dyn CatalogProvider>, default_weekly_hours: f64) -> Self {
        Self {
            catalog,
            default_weekly_hours,
        }
    }

    pub fn materialize(&self, stored: &StoredPlan) -> Result<MaterializedPlan, EngineError> {
        let catalog = self.catalog.published_courses()?;
        Ok(materialize_plan(
            &stored.plan,
            &catalog,
            self.default_weekly_hours,
        ))
    }
}
