pub mod bucket;
pub mod materializer;
pub mod schedule;
pub mod topic;

pub use materializer::{materialize_plan, PlanMaterializer, LEVEL_TITLES};
