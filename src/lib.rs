//! Masar - Learning Path Engine
//!
//! Module map:
//! - **config**: application configuration (TOML + `MASAR__*` env overrides)
//! - **discovery**: the fixed onboarding state machine and suggestion contract
//! - **domain**: courses, preferences, abstract and materialized plans
//! - **error**: engine errors and completion-failure classification
//! - **llm**: completion client abstraction (OpenAI-compatible / scripted)
//! - **orchestrator**: the bounded model/tool conversation loop
//! - **plan**: topic dedup, level bucketing, time scheduling, materializer
//! - **session**: conversation messages and bounded history
//! - **store**: collaborator traits + the SQLite reference store
//! - **tools**: the four platform tools, their schemas and the executor

pub mod config;
pub mod discovery;
pub mod domain;
pub mod error;
pub mod llm;
pub mod orchestrator;
pub mod plan;
pub mod session;
pub mod store;
pub mod tools;

pub use error::EngineError;
pub use orchestrator::{Orchestrator, TurnOutcome};
pub use plan::PlanMaterializer;
