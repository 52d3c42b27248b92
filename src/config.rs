//! Application configuration: `config/default.toml` plus environment overrides
//!
//! Load order: the TOML file first, then `MASAR__*` environment variables on
//! top (double underscore nests, e.g. `MASAR__LLM__MODEL=gpt-4o-mini`).
//! API keys resolve layered: explicit config value > environment variable >
//! absent. An absent key is a hard error at client construction; there is no
//! literal fallback secret anywhere in the crate.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::EngineError;

/// Configuration root (mirrors the top level of config/default.toml).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub store: StoreSection,
}

/// [llm] section: model selection and endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    #[serde(default = "default_model")]
    pub model: String,
    /// Any OpenAI-compatible endpoint; None uses the provider default.
    pub base_url: Option<String>,
    /// Explicit key; when unset the `OPENAI_API_KEY` env var is consulted.
    pub api_key: Option<String>,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: None,
            api_key: None,
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

/// [engine] section: conversation-loop and materializer knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    /// Hard bound on model round-trips per user turn.
    #[serde(default = "default_max_model_calls")]
    pub max_model_calls: usize,
    /// Weekly study hours assumed when a plan duration cannot be parsed.
    #[serde(default = "default_weekly_hours")]
    pub default_weekly_hours: f64,
    /// Cap on courses returned by the search tool.
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
    /// Conversation history bound (messages kept per session).
    #[serde(default = "default_max_history_messages")]
    pub max_history_messages: usize,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            max_model_calls: default_max_model_calls(),
            default_weekly_hours: default_weekly_hours(),
            search_limit: default_search_limit(),
            max_history_messages: default_max_history_messages(),
        }
    }
}

fn default_max_model_calls() -> usize {
    5
}

fn default_weekly_hours() -> f64 {
    10.0
}

fn default_search_limit() -> usize {
    10
}

fn default_max_history_messages() -> usize {
    40
}

/// [store] section: SQLite database location.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct StoreSection {
    /// Database file; unset runs in memory (demo / tests).
    pub path: Option<PathBuf>,
}

impl LlmSection {
    /// Layered API-key lookup: config value > environment > absent (error).
    pub fn resolve_api_key(&self) -> Result<String, EngineError> {
        if let Some(key) = self.api_key.as_deref() {
            if !key.trim().is_empty() {
                return Ok(key.to_string());
            }
        }
        std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                EngineError::Config(
                    "no API key: set [llm].api_key or the OPENAI_API_KEY environment variable"
                        .to_string(),
                )
            })
    }
}

/// Load configuration; `MASAR__*` environment variables override file keys.
///
/// 1. The first existing file among config/default.toml, ../config/default.toml,
///    default.toml becomes the base source.
/// 2. An explicit `config_path` is layered on top when provided and present.
/// 3. Environment variables with the `MASAR` prefix override everything.
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("MASAR")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
