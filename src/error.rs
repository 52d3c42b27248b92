//! Engine error types
//!
//! Completion failures are classified at the turn boundary into a
//! `CompletionErrorKind` so the caller can show a distinct degraded message
//! instead of a raw provider error. Tool-argument problems never surface
//! here: the executor turns them into structured failure JSON for the model.

use thiserror::Error;

/// Why a completion-service call failed, as far as the user needs to know.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionErrorKind {
    QuotaExhausted,
    RateLimited,
    Unknown,
}

impl CompletionErrorKind {
    /// Classify a provider error string. Matches the common OpenAI-compatible
    /// error codes and status hints.
    pub fn classify(detail: &str) -> Self {
        let lower = detail.to_lowercase();
        if lower.contains("insufficient_quota") || lower.contains("quota") {
            CompletionErrorKind::QuotaExhausted
        } else if lower.contains("rate limit")
            || lower.contains("rate_limit")
            || lower.contains("429")
        {
            CompletionErrorKind::RateLimited
        } else {
            CompletionErrorKind::Unknown
        }
    }

    /// Degraded user-visible reply shown when a turn cannot be completed.
    pub fn user_message(&self) -> &'static str {
        match self {
            CompletionErrorKind::QuotaExhausted => {
                "نفدت حصة المساعد الذكي حاليا، يرجى المحاولة لاحقا."
            }
            CompletionErrorKind::RateLimited => {
                "المساعد مشغول حاليا، يرجى المحاولة بعد قليل."
            }
            CompletionErrorKind::Unknown => {
                "تعذر معالجة طلبك الآن، يرجى المحاولة مرة أخرى."
            }
        }
    }
}

/// Errors crossing the engine's public boundaries.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("completion failed ({kind:?}): {message}")]
    Completion {
        kind: CompletionErrorKind,
        message: String,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl EngineError {
    pub fn completion(detail: impl Into<String>) -> Self {
        let message = detail.into();
        EngineError::Completion {
            kind: CompletionErrorKind::classify(&message),
            message,
        }
    }
}

impl From<rusqlite::Error> for EngineError {
    fn from(e: rusqlite::Error) -> Self {
        EngineError::Store(e.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Serialization(e.to_string())
    }
}
