//! Completion client abstraction
//!
//! One model round-trip: (messages, tool specs) in, a `ModelTurn` out. The
//! turn carries either final text, tool calls, or both; the orchestrator
//! decides what to do with it. Backends: OpenAI-compatible (async-openai)
//! and a scripted client for tests.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::EngineError;
use crate::session::ChatMessage;

/// Declared schema of one callable tool, attached to every completion request.
#[derive(Clone, Debug)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON Schema for the arguments object.
    pub parameters: Value,
}

/// A tool call as the model returned it, arguments still unparsed.
#[derive(Clone, Debug)]
pub struct RawToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

/// One model response: final text and/or ordered tool calls.
#[derive(Clone, Debug, Default)]
pub struct ModelTurn {
    pub content: Option<String>,
    pub tool_calls: Vec<RawToolCall>,
}

impl ModelTurn {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn calls(tool_calls: Vec<RawToolCall>) -> Self {
        Self {
            content: None,
            tool_calls,
        }
    }
}

/// Completion client: one chat completion with tool schemas attached.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<ModelTurn, EngineError>;

    /// Cumulative (prompt, completion, total) token counts; backends without
    /// usage reporting return zeros.
    fn token_usage(&self) -> (u64, u64, u64) {
        (0, 0, 0)
    }
}
