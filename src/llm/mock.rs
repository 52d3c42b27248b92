//! Scripted completion client (tests and offline demo)
//!
//! Plays back a queue of prepared results in order. An exhausted script keeps
//! returning empty turns, which is exactly what the orchestrator's step bound
//! has to survive.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::EngineError;
use crate::llm::{CompletionClient, ModelTurn, ToolSpec};
use crate::session::ChatMessage;

/// Canned client: each `complete` pops the next scripted result.
#[derive(Default)]
pub struct ScriptedClient {
    steps: Mutex<VecDeque<Result<ModelTurn, EngineError>>>,
}

impl ScriptedClient {
    pub fn new(steps: Vec<Result<ModelTurn, EngineError>>) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
        }
    }

    pub fn push(&self, step: Result<ModelTurn, EngineError>) {
        self.steps.lock().unwrap().push_back(step);
    }

    /// Steps not yet consumed.
    pub fn remaining(&self) -> usize {
        self.steps.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(
        &self,
        _messages: &[ChatMessage],
        _tools: &[ToolSpec],
    ) -> Result<ModelTurn, EngineError> {
        self.steps
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ModelTurn::default()))
    }
}
