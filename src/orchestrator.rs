//! Conversation orchestrator: the bounded model/tool loop
//!
//! One user turn: refresh the system instructions for the current discovery
//! stage, append the user message, then call the model up to
//! `max_model_calls` times. Tool calls are executed strictly in the order the
//! model returned them, each result appended as a tool message before the
//! next model call. A response without tool calls ends the turn. Exhausting
//! the bound is a soft failure: the last assistant text (possibly empty) is
//! returned instead of an error. Completion failures never escape either;
//! they become a degraded Arabic reply.

use std::sync::Arc;

use crate::config::EngineSection;
use crate::discovery::{self, DiscoveryStage};
use crate::error::{CompletionErrorKind, EngineError};
use crate::llm::CompletionClient;
use crate::session::{ChatMessage, ConversationSession, ToolCallRecord};
use crate::store::EngineStore;
use crate::tools::{tool_specs, ToolExecutor};

/// Result of one user turn.
#[derive(Clone, Debug)]
pub struct TurnOutcome {
    /// Final reply, suggestion line included.
    pub reply: String,
    /// Parsed suggestion buttons for the client.
    pub suggestions: Vec<String>,
    /// Discovery stage after the turn's tool effects.
    pub stage: DiscoveryStage,
}

/// Drives one conversation per call; holds no per-session state itself.
pub struct Orchestrator {
    llm: Arc<dyn CompletionClient>,
    executor: ToolExecutor,
    store: Arc<dyn EngineStore>,
    engine: EngineSection,
}

impl Orchestrator {
    pub fn new(
        llm: Arc<dyn CompletionClient>,
        store: Arc<dyn EngineStore>,
        engine: EngineSection,
    ) -> Self {
        Self {
            llm,
            executor: ToolExecutor::new(store.clone(), engine.search_limit),
            store,
            engine,
        }
    }

    fn current_stage(&self, user_id: &str) -> DiscoveryStage {
        let prefs = self.store.preferences(user_id).unwrap_or_default();
        let has_plan = self
            .store
            .plans_for(user_id)
            .map(|plans| !plans.is_empty())
            .unwrap_or(false);
        discovery::stage_for(&prefs, has_plan)
    }

    /// Handle one user message. Infallible at the turn boundary: every
    /// failure mode maps to a user-visible reply.
    pub async fn handle_turn(
        &self,
        session: &mut ConversationSession,
        user_input: &str,
    ) -> TurnOutcome {
        let stage = self.current_stage(&session.user_id);
        session.set_system(discovery::system_instructions(stage));
        session.push(ChatMessage::user(user_input));

        let specs = tool_specs();
        let mut last_text = String::new();

        for step in 0..self.engine.max_model_calls {
            let turn = match self.llm.complete(session.messages(), &specs).await {
                Ok(turn) => turn,
                Err(e) => {
                    let kind = match &e {
                        EngineError::Completion { kind, .. } => *kind,
                        _ => CompletionErrorKind::Unknown,
                    };
                    tracing::warn!(error = %e, step, "completion failed, degrading turn");
                    return self.finish(session, kind.user_message().to_string());
                }
            };

            if turn.tool_calls.is_empty() {
                return self.finish(session, turn.content.unwrap_or_default());
            }

            let records: Vec<ToolCallRecord> = turn
                .tool_calls
                .iter()
                .map(|tc| ToolCallRecord {
                    id: tc.id.clone(),
                    name: tc.name.clone(),
                    arguments: tc.arguments.clone(),
                })
                .collect();
            if let Some(content) = &turn.content {
                last_text = content.clone();
            }
            session.push(ChatMessage::assistant_with_calls(
                turn.content.clone().unwrap_or_default(),
                records,
            ));

            // Strictly sequential: the causal trace the model sees next
            // depends on this ordering.
            for call in &turn.tool_calls {
                let result = self.executor.execute(&session.user_id, &session.id, call);
                session.push(ChatMessage::tool(call.id.clone(), result));
            }
        }

        tracing::warn!(
            max = self.engine.max_model_calls,
            "model call bound exhausted, returning best-effort text"
        );
        self.finish(session, last_text)
    }

    /// Recompute the stage after tool effects, enforce the suggestion-line
    /// contract and record the reply.
    fn finish(&self, session: &mut ConversationSession, reply: String) -> TurnOutcome {
        let stage = self.current_stage(&session.user_id);
        let reply = discovery::ensure_suggestions(reply, stage);
        session.push(ChatMessage::assistant(reply.clone()));
        let suggestions = discovery::parse_suggestions(&reply).unwrap_or_default();
        TurnOutcome {
            reply,
            suggestions,
            stage,
        }
    }
}
