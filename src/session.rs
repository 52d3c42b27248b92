//! Conversation history: roles, messages, bounded sessions
//!
//! Message shapes follow the completion API: an assistant message may carry
//! tool-call records, and each tool result is its own message tied back by
//! `tool_call_id`. History is pruned oldest-first, keeping the leading system
//! message and never splitting an assistant-with-tool-calls from its results.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Message role as the completion API sees it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    Tool,
}

/// A tool call the model requested, as recorded on the assistant message.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub id: String,
    pub name: String,
    /// Raw JSON argument string exactly as the model produced it.
    pub arguments: String,
}

/// A single conversation message.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Assistant message announcing tool calls; content may be empty.
    pub fn assistant_with_calls(content: impl Into<String>, calls: Vec<ToolCallRecord>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            tool_calls: calls,
            tool_call_id: None,
        }
    }

    /// Tool result message answering the call with the given id.
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Tool,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.into()),
        }
    }
}

/// One learner's conversation with the discovery agent.
#[derive(Clone, Debug)]
pub struct ConversationSession {
    pub user_id: String,
    pub id: String,
    messages: Vec<ChatMessage>,
    max_messages: usize,
}

impl ConversationSession {
    pub fn new(user_id: impl Into<String>, max_messages: usize) -> Self {
        Self {
            user_id: user_id.into(),
            id: Uuid::new_v4().to_string(),
            messages: Vec::new(),
            max_messages: max_messages.max(4),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Install or replace the leading system message.
    pub fn set_system(&mut self, content: impl Into<String>) {
        match self.messages.first() {
            Some(m) if m.role == ChatRole::System => {
                self.messages[0] = ChatMessage::system(content);
            }
            _ => self.messages.insert(0, ChatMessage::system(content)),
        }
    }

    pub fn push(&mut self, msg: ChatMessage) {
        self.messages.push(msg);
        self.prune();
    }

    /// Drop the oldest non-system messages past the bound. A tool message is
    /// never left as the new head: it would dangle without the assistant
    /// message that requested it.
    fn prune(&mut self) {
        let has_system = matches!(self.messages.first(), Some(m) if m.role == ChatRole::System);
        let start = usize::from(has_system);
        while self.messages.len() > self.max_messages && self.messages.len() > start {
            self.messages.remove(start);
            while matches!(self.messages.get(start), Some(m) if m.role == ChatRole::Tool) {
                self.messages.remove(start);
            }
        }
    }
}
