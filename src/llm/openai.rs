//! OpenAI-compatible API client
//!
//! Uses async_openai against any OpenAI-compatible endpoint (configurable
//! base_url). Tool schemas are attached to every request; tool calls come
//! back on the assistant message and are forwarded verbatim as `RawToolCall`s.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionMessageToolCall, ChatCompletionMessageToolCalls,
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestToolMessageArgs,
    ChatCompletionRequestUserMessageArgs, ChatCompletionTool, ChatCompletionTools,
    CreateChatCompletionRequestArgs, FunctionCall, FunctionObjectArgs,
};
use async_openai::Client;
use async_trait::async_trait;

use crate::error::EngineError;
use crate::llm::{CompletionClient, ModelTurn, RawToolCall, ToolSpec};
use crate::session::{ChatMessage, ChatRole};

/// Cumulative token usage counters.
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: Arc<AtomicU64>,
    pub completion_tokens: Arc<AtomicU64>,
    pub total_tokens: Arc<AtomicU64>,
}

impl TokenUsage {
    pub fn add(&self, prompt: u64, completion: u64) {
        self.prompt_tokens.fetch_add(prompt, Ordering::Relaxed);
        self.completion_tokens.fetch_add(completion, Ordering::Relaxed);
        self.total_tokens.fetch_add(prompt + completion, Ordering::Relaxed);
    }

    pub fn get(&self) -> (u64, u64, u64) {
        (
            self.prompt_tokens.load(Ordering::Relaxed),
            self.completion_tokens.load(Ordering::Relaxed),
            self.total_tokens.load(Ordering::Relaxed),
        )
    }
}

/// OpenAI-compatible client: holds the Client and model name, converts the
/// session history to API messages and reads back text plus tool calls.
pub struct OpenAiCompletionClient {
    client: Client<OpenAIConfig>,
    model: String,
    pub usage: TokenUsage,
}

impl OpenAiCompletionClient {
    /// The API key comes from the layered config lookup; there is no
    /// fallback value here.
    pub fn new(base_url: Option<&str>, model: &str, api_key: &str) -> Self {
        let config = if let Some(url) = base_url {
            OpenAIConfig::new().with_api_base(url).with_api_key(api_key)
        } else {
            OpenAIConfig::new().with_api_key(api_key)
        };

        Self {
            client: Client::with_config(config),
            model: model.to_string(),
            usage: TokenUsage::default(),
        }
    }

    fn to_api_messages(&self, messages: &[ChatMessage]) -> Vec<ChatCompletionRequestMessage> {
        messages
            .iter()
            .map(|m| match m.role {
                ChatRole::System => ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessageArgs::default()
                        .content(m.content.clone())
                        .build()
                        .unwrap(),
                ),
                ChatRole::User => ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(m.content.clone())
                        .build()
                        .unwrap(),
                ),
                ChatRole::Assistant => {
                    let mut args = ChatCompletionRequestAssistantMessageArgs::default();
                    if !m.content.is_empty() {
                        args.content(m.content.clone());
                    }
                    if !m.tool_calls.is_empty() {
                        let calls: Vec<ChatCompletionMessageToolCalls> = m
                            .tool_calls
                            .iter()
                            .map(|tc| {
                                ChatCompletionMessageToolCalls::Function(
                                    ChatCompletionMessageToolCall {
                                        id: tc.id.clone(),
                                        function: FunctionCall {
                                            name: tc.name.clone(),
                                            arguments: tc.arguments.clone(),
                                        },
                                    },
                                )
                            })
                            .collect();
                        args.tool_calls(calls);
                    }
                    ChatCompletionRequestMessage::Assistant(args.build().unwrap())
                }
                ChatRole::Tool => ChatCompletionRequestMessage::Tool(
                    ChatCompletionRequestToolMessageArgs::default()
                        .content(m.content.clone())
                        .tool_call_id(m.tool_call_id.clone().unwrap_or_default())
                        .build()
                        .unwrap(),
                ),
            })
            .collect()
    }

    fn to_api_tools(&self, tools: &[ToolSpec]) -> Result<Vec<ChatCompletionTools>, EngineError> {
        tools
            .iter()
            .map(|t| {
                let function = FunctionObjectArgs::default()
                    .name(t.name)
                    .description(t.description)
                    .parameters(t.parameters.clone())
                    .build()
                    .map_err(|e| EngineError::completion(e.to_string()))?;
                Ok(ChatCompletionTools::Function(ChatCompletionTool {
                    function,
                }))
            })
            .collect()
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    fn token_usage(&self) -> (u64, u64, u64) {
        self.usage.get()
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<ModelTurn, EngineError> {
        let mut request = CreateChatCompletionRequestArgs::default();
        request
            .model(&self.model)
            .messages(self.to_api_messages(messages));
        if !tools.is_empty() {
            request.tools(self.to_api_tools(tools)?);
        }
        let request = request
            .build()
            .map_err(|e| EngineError::completion(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| EngineError::completion(e.to_string()))?;

        if let Some(usage) = &response.usage {
            self.usage
                .add(usage.prompt_tokens as u64, usage.completion_tokens as u64);
        }

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::completion("empty choices in completion response"))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .filter_map(|tc| match tc {
                ChatCompletionMessageToolCalls::Function(call) => Some(RawToolCall {
                    id: call.id,
                    name: call.function.name,
                    arguments: call.function.arguments,
                }),
                _ => None,
            })
            .collect();

        Ok(ModelTurn {
            content: choice.message.content,
            tool_calls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ToolCallRecord;
    use crate::tools::schema::tool_specs;

    fn client() -> OpenAiCompletionClient {
        OpenAiCompletionClient::new(None, "gpt-4o-mini", "test-key")
    }

    #[test]
    fn assistant_tool_calls_survive_message_conversion() {
        let history = vec![
            ChatMessage::system("سياق"),
            ChatMessage::user("سجلني"),
            ChatMessage::assistant_with_calls(
                "",
                vec![ToolCallRecord {
                    id: "call_1".into(),
                    name: "enroll_student".into(),
                    arguments: r#"{"courseId":"c1","courseTitle":"HTML"}"#.into(),
                }],
            ),
            ChatMessage::tool("call_1", r#"{"success":true}"#),
        ];
        let api = client().to_api_messages(&history);
        assert_eq!(api.len(), 4);
        match &api[2] {
            ChatCompletionRequestMessage::Assistant(msg) => {
                let calls = msg.tool_calls.as_ref().unwrap();
                assert_eq!(calls.len(), 1);
                match &calls[0] {
                    ChatCompletionMessageToolCalls::Function(call) => {
                        assert_eq!(call.id, "call_1");
                        assert_eq!(call.function.name, "enroll_student");
                    }
                    other => panic!("unexpected tool-call variant: {other:?}"),
                }
            }
            other => panic!("expected assistant message, got {other:?}"),
        }
        assert!(matches!(&api[3], ChatCompletionRequestMessage::Tool(_)));
    }

    #[test]
    fn tool_specs_convert_to_function_tools() {
        let tools = client().to_api_tools(&tool_specs()).unwrap();
        assert_eq!(tools.len(), 4);
        assert!(tools
            .iter()
            .all(|t| matches!(t, ChatCompletionTools::Function(_))));
    }
}
