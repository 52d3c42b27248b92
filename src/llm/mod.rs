pub mod mock;
pub mod openai;
pub mod traits;

pub use mock::ScriptedClient;
pub use openai::{OpenAiCompletionClient, TokenUsage};
pub use traits::{CompletionClient, ModelTurn, RawToolCall, ToolSpec};
