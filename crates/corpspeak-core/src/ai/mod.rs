pub mod openai;

pub use openai::OpenAIClient;

use tracing::error;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that translates layman speak into how a corporate person would say it.";

/// Shown in place of the assistant reply when a completion request fails
pub const FALLBACK_REPLY: &str =
    "This is a simulated response. There was an error connecting to the AI API.";

/// Parameters sent with every completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub model: String,
    pub system_prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            temperature: 0.7,
            max_tokens: 500,
        }
    }
}

/// Collapse a completion result into the text to show; failures are logged.
pub fn reply_or_fallback(result: anyhow::Result<String>) -> String {
    match result {
        Ok(reply) => reply,
        Err(e) => {
            error!("completion request failed: {:#}", e);
            FALLBACK_REPLY.to_string()
        }
    }
}
