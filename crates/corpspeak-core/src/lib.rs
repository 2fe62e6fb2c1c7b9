//! Core library for corpspeak: reply formatting, conversation state,
//! configuration and the completion client. Nothing here depends on a UI.

pub mod ai;
pub mod config;
pub mod format;
pub mod state;

// Re-export main types for convenience
pub use ai::{CompletionSettings, OpenAIClient, FALLBACK_REPLY};
pub use config::Config;
pub use format::{format_message, ContentBlock};
pub use state::{ChatMessage, ChatRole, Conversation, ThemeMode};
