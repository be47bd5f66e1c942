// Conversational translation engine
//
// This module turns parsed cues into translated cues through a chat backend:
// - History: bounded conversation buffer shared across the cues of a session
// - Ollama: HTTP chat completion backend
// - Session: per-cue prompt building, retry policy and failure marking

pub mod history;
pub mod ollama;
pub mod session;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use history::ConversationHistory;
pub use ollama::OllamaBackend;
pub use session::TranslationSession;

use crate::error::Result;

/// One turn of the conversation sent to the chat backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (user or assistant)
    pub role: String,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    pub fn user<S: Into<String>>(content: S) -> Self {
        ChatMessage {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant<S: Into<String>>(content: S) -> Self {
        ChatMessage {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Chat completion backend: an ordered list of role-tagged turns in, one
/// assistant message out. Any failure is retryable; the session does not
/// distinguish transport errors from backend-side rejections.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String>;
}
