use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::TranslateConfig;
use crate::error::{Result, SubtransError};
use super::{ChatBackend, ChatMessage};

/// Chat request for the Ollama API
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    /// Model name to use for generation
    pub model: &'a str,
    /// Messages of the conversation
    pub messages: &'a [ChatMessage],
    /// Whether to stream the response
    pub stream: bool,
}

/// Chat response from the Ollama API
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    /// The assistant message produced for this conversation
    pub message: ChatMessage,
    /// Whether the generation is complete
    pub done: bool,
}

/// Ollama-backed chat completion client.
pub struct OllamaBackend {
    client: Client,
    endpoint: String,
    model: String,
}

impl OllamaBackend {
    pub fn new(config: &TranslateConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(SubtransError::Http)?;

        Ok(OllamaBackend {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl ChatBackend for OllamaBackend {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let url = format!("{}/api/chat", self.endpoint);

        debug!("Sending chat request ({} turns) to: {}", messages.len(), url);

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest {
                model: &self.model,
                messages,
                stream: false,
            })
            .send()
            .await
            .map_err(|e| SubtransError::Translation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SubtransError::Translation(format!(
                "Chat backend error {}: {}",
                status, error_text
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| SubtransError::Translation(format!("Failed to parse response: {}", e)))?;

        let content = chat_response.message.content.trim().to_string();
        if content.is_empty() {
            return Err(SubtransError::Translation(
                "Empty translation received".to_string(),
            ));
        }

        Ok(content)
    }
}
