use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::config::TranslateConfig;
use crate::subtitle::{Cue, TRANSLATION_ERROR_MARKER};
use super::{ChatBackend, ChatMessage, ConversationHistory};

/// Per-cue translation driver.
///
/// Owns the retry policy and the prompt shape; the conversation history is
/// passed in by the caller so its lifetime (per file or per run) stays a
/// caller decision.
pub struct TranslationSession {
    backend: Arc<dyn ChatBackend>,
    source_name: String,
    target_name: String,
    max_attempts: u32,
    backoff: Duration,
}

impl TranslationSession {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        config: &TranslateConfig,
        source_name: String,
        target_name: String,
    ) -> Self {
        TranslationSession {
            backend,
            source_name,
            target_name,
            max_attempts: config.max_attempts.max(1),
            backoff: Duration::from_secs(config.backoff_secs),
        }
    }

    /// Translate one cue against the accumulated history.
    ///
    /// Never fails: on success the returned cue carries the backend's answer
    /// and the history gains the request/response pair; once every attempt
    /// is exhausted the returned cue carries the error marker instead, so a
    /// dead backend degrades the output file rather than aborting the batch.
    pub async fn translate(&self, cue: &Cue, history: &mut ConversationHistory) -> Cue {
        history.push(ChatMessage::user(self.build_request(cue)));

        let mut attempt = 1;
        loop {
            match self.backend.chat(history.messages()).await {
                Ok(content) => {
                    history.push(ChatMessage::assistant(content.clone()));
                    debug!("Cue {}: translated on attempt {}", cue.seq, attempt);
                    return cue.with_translation(content);
                }
                Err(e) => {
                    warn!(
                        "Cue {}: attempt {}/{} failed: {}",
                        cue.seq, attempt, self.max_attempts, e
                    );
                    debug!("Cue {} request text: [{}]", cue.seq, cue.text);

                    if attempt >= self.max_attempts {
                        error!(
                            "Cue {}: giving up after {} attempts, marking as failed",
                            cue.seq, attempt
                        );
                        return cue.with_translation(TRANSLATION_ERROR_MARKER.to_string());
                    }

                    attempt += 1;
                    if !self.backoff.is_zero() {
                        tokio::time::sleep(self.backoff).await;
                    }
                }
            }
        }
    }

    /// Request text for one cue. The start timestamp is included as scene
    /// context only; the backend is told to answer with nothing but the
    /// translation itself.
    fn build_request(&self, cue: &Cue) -> String {
        format!(
            "Considering all translated subtitles in the full chat history, \
             translate the following subtitle sentence (at timing:{}) from {} to {}: \
             - Adapt the translated text to ensure fluency in {}. \
             - Use the context of previous translations and character names to guess implicit genders \
             (distant subtitle timing may lead to different scenes and characters). \
             - Ensure the tone and register match the original context. \
             - Adapt the translation to sound natural when spoken, avoiding overly literal or bookish phrasing. \
             Write only the translation (e.g., don't say 'here is the translation', 'the translated version is' or similar phrases). \
             Text:{}",
            cue.start, self.source_name, self.target_name, self.target_name, cue.text
        )
    }
}
