use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::{Result, SubtransError};

fn default_max_attempts() -> u32 {
    5
}

fn default_backoff_secs() -> u64 {
    5
}

fn default_history_limit() -> usize {
    60
}

fn default_request_timeout_secs() -> u64 {
    300
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub translate: TranslateConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Chat backend endpoint URL
    pub endpoint: String,
    /// LLM model to use for translation
    pub model: String,
    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Total attempts per cue (1 initial + retries)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay between failed attempts in seconds
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,
    /// Maximum conversation history entries kept per session
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Conversation history lifetime
    #[serde(default)]
    pub history_scope: HistoryScope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HistoryScope {
    /// PerFile: a fresh conversation buffer for each input file
    #[default]
    PerFile,
    /// PerRun: one conversation buffer shared across all files in the run
    PerRun,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            translate: TranslateConfig {
                endpoint: "http://localhost:11434".to_string(),
                model: "llama3.2:3b".to_string(),
                request_timeout_secs: default_request_timeout_secs(),
                max_attempts: default_max_attempts(),
                backoff_secs: default_backoff_secs(),
                history_limit: default_history_limit(),
                history_scope: HistoryScope::PerFile,
            },
            media: MediaConfig {
                binary_path: "ffmpeg".to_string(),
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SubtransError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| SubtransError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SubtransError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SubtransError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_retry_policy() {
        let config = Config::default();
        assert_eq!(config.translate.max_attempts, 5);
        assert_eq!(config.translate.backoff_secs, 5);
        assert_eq!(config.translate.history_limit, 60);
        assert_eq!(config.translate.history_scope, HistoryScope::PerFile);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml_str = r#"
            [translate]
            endpoint = "http://localhost:11434"
            model = "llama3.2:3b"

            [media]
            binary_path = "ffmpeg"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.translate.max_attempts, 5);
        assert_eq!(config.translate.history_scope, HistoryScope::PerFile);
    }

    #[test]
    fn test_history_scope_roundtrip() {
        let mut config = Config::default();
        config.translate.history_scope = HistoryScope::PerRun;
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.translate.history_scope, HistoryScope::PerRun);
    }
}
