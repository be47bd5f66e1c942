use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, SubtransError};

// ffmpeg can stall indefinitely on damaged containers
const EXECUTION_TIMEOUT: Duration = Duration::from_secs(120);

/// External media command assembled argument by argument.
#[derive(Debug, Clone)]
pub struct MediaCommand {
    binary_path: String,
    args: Vec<String>,
    description: String,
}

impl MediaCommand {
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        MediaCommand {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Select the n-th subtitle stream of the first input
    pub fn map_subtitle_stream(self, index: usize) -> Self {
        self.arg("-map").arg(format!("0:s:{}", index))
    }

    /// Execute the command, capturing output.
    pub async fn execute(&self) -> Result<()> {
        debug!(
            "Executing media command: {} {:?}",
            self.binary_path, self.args
        );

        let mut cmd = Command::new(&self.binary_path);
        cmd.args(&self.args);

        let output = tokio::time::timeout(EXECUTION_TIMEOUT, cmd.output())
            .await
            .map_err(|_| {
                SubtransError::Media(format!(
                    "{} timed out after {}s",
                    self.description,
                    EXECUTION_TIMEOUT.as_secs()
                ))
            })?
            .map_err(|e| {
                SubtransError::Media(format!("Failed to execute media tool: {}", e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SubtransError::Media(format!(
                "{} failed: {}",
                self.description,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_assembles_demux_arguments() {
        let command = MediaCommand::new("ffmpeg", "Subtitle demux")
            .overwrite()
            .input("movie.mkv")
            .map_subtitle_stream(2)
            .output("movie_2.srt");

        assert_eq!(
            command.args,
            vec!["-y", "-i", "movie.mkv", "-map", "0:s:2", "movie_2.srt"]
        );
    }

    #[tokio::test]
    async fn test_execute_reports_missing_binary() {
        let command = MediaCommand::new("definitely-not-a-real-binary", "Probe").arg("-version");
        let result = command.execute().await;
        assert!(matches!(result, Err(SubtransError::Media(_))));
    }
}
