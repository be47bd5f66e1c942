use async_trait::async_trait;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info, warn};

use crate::config::MediaConfig;
use crate::error::{Result, SubtransError};
use super::{DemuxOutcome, MediaCommand, SubtitleDemuxer};

/// FFmpeg-based subtitle stream extractor.
pub struct DemuxProcessor {
    config: MediaConfig,
}

impl DemuxProcessor {
    pub fn new(config: MediaConfig) -> Self {
        DemuxProcessor { config }
    }
}

#[async_trait]
impl SubtitleDemuxer for DemuxProcessor {
    /// Extract one subtitle stream of a container file.
    ///
    /// The extraction goes to a temporary file first and is renamed into
    /// place only on success, so a killed or failed run never leaves a
    /// partial file at the cache path. An output that already exists is
    /// reused as-is, which makes re-running a batch safe and cheap.
    async fn demux(
        &self,
        container: &Path,
        stream_index: usize,
        output: &Path,
    ) -> Result<DemuxOutcome> {
        if output.exists() {
            debug!(
                "Demuxed subtitle already present: {}, skipping extraction",
                output.display()
            );
            return Ok(DemuxOutcome::Skipped);
        }

        // Temp file in the output's directory so persist() is a rename on
        // the same filesystem
        let parent = output.parent().unwrap_or_else(|| Path::new("."));
        let temp = tempfile::Builder::new()
            .prefix(".demux-")
            .suffix(".srt")
            .tempfile_in(parent)?;

        info!(
            "Demuxing subtitle stream [{}] from {}",
            stream_index,
            container.display()
        );

        let command = MediaCommand::new(&self.config.binary_path, "Subtitle demux")
            .overwrite()
            .input(container)
            .map_subtitle_stream(stream_index)
            .output(temp.path());

        match command.execute().await {
            Ok(()) => {
                temp.persist(output).map_err(|e| {
                    SubtransError::Media(format!(
                        "Failed to move demuxed subtitle into place: {}",
                        e.error
                    ))
                })?;
                info!("Demuxed subtitle stream to {}", output.display());
                Ok(DemuxOutcome::Extracted)
            }
            Err(e) => {
                // Dropping the temp handle removes the partial artifact
                warn!(
                    "Subtitle stream [{}] not extracted from {}: {}",
                    stream_index,
                    container.display(),
                    e
                );
                Ok(DemuxOutcome::NotFound)
            }
        }
    }

    /// Check if the media tool is available
    fn check_availability(&self) -> Result<()> {
        let output = Command::new(&self.config.binary_path)
            .arg("-version")
            .output()
            .map_err(|e| SubtransError::Media(format!("Media tool not found: {}", e)))?;

        if output.status.success() {
            debug!("Media tool is available");
            Ok(())
        } else {
            Err(SubtransError::Media(
                "Media tool version check failed".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processor(binary: &str) -> DemuxProcessor {
        DemuxProcessor::new(MediaConfig {
            binary_path: binary.to_string(),
        })
    }

    #[tokio::test]
    async fn test_existing_output_short_circuits_the_tool() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("movie_0.srt");
        std::fs::write(&output, "cached").unwrap();

        // The binary does not exist; reaching it would error rather than skip
        let demuxer = processor("definitely-not-a-real-binary");
        let outcome = demuxer
            .demux(Path::new("movie.mkv"), 0, &output)
            .await
            .unwrap();

        assert_eq!(outcome, DemuxOutcome::Skipped);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "cached");
    }

    #[tokio::test]
    async fn test_tool_failure_reports_not_found_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("movie_0.srt");

        let demuxer = processor("definitely-not-a-real-binary");
        let outcome = demuxer
            .demux(Path::new("movie.mkv"), 0, &output)
            .await
            .unwrap();

        assert_eq!(outcome, DemuxOutcome::NotFound);
        assert!(!output.exists());
        // No temp artifact left behind either
        let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_availability_check_fails_for_missing_binary() {
        let demuxer = processor("definitely-not-a-real-binary");
        assert!(demuxer.check_availability().is_err());
    }
}
