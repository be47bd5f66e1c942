// Subtitle demux orchestration
//
// This module wraps the external ffmpeg tool:
// - Commands: argument builder and async process execution
// - Processor: idempotent stream extraction with atomic cache placement

pub mod commands;
pub mod processor;

use async_trait::async_trait;
use std::path::Path;

pub use commands::MediaCommand;
pub use processor::DemuxProcessor;

use crate::config::MediaConfig;
use crate::error::Result;

/// Outcome of a demux request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemuxOutcome {
    /// The subtitle stream was extracted to the requested path
    Extracted,
    /// The output already existed; the external tool was not invoked
    Skipped,
    /// The container has no usable subtitle stream at the requested index
    NotFound,
}

/// Main trait for subtitle extraction from container files.
#[async_trait]
pub trait SubtitleDemuxer: Send + Sync {
    /// Extract subtitle stream `stream_index` of `container` to `output`.
    async fn demux(
        &self,
        container: &Path,
        stream_index: usize,
        output: &Path,
    ) -> Result<DemuxOutcome>;

    /// Check that the external tool can be invoked at all.
    fn check_availability(&self) -> Result<()>;
}

/// Factory for creating demuxer instances.
pub struct DemuxerFactory;

impl DemuxerFactory {
    /// Create the default demuxer implementation (ffmpeg-based).
    pub fn create(config: MediaConfig) -> Box<dyn SubtitleDemuxer> {
        Box::new(DemuxProcessor::new(config))
    }
}
