use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::fs;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::{Config, HistoryScope};
use crate::error::{Result, SubtransError};
use crate::language;
use crate::media::{DemuxOutcome, DemuxerFactory, SubtitleDemuxer};
use crate::subtitle::{self, Cue};
use crate::translate::{ChatBackend, ConversationHistory, OllamaBackend, TranslationSession};

/// Per-run options resolved from the command line.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Source language code as given on the command line
    pub source_lang: String,
    /// Target language code as given on the command line; also the token
    /// used in output file names
    pub target_lang: String,
    /// Demux subtitle stream index, None for plain subtitle input
    pub demux_stream: Option<usize>,
    /// Delete source artifacts after a successful write
    pub delete_source: bool,
}

pub struct Workflow {
    config: Config,
    options: RunOptions,
    backend: Arc<dyn ChatBackend>,
    demuxer: Box<dyn SubtitleDemuxer>,
    source_name: String,
    target_name: String,
}

impl Workflow {
    pub fn new(config: Config, options: RunOptions) -> Result<Self> {
        let backend = Arc::new(OllamaBackend::new(&config.translate)?);
        Self::with_backend(config, options, backend)
    }

    /// Build a workflow around an explicit chat backend.
    pub fn with_backend(
        config: Config,
        options: RunOptions,
        backend: Arc<dyn ChatBackend>,
    ) -> Result<Self> {
        let source_name = language::prompt_name(&options.source_lang)?;
        let target_name = language::prompt_name(&options.target_lang)?;

        let demuxer = DemuxerFactory::create(config.media.clone());
        if options.demux_stream.is_some() {
            demuxer.check_availability()?;
        }

        Ok(Workflow {
            config,
            options,
            backend,
            demuxer,
            source_name,
            target_name,
        })
    }

    /// Process every candidate under `input_path`, writing next to it or
    /// into `output_folder`.
    ///
    /// Failures of a single file or container are reported and skipped; an
    /// error return means the run could not start at all.
    pub async fn run(&self, input_path: &Path, output_folder: &Path) -> Result<()> {
        fs::create_dir_all(output_folder).await?;

        let mut history = ConversationHistory::new(self.config.translate.history_limit);
        match self.options.demux_stream {
            Some(stream_index) => {
                self.run_containers(input_path, output_folder, stream_index, &mut history)
                    .await
            }
            None => {
                self.run_subtitles(input_path, output_folder, &mut history)
                    .await
            }
        }
    }

    async fn run_subtitles(
        &self,
        input_path: &Path,
        output_folder: &Path,
        history: &mut ConversationHistory,
    ) -> Result<()> {
        let files = collect_input_files(input_path, "srt")?;
        info!("Loaded {} subtitle file(s)", files.len());

        let session = self.session();
        for file in files {
            match self
                .process_subtitle_file(&file, output_folder, &session, history)
                .await
            {
                Ok(_) => {}
                Err(e) => warn!("Failed to process {}: {}", file.display(), e),
            }
        }

        Ok(())
    }

    async fn run_containers(
        &self,
        input_path: &Path,
        output_folder: &Path,
        stream_index: usize,
        history: &mut ConversationHistory,
    ) -> Result<()> {
        let containers = collect_input_files(input_path, "mkv")?;
        info!("Loaded {} container file(s)", containers.len());

        let session = self.session();
        for container in containers {
            match self
                .process_container(&container, output_folder, stream_index, &session, history)
                .await
            {
                Ok(_) => {}
                Err(e) => warn!("Failed to process {}: {}", container.display(), e),
            }
        }

        Ok(())
    }

    async fn process_subtitle_file(
        &self,
        input: &Path,
        output_folder: &Path,
        session: &TranslationSession,
        history: &mut ConversationHistory,
    ) -> Result<()> {
        let output_file = output_folder.join(output_name(input, &self.options.target_lang)?);

        info!("Input: {}", input.display());
        if output_file.exists() || carries_language_suffix(input, &self.options.target_lang) {
            info!("File already translated. Skipping..");
            if self.options.delete_source {
                self.remove_artifact(input).await;
            }
            return Ok(());
        }
        info!("Output: {}", output_file.display());
        info!("Language: {} -> {}", self.source_name, self.target_name);

        let cues = subtitle::read_srt(input).await?;
        let translated = self.translate_cues(&cues, session, history).await;
        subtitle::write_srt(&translated, &output_file).await?;

        if self.options.delete_source {
            self.remove_artifact(input).await;
        }

        Ok(())
    }

    async fn process_container(
        &self,
        container: &Path,
        output_folder: &Path,
        stream_index: usize,
        session: &TranslationSession,
        history: &mut ConversationHistory,
    ) -> Result<()> {
        let stem = file_stem(container)?;
        let output_file = output_folder.join(format!("{}_{}.srt", stem, self.options.target_lang));
        let demuxed_file = output_folder.join(format!("{}_{}.srt", stem, stream_index));

        info!("Input container: {}", container.display());
        if output_file.exists() {
            info!("File already translated. Skipping..");
            if self.options.delete_source && demuxed_file.exists() {
                self.remove_artifact(&demuxed_file).await;
            }
            return Ok(());
        }
        info!("Output: {}", output_file.display());

        match self
            .demuxer
            .demux(container, stream_index, &demuxed_file)
            .await?
        {
            DemuxOutcome::NotFound => {
                warn!(
                    "Subtitle stream [{}] not found in {}. Skipping container..",
                    stream_index,
                    container.display()
                );
                return Ok(());
            }
            DemuxOutcome::Skipped => {
                info!("Subtitle stream already demuxed. Skipping demux..");
            }
            DemuxOutcome::Extracted => {}
        }

        info!("Language: {} -> {}", self.source_name, self.target_name);

        let cues = subtitle::read_srt(&demuxed_file).await?;
        let translated = self.translate_cues(&cues, session, history).await;
        subtitle::write_srt(&translated, &output_file).await?;

        if self.options.delete_source {
            self.remove_artifact(&demuxed_file).await;
        }

        Ok(())
    }

    /// Translate all cues of one document in source order.
    ///
    /// Sequential on purpose: each request is conditioned on the previous
    /// cues' request/response turns, so reordering would change results.
    async fn translate_cues(
        &self,
        cues: &[Cue],
        session: &TranslationSession,
        history: &mut ConversationHistory,
    ) -> Vec<Cue> {
        if self.config.translate.history_scope == HistoryScope::PerFile {
            *history = ConversationHistory::new(self.config.translate.history_limit);
        }

        let pb = ProgressBar::new(cues.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} cues")
                .unwrap()
                .progress_chars("#>-"),
        );

        let mut translated = Vec::with_capacity(cues.len());
        for cue in cues {
            translated.push(session.translate(cue, history).await);
            pb.inc(1);
        }
        pb.finish();

        translated
    }

    fn session(&self) -> TranslationSession {
        TranslationSession::new(
            self.backend.clone(),
            &self.config.translate,
            self.source_name.clone(),
            self.target_name.clone(),
        )
    }

    async fn remove_artifact(&self, path: &Path) {
        if !path.exists() {
            return;
        }
        match fs::remove_file(path).await {
            Ok(()) => info!("Deleted {}", path.display()),
            Err(e) => warn!("Failed to delete {}: {}", path.display(), e),
        }
    }
}

/// Collect candidate files: the explicit file itself, or every direct child
/// of the directory with the wanted extension, in lexicographic order.
fn collect_input_files(input_path: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    if input_path.is_file() {
        if has_extension(input_path, extension) {
            files.push(input_path.to_path_buf());
        }
    } else if input_path.is_dir() {
        for entry in WalkDir::new(input_path)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && has_extension(path, extension) {
                files.push(path.to_path_buf());
            }
        }
    }

    files.sort();

    if files.is_empty() {
        return Err(SubtransError::Config(format!(
            "No .{} files found in the specified path",
            extension
        )));
    }

    Ok(files)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

/// True when the file name already carries the `_{lang}` suffix this run
/// would add, i.e. it is a previous run's output discovered by the scan.
fn carries_language_suffix(path: &Path, lang: &str) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => name.ends_with(&format!("_{}.{}", lang, ext)),
        None => false,
    }
}

fn file_stem(path: &Path) -> Result<&str> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| SubtransError::Config(format!("Invalid file name: {}", path.display())))
}

fn output_name(input: &Path, lang: &str) -> Result<String> {
    let stem = file_stem(input)?;
    let ext = input.extension().and_then(|e| e.to_str()).unwrap_or("srt");
    Ok(format!("{}_{}.{}", stem, lang, ext))
}
