//! Subtrans - Batch Subtitle Translation Workflow
//!
//! This is the main entry point for the subtrans application: it validates
//! the run up front, then hands the batch to the workflow, which translates
//! subtitle files through a conversational LLM backend.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use subtrans::cli::Args;
use subtrans::config::Config;
use subtrans::error::SubtransError;
use subtrans::workflow::{RunOptions, Workflow};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose)?;

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            // Try to load config.toml from current directory first
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    match run(args, config).await {
        Ok(()) => {
            info!("Subtrans run completed");
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("ERR: {}", e);
            std::process::exit(1);
        }
    }
}

/// Validate the run up front, then drive the batch. Any error returned here
/// is a pre-flight failure: nothing has been translated yet and the process
/// exits with code 1.
async fn run(args: Args, config: Config) -> subtrans::error::Result<()> {
    if !args.input_path.exists() {
        return Err(SubtransError::FileNotFound(
            args.input_path.display().to_string(),
        ));
    }

    let output_folder = resolve_output_folder(&args)?;

    let options = RunOptions {
        source_lang: args.source_lang,
        target_lang: args.target_lang,
        demux_stream: args.demux,
        delete_source: args.delete,
    };

    let workflow = Workflow::new(config, options)?;
    workflow.run(&args.input_path, &output_folder).await
}

/// An explicit output folder must already exist; without one, output lands
/// next to the input.
fn resolve_output_folder(args: &Args) -> subtrans::error::Result<PathBuf> {
    match &args.output_folder {
        Some(folder) => {
            if !folder.is_dir() {
                return Err(SubtransError::Config(format!(
                    "Output folder does not exist: {}",
                    folder.display()
                )));
            }
            Ok(folder.clone())
        }
        None => {
            if args.input_path.is_file() {
                Ok(args
                    .input_path
                    .parent()
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|| PathBuf::from(".")))
            } else {
                Ok(args.input_path.clone())
            }
        }
    }
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(".subtrans").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "subtrans.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer().with_target(false);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
