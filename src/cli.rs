use clap::Parser;
use std::path::PathBuf;

/// Translate SRT subtitle file(s) with a conversational LLM backend.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Input .srt file, .mkv container, or folder containing them
    pub input_path: PathBuf,

    /// Source language code (ISO 639): eng, fra, ita, jpn..
    pub source_lang: String,

    /// Target language code (ISO 639): eng, fra, ita, jpn..
    pub target_lang: String,

    /// Custom output folder for the translated file(s)
    #[arg(short, long)]
    pub output_folder: Option<PathBuf>,

    /// Demux the subtitle stream from .mkv file(s) before translating
    /// (default stream index is 0)
    #[arg(long, value_name = "STREAM_INDEX", num_args = 0..=1, default_missing_value = "0")]
    pub demux: Option<usize>,

    /// Delete the source subtitle file after processing
    #[arg(long)]
    pub delete: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_invocation() {
        let args = Args::parse_from(["subtrans", "movie.srt", "eng", "fra"]);
        assert_eq!(args.input_path, PathBuf::from("movie.srt"));
        assert_eq!(args.source_lang, "eng");
        assert_eq!(args.target_lang, "fra");
        assert_eq!(args.demux, None);
        assert!(!args.delete);
    }

    #[test]
    fn test_demux_flag_defaults_to_stream_zero() {
        let args = Args::parse_from(["subtrans", "movies/", "eng", "ita", "--demux"]);
        assert_eq!(args.demux, Some(0));
    }

    #[test]
    fn test_demux_flag_accepts_stream_index() {
        let args = Args::parse_from(["subtrans", "movies/", "eng", "ita", "--demux", "2"]);
        assert_eq!(args.demux, Some(2));
    }
}
