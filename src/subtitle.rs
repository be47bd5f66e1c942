use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

use crate::error::{Result, SubtransError};

/// Marker written in place of a translation once all attempts are exhausted.
pub const TRANSLATION_ERROR_MARKER: &str = "! TRANSLATION ERROR !";

/// One timed subtitle entry.
///
/// The sequence number and the two timestamps are carried through verbatim
/// as they appeared in the source file; nothing is renumbered or reformatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    /// Decimal ordinal token from the source document
    pub seq: String,
    /// Start timestamp token (HH:MM:SS,mmm)
    pub start: String,
    /// End timestamp token (HH:MM:SS,mmm)
    pub end: String,
    /// Source text, internal line breaks preserved
    pub text: String,
    /// Translated text, empty until the translation step runs
    pub translation: String,
}

impl Cue {
    /// Text that serialization writes for this cue: the translation once
    /// set, the source text otherwise.
    pub fn rendered_text(&self) -> &str {
        if self.translation.is_empty() {
            &self.text
        } else {
            &self.translation
        }
    }

    /// Return a copy of this cue with the translation set.
    pub fn with_translation(&self, translation: String) -> Self {
        Cue {
            translation,
            ..self.clone()
        }
    }
}

/// Parse SRT content into cues, in appearance order.
///
/// A line consisting solely of digits opens a cue block; the following line
/// is split on the literal `" --> "` token into the start and end timestamps;
/// subsequent non-blank lines collect as the text body. Anything that does
/// not fit that shape is skipped without error, so stray BOM lines, comments
/// or damaged blocks never abort a file.
pub fn parse_srt(content: &str) -> Vec<Cue> {
    let lines: Vec<&str> = content.lines().collect();
    let mut cues = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let seq = lines[i].trim();
        if seq.is_empty() || !seq.chars().all(|c| c.is_ascii_digit()) {
            i += 1;
            continue;
        }

        let Some(timing) = lines.get(i + 1).map(|l| l.trim()) else {
            break;
        };
        let Some((start, end)) = timing.split_once(" --> ") else {
            debug!("Skipping block {}: no timing line", seq);
            i += 1;
            continue;
        };

        let mut text_lines = Vec::new();
        let mut j = i + 2;
        while j < lines.len() && !lines[j].trim().is_empty() {
            text_lines.push(lines[j].trim());
            j += 1;
        }

        cues.push(Cue {
            seq: seq.to_string(),
            start: start.trim().to_string(),
            end: end.trim().to_string(),
            text: text_lines.join("\n"),
            translation: String::new(),
        });

        i = j + 1;
    }

    cues
}

/// Read and parse an SRT file.
pub async fn read_srt<P: AsRef<Path>>(path: P) -> Result<Vec<Cue>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).await?;

    let cues = parse_srt(&content);
    if cues.is_empty() {
        return Err(SubtransError::Subtitle(format!(
            "No subtitle entries found in {}",
            path.display()
        )));
    }

    debug!("Parsed {} cues from {}", cues.len(), path.display());
    Ok(cues)
}

/// Write cues to an SRT file in document order.
pub async fn write_srt<P: AsRef<Path>>(cues: &[Cue], path: P) -> Result<()> {
    let path = path.as_ref();

    let mut content = String::new();
    for cue in cues {
        content.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            cue.seq,
            cue.start,
            cue.end,
            cue.rendered_text()
        ));
    }

    fs::write(path, content).await?;

    info!("Wrote {} cues to {}", cues.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "1\n00:00:01,000 --> 00:00:02,000\nHello\n\n2\n00:00:03,500 --> 00:00:04,250\nHow are you?\nFine, thanks.\n\n";

    #[test]
    fn test_parse_preserves_order_and_fields() {
        let cues = parse_srt(SAMPLE);
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].seq, "1");
        assert_eq!(cues[0].start, "00:00:01,000");
        assert_eq!(cues[0].end, "00:00:02,000");
        assert_eq!(cues[0].text, "Hello");
        assert_eq!(cues[1].seq, "2");
        assert_eq!(cues[1].text, "How are you?\nFine, thanks.");
        assert!(cues.iter().all(|c| c.translation.is_empty()));
    }

    #[test]
    fn test_parse_skips_malformed_leading_lines() {
        let content = "WEBVTT garbage\n\n1\n00:00:01,000 --> 00:00:02,000\nHello\n\n";
        let cues = parse_srt(content);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "Hello");
    }

    #[test]
    fn test_parse_skips_block_without_timing_line() {
        let content = "1\nnot a timing line\n\n2\n00:00:03,000 --> 00:00:04,000\nStill here\n\n";
        let cues = parse_srt(content);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].seq, "2");
    }

    #[test]
    fn test_parse_keeps_verbatim_sequence_numbers() {
        let content = "7\n00:00:01,000 --> 00:00:02,000\nSeven\n\n12\n00:00:03,000 --> 00:00:04,000\nTwelve\n\n";
        let cues = parse_srt(content);
        let seqs: Vec<&str> = cues.iter().map(|c| c.seq.as_str()).collect();
        assert_eq!(seqs, vec!["7", "12"]);
    }

    #[test]
    fn test_parse_handles_missing_trailing_blank_line() {
        let content = "1\n00:00:01,000 --> 00:00:02,000\nNo trailing newline";
        let cues = parse_srt(content);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "No trailing newline");
    }

    #[tokio::test]
    async fn test_roundtrip_preserves_every_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.srt");

        let cues = parse_srt(SAMPLE);
        write_srt(&cues, &path).await.unwrap();

        let reparsed = read_srt(&path).await.unwrap();
        assert_eq!(cues, reparsed);
    }

    #[tokio::test]
    async fn test_write_uses_translation_once_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.srt");

        let cues: Vec<Cue> = parse_srt("1\n00:00:01,000 --> 00:00:02,000\nHello\n\n")
            .into_iter()
            .map(|c| c.with_translation("Bonjour".to_string()))
            .collect();
        write_srt(&cues, &path).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "1\n00:00:01,000 --> 00:00:02,000\nBonjour\n\n");
    }

    #[tokio::test]
    async fn test_read_srt_rejects_empty_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.srt");
        std::fs::write(&path, "no cues in here\n").unwrap();

        assert!(read_srt(&path).await.is_err());
    }
}
