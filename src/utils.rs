//! Small helpers: text normalization, truncation, and output-dir checks.

use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Collapse runs of whitespace (including newlines from nested markup) into
/// single spaces and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate a string to at most `max` characters, respecting char boundaries.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Truncate a string for logging, appending how much was cut.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept = truncate_chars(s, max);
        format!("{}…(+{} bytes)", kept, s.len() - kept.len())
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then probes it with a throwaway file.
/// Run before scraping so a bad output path fails fast instead of after all
/// the network work.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_whitespace_flattens_newlines_and_runs() {
        assert_eq!(collapse_whitespace("  a \n\t b   c "), "a b c");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn truncate_chars_is_boundary_safe() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        // Multi-byte chars must not be split mid-sequence.
        assert_eq!(truncate_chars("éééé", 2), "éé");
    }

    #[test]
    fn truncate_for_log_marks_cut_length() {
        assert_eq!(truncate_for_log("short", 100), "short");
        let long = "a".repeat(500);
        let result = truncate_for_log(&long, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("+400 bytes"));
    }
}
