//! Plain-text files under a fixed directory.

use crate::error::Result;
use std::path::PathBuf;
use tracing::info;

/// Longest file stem produced by [`sanitize_stem`].
const MAX_STEM_CHARS: usize = 100;

/// Writes text files named after a human-readable hint.
#[derive(Debug, Clone)]
pub struct TextPersistence {
    dir: PathBuf,
    suffix: String,
}

impl TextPersistence {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            suffix: String::new(),
        }
    }

    /// Append `suffix` to every file stem (e.g. `_summary`).
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Write `text` to `<dir>/<sanitized hint><suffix>.txt`, replacing any existing file.
    pub fn persist_text(&self, text: &str, name_hint: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self
            .dir
            .join(format!("{}{}.txt", sanitize_stem(name_hint), self.suffix));
        std::fs::write(&path, text)?;
        info!("Saved {:?}", path);
        Ok(path)
    }
}

/// A filesystem-safe file stem derived from `hint`.
pub fn sanitize_stem(hint: &str) -> String {
    let replaced: String = hint
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ' ') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_STEM_CHARS)
        .collect();

    let stem = replaced.trim().trim_start_matches('.').trim();
    if stem.is_empty() {
        "untitled".to_string()
    } else {
        stem.to_string()
    }
}
