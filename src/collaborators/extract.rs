//! Text extraction from uploaded documents.

use crate::error::{Result, VettError};
use crate::web::extract_readable_text;
use std::path::Path;
use tracing::instrument;

/// Reads the text content of plain-text, Markdown and HTML files.
#[derive(Debug, Clone, Default)]
pub struct TextExtractor;

impl TextExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Whether files with this extension can be read.
    pub fn supports(extension: &str) -> bool {
        matches!(
            extension.to_lowercase().as_str(),
            "txt" | "md" | "markdown" | "html" | "htm"
        )
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn extract_text(&self, path: &Path) -> Result<String> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();

        if !Self::supports(&extension) {
            return Err(VettError::UnsupportedFormat(if extension.is_empty() {
                "file has no extension".to_string()
            } else {
                format!(".{} (supported: .txt, .md, .html)", extension)
            }));
        }

        let bytes = std::fs::read(path)
            .map_err(|e| VettError::Extraction(format!("{}: {}", path.display(), e)))?;
        let content = String::from_utf8_lossy(&bytes);

        Ok(match extension.as_str() {
            "html" | "htm" => extract_readable_text(&content, usize::MAX),
            _ => content.into_owned(),
        })
    }
}
