//! Error types for Vett.

use thiserror::Error;

/// Library-level error type for Vett operations.
#[derive(Error, Debug)]
pub enum VettError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Search provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Page {url} has only {len} characters of readable text")]
    ContentTooShort { url: String, len: usize },

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Knowledge store error: {0}")]
    KnowledgeStore(String),

    #[error("Audio download failed: {0}")]
    MediaDownload(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Could not extract text: {0}")]
    Extraction(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("External tool not found: {0}. Please install it or set its path in the config.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),
}

impl VettError {
    /// Stable variant label, used in user-facing degradation messages.
    pub fn kind(&self) -> &'static str {
        match self {
            VettError::Config(_) => "ConfigError",
            VettError::Validation(_) => "ValidationError",
            VettError::ProviderUnavailable(_) => "ProviderUnavailable",
            VettError::ContentTooShort { .. } => "ContentTooShort",
            VettError::BackendUnavailable(_) => "BackendUnavailable",
            VettError::NotFound(_) => "NotFound",
            VettError::Embedding(_) => "EmbeddingError",
            VettError::KnowledgeStore(_) => "KnowledgeStoreError",
            VettError::MediaDownload(_) => "MediaDownloadError",
            VettError::Transcription(_) => "TranscriptionError",
            VettError::UnsupportedFormat(_) => "UnsupportedFormat",
            VettError::Extraction(_) => "ExtractionError",
            VettError::Io(_) => "IoError",
            VettError::Json(_) => "JsonError",
            VettError::TomlParse(_) => "TomlParseError",
            VettError::Http(_) => "HttpError",
            VettError::Database(_) => "DatabaseError",
            VettError::OpenAI(_) => "OpenAIError",
            VettError::ToolNotFound(_) => "ToolNotFound",
            VettError::ToolFailed(_) => "ToolFailed",
        }
    }
}

/// Result type alias for Vett operations.
pub type Result<T> = std::result::Result<T, VettError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels() {
        assert_eq!(VettError::Validation("empty".into()).kind(), "ValidationError");
        assert_eq!(
            VettError::ContentTooShort { url: "https://a.b".into(), len: 3 }.kind(),
            "ContentTooShort"
        );
        let io = VettError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(io.kind(), "IoError");
    }

    #[test]
    fn test_display_embeds_cause() {
        let err = VettError::Extraction("bad zip header".into());
        assert_eq!(err.to_string(), "Could not extract text: bad zip header");
    }
}
