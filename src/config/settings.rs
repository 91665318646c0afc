//! Configuration settings for Vett.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub backend: ApiSettings,
    pub summarizer: SummarizerSettings,
    pub embedding: EmbeddingSettings,
    pub knowledge: KnowledgeSettings,
    pub web: WebSettings,
    pub media: MediaSettings,
    pub speech: SpeechSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Directory for temporary files.
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.vett".to_string(),
            temp_dir: "/tmp/vett".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Connection settings for an OpenAI-compatible API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL. Empty uses the OpenAI default.
    pub api_base: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.groq.com/openai/v1".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            timeout_secs: 300,
        }
    }
}

impl ApiSettings {
    /// Settings for the public OpenAI API.
    pub fn openai() -> Self {
        Self {
            api_base: String::new(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 300,
        }
    }
}

/// Text generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerSettings {
    /// Chat model used for summaries and translation.
    pub model: String,
    /// Context is cut to this many characters before it is sent.
    pub max_context_chars: usize,
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self {
            model: "llama-3.1-8b-instant".to_string(),
            max_context_chars: 12_000,
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding API connection.
    pub api: ApiSettings,
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            api: ApiSettings::openai(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
        }
    }
}

/// Knowledge cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeSettings {
    /// Index backend (sqlite, memory).
    pub provider: String,
    /// Path to SQLite database (for sqlite provider).
    pub sqlite_path: String,
    /// Matches scoring at or below this are dropped from search results.
    pub min_score: f32,
    /// A cached match must score above this to be used as an answer.
    pub accept_threshold: f32,
    /// Confidence reported for answers learned from the web.
    pub web_confidence: f32,
}

impl Default for KnowledgeSettings {
    fn default() -> Self {
        Self {
            provider: "sqlite".to_string(),
            sqlite_path: "~/.vett/knowledge.db".to_string(),
            min_score: 0.6,
            accept_threshold: 0.65,
            web_confidence: 0.5,
        }
    }
}

/// Web retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSettings {
    /// Environment variable holding the Google Custom Search API key.
    pub google_api_key_env: String,
    /// Environment variable holding the Google search engine id.
    pub google_engine_id_env: String,
    /// Google Custom Search endpoint.
    pub google_endpoint: String,
    /// DuckDuckGo HTML endpoint.
    pub duckduckgo_endpoint: String,
    /// Links requested per provider.
    pub max_results: usize,
    /// Per-page fetch timeout in seconds.
    pub fetch_timeout_secs: u64,
    /// Extracted page text is cut to this many characters.
    pub max_page_chars: usize,
    /// Pages must yield more than this many characters to be used.
    pub min_page_chars: usize,
    /// User agent sent with page fetches.
    pub user_agent: String,
    /// Accept invalid TLS certificates when fetching pages.
    pub accept_invalid_certs: bool,
    /// Links whose path ends in one of these extensions are never fetched.
    pub ignored_extensions: Vec<String>,
}

impl Default for WebSettings {
    fn default() -> Self {
        Self {
            google_api_key_env: "GOOGLE_API_KEY".to_string(),
            google_engine_id_env: "SEARCH_ENGINE_ID".to_string(),
            google_endpoint: "https://www.googleapis.com/customsearch/v1".to_string(),
            duckduckgo_endpoint: "https://html.duckduckgo.com/html/".to_string(),
            max_results: 3,
            fetch_timeout_secs: 10,
            max_page_chars: 4000,
            min_page_chars: 200,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/124.0 Safari/537.36"
                .to_string(),
            accept_invalid_certs: false,
            ignored_extensions: [
                "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "zip", "rar", "7z", "gz",
                "tar", "exe", "dmg", "msi", "mp3", "wav", "ogg", "mp4", "avi", "mov", "mkv",
                "jpg", "jpeg", "png", "gif", "webp", "svg",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Video suggestion and enrichment settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaSettings {
    /// Suggest videos and summarize their audio in the background.
    pub enabled: bool,
    /// yt-dlp binary name or path.
    pub yt_dlp_path: String,
    /// ffmpeg binary name or path.
    pub ffmpeg_path: String,
    /// Speech-to-text model.
    pub transcription_model: String,
    /// Vision model used for image descriptions.
    pub vision_model: String,
    /// Upper bound on concurrently running enrichment tasks.
    pub max_concurrent_enrichments: usize,
    /// Subdirectory of the data dir receiving video summaries.
    pub summary_subdir: String,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            yt_dlp_path: "yt-dlp".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
            transcription_model: "whisper-large-v3".to_string(),
            vision_model: "meta-llama/llama-4-scout-17b-16e-instruct".to_string(),
            max_concurrent_enrichments: 2,
            summary_subdir: "video_summaries".to_string(),
        }
    }
}

/// Speech synthesis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    /// Speech API connection.
    pub api: ApiSettings,
    /// Text-to-speech model (tts-1, tts-1-hd).
    pub model: String,
    /// Voice to use.
    pub voice: String,
    /// Subdirectory of the data dir receiving audio files.
    pub output_subdir: String,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            api: ApiSettings::openai(),
            model: "tts-1".to_string(),
            voice: "alloy".to_string(),
            output_subdir: "audio".to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            settings.validate()?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Reject values that would break the retrieval policy.
    pub fn validate(&self) -> crate::error::Result<()> {
        let k = &self.knowledge;
        for (name, value) in [
            ("knowledge.min_score", k.min_score),
            ("knowledge.accept_threshold", k.accept_threshold),
            ("knowledge.web_confidence", k.web_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(crate::error::VettError::Config(format!(
                    "{} must be between 0.0 and 1.0, got {}",
                    name, value
                )));
            }
        }
        if self.media.max_concurrent_enrichments == 0 {
            return Err(crate::error::VettError::Config(
                "media.max_concurrent_enrichments must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::VettError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vett")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.knowledge.sqlite_path)
    }

    /// Directory receiving background video summaries.
    pub fn video_summary_dir(&self) -> PathBuf {
        self.data_dir().join(&self.media.summary_subdir)
    }
}
