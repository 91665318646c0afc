//! Optional extras attached to an answer: translation, speech and a
//! downloadable text file.

use crate::collaborators::{
    LlmTranslator, OpenAiSpeech, SpeechOutcome, SpeechSynthesizer, TextPersistence, Translator,
};
use crate::config::Settings;
use crate::summarizer::{is_degraded, Summarizer};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// Directory under the data dir receiving downloadable summaries.
pub const SUMMARY_DOWNLOAD_SUBDIR: &str = "summaries";

/// Which extras were requested.
#[derive(Debug, Clone, Default)]
pub struct DeliveryOptions {
    pub translate_to: Option<String>,
    pub speak: bool,
    pub download: bool,
}

/// Extras produced for an answer.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Deliverables {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_path: Option<PathBuf>,
}

/// Produces the requested extras for a summary.
pub struct Delivery {
    translator: Arc<dyn Translator>,
    speech: Arc<dyn SpeechSynthesizer>,
    downloads: TextPersistence,
}

impl Delivery {
    pub fn new(
        translator: Arc<dyn Translator>,
        speech: Arc<dyn SpeechSynthesizer>,
        downloads: TextPersistence,
    ) -> Self {
        Self {
            translator,
            speech,
            downloads,
        }
    }

    /// Translation shares the summarizer's backend.
    pub fn from_settings(settings: &Settings, summarizer: &Summarizer) -> Self {
        let data_dir = settings.data_dir();
        Self::new(
            Arc::new(LlmTranslator::new(summarizer.backend(), summarizer.prompts())),
            Arc::new(OpenAiSpeech::with_config(
                &settings.speech,
                data_dir.join(&settings.speech.output_subdir),
            )),
            TextPersistence::new(data_dir.join(SUMMARY_DOWNLOAD_SUBDIR)),
        )
    }

    /// Produce the extras in `options` for `summary`. Apologies and error
    /// messages get no extras.
    pub async fn deliver(
        &self,
        summary: &str,
        name_hint: &str,
        options: &DeliveryOptions,
    ) -> Deliverables {
        let mut out = Deliverables::default();
        if is_degraded(summary) {
            return out;
        }

        if let Some(target) = &options.translate_to {
            out.translated_summary = Some(self.translator.translate(summary, target).await);
        }

        if options.speak {
            match self.speech.synthesize(summary, "en", name_hint).await {
                SpeechOutcome::Saved(path) => out.audio_path = Some(path),
                SpeechOutcome::Failed(msg) => out.audio_error = Some(msg),
            }
        }

        if options.download {
            match self.downloads.persist_text(summary, name_hint) {
                Ok(path) => out.summary_path = Some(path),
                Err(e) => warn!("Could not save summary: {}", e),
            }
        }

        out
    }
}

/// URL under `/static` serving `path`, if it lives inside `data_dir`.
pub fn static_url(data_dir: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(data_dir).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(format!("/static/{}", parts.join("/")))
}
