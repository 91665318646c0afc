//! Spoken versions of summaries.

use super::persist::sanitize_stem;
use crate::config::SpeechSettings;
use crate::error::{Result, VettError};
use crate::openai::create_client;
use async_openai::types::{CreateSpeechRequestArgs, SpeechModel, Voice};
use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{error, info, instrument, warn};

/// Result of a synthesis attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechOutcome {
    /// Audio written to this file.
    Saved(PathBuf),
    /// Human-readable reason no audio was produced.
    Failed(String),
}

impl SpeechOutcome {
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            SpeechOutcome::Saved(path) => Some(path),
            SpeechOutcome::Failed(_) => None,
        }
    }
}

/// Turns text into an audio file.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Speak `text` in `language_code`, naming the file after `name_hint`.
    async fn synthesize(&self, text: &str, language_code: &str, name_hint: &str) -> SpeechOutcome;
}

/// Speech synthesis over the OpenAI audio API.
pub struct OpenAiSpeech {
    client: Option<Client<OpenAIConfig>>,
    model: SpeechModel,
    voice: Voice,
    output_dir: PathBuf,
}

impl OpenAiSpeech {
    /// A missing API key is logged; every synthesis then reports failure.
    pub fn with_config(settings: &SpeechSettings, output_dir: PathBuf) -> Self {
        let client = match create_client(&settings.api) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("Speech synthesis unavailable: {}", e);
                None
            }
        };

        Self {
            client,
            model: parse_model(&settings.model),
            voice: parse_voice(&settings.voice),
            output_dir,
        }
    }

    async fn try_synthesize(&self, text: &str, name_hint: &str) -> Result<PathBuf> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| VettError::BackendUnavailable("speech API key not set".to_string()))?;

        let request = CreateSpeechRequestArgs::default()
            .input(text)
            .model(self.model.clone())
            .voice(self.voice.clone())
            .build()
            .map_err(|e| VettError::OpenAI(e.to_string()))?;

        let response = client
            .audio()
            .speech(request)
            .await
            .map_err(|e| VettError::OpenAI(e.to_string()))?;

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self
            .output_dir
            .join(format!("{}.mp3", sanitize_stem(name_hint)));
        response
            .save(&path)
            .await
            .map_err(|e| VettError::OpenAI(e.to_string()))?;
        Ok(path)
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeech {
    #[instrument(skip(self, text), fields(len = text.len()))]
    async fn synthesize(&self, text: &str, language_code: &str, name_hint: &str) -> SpeechOutcome {
        // The model infers the spoken language from the text itself.
        match self.try_synthesize(text, name_hint).await {
            Ok(path) => {
                info!("Audio ({}) saved to {:?}", language_code, path);
                SpeechOutcome::Saved(path)
            }
            Err(e) => {
                error!("Speech synthesis failed: {}", e);
                SpeechOutcome::Failed(format!("Could not generate audio. Error: {}", e))
            }
        }
    }
}

fn parse_model(name: &str) -> SpeechModel {
    match name {
        "tts-1" => SpeechModel::Tts1,
        "tts-1-hd" => SpeechModel::Tts1Hd,
        other => SpeechModel::Other(other.to_string()),
    }
}

fn parse_voice(name: &str) -> Voice {
    match name.to_lowercase().as_str() {
        "echo" => Voice::Echo,
        "fable" => Voice::Fable,
        "onyx" => Voice::Onyx,
        "nova" => Voice::Nova,
        "shimmer" => Voice::Shimmer,
        "alloy" => Voice::Alloy,
        other => {
            warn!("Unknown voice '{}', using alloy", other);
            Voice::Alloy
        }
    }
}
