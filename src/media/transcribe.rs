//! Speech-to-text for downloaded audio.

use crate::config::{ApiSettings, MediaSettings};
use crate::error::{Result, VettError};
use crate::openai::create_client;
use async_openai::types::{AudioInput, CreateTranscriptionRequestArgs};
use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, instrument};

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Plain text spoken in the audio file.
    async fn transcribe(&self, audio_path: &Path) -> Result<String>;
}

/// Whisper transcription over an OpenAI-compatible audio endpoint.
pub struct WhisperTranscriber {
    client: Client<OpenAIConfig>,
    model: String,
}

impl WhisperTranscriber {
    pub fn with_config(api: &ApiSettings, media: &MediaSettings) -> Result<Self> {
        Ok(Self {
            client: create_client(api)?,
            model: media.transcription_model.clone(),
        })
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe(&self, audio_path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.m4a")
            .to_string();

        let request = CreateTranscriptionRequestArgs::default()
            .file(AudioInput::from_vec_u8(file_name, bytes))
            .model(&self.model)
            .build()
            .map_err(|e| VettError::Transcription(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe(request)
            .await
            .map_err(|e| VettError::Transcription(format!("Whisper API error: {}", e)))?;

        debug!("Transcribed {} chars", response.text.len());
        Ok(response.text.trim().to_string())
    }
}
