//! Media lookup implementations.

use super::{
    MediaLookup, ToolPaths, Transcriber, VideoCandidate, VideoPlatform, WhisperTranscriber, YtDlp,
};
use crate::collaborators::TextPersistence;
use crate::config::Settings;
use crate::error::Result;
use crate::summarizer::{AudienceTier, Summarizer};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Finds videos on a platform and archives summaries of their audio.
pub struct SecondaryMediaLookup {
    platform: Arc<dyn VideoPlatform>,
    transcriber: Arc<dyn Transcriber>,
    summarizer: Arc<Summarizer>,
    persistence: TextPersistence,
    temp_root: PathBuf,
}

impl SecondaryMediaLookup {
    pub fn new(
        platform: Arc<dyn VideoPlatform>,
        transcriber: Arc<dyn Transcriber>,
        summarizer: Arc<Summarizer>,
        persistence: TextPersistence,
        temp_root: PathBuf,
    ) -> Self {
        Self {
            platform,
            transcriber,
            summarizer,
            persistence,
            temp_root,
        }
    }

    /// Returns the saved summary path, or `None` for a silent video.
    async fn enrich(&self, video_id: &str, title: &str) -> Result<Option<PathBuf>> {
        std::fs::create_dir_all(&self.temp_root)?;
        // Removed on drop, whichever way this function exits.
        let workdir = tempfile::Builder::new()
            .prefix("vett-audio-")
            .tempdir_in(&self.temp_root)?;

        let audio = self.platform.download_audio(video_id, workdir.path()).await?;
        let transcript = self.transcriber.transcribe(&audio).await?;
        if transcript.trim().is_empty() {
            return Ok(None);
        }

        let query = format!("the YouTube video titled '{}'", title);
        let summary = self
            .summarizer
            .generate(&transcript, &query, AudienceTier::Adult)
            .await;

        let content = format!("Summary of '{}':\n\n{}", title, summary);
        Ok(Some(self.persistence.persist_text(&content, title)?))
    }
}

#[async_trait]
impl MediaLookup for SecondaryMediaLookup {
    #[instrument(skip(self))]
    async fn find_video(&self, query: &str) -> Option<VideoCandidate> {
        match self.platform.search_top(query).await {
            Ok(candidate) => candidate,
            Err(e) => {
                warn!("Video search failed: {}", e);
                None
            }
        }
    }

    #[instrument(skip(self))]
    async fn transcribe_and_summarize(&self, video_id: &str, title: &str) {
        match self.enrich(video_id, title).await {
            Ok(Some(path)) => info!("Video summary for '{}' saved to {:?}", title, path),
            Ok(None) => info!("Video '{}' produced no transcript", title),
            Err(e) => error!("Background processing of video {} failed: {}", video_id, e),
        }
    }
}

/// Lookup used when video tooling is disabled or unavailable.
pub struct DisabledMediaLookup;

#[async_trait]
impl MediaLookup for DisabledMediaLookup {
    async fn find_video(&self, _query: &str) -> Option<VideoCandidate> {
        None
    }

    async fn transcribe_and_summarize(&self, _video_id: &str, _title: &str) {}
}

/// The configured media lookup, falling back to [`DisabledMediaLookup`]
/// when yt-dlp or the transcription backend is unavailable.
pub fn media_lookup_from_settings(
    settings: &Settings,
    summarizer: Arc<Summarizer>,
) -> Arc<dyn MediaLookup> {
    if !settings.media.enabled {
        info!("Video suggestions disabled");
        return Arc::new(DisabledMediaLookup);
    }

    let Some(yt_dlp) = ToolPaths::resolve(&settings.media).yt_dlp else {
        warn!(
            "yt-dlp not found at '{}', video suggestions disabled",
            settings.media.yt_dlp_path
        );
        return Arc::new(DisabledMediaLookup);
    };

    let transcriber = match WhisperTranscriber::with_config(&settings.backend, &settings.media) {
        Ok(t) => t,
        Err(e) => {
            warn!("Transcription unavailable ({}), video suggestions disabled", e);
            return Arc::new(DisabledMediaLookup);
        }
    };

    Arc::new(SecondaryMediaLookup::new(
        Arc::new(YtDlp::new(yt_dlp)),
        Arc::new(transcriber),
        summarizer,
        TextPersistence::new(settings.video_summary_dir()).with_suffix("_summary"),
        settings.temp_dir(),
    ))
}
