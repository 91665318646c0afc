//! Summaries of whole videos, from a URL or a local file.

use crate::error::{Result, VettError};
use crate::media::{extract_audio, Transcriber, VideoMetadata, VideoPlatform};
use crate::summarizer::{AudienceTier, Summarizer};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Outcome of summarizing a video.
#[derive(Debug, Clone, Serialize)]
pub struct VideoSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<VideoMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    pub summary: String,
}

/// Transcribes and summarizes videos.
pub struct VideoSummarizer {
    platform: Option<Arc<dyn VideoPlatform>>,
    ffmpeg: Option<PathBuf>,
    transcriber: Arc<dyn Transcriber>,
    summarizer: Arc<Summarizer>,
    temp_root: PathBuf,
}

impl VideoSummarizer {
    /// `platform` handles URLs and `ffmpeg` handles local files; either may be missing.
    pub fn new(
        platform: Option<Arc<dyn VideoPlatform>>,
        ffmpeg: Option<PathBuf>,
        transcriber: Arc<dyn Transcriber>,
        summarizer: Arc<Summarizer>,
        temp_root: PathBuf,
    ) -> Self {
        Self {
            platform,
            ffmpeg,
            transcriber,
            summarizer,
            temp_root,
        }
    }

    /// Summarize the video at `source` (URL or local path). Never fails;
    /// problems are reported in the summary text.
    #[instrument(skip(self))]
    pub async fn summarize_video(&self, source: &str, tier: AudienceTier) -> VideoSummary {
        match self.process(source, tier).await {
            Ok(summary) => summary,
            Err(e) => {
                error!("Video processing failed: {}", e);
                VideoSummary {
                    metadata: None,
                    transcript: None,
                    summary: format!("Could not process video. Error: {}: {}", e.kind(), e),
                }
            }
        }
    }

    async fn process(&self, source: &str, tier: AudienceTier) -> Result<VideoSummary> {
        std::fs::create_dir_all(&self.temp_root)?;
        let workdir = tempfile::Builder::new()
            .prefix("vett-video-")
            .tempdir_in(&self.temp_root)?;

        let (metadata, audio) = if source.to_lowercase().starts_with("http") {
            self.fetch_remote(source, workdir.path()).await?
        } else {
            self.extract_local(Path::new(source), workdir.path()).await?
        };

        let transcript = self.transcriber.transcribe(&audio).await?;
        info!("Transcribed '{}' ({} chars)", metadata.title, transcript.len());

        let query = format!(
            "a comprehensive summary of this video's audio, titled '{}'",
            metadata.title
        );
        let summary = self.summarizer.generate(&transcript, &query, tier).await;

        Ok(VideoSummary {
            metadata: Some(metadata),
            transcript: Some(transcript),
            summary,
        })
    }

    async fn fetch_remote(&self, url: &str, dir: &Path) -> Result<(VideoMetadata, PathBuf)> {
        let platform = self
            .platform
            .as_ref()
            .ok_or_else(|| VettError::ToolNotFound("yt-dlp".to_string()))?;

        let metadata = platform.metadata(url).await?;
        let audio = platform.download_audio(url, dir).await?;
        Ok((metadata, audio))
    }

    async fn extract_local(&self, path: &Path, dir: &Path) -> Result<(VideoMetadata, PathBuf)> {
        if !path.is_file() {
            return Err(VettError::NotFound(format!("{}", path.display())));
        }
        let ffmpeg = self
            .ffmpeg
            .as_ref()
            .ok_or_else(|| VettError::ToolNotFound("ffmpeg".to_string()))?;

        let audio = dir.join("audio.mp3");
        extract_audio(ffmpeg, path, &audio).await?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let metadata = VideoMetadata {
            id: path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            title: name,
            url: path.display().to_string(),
            thumbnail: None,
            duration_seconds: None,
            channel: None,
        };
        Ok((metadata, audio))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Prompts;
    use crate::testing::{FailingTranscriber, FakePlatform, FixedTranscriber, RecordingGenerator};

    fn rainforest_platform() -> Arc<dyn VideoPlatform> {
        Arc::new(FakePlatform::with_video("v1", "Rainforests"))
    }

    fn video_summarizer(
        platform: Option<Arc<dyn VideoPlatform>>,
        transcriber: Arc<dyn Transcriber>,
        tmp: &Path,
    ) -> (VideoSummarizer, Arc<RecordingGenerator>) {
        let generator = Arc::new(RecordingGenerator::new("Short and sweet."));
        let summarizer = Arc::new(Summarizer::new(
            generator.clone(),
            Prompts::default(),
            12_000,
        ));
        (
            VideoSummarizer::new(platform, None, transcriber, summarizer, tmp.to_path_buf()),
            generator,
        )
    }

    #[tokio::test]
    async fn test_url_video_is_summarized() {
        let tmp = tempfile::tempdir().unwrap();
        let (videos, generator) = video_summarizer(
            Some(rainforest_platform()),
            Arc::new(FixedTranscriber::new("Rainforests are humid.")),
            tmp.path(),
        );

        let result = videos
            .summarize_video("https://www.youtube.com/watch?v=v1", AudienceTier::Teen)
            .await;

        assert_eq!(result.summary, "Short and sweet.");
        assert_eq!(result.metadata.unwrap().title, "Rainforests");
        assert_eq!(result.transcript.as_deref(), Some("Rainforests are humid."));
        assert!(generator.calls()[0].0.contains("titled 'Rainforests'"));
        assert!(std::fs::read_dir(tmp.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_failure_is_reported_in_summary() {
        let tmp = tempfile::tempdir().unwrap();
        let (videos, _) = video_summarizer(
            Some(rainforest_platform()),
            Arc::new(FailingTranscriber),
            tmp.path(),
        );

        let result = videos
            .summarize_video("https://www.youtube.com/watch?v=v1", AudienceTier::Adult)
            .await;

        assert!(result
            .summary
            .starts_with("Could not process video. Error: TranscriptionError:"));
        assert!(result.metadata.is_none());
        assert!(result.transcript.is_none());
        assert!(std::fs::read_dir(tmp.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_missing_local_file() {
        let tmp = tempfile::tempdir().unwrap();
        let (videos, _) = video_summarizer(
            None,
            Arc::new(FixedTranscriber::new("unused")),
            tmp.path(),
        );

        let result = videos
            .summarize_video("/nonexistent/lecture.mp4", AudienceTier::Adult)
            .await;
        assert!(result.summary.contains("NotFound"));
    }

    #[tokio::test]
    async fn test_url_without_platform() {
        let tmp = tempfile::tempdir().unwrap();
        let (videos, _) = video_summarizer(
            None,
            Arc::new(FixedTranscriber::new("unused")),
            tmp.path(),
        );

        let result = videos
            .summarize_video("https://example.org/clip", AudienceTier::Adult)
            .await;
        assert!(result.summary.contains("ToolNotFound"));
    }
}
