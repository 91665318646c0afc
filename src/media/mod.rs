//! Video suggestions and background video summaries.
//!
//! Finding a video is quick and happens on every query. Transcribing and
//! summarizing it is slow and runs detached; see [`SecondaryMediaLookup`].

mod ffmpeg;
mod lookup;
mod transcribe;
mod ytdlp;

pub use ffmpeg::extract_audio;
pub use lookup::{media_lookup_from_settings, DisabledMediaLookup, SecondaryMediaLookup};
pub use transcribe::{Transcriber, WhisperTranscriber};
pub use ytdlp::{watch_url, YtDlp};

use crate::config::{MediaSettings, Settings};
use crate::error::{Result, VettError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::debug;

/// A suggested video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoCandidate {
    pub id: String,
    pub title: String,
    pub url: String,
    pub thumbnail: String,
}

/// Details of a single video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub id: String,
    pub title: String,
    pub url: String,
    pub thumbnail: Option<String>,
    pub duration_seconds: Option<u32>,
    pub channel: Option<String>,
}

/// A video hosting site reachable through some tool or API.
#[async_trait]
pub trait VideoPlatform: Send + Sync {
    /// Best match for `query`, if any.
    async fn search_top(&self, query: &str) -> Result<Option<VideoCandidate>>;

    /// Details of the video at `url`.
    async fn metadata(&self, url: &str) -> Result<VideoMetadata>;

    /// Download the audio of `video` (id or URL) into `dest_dir`.
    async fn download_audio(&self, video: &str, dest_dir: &Path) -> Result<PathBuf>;
}

/// Finds a video for a query and summarizes videos in the background.
#[async_trait]
pub trait MediaLookup: Send + Sync {
    /// Best video for `query`. Failures are logged and reported as `None`.
    async fn find_video(&self, query: &str) -> Option<VideoCandidate>;

    /// Transcribe, summarize and archive the video. Never fails; nobody waits on it.
    async fn transcribe_and_summarize(&self, video_id: &str, title: &str);
}

/// Resolved locations of the external media tools.
#[derive(Debug, Clone, Default)]
pub struct ToolPaths {
    pub yt_dlp: Option<PathBuf>,
    pub ffmpeg: Option<PathBuf>,
}

impl ToolPaths {
    /// Resolve the configured tools. Missing tools are `None`.
    pub fn resolve(settings: &MediaSettings) -> Self {
        Self {
            yt_dlp: resolve_tool(&settings.yt_dlp_path),
            ffmpeg: resolve_tool(&settings.ffmpeg_path),
        }
    }
}

/// Locate a tool given as a bare name (searched on PATH) or a path.
pub fn resolve_tool(configured: &str) -> Option<PathBuf> {
    let expanded = Settings::expand_path(configured);
    if expanded.components().count() > 1 {
        expanded.is_file().then_some(expanded)
    } else {
        which::which(configured).ok()
    }
}

/// Run an external tool to completion, capturing its output.
pub(crate) async fn run_tool(binary: &Path, name: &str, args: &[&str]) -> Result<Output> {
    debug!("Running {} {:?}", name, args);

    let output = Command::new(binary)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VettError::ToolNotFound(name.to_string())
            } else {
                VettError::ToolFailed(format!("Failed to run {}: {}", name, e))
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(VettError::ToolFailed(format!(
            "{} failed: {}",
            name,
            stderr.trim()
        )));
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_missing_path() {
        assert!(resolve_tool("/nonexistent/vett-test/yt-dlp").is_none());
        assert!(resolve_tool("vett-test-binary-that-does-not-exist").is_none());
    }

    #[test]
    fn test_resolve_existing_path() {
        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("yt-dlp");
        std::fs::write(&tool, b"#!/bin/sh\n").unwrap();

        let resolved = resolve_tool(tool.to_str().unwrap()).unwrap();
        assert_eq!(resolved, tool);
    }

    #[tokio::test]
    async fn test_run_tool_missing_binary() {
        let err = run_tool(Path::new("/nonexistent/vett-test/tool"), "tool", &["--version"])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "ToolNotFound");
    }
}
