//! yt-dlp backed video platform.

use super::{run_tool, VideoCandidate, VideoMetadata, VideoPlatform};
use crate::error::{Result, VettError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Audio formats yt-dlp may leave behind, in order of preference.
const AUDIO_EXTENSIONS: &[&str] = &["m4a", "mp3", "opus", "webm", "ogg"];

/// Stem of the downloaded audio file inside the destination directory.
const AUDIO_STEM: &str = "audio";

/// Video search and audio download through the yt-dlp binary.
pub struct YtDlp {
    binary: PathBuf,
}

impl YtDlp {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

/// Watch URL for a bare id; URLs pass through.
pub fn watch_url(id_or_url: &str) -> String {
    if id_or_url.starts_with("http://") || id_or_url.starts_with("https://") {
        id_or_url.to_string()
    } else {
        format!("https://www.youtube.com/watch?v={}", id_or_url)
    }
}

/// Best thumbnail in a yt-dlp JSON record.
fn thumbnail_of(json: &serde_json::Value, id: &str) -> String {
    json["thumbnail"]
        .as_str()
        .map(str::to_string)
        .or_else(|| {
            json["thumbnails"]
                .as_array()
                .and_then(|thumbs| thumbs.last())
                .and_then(|t| t["url"].as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", id))
}

/// Candidate from one line of `--dump-json` output.
fn parse_candidate(line: &str) -> Result<VideoCandidate> {
    let json: serde_json::Value = serde_json::from_str(line)?;
    let id = json["id"]
        .as_str()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| VettError::NotFound("yt-dlp record has no id".to_string()))?
        .to_string();

    Ok(VideoCandidate {
        title: json["title"].as_str().unwrap_or("Untitled video").to_string(),
        url: watch_url(&id),
        thumbnail: thumbnail_of(&json, &id),
        id,
    })
}

fn parse_metadata(json_str: &str) -> Result<VideoMetadata> {
    let json: serde_json::Value = serde_json::from_str(json_str)?;
    let candidate = parse_candidate(json_str)?;

    Ok(VideoMetadata {
        id: candidate.id,
        title: candidate.title,
        url: json["webpage_url"]
            .as_str()
            .map(str::to_string)
            .unwrap_or(candidate.url),
        thumbnail: Some(candidate.thumbnail),
        duration_seconds: json["duration"].as_f64().map(|d| d as u32),
        channel: json["channel"]
            .as_str()
            .or_else(|| json["uploader"].as_str())
            .map(str::to_string),
    })
}

/// Locate the audio file yt-dlp wrote for `stem`.
pub(crate) fn find_audio_file(dir: &Path, stem: &str) -> Result<PathBuf> {
    for ext in AUDIO_EXTENSIONS {
        let candidate = dir.join(format!("{}.{}", stem, ext));
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    let entries = std::fs::read_dir(dir)
        .map_err(|e| VettError::MediaDownload(format!("Cannot read directory: {e}")))?;
    for entry in entries.flatten() {
        if entry.file_name().to_string_lossy().starts_with(stem) {
            return Ok(entry.path());
        }
    }

    Err(VettError::MediaDownload(
        "Audio file not found after download".into(),
    ))
}

#[async_trait]
impl VideoPlatform for YtDlp {
    #[instrument(skip(self))]
    async fn search_top(&self, query: &str) -> Result<Option<VideoCandidate>> {
        let search = format!("ytsearch1:{}", query);
        let output = run_tool(
            &self.binary,
            "yt-dlp",
            &["--flat-playlist", "--dump-json", "--no-warnings", search.as_str()],
        )
        .await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        match stdout.lines().find(|l| !l.trim().is_empty()) {
            Some(line) => {
                let candidate = parse_candidate(line)?;
                debug!("Top video for '{}': {}", query, candidate.id);
                Ok(Some(candidate))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn metadata(&self, url: &str) -> Result<VideoMetadata> {
        let output = run_tool(
            &self.binary,
            "yt-dlp",
            &["--dump-json", "--no-download", "--no-playlist", "--no-warnings", url],
        )
        .await?;

        parse_metadata(&String::from_utf8_lossy(&output.stdout))
    }

    #[instrument(skip(self, dest_dir))]
    async fn download_audio(&self, video: &str, dest_dir: &Path) -> Result<PathBuf> {
        let url = watch_url(video);
        let template = dest_dir.join(format!("{}.%(ext)s", AUDIO_STEM));
        let template = template.to_string_lossy().into_owned();

        info!("Downloading audio for {}", url);
        run_tool(
            &self.binary,
            "yt-dlp",
            &[
                "-f",
                "bestaudio[ext=m4a]/bestaudio",
                "--no-playlist",
                "--quiet",
                "--no-warnings",
                "--output",
                template.as_str(),
                url.as_str(),
            ],
        )
        .await
        .map_err(|e| match e {
            VettError::ToolFailed(msg) => VettError::MediaDownload(msg),
            other => other,
        })?;

        find_audio_file(dest_dir, AUDIO_STEM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat_search_line() {
        let line = r#"{"id":"abc123","title":"How Photosynthesis Works","thumbnails":[{"url":"https://i.ytimg.com/small.jpg"},{"url":"https://i.ytimg.com/big.jpg"}]}"#;
        let candidate = parse_candidate(line).unwrap();
        assert_eq!(candidate.id, "abc123");
        assert_eq!(candidate.title, "How Photosynthesis Works");
        assert_eq!(candidate.url, "https://www.youtube.com/watch?v=abc123");
        assert_eq!(candidate.thumbnail, "https://i.ytimg.com/big.jpg");
    }

    #[test]
    fn test_thumbnail_fallback() {
        let candidate = parse_candidate(r#"{"id":"xyz","title":"T"}"#).unwrap();
        assert_eq!(candidate.thumbnail, "https://i.ytimg.com/vi/xyz/hqdefault.jpg");
    }

    #[test]
    fn test_record_without_id_is_rejected() {
        assert!(parse_candidate(r#"{"title":"no id"}"#).is_err());
        assert!(parse_candidate("not json").is_err());
    }

    #[test]
    fn test_parse_metadata() {
        let json = r#"{"id":"abc","title":"Tides","webpage_url":"https://www.youtube.com/watch?v=abc","duration":312.5,"uploader":"Ocean Lab","thumbnail":"https://t/abc.jpg"}"#;
        let meta = parse_metadata(json).unwrap();
        assert_eq!(meta.duration_seconds, Some(312));
        assert_eq!(meta.channel.as_deref(), Some("Ocean Lab"));
        assert_eq!(meta.thumbnail.as_deref(), Some("https://t/abc.jpg"));
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(watch_url("abc"), "https://www.youtube.com/watch?v=abc");
        assert_eq!(watch_url("https://youtu.be/abc"), "https://youtu.be/abc");
    }

    #[test]
    fn test_find_audio_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_audio_file(dir.path(), "audio").is_err());

        std::fs::write(dir.path().join("audio.webm"), b"x").unwrap();
        let found = find_audio_file(dir.path(), "audio").unwrap();
        assert!(found.ends_with("audio.webm"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_tool_not_found() {
        let platform = YtDlp::new("/nonexistent/vett-test/yt-dlp");
        let err = platform.search_top("anything").await.unwrap_err();
        assert_eq!(err.kind(), "ToolNotFound");
    }
}
