//! Audio extraction from local video files.

use super::run_tool;
use crate::error::{Result, VettError};
use std::path::Path;
use tracing::{debug, instrument};

/// Extract the audio track of `source` into `dest` as MP3.
#[instrument(skip_all, fields(source = %source.display()))]
pub async fn extract_audio(ffmpeg: &Path, source: &Path, dest: &Path) -> Result<()> {
    if !source.exists() {
        return Err(VettError::NotFound(format!("{}", source.display())));
    }

    debug!("Extracting audio to {:?}", dest);

    let source = source.to_string_lossy().into_owned();
    let dest_str = dest.to_string_lossy().into_owned();
    run_tool(
        ffmpeg,
        "ffmpeg",
        &[
            "-i",
            source.as_str(),
            "-vn",
            "-codec:a",
            "libmp3lame",
            "-qscale:a",
            "2",
            "-y",
            "-loglevel",
            "error",
            dest_str.as_str(),
        ],
    )
    .await
    .map_err(|e| match e {
        VettError::ToolFailed(msg) => VettError::MediaDownload(msg),
        other => other,
    })?;

    if !dest.exists() {
        return Err(VettError::MediaDownload(
            "ffmpeg produced no audio file".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_source_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_audio(
            Path::new("ffmpeg"),
            &dir.path().join("missing.mp4"),
            &dir.path().join("out.mp3"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), "NotFound");
    }
}
