//! Summarize command: documents, images and videos.

use crate::cli::delivery::SUMMARY_DOWNLOAD_SUBDIR;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::collaborators::{
    ChatVision, ImageDescriber, KeywordExtractor, TextExtractor, TextPersistence, VideoSummarizer,
    VisionModel,
};
use crate::config::{Prompts, Settings};
use crate::media::{ToolPaths, Transcriber, VideoPlatform, WhisperTranscriber, YtDlp};
use crate::summarizer::{AudienceTier, Summarizer};
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "mov", "webm", "avi", "mp3", "m4a", "wav"];

/// What kind of input the user handed over.
#[derive(Debug, PartialEq)]
enum InputKind {
    Document,
    Image,
    Video,
}

fn classify(input: &str) -> InputKind {
    if input.to_lowercase().starts_with("http") {
        return InputKind::Video;
    }

    let extension = Path::new(input)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase();

    if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        InputKind::Image
    } else if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
        InputKind::Video
    } else {
        InputKind::Document
    }
}

/// Run the summarize command.
pub async fn run_summarize(
    input: &str,
    tier: &str,
    download: bool,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Summarize, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'vett doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;
    let summarizer = Arc::new(Summarizer::from_settings(&settings, prompts));
    let tier = AudienceTier::from_label(tier);

    let spinner = Output::spinner("Summarizing...");
    let summarized = match classify(input) {
        InputKind::Document => summarize_document(input, tier, &summarizer).await,
        InputKind::Image => summarize_image(input, tier, &settings, summarizer.clone())
            .await
            .map(|summary| (summary, Vec::new())),
        InputKind::Video => summarize_video(input, tier, &settings, summarizer.clone())
            .await
            .map(|summary| (summary, Vec::new())),
    };
    spinner.finish_and_clear();

    let (summary, keywords) = match summarized {
        Ok(summarized) => summarized,
        Err(e) => {
            Output::error(&format!("{}", e));
            return Err(e);
        }
    };

    println!("\n{}\n", summary);

    if !keywords.is_empty() {
        Output::kv("Keywords", &keywords.join(", "));
        println!();
    }

    if download {
        let name = Path::new(input)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| input.to_string());
        let path = TextPersistence::new(settings.data_dir().join(SUMMARY_DOWNLOAD_SUBDIR))
            .persist_text(&summary, &name)?;
        Output::success(&format!("Summary saved to {}", path.display()));
    }

    Ok(())
}

/// Summary and keywords of a document, extracted concurrently.
async fn summarize_document(
    input: &str,
    tier: AudienceTier,
    summarizer: &Summarizer,
) -> Result<(String, Vec<String>)> {
    let path = Path::new(input);
    let text = TextExtractor::new().extract_text(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let keywords = KeywordExtractor::new(summarizer.backend(), summarizer.prompts());
    let query = format!("the document {}", name);
    Ok(tokio::join!(
        summarizer.generate(&text, &query, tier),
        keywords.extract_keywords(&text),
    ))
}

async fn summarize_image(
    input: &str,
    tier: AudienceTier,
    settings: &Settings,
    summarizer: Arc<Summarizer>,
) -> Result<String> {
    let vision = match ChatVision::with_config(&settings.backend, &settings.media) {
        Ok(v) => Some(Arc::new(v) as Arc<dyn VisionModel>),
        Err(e) => {
            Output::warning(&format!("Vision model unavailable: {}", e));
            None
        }
    };

    Ok(ImageDescriber::new(vision, summarizer)
        .describe_image(Path::new(input), tier)
        .await)
}

async fn summarize_video(
    input: &str,
    tier: AudienceTier,
    settings: &Settings,
    summarizer: Arc<Summarizer>,
) -> Result<String> {
    let tools = ToolPaths::resolve(&settings.media);
    let platform = tools
        .yt_dlp
        .map(|path| Arc::new(YtDlp::new(path)) as Arc<dyn VideoPlatform>);
    let transcriber: Arc<dyn Transcriber> = Arc::new(WhisperTranscriber::with_config(
        &settings.backend,
        &settings.media,
    )?);

    let videos = VideoSummarizer::new(
        platform,
        tools.ffmpeg,
        transcriber,
        summarizer,
        settings.temp_dir(),
    );
    let result = videos.summarize_video(input, tier).await;

    if let Some(metadata) = &result.metadata {
        Output::kv("Video", &metadata.title);
    }
    Ok(result.summary)
}
