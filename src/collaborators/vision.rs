//! Image descriptions through a vision-capable chat model.

use crate::config::{ApiSettings, MediaSettings};
use crate::error::{Result, VettError};
use crate::openai::create_client;
use crate::summarizer::{AudienceTier, Summarizer};
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImageArgs,
    ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequestArgs, ImageUrlArgs,
};
use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use base64::Engine;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, instrument};

/// Returned whenever an image cannot be described.
pub const IMAGE_UNAVAILABLE: &str = "Could not process the image.";

/// A model that can look at an image.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Answer `prompt` about the image encoded in `data_url`.
    async fn analyze(&self, prompt: &str, data_url: &str) -> Result<String>;
}

/// Vision model over an OpenAI-compatible chat endpoint.
pub struct ChatVision {
    client: Client<OpenAIConfig>,
    model: String,
}

impl ChatVision {
    pub fn with_config(api: &ApiSettings, media: &MediaSettings) -> Result<Self> {
        Ok(Self {
            client: create_client(api)?,
            model: media.vision_model.clone(),
        })
    }
}

fn openai_err(e: impl std::fmt::Display) -> VettError {
    VettError::OpenAI(e.to_string())
}

#[async_trait]
impl VisionModel for ChatVision {
    #[instrument(skip_all, fields(model = %self.model))]
    async fn analyze(&self, prompt: &str, data_url: &str) -> Result<String> {
        let parts: Vec<ChatCompletionRequestUserMessageContentPart> = vec![
            ChatCompletionRequestMessageContentPartTextArgs::default()
                .text(prompt)
                .build()
                .map_err(openai_err)?
                .into(),
            ChatCompletionRequestMessageContentPartImageArgs::default()
                .image_url(ImageUrlArgs::default().url(data_url).build().map_err(openai_err)?)
                .build()
                .map_err(openai_err)?
                .into(),
        ];

        let messages: Vec<ChatCompletionRequestMessage> =
            vec![ChatCompletionRequestUserMessageArgs::default()
                .content(parts)
                .build()
                .map_err(openai_err)?
                .into()];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()
            .map_err(openai_err)?;

        let response = self.client.chat().create(request).await.map_err(openai_err)?;
        Ok(response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default()
            .trim()
            .to_string())
    }
}

/// Describes images for an audience tier.
pub struct ImageDescriber {
    vision: Option<Arc<dyn VisionModel>>,
    prompt: String,
    summarizer: Arc<Summarizer>,
}

impl ImageDescriber {
    pub fn new(vision: Option<Arc<dyn VisionModel>>, summarizer: Arc<Summarizer>) -> Self {
        let prompt = summarizer.prompts().vision.analysis.clone();
        Self {
            vision,
            prompt,
            summarizer,
        }
    }

    /// Tier-appropriate description of the image at `path`. Never fails.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn describe_image(&self, path: &Path, tier: AudienceTier) -> String {
        match self.analyze(path).await {
            Ok(analysis) => {
                self.summarizer
                    .generate(&analysis, "an analysis of an image", tier)
                    .await
            }
            Err(e) => {
                error!("Image processing failed: {}", e);
                IMAGE_UNAVAILABLE.to_string()
            }
        }
    }

    async fn analyze(&self, path: &Path) -> Result<String> {
        let vision = self
            .vision
            .as_ref()
            .ok_or_else(|| VettError::BackendUnavailable("vision model".to_string()))?;

        let data_url = image_data_url(path).await?;
        let analysis = vision.analyze(&self.prompt, &data_url).await?;
        if analysis.is_empty() {
            return Err(VettError::Extraction(
                "vision model returned no analysis".to_string(),
            ));
        }
        Ok(analysis)
    }
}

/// The image at `path` as a base64 `data:` URL.
pub async fn image_data_url(path: &Path) -> Result<String> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase();

    let mime = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        other => return Err(VettError::UnsupportedFormat(format!("image .{}", other))),
    };

    let bytes = tokio::fs::read(path).await?;
    Ok(format!(
        "data:{};base64,{}",
        mime,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Prompts;
    use crate::testing::RecordingGenerator;
    use std::sync::Mutex;

    struct FakeVision {
        reply: String,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl VisionModel for FakeVision {
        async fn analyze(&self, _prompt: &str, data_url: &str) -> Result<String> {
            self.seen.lock().unwrap().push(data_url.to_string());
            Ok(self.reply.clone())
        }
    }

    fn summarizer(generator: Arc<RecordingGenerator>) -> Arc<Summarizer> {
        Arc::new(Summarizer::new(generator, Prompts::default(), 12_000))
    }

    #[tokio::test]
    async fn test_image_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot.PNG");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        assert_eq!(
            image_data_url(&path).await.unwrap(),
            "data:image/png;base64,AQID"
        );
        assert!(image_data_url(Path::new("scan.tiff")).await.is_err());
    }

    #[tokio::test]
    async fn test_describe_image_summarizes_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cat.jpg");
        std::fs::write(&path, b"jpeg").unwrap();

        let vision = Arc::new(FakeVision {
            reply: "A cat on a windowsill.".to_string(),
            seen: Mutex::new(Vec::new()),
        });
        let generator = Arc::new(RecordingGenerator::new("A fluffy cat!"));
        let describer = ImageDescriber::new(
            Some(vision.clone() as Arc<dyn VisionModel>),
            summarizer(generator.clone()),
        );

        let text = describer.describe_image(&path, AudienceTier::Child).await;
        assert_eq!(text, "A fluffy cat!");
        assert!(vision.seen.lock().unwrap()[0].starts_with("data:image/jpeg;base64,"));
        assert_eq!(generator.calls()[0].1, "A cat on a windowsill.");
    }

    #[tokio::test]
    async fn test_describe_image_degrades() {
        let generator = Arc::new(RecordingGenerator::new("unused"));
        let describer = ImageDescriber::new(None, summarizer(generator.clone()));

        let text = describer
            .describe_image(Path::new("/tmp/whatever.jpg"), AudienceTier::Adult)
            .await;
        assert_eq!(text, IMAGE_UNAVAILABLE);
        assert!(generator.calls().is_empty());
    }
}
