//! Summary generation for Vett.
//!
//! Every piece of natural-language output goes through [`Summarizer`],
//! which never fails: backend problems become fixed user-facing messages.

mod chat;

pub use chat::ChatGenerator;

use crate::config::{Prompts, Settings};
use crate::error::Result;
use crate::web::truncate_chars;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{error, instrument, warn};

/// Returned when no text-generation backend could be created.
pub const SUMMARIZER_UNAVAILABLE: &str =
    "Sorry, the summarization service is currently unavailable.";

/// Returned for empty context, without calling the backend.
pub const NOT_ENOUGH_CONTENT: &str = "There is not enough content to summarize.";

/// Prefix of the message returned when the backend call fails.
pub const GENERATION_FAILED_PREFIX: &str = "Sorry, the summary could not be generated.";

/// A text-generation backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Complete `user` under the `system` instruction.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

/// Presentation style of a summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudienceTier {
    Child,
    Teen,
    #[default]
    Adult,
    Senior,
}

impl AudienceTier {
    /// Parse a tier label. Unknown labels map to [`AudienceTier::Adult`].
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "child" | "kid" | "kids" => AudienceTier::Child,
            "teen" | "teenager" => AudienceTier::Teen,
            "senior" | "elderly" => AudienceTier::Senior,
            _ => AudienceTier::Adult,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AudienceTier::Child => "child",
            AudienceTier::Teen => "teen",
            AudienceTier::Adult => "adult",
            AudienceTier::Senior => "senior",
        }
    }
}

impl fmt::Display for AudienceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Turns context into an audience-appropriate summary.
pub struct Summarizer {
    backend: Option<Arc<dyn TextGenerator>>,
    prompts: Prompts,
    max_context_chars: usize,
}

impl Summarizer {
    pub fn new(backend: Arc<dyn TextGenerator>, prompts: Prompts, max_context_chars: usize) -> Self {
        Self {
            backend: Some(backend),
            prompts,
            max_context_chars,
        }
    }

    /// A summarizer whose backend failed to initialize.
    pub fn unavailable(prompts: Prompts, max_context_chars: usize) -> Self {
        Self {
            backend: None,
            prompts,
            max_context_chars,
        }
    }

    /// Connect the configured chat backend. A missing key is logged and
    /// leaves the summarizer in its unavailable state.
    pub fn from_settings(settings: &Settings, prompts: Prompts) -> Self {
        let max = settings.summarizer.max_context_chars;
        match ChatGenerator::with_config(&settings.backend, &settings.summarizer) {
            Ok(backend) => Self::new(Arc::new(backend), prompts, max),
            Err(e) => {
                error!("Summarization backend unavailable: {}", e);
                Self::unavailable(prompts, max)
            }
        }
    }

    /// The text-generation backend, if one is available.
    pub fn backend(&self) -> Option<Arc<dyn TextGenerator>> {
        self.backend.clone()
    }

    pub fn prompts(&self) -> &Prompts {
        &self.prompts
    }

    /// System instruction for `tier`, with `query` filled in.
    pub fn instruction(&self, query: &str, tier: AudienceTier) -> String {
        let template = match tier {
            AudienceTier::Child => &self.prompts.tiers.child,
            AudienceTier::Teen => &self.prompts.tiers.teen,
            AudienceTier::Adult => &self.prompts.tiers.adult,
            AudienceTier::Senior => &self.prompts.tiers.senior,
        };

        let mut vars = HashMap::new();
        vars.insert("query".to_string(), query.to_string());
        self.prompts.render_with_custom(template, &vars)
    }

    /// Summarize `context` about `query` for `tier`. Never fails.
    #[instrument(skip(self, context), fields(context_len = context.len()))]
    pub async fn generate(&self, context: &str, query: &str, tier: AudienceTier) -> String {
        let Some(backend) = &self.backend else {
            return SUMMARIZER_UNAVAILABLE.to_string();
        };

        if context.trim().is_empty() {
            return NOT_ENOUGH_CONTENT.to_string();
        }

        let context = if context.chars().count() > self.max_context_chars {
            warn!(
                "Context too long, truncating to {} chars",
                self.max_context_chars
            );
            truncate_chars(context, self.max_context_chars)
        } else {
            context.to_string()
        };

        let system = self.instruction(query, tier);
        match backend.complete(&system, &context).await {
            Ok(summary) => summary,
            Err(e) => {
                error!("Summary generation failed: {}", e);
                format!("{} API Error: {}", GENERATION_FAILED_PREFIX, e)
            }
        }
    }
}

/// Whether `summary` is an apology or error message rather than content.
pub fn is_degraded(summary: &str) -> bool {
    summary.trim() == NOT_ENOUGH_CONTENT
        || summary.contains("Sorry")
        || summary.contains("API Error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingGenerator, RecordingGenerator};

    fn summarizer(backend: Arc<dyn TextGenerator>) -> Summarizer {
        Summarizer::new(backend, Prompts::default(), 12_000)
    }

    #[test]
    fn test_tier_labels() {
        assert_eq!(AudienceTier::from_label("Child"), AudienceTier::Child);
        assert_eq!(AudienceTier::from_label(" senior "), AudienceTier::Senior);
        assert_eq!(AudienceTier::from_label("toddler"), AudienceTier::Adult);
        assert_eq!(AudienceTier::from_label(""), AudienceTier::Adult);
        assert_eq!(AudienceTier::Teen.to_string(), "teen");
    }

    #[test]
    fn test_instruction_names_query() {
        let s = summarizer(Arc::new(RecordingGenerator::new("ok")));
        let child = s.instruction("photosynthesis", AudienceTier::Child);
        assert!(child.contains("'photosynthesis'"));
        assert!(child.contains("6-year-old"));
        assert!(s
            .instruction("photosynthesis", AudienceTier::Adult)
            .contains("professional analyst"));
    }

    #[tokio::test]
    async fn test_unavailable_backend() {
        let s = Summarizer::unavailable(Prompts::default(), 12_000);
        assert_eq!(
            s.generate("some context", "q", AudienceTier::Adult).await,
            SUMMARIZER_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn test_empty_context_skips_backend() {
        let backend = Arc::new(RecordingGenerator::new("should not be used"));
        let s = summarizer(backend.clone());

        assert_eq!(
            s.generate("   \n\t", "q", AudienceTier::Teen).await,
            NOT_ENOUGH_CONTENT
        );
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_long_context_is_truncated() {
        let backend = Arc::new(RecordingGenerator::new("summary"));
        let s = summarizer(backend.clone());

        let context = "a".repeat(20_000);
        let summary = s.generate(&context, "letters", AudienceTier::Adult).await;

        assert_eq!(summary, "summary");
        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.chars().count(), 12_000);
        assert!(calls[0].0.contains("'letters'"));
    }

    #[tokio::test]
    async fn test_backend_failure_is_reported_inline() {
        let s = summarizer(Arc::new(FailingGenerator));
        let summary = s.generate("context", "q", AudienceTier::Senior).await;

        assert!(summary.starts_with(GENERATION_FAILED_PREFIX));
        assert!(summary.contains("API Error:"));
        assert!(is_degraded(&summary));
    }

    #[test]
    fn test_is_degraded() {
        assert!(is_degraded(SUMMARIZER_UNAVAILABLE));
        assert!(is_degraded(NOT_ENOUGH_CONTENT));
        assert!(!is_degraded("There is not enough rain this year."));
        assert!(!is_degraded("Plants make food from light."));
    }
}
