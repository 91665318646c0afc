//! Keyword extraction for summarized documents.

use crate::config::{KeywordPrompts, Prompts};
use crate::summarizer::TextGenerator;
use crate::web::truncate_chars;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, instrument};

/// Returned as the only keyword when no backend could be created.
pub const KEYWORDS_UNAVAILABLE: &str = "Keyword extraction service unavailable.";

/// Returned as the only keyword when the backend call fails.
pub const KEYWORDS_FAILED: &str = "Keyword extraction failed.";

const KEYWORD_COUNT: usize = 5;
const MAX_KEYWORD_INPUT_CHARS: usize = 4000;

/// Asks a chat model for the main keywords of a text.
pub struct KeywordExtractor {
    backend: Option<Arc<dyn TextGenerator>>,
    prompts: KeywordPrompts,
    variables: HashMap<String, String>,
}

impl KeywordExtractor {
    pub fn new(backend: Option<Arc<dyn TextGenerator>>, prompts: &Prompts) -> Self {
        Self {
            backend,
            prompts: prompts.keywords.clone(),
            variables: prompts.variables.clone(),
        }
    }

    /// Keywords of the first 4000 characters of `text`. Never fails; a
    /// missing or failing backend yields a single fixed message.
    #[instrument(skip(self, text), fields(len = text.len()))]
    pub async fn extract_keywords(&self, text: &str) -> Vec<String> {
        let Some(backend) = &self.backend else {
            return vec![KEYWORDS_UNAVAILABLE.to_string()];
        };

        let mut vars = self.variables.clone();
        vars.insert("count".to_string(), KEYWORD_COUNT.to_string());
        let system = Prompts::render(&self.prompts.system, &vars);

        let input = truncate_chars(text, MAX_KEYWORD_INPUT_CHARS);
        match backend.complete(&system, &input).await {
            Ok(reply) => split_keywords(&reply),
            Err(e) => {
                error!("Keyword extraction failed: {}", e);
                vec![KEYWORDS_FAILED.to_string()]
            }
        }
    }
}

fn split_keywords(reply: &str) -> Vec<String> {
    reply
        .split(',')
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingGenerator, RecordingGenerator};

    #[tokio::test]
    async fn test_reply_is_split_on_commas() {
        let generator = Arc::new(RecordingGenerator::new(" tides, moon ,gravity,, oceans "));
        let backend: Arc<dyn TextGenerator> = generator.clone();
        let extractor = KeywordExtractor::new(Some(backend), &Prompts::default());

        let keywords = extractor.extract_keywords(&"x".repeat(9000)).await;

        assert_eq!(keywords, vec!["tides", "moon", "gravity", "oceans"]);
        let calls = generator.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0.contains("5 most important"));
        assert_eq!(calls[0].1.chars().count(), 4000);
    }

    #[tokio::test]
    async fn test_degraded_backends() {
        let offline = KeywordExtractor::new(None, &Prompts::default());
        assert_eq!(offline.extract_keywords("text").await, vec![KEYWORDS_UNAVAILABLE]);

        let failing: Arc<dyn TextGenerator> = Arc::new(FailingGenerator);
        let broken = KeywordExtractor::new(Some(failing), &Prompts::default());
        assert_eq!(broken.extract_keywords("text").await, vec![KEYWORDS_FAILED]);
    }
}
