//! Translation of summaries into other languages.

use crate::config::{Prompts, TranslationPrompts};
use crate::summarizer::TextGenerator;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, instrument};

/// Returned when the translation backend cannot be reached.
pub const TRANSLATION_UNAVAILABLE: &str = "Sorry, the translation service is currently unavailable.";

/// Languages offered for translation and speech, as (name, code).
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("english", "en"),
    ("spanish", "es"),
    ("french", "fr"),
    ("german", "de"),
    ("italian", "it"),
    ("portuguese", "pt"),
    ("dutch", "nl"),
    ("russian", "ru"),
    ("japanese", "ja"),
    ("korean", "ko"),
    ("chinese (simplified)", "zh-CN"),
    ("arabic", "ar"),
    ("hindi", "hi"),
    ("bengali", "bn"),
    ("turkish", "tr"),
    ("vietnamese", "vi"),
    ("polish", "pl"),
    ("swedish", "sv"),
    ("finnish", "fi"),
    ("indonesian", "id"),
    ("tamil", "ta"),
    ("telugu", "te"),
    ("marathi", "mr"),
    ("urdu", "ur"),
    ("malayalam", "ml"),
    ("kannada", "kn"),
    ("gujarati", "gu"),
    ("punjabi", "pa"),
];

/// A supported language matching a name or code, case-insensitively.
pub fn resolve_language(name_or_code: &str) -> Option<(&'static str, &'static str)> {
    let wanted = name_or_code.trim().to_lowercase();
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(name, code)| *name == wanted || code.to_lowercase() == wanted)
        .copied()
}

/// Message returned for a language outside [`SUPPORTED_LANGUAGES`].
pub fn unsupported_language(target: &str) -> String {
    format!(
        "Language '{}' is not supported by the translation service.",
        target
    )
}

/// Translates text. Never fails; problems become fixed messages.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target: &str) -> String;
}

/// Translator over a chat model.
pub struct LlmTranslator {
    backend: Option<Arc<dyn TextGenerator>>,
    prompts: TranslationPrompts,
    variables: HashMap<String, String>,
    cache: Mutex<HashMap<(String, String), String>>,
}

impl LlmTranslator {
    pub fn new(backend: Option<Arc<dyn TextGenerator>>, prompts: &Prompts) -> Self {
        Self {
            backend,
            prompts: prompts.translation.clone(),
            variables: prompts.variables.clone(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn cached(&self, key: &(String, String)) -> Option<String> {
        self.cache.lock().ok().and_then(|c| c.get(key).cloned())
    }

    fn remember(&self, key: (String, String), value: &str) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, value.to_string());
        }
    }
}

#[async_trait]
impl Translator for LlmTranslator {
    #[instrument(skip(self, text), fields(len = text.len()))]
    async fn translate(&self, text: &str, target: &str) -> String {
        let Some((name, code)) = resolve_language(target) else {
            return unsupported_language(target);
        };
        if text.trim().is_empty() {
            return text.to_string();
        }
        let Some(backend) = &self.backend else {
            return TRANSLATION_UNAVAILABLE.to_string();
        };

        let key = (code.to_string(), text.to_string());
        if let Some(hit) = self.cached(&key) {
            debug!("Translation cache hit for {}", code);
            return hit;
        }

        let mut vars = self.variables.clone();
        vars.insert("language".to_string(), name.to_string());
        let system = Prompts::render(&self.prompts.system, &vars);

        match backend.complete(&system, text).await {
            Ok(translated) => {
                self.remember(key, &translated);
                translated
            }
            Err(e) => {
                error!("Translation failed: {}", e);
                TRANSLATION_UNAVAILABLE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingGenerator, RecordingGenerator};

    fn translator_over(backend: Arc<RecordingGenerator>) -> LlmTranslator {
        let backend: Arc<dyn TextGenerator> = backend;
        LlmTranslator::new(Some(backend), &Prompts::default())
    }

    #[test]
    fn test_language_table() {
        assert_eq!(SUPPORTED_LANGUAGES.len(), 28);
        assert_eq!(resolve_language("Spanish"), Some(("spanish", "es")));
        assert_eq!(resolve_language("zh-cn"), Some(("chinese (simplified)", "zh-CN")));
        assert_eq!(resolve_language("klingon"), None);
    }

    #[tokio::test]
    async fn test_translate_uses_language_name() {
        let backend = Arc::new(RecordingGenerator::new("Las plantas hacen comida."));
        let translator = translator_over(backend.clone());

        let out = translator.translate("Plants make food.", "es").await;
        assert_eq!(out, "Las plantas hacen comida.");

        let calls = backend.calls();
        assert!(calls[0].0.contains("spanish"));
        assert_eq!(calls[0].1, "Plants make food.");
    }

    #[tokio::test]
    async fn test_repeat_translation_is_cached() {
        let backend = Arc::new(RecordingGenerator::new("Bonjour"));
        let translator = translator_over(backend.clone());

        translator.translate("Hello", "french").await;
        translator.translate("Hello", "fr").await;
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_unsupported_language() {
        let backend = Arc::new(RecordingGenerator::new("unused"));
        let translator = translator_over(backend.clone());

        assert_eq!(
            translator.translate("Hello", "klingon").await,
            "Language 'klingon' is not supported by the translation service."
        );
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_backend_failure() {
        let failing: Arc<dyn TextGenerator> = Arc::new(FailingGenerator);
        let translator = LlmTranslator::new(Some(failing), &Prompts::default());
        assert_eq!(
            translator.translate("Hello", "de").await,
            TRANSLATION_UNAVAILABLE
        );

        let offline = LlmTranslator::new(None, &Prompts::default());
        assert_eq!(offline.translate("Hello", "de").await, TRANSLATION_UNAVAILABLE);
    }
}
