//! Prompt templates for Vett.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    /// One system instruction per audience tier.
    pub tiers: TierPrompts,
    pub vision: VisionPrompts,
    pub translation: TranslationPrompts,
    pub keywords: KeywordPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// System instructions for each audience tier. `{{query}}` names the topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TierPrompts {
    pub child: String,
    pub teen: String,
    pub adult: String,
    pub senior: String,
}

impl Default for TierPrompts {
    fn default() -> Self {
        Self {
            child: "You are a fun teacher explaining '{{query}}' to a 6-year-old. \
                    The summary must be written in English. Cover the main idea and \
                    interesting details. Use simple words and fun emojis."
                .to_string(),
            teen: "You are a cool creator explaining '{{query}}' to a teenager. \
                   The summary must be written in English. Explain the key takeaways \
                   and why it matters. Be thorough."
                .to_string(),
            adult: "You are a professional analyst providing a complete, detailed summary \
                    of '{{query}}'. The summary must be written in English. Capture all main \
                    arguments, facts, and conclusions. Prioritize completeness."
                .to_string(),
            senior: "You are a calm narrator explaining '{{query}}'. The summary must be \
                     written in English. Explain all essential points in a logical order so \
                     the full picture is clear."
                .to_string(),
        }
    }
}

/// Prompt for image analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionPrompts {
    pub analysis: String,
}

impl Default for VisionPrompts {
    fn default() -> Self {
        Self {
            analysis: r#"Analyze this image carefully and provide:
1. **Authenticity Analysis:** Determine if this image is likely real or AI-generated and briefly explain why.
2. **Identify People:** Identify any famous people and what they are known for (describe in general terms if not famous).
3. **OCR (Text Extraction):** Transcribe any text visible in the image.
4. **Visual Description:** Describe the scene, objects, colors, composition, and overall context."#
                .to_string(),
        }
    }
}

/// Prompt for translation. `{{language}}` is the target language name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationPrompts {
    pub system: String,
}

impl Default for TranslationPrompts {
    fn default() -> Self {
        Self {
            system: "You are a professional translator. Translate the user's text into \
                     {{language}}. Preserve meaning, tone, formatting and emojis. Reply with \
                     the translation only."
                .to_string(),
        }
    }
}

/// Prompt for keyword extraction. `{{count}}` is the number of keywords.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordPrompts {
    pub system: String,
}

impl Default for KeywordPrompts {
    fn default() -> Self {
        Self {
            system: "Extract the {{count}} most important and relevant keywords from the \
                     user's text. Return only a comma-separated list. For example: keyword \
                     one, keyword two, keyword three"
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let tiers_path = custom_path.join("tiers.toml");
            if tiers_path.exists() {
                let content = std::fs::read_to_string(&tiers_path)?;
                prompts.tiers = toml::from_str(&content)?;
            }

            let vision_path = custom_path.join("vision.toml");
            if vision_path.exists() {
                let content = std::fs::read_to_string(&vision_path)?;
                prompts.vision = toml::from_str(&content)?;
            }

            let translation_path = custom_path.join("translation.toml");
            if translation_path.exists() {
                let content = std::fs::read_to_string(&translation_path)?;
                prompts.translation = toml::from_str(&content)?;
            }

            let keywords_path = custom_path.join("keywords.toml");
            if keywords_path.exists() {
                let content = std::fs::read_to_string(&keywords_path)?;
                prompts.keywords = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
