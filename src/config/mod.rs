//! Configuration module for Vett.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{KeywordPrompts, Prompts, TierPrompts, TranslationPrompts, VisionPrompts};
pub use settings::{
    ApiSettings, EmbeddingSettings, GeneralSettings, KnowledgeSettings, MediaSettings,
    PromptSettings, Settings, SpeechSettings, SummarizerSettings, WebSettings,
};
