//! Adapters around the core: document, image and video input, translation,
//! speech output and file persistence.

mod extract;
mod keywords;
mod persist;
mod speech;
mod translate;
mod video;
mod vision;

pub use extract::TextExtractor;
pub use keywords::{KeywordExtractor, KEYWORDS_FAILED, KEYWORDS_UNAVAILABLE};
pub use persist::{sanitize_stem, TextPersistence};
pub use speech::{OpenAiSpeech, SpeechOutcome, SpeechSynthesizer};
pub use translate::{
    resolve_language, unsupported_language, LlmTranslator, Translator, SUPPORTED_LANGUAGES,
    TRANSLATION_UNAVAILABLE,
};
pub use video::{VideoSummarizer, VideoSummary};
pub use vision::{image_data_url, ChatVision, ImageDescriber, VisionModel, IMAGE_UNAVAILABLE};
