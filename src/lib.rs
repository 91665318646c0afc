//! Vett - audience-aware answers from a self-learning knowledge cache
//!
//! Vett answers a natural-language question with a summary pitched at a
//! chosen audience, using what it has already learned when it can and the
//! web when it must. Whatever it fetches is stored for next time.
//!
//! The name "Vett" is Norwegian for "wit, common sense."
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `knowledge` - Similarity search over learned content (`ContentStore`)
//! - `embedding` - Embedding generation
//! - `web` - Search provider chain and page extraction (`WebRetriever`)
//! - `summarizer` - Audience-tier summaries
//! - `media` - Video suggestions and background video summaries
//! - `tasks` - Bounded background task spawning
//! - `collaborators` - Documents, images, videos, translation, speech, files
//! - `orchestrator` - Cache-first, web-fallback query answering
//!
//! # Example
//!
//! ```rust,no_run
//! use vett::config::Settings;
//! use vett::orchestrator::Orchestrator;
//! use vett::summarizer::AudienceTier;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::from_settings(&settings)?;
//!
//!     let result = orchestrator.answer("photosynthesis", AudienceTier::Child).await?;
//!     println!("{} ({})", result.summary, result.source_type);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod collaborators;
pub mod config;
pub mod embedding;
pub mod error;
pub mod knowledge;
pub mod media;
pub mod openai;
pub mod orchestrator;
pub mod summarizer;
pub mod tasks;
pub mod web;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Result, VettError};
