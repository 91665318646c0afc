//! Query orchestrator for Vett.
//!
//! Answers a query from the knowledge cache when a close enough match
//! exists, falls back to the web otherwise (storing what it learns), and
//! suggests a related video whose summary is produced in the background.

use crate::config::{KnowledgeSettings, Prompts, Settings};
use crate::error::{Result, VettError};
use crate::knowledge::{ContentStore, ItemMetadata, SimilarityMatch};
use crate::media::{media_lookup_from_settings, MediaLookup, VideoCandidate};
use crate::summarizer::{AudienceTier, Summarizer};
use crate::tasks::BackgroundTasks;
use crate::web::WebRetriever;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Where the context behind a summary came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SourceType {
    #[serde(rename = "Knowledge Base (RAG)")]
    KnowledgeBase,
    #[serde(rename = "Web Learned")]
    WebLearned,
    #[serde(rename = "No Results")]
    NoResults,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SourceType::KnowledgeBase => "Knowledge Base (RAG)",
            SourceType::WebLearned => "Web Learned",
            SourceType::NoResults => "No Results",
        })
    }
}

/// The answer to one query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub query: String,
    pub audience_tier: AudienceTier,
    pub summary: String,
    /// Source URL, or "N/A".
    pub source: String,
    /// Source title, or the query itself.
    pub title: String,
    pub source_type: SourceType,
    pub confidence: f32,
    pub video_suggestion: Option<VideoCandidate>,
    /// Wall-clock seconds spent answering.
    pub elapsed_time: f64,
}

/// Thresholds deciding between cached and fresh content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrievalPolicy {
    /// A cached match must score strictly above this to be used.
    pub accept_threshold: f32,
    /// Confidence reported for web-sourced answers.
    pub web_confidence: f32,
}

impl Default for RetrievalPolicy {
    fn default() -> Self {
        Self {
            accept_threshold: 0.65,
            web_confidence: 0.5,
        }
    }
}

impl From<&KnowledgeSettings> for RetrievalPolicy {
    fn from(settings: &KnowledgeSettings) -> Self {
        Self {
            accept_threshold: settings.accept_threshold,
            web_confidence: settings.web_confidence,
        }
    }
}

/// Context chosen for a query, before summarization.
struct Context {
    text: String,
    metadata: ItemMetadata,
    source_type: SourceType,
    confidence: f32,
}

impl Context {
    fn none() -> Self {
        Self {
            text: String::new(),
            metadata: ItemMetadata::default(),
            source_type: SourceType::NoResults,
            confidence: 0.0,
        }
    }
}

/// Ties the knowledge cache, web retrieval, summarization and video lookup together.
pub struct Orchestrator {
    store: Arc<ContentStore>,
    web: Arc<WebRetriever>,
    summarizer: Arc<Summarizer>,
    media: Arc<dyn MediaLookup>,
    tasks: BackgroundTasks,
    policy: RetrievalPolicy,
}

impl Orchestrator {
    /// Create an orchestrator over already-built components.
    pub fn new(
        store: Arc<ContentStore>,
        web: Arc<WebRetriever>,
        summarizer: Arc<Summarizer>,
        media: Arc<dyn MediaLookup>,
        tasks: BackgroundTasks,
        policy: RetrievalPolicy,
    ) -> Self {
        Self {
            store,
            web,
            summarizer,
            media,
            tasks,
            policy,
        }
    }

    /// Build the production component graph from configuration.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let summarizer = Arc::new(Summarizer::from_settings(settings, prompts));
        let store = Arc::new(ContentStore::from_settings(settings)?);
        let web = Arc::new(WebRetriever::from_settings(&settings.web)?);
        let media = media_lookup_from_settings(settings, summarizer.clone());

        Ok(Self::new(
            store,
            web,
            summarizer,
            media,
            BackgroundTasks::new(settings.media.max_concurrent_enrichments),
            RetrievalPolicy::from(&settings.knowledge),
        ))
    }

    pub fn summarizer(&self) -> Arc<Summarizer> {
        self.summarizer.clone()
    }

    /// Spawner holding the background video enrichments.
    pub fn tasks(&self) -> &BackgroundTasks {
        &self.tasks
    }

    /// Answer `query` for `tier`.
    ///
    /// Only an empty query is an error. Every other failure degrades: a
    /// broken cache falls through to the web, a failed web search yields
    /// [`SourceType::NoResults`], and video problems just mean no suggestion.
    #[instrument(skip(self))]
    pub async fn answer(&self, query: &str, tier: AudienceTier) -> Result<QueryResult> {
        let query = query.trim();
        if query.is_empty() {
            return Err(VettError::Validation("Query must not be empty".to_string()));
        }

        let started = Instant::now();
        let ((context, summary), video) =
            tokio::join!(self.primary(query, tier), self.media.find_video(query));

        if let Some(video) = &video {
            self.schedule_enrichment(video);
        }

        let elapsed_time = started.elapsed().as_secs_f64();
        info!(
            "Answered '{}' from {} in {:.2}s",
            query, context.source_type, elapsed_time
        );

        Ok(QueryResult {
            query: query.to_string(),
            audience_tier: tier,
            summary,
            source: if context.metadata.source.is_empty() {
                "N/A".to_string()
            } else {
                context.metadata.source
            },
            title: if context.metadata.title.is_empty() {
                query.to_string()
            } else {
                context.metadata.title
            },
            source_type: context.source_type,
            confidence: context.confidence,
            video_suggestion: video,
            elapsed_time,
        })
    }

    /// Cache lookup, web fallback and summarization.
    async fn primary(&self, query: &str, tier: AudienceTier) -> (Context, String) {
        let context = match self.cache_lookup(query).await {
            Some(hit) => {
                info!("Cache hit (score {:.3})", hit.score);
                Context {
                    text: hit.item.text,
                    metadata: hit.item.metadata,
                    source_type: SourceType::KnowledgeBase,
                    confidence: hit.score,
                }
            }
            None => self.web_fallback(query).await,
        };

        let summary = self.summarizer.generate(&context.text, query, tier).await;
        (context, summary)
    }

    /// Best cached match, if it clears the acceptance threshold.
    async fn cache_lookup(&self, query: &str) -> Option<SimilarityMatch> {
        let best = match self.store.search(query, 1).await {
            Ok(matches) => matches.into_iter().next(),
            Err(e) => {
                warn!("Knowledge lookup failed, treating as a miss: {}", e);
                None
            }
        };

        match best {
            Some(m) if m.score > self.policy.accept_threshold => Some(m),
            Some(m) => {
                debug!(
                    "Best match scored {:.3}, needs more than {}",
                    m.score, self.policy.accept_threshold
                );
                None
            }
            None => None,
        }
    }

    async fn web_fallback(&self, query: &str) -> Context {
        let Some(page) = self.web.fetch_best_result(query).await else {
            return Context::none();
        };

        match self.store.add(vec![page.clone().into()]).await {
            Ok(_) => info!("Learned '{}' from {}", page.metadata.title, page.metadata.source),
            Err(e) => warn!("Could not store web result: {}", e),
        }

        Context {
            text: page.text,
            metadata: page.metadata,
            source_type: SourceType::WebLearned,
            confidence: self.policy.web_confidence,
        }
    }

    fn schedule_enrichment(&self, video: &VideoCandidate) {
        let media = self.media.clone();
        let id = video.id.clone();
        let title = video.title.clone();
        debug!("Scheduling background summary of video {}", id);

        self.tasks.spawn(format!("video {}", id), async move {
            media.transcribe_and_summarize(&id, &title).await;
        });
    }
}
