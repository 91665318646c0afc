//! Similarity search and write-back over a vector index.

use super::{
    IndexEntry, KnowledgeItem, MemoryIndex, NewKnowledge, SimilarityMatch, SqliteIndex,
    VectorIndex,
};
use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, VettError};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// The knowledge cache: embeds text and matches queries against it.
pub struct ContentStore {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    min_score: f32,
}

impl ContentStore {
    /// Create a store. Matches scoring at or below `min_score` are dropped.
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>, min_score: f32) -> Self {
        Self {
            embedder,
            index,
            min_score,
        }
    }

    /// Build the configured embedder and index backend.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let embedder = Arc::new(OpenAIEmbedder::with_config(&settings.embedding)?);

        let index: Arc<dyn VectorIndex> = match settings.knowledge.provider.as_str() {
            "sqlite" => Arc::new(SqliteIndex::new(&settings.sqlite_path())?),
            "memory" => Arc::new(MemoryIndex::new()),
            other => {
                return Err(VettError::Config(format!(
                    "Unknown knowledge provider: {}",
                    other
                )))
            }
        };

        Ok(Self::new(embedder, index, settings.knowledge.min_score))
    }

    /// Up to `k` stored items similar to `query`, best first.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SimilarityMatch>> {
        if k == 0 || self.index.count().await? == 0 {
            return Ok(Vec::new());
        }

        let embedding = self.embedder.embed(query).await?;
        let neighbours = self.index.nearest(&embedding, k).await?;

        let mut matches: Vec<SimilarityMatch> = neighbours
            .into_iter()
            .map(|n| SimilarityMatch {
                score: (1.0 - n.distance).clamp(0.0, 1.0),
                item: n.item,
            })
            .filter(|m| m.score > self.min_score)
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        debug!("{} matches above {}", matches.len(), self.min_score);
        Ok(matches)
    }

    /// Embed and store `items`. Re-adding an id replaces the earlier item.
    #[instrument(skip(self, items), fields(count = items.len()))]
    pub async fn add(&self, items: Vec<NewKnowledge>) -> Result<usize> {
        if items.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = items.iter().map(|i| i.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != items.len() {
            return Err(VettError::Embedding(format!(
                "Expected {} embeddings, got {}",
                items.len(),
                embeddings.len()
            )));
        }

        let now = Utc::now();
        let entries: Vec<IndexEntry> = items
            .into_iter()
            .zip(embeddings)
            .map(|(new, embedding)| IndexEntry {
                item: KnowledgeItem {
                    id: item_id(&new.text, &new.metadata.source),
                    text: new.text,
                    metadata: new.metadata,
                    learned_at: now,
                },
                embedding,
            })
            .collect();

        let stored = self.index.upsert_batch(&entries).await?;
        info!("Stored {} knowledge items", stored);
        Ok(stored)
    }

    /// Number of stored items.
    pub async fn count(&self) -> Result<usize> {
        self.index.count().await
    }

    /// All stored items, most recent first.
    pub async fn list(&self) -> Result<Vec<KnowledgeItem>> {
        self.index.list().await
    }
}

/// The source when present, otherwise an id derived from the text.
pub fn item_id(text: &str, source: &str) -> String {
    if source.is_empty() {
        format!(
            "content-{}",
            Uuid::new_v5(&Uuid::NAMESPACE_URL, text.as_bytes())
        )
    } else {
        source.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::ItemMetadata;
    use crate::testing::KeywordEmbedder;

    fn new_item(text: &str, source: &str) -> NewKnowledge {
        NewKnowledge {
            text: text.to_string(),
            metadata: ItemMetadata {
                source: source.to_string(),
                title: "Photosynthesis".to_string(),
            },
        }
    }

    fn store_with(embedder: Arc<KeywordEmbedder>) -> ContentStore {
        ContentStore::new(embedder, Arc::new(MemoryIndex::new()), 0.6)
    }

    #[tokio::test]
    async fn test_empty_store_skips_embedding() {
        let embedder = Arc::new(KeywordEmbedder::default());
        let store = store_with(embedder.clone());

        let matches = store.search("photosynthesis", 1).await.unwrap();
        assert!(matches.is_empty());
        assert_eq!(embedder.calls(), 0);
    }

    #[tokio::test]
    async fn test_search_finds_related_item() {
        let store = store_with(Arc::new(KeywordEmbedder::default()));
        store
            .add(vec![new_item(
                "Photosynthesis turns light into chemical energy.",
                "https://example.org/photosynthesis",
            )])
            .await
            .unwrap();

        let matches = store.search("how does photosynthesis work", 1).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert!(matches[0].score > 0.99);
        assert_eq!(matches[0].item.id, "https://example.org/photosynthesis");
    }

    #[tokio::test]
    async fn test_unrelated_query_is_filtered() {
        let store = store_with(Arc::new(KeywordEmbedder::default()));
        store
            .add(vec![new_item("Photosynthesis facts.", "https://a")])
            .await
            .unwrap();

        // Orthogonal vectors score 0.0, below the floor.
        let matches = store.search("volcanoes", 3).await.unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_add_is_idempotent_per_id() {
        let store = store_with(Arc::new(KeywordEmbedder::default()));
        let item = new_item("Photosynthesis facts.", "");

        store.add(vec![item.clone()]).await.unwrap();
        store.add(vec![item]).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let items = store.list().await.unwrap();
        assert!(items[0].id.starts_with("content-"));
    }

    #[tokio::test]
    async fn test_add_empty_is_noop() {
        let embedder = Arc::new(KeywordEmbedder::default());
        let store = store_with(embedder.clone());
        assert_eq!(store.add(Vec::new()).await.unwrap(), 0);
        assert_eq!(embedder.calls(), 0);
    }

    async fn add_and_search_concurrently(index: Arc<dyn VectorIndex>) {
        let store = Arc::new(ContentStore::new(
            Arc::new(KeywordEmbedder::default()),
            index,
            0.6,
        ));

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..16 {
            let writer = store.clone();
            tasks.spawn(async move {
                writer
                    .add(vec![new_item(
                        &format!("Photosynthesis fact number {}.", i),
                        &format!("https://example.org/fact/{}", i),
                    )])
                    .await
                    .map(|_| ())
            });
            let reader = store.clone();
            tasks.spawn(async move { reader.search("photosynthesis", 3).await.map(|_| ()) });
        }

        while let Some(joined) = tasks.join_next().await {
            joined.unwrap().unwrap();
        }

        assert_eq!(store.count().await.unwrap(), 16);
        assert_eq!(store.search("photosynthesis", 3).await.unwrap().len(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_add_and_search_memory() {
        add_and_search_concurrently(Arc::new(MemoryIndex::new())).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_add_and_search_sqlite() {
        add_and_search_concurrently(Arc::new(SqliteIndex::in_memory().unwrap())).await;
    }

    #[test]
    fn test_item_id_is_stable() {
        assert_eq!(item_id("x", "https://a"), "https://a");
        assert_eq!(item_id("same text", ""), item_id("same text", ""));
        assert_ne!(item_id("one", ""), item_id("two", ""));
    }
}
