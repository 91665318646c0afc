//! Knowledge cache for Vett.
//!
//! Stores text learned from the web together with its embedding, and answers
//! similarity queries against it. Backends implement [`VectorIndex`].

mod memory;
mod sqlite;
mod store;

pub use memory::MemoryIndex;
pub use sqlite::SqliteIndex;
pub use store::ContentStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a piece of knowledge came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemMetadata {
    /// Source URL, or empty when unknown.
    pub source: String,
    /// Human-readable title.
    pub title: String,
}

/// A stored unit of knowledge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeItem {
    /// Source URL, or a content-derived id when the source is empty.
    pub id: String,
    pub text: String,
    pub metadata: ItemMetadata,
    /// When the item was stored.
    pub learned_at: DateTime<Utc>,
}

/// Input to [`ContentStore::add`].
#[derive(Debug, Clone)]
pub struct NewKnowledge {
    pub text: String,
    pub metadata: ItemMetadata,
}

/// A knowledge item with its similarity to a query.
#[derive(Debug, Clone)]
pub struct SimilarityMatch {
    pub item: KnowledgeItem,
    /// Similarity in [0, 1], higher is closer.
    pub score: f32,
}

/// An item ready for indexing.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub item: KnowledgeItem,
    pub embedding: Vec<f32>,
}

/// A nearest-neighbour hit as reported by an index.
#[derive(Debug, Clone)]
pub struct Neighbour {
    pub item: KnowledgeItem,
    /// Cosine distance (0 is identical, 2 is opposite).
    pub distance: f32,
}

/// Trait for vector index implementations.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert entries, replacing any with the same id.
    async fn upsert_batch(&self, entries: &[IndexEntry]) -> Result<usize>;

    /// Closest entries to `embedding`, nearest first.
    async fn nearest(&self, embedding: &[f32], limit: usize) -> Result<Vec<Neighbour>>;

    /// Number of stored items.
    async fn count(&self) -> Result<usize>;

    /// All stored items, most recently learned first.
    async fn list(&self) -> Result<Vec<KnowledgeItem>>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Cosine distance, the quantity indexes rank by.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}

/// Rank `entries` by distance to `embedding`, keeping the closest `limit`.
pub(crate) fn rank<'a>(
    embedding: &[f32],
    entries: impl Iterator<Item = (&'a KnowledgeItem, &'a [f32])>,
    limit: usize,
) -> Vec<Neighbour> {
    let mut hits: Vec<Neighbour> = entries
        .map(|(item, stored)| Neighbour {
            item: item.clone(),
            distance: cosine_distance(embedding, stored),
        })
        .collect();

    hits.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    hits.truncate(limit);
    hits
}
