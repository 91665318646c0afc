//! In-memory vector index.
//!
//! Useful for testing and for sessions that should not persist anything.

use super::{rank, IndexEntry, KnowledgeItem, Neighbour, VectorIndex};
use crate::error::{Result, VettError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory vector index.
pub struct MemoryIndex {
    entries: RwLock<HashMap<String, IndexEntry>>,
}

impl MemoryIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> VettError {
    VettError::KnowledgeStore(format!("Index lock poisoned: {}", e))
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn upsert_batch(&self, entries: &[IndexEntry]) -> Result<usize> {
        let mut store = self.entries.write().map_err(poisoned)?;
        for entry in entries {
            store.insert(entry.item.id.clone(), entry.clone());
        }
        Ok(entries.len())
    }

    async fn nearest(&self, embedding: &[f32], limit: usize) -> Result<Vec<Neighbour>> {
        let store = self.entries.read().map_err(poisoned)?;
        Ok(rank(
            embedding,
            store.values().map(|e| (&e.item, e.embedding.as_slice())),
            limit,
        ))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.entries.read().map_err(poisoned)?.len())
    }

    async fn list(&self) -> Result<Vec<KnowledgeItem>> {
        let store = self.entries.read().map_err(poisoned)?;
        let mut items: Vec<KnowledgeItem> = store.values().map(|e| e.item.clone()).collect();
        items.sort_by(|a, b| b.learned_at.cmp(&a.learned_at));
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::ItemMetadata;
    use chrono::Utc;

    fn entry(id: &str, text: &str, embedding: Vec<f32>) -> IndexEntry {
        IndexEntry {
            item: KnowledgeItem {
                id: id.to_string(),
                text: text.to_string(),
                metadata: ItemMetadata {
                    source: id.to_string(),
                    title: text.to_string(),
                },
                learned_at: Utc::now(),
            },
            embedding,
        }
    }

    #[tokio::test]
    async fn test_memory_index() {
        let index = MemoryIndex::new();
        index
            .upsert_batch(&[
                entry("https://a", "alpha", vec![1.0, 0.0, 0.0]),
                entry("https://b", "beta", vec![0.0, 1.0, 0.0]),
            ])
            .await
            .unwrap();

        assert_eq!(index.count().await.unwrap(), 2);

        let hits = index.nearest(&[0.9, 0.1, 0.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].item.id, "https://a");
        assert!(hits[0].distance < hits[1].distance);
    }

    #[tokio::test]
    async fn test_upsert_replaces_same_id() {
        let index = MemoryIndex::new();
        index
            .upsert_batch(&[entry("https://a", "old", vec![1.0, 0.0])])
            .await
            .unwrap();
        index
            .upsert_batch(&[entry("https://a", "new", vec![1.0, 0.0])])
            .await
            .unwrap();

        let items = index.list().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].text, "new");
    }
}
