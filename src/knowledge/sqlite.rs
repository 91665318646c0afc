//! SQLite-backed vector index.
//!
//! Embeddings are stored as little-endian f32 blobs and ranked in Rust.

use super::{rank, IndexEntry, ItemMetadata, KnowledgeItem, Neighbour, VectorIndex};
use crate::error::{Result, VettError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS knowledge (
        id TEXT PRIMARY KEY,
        text TEXT NOT NULL,
        source TEXT NOT NULL,
        title TEXT NOT NULL,
        embedding BLOB NOT NULL,
        learned_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_knowledge_learned_at ON knowledge(learned_at);
"#;

/// SQLite-backed vector index.
pub struct SqliteIndex {
    conn: Mutex<Connection>,
}

impl SqliteIndex {
    /// Open (or create) the index at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Opened knowledge index at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory index (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| VettError::KnowledgeStore(format!("Failed to acquire lock: {}", e)))
    }

    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    fn item_from_row(row: &Row<'_>) -> rusqlite::Result<KnowledgeItem> {
        let learned_at: String = row.get(4)?;
        Ok(KnowledgeItem {
            id: row.get(0)?,
            text: row.get(1)?,
            metadata: ItemMetadata {
                source: row.get(2)?,
                title: row.get(3)?,
            },
            learned_at: DateTime::parse_from_rfc3339(&learned_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}

#[async_trait]
impl VectorIndex for SqliteIndex {
    #[instrument(skip(self, entries), fields(count = entries.len()))]
    async fn upsert_batch(&self, entries: &[IndexEntry]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        for entry in entries {
            let item = &entry.item;
            tx.execute(
                r#"
                INSERT OR REPLACE INTO knowledge (id, text, source, title, embedding, learned_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    item.id,
                    item.text,
                    item.metadata.source,
                    item.metadata.title,
                    Self::embedding_to_bytes(&entry.embedding),
                    item.learned_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        debug!("Upserted {} knowledge items", entries.len());
        Ok(entries.len())
    }

    #[instrument(skip(self, embedding))]
    async fn nearest(&self, embedding: &[f32], limit: usize) -> Result<Vec<Neighbour>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT id, text, source, title, learned_at, embedding FROM knowledge")?;

        let rows: Vec<(KnowledgeItem, Vec<f32>)> = stmt
            .query_map([], |row| {
                let bytes: Vec<u8> = row.get(5)?;
                Ok((Self::item_from_row(row)?, Self::bytes_to_embedding(&bytes)))
            })?
            .collect::<rusqlite::Result<_>>()?;

        let hits = rank(
            embedding,
            rows.iter().map(|(item, stored)| (item, stored.as_slice())),
            limit,
        );
        debug!("Ranked {} of {} items", hits.len(), rows.len());
        Ok(hits)
    }

    async fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM knowledge", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    async fn list(&self) -> Result<Vec<KnowledgeItem>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, text, source, title, learned_at FROM knowledge ORDER BY learned_at DESC",
        )?;
        let items = stmt
            .query_map([], Self::item_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, text: &str, embedding: Vec<f32>) -> IndexEntry {
        IndexEntry {
            item: KnowledgeItem {
                id: id.to_string(),
                text: text.to_string(),
                metadata: ItemMetadata {
                    source: id.to_string(),
                    title: format!("Title of {}", text),
                },
                learned_at: Utc::now(),
            },
            embedding,
        }
    }

    #[tokio::test]
    async fn test_sqlite_index_roundtrip() {
        let index = SqliteIndex::in_memory().unwrap();
        index
            .upsert_batch(&[
                entry("https://a", "alpha", vec![1.0, 0.0, 0.0]),
                entry("https://b", "beta", vec![0.0, 1.0, 0.0]),
            ])
            .await
            .unwrap();

        assert_eq!(index.count().await.unwrap(), 2);

        let hits = index.nearest(&[0.0, 1.0, 0.0], 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].item.id, "https://b");
        assert_eq!(hits[0].item.metadata.title, "Title of beta");
        assert!(hits[0].distance.abs() < 0.001);
    }

    #[tokio::test]
    async fn test_sqlite_index_replaces_same_id() {
        let index = SqliteIndex::in_memory().unwrap();
        index
            .upsert_batch(&[entry("https://a", "first", vec![1.0, 0.0])])
            .await
            .unwrap();
        index
            .upsert_batch(&[entry("https://a", "second", vec![1.0, 0.0])])
            .await
            .unwrap();

        let items = index.list().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].text, "second");
    }

    #[tokio::test]
    async fn test_sqlite_index_persists_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("knowledge.db");

        {
            let index = SqliteIndex::new(&path).unwrap();
            index
                .upsert_batch(&[entry("https://a", "alpha", vec![1.0, 0.0])])
                .await
                .unwrap();
        }

        let reopened = SqliteIndex::new(&path).unwrap();
        assert_eq!(reopened.count().await.unwrap(), 1);
    }

    #[test]
    fn test_embedding_bytes_roundtrip() {
        let embedding = vec![0.25, -1.5, 3.0];
        let bytes = SqliteIndex::embedding_to_bytes(&embedding);
        assert_eq!(bytes.len(), 12);
        assert_eq!(SqliteIndex::bytes_to_embedding(&bytes), embedding);
    }
}
