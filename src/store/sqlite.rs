//! SQLite-backed reference implementation of [`super::VectorStore`] and
//! [`super::LexicalStore`].
//!
//! Grounded on `storage::sqlite::SqliteStorage`'s connection-management and
//! transaction-wrapped batch-insert style (`store_embeddings_batch`,
//! `search_fts`), generalized to the per-collection `points`/`lexical_fts`
//! schema in [`super::schema`]. Filtering beyond the SQL-indexed columns
//! (numeric-fact ranges, set-membership) is applied in Rust via
//! [`super::filter::Filter::matches`] after a bounded SQL fetch — a
//! deliberate simplification appropriate to a reference/test store; a
//! production deployment swaps this trait implementation for a real vector
//! database (see `DESIGN.md`).

#![allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]

use crate::core::chunk::{Chunk, CollectionName};
use crate::core::chunk_id::{ChunkId, content_hash};
use crate::error::{Result, StorageError};
use crate::store::filter::Filter;
use crate::store::schema::{CHECK_SCHEMA_SQL, SCHEMA_SQL};
use crate::store::{CollectionInfo, DeleteSelector, LexicalHit, LexicalStore, ScoredPoint, VectorStore};
use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::Mutex;

/// A `SQLite`-backed store implementing both index protocols over one
/// connection, guarded by a mutex since both traits require only `&self`
/// (interior mutability, matching `spec.md` §5's "read paths are
/// lock-free" intent for the *logical* read API even though this reference
/// implementation serializes physical access).
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens or creates a `SQLite`-backed store at `path`, creating the
    /// schema if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the database cannot be opened or the
    /// schema cannot be created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| StorageError::Database(e.to_string()))?;
            }
        }
        let conn = Connection::open(path).map_err(StorageError::from)?;
        let store = Self { conn: Mutex::new(conn) };
        store.init()?;
        Ok(store)
    }

    /// Creates an in-memory store. Useful for tests and the CLI demo mode.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the schema cannot be created.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        let store = Self { conn: Mutex::new(conn) };
        store.init()?;
        Ok(store)
    }

    fn init(&self) -> Result<()> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        conn.execute_batch(SCHEMA_SQL).map_err(StorageError::from)?;
        let initialized: i64 = conn
            .query_row(CHECK_SCHEMA_SQL, [], |row| row.get(0))
            .map_err(StorageError::from)?;
        if initialized == 0 {
            return Err(StorageError::Migration("schema creation verification failed".to_string()).into());
        }
        Ok(())
    }

    fn now() -> i64 {
        #[allow(clippy::cast_possible_wrap)]
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }

    fn serialize_vector(vector: &[f32]) -> Vec<u8> {
        vector.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn deserialize_vector(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    fn deserialize_payload(payload: &str) -> Result<Chunk> {
        serde_json::from_str(payload).map_err(|e| StorageError::Serialization(e.to_string()).into())
    }
}

impl VectorStore for SqliteStore {
    fn create_collection(&self, _collection: CollectionName) -> Result<()> {
        // Collections share the single `points` table partitioned by the
        // `collection` column; no per-collection DDL is needed, making this
        // trivially idempotent.
        Ok(())
    }

    fn upsert_points(&self, collection: CollectionName, points: &[(Chunk, Vec<f32>)]) -> Result<()> {
        let mut conn = self.conn.lock().expect("store mutex poisoned");
        let tx = conn.transaction().map_err(StorageError::from)?;
        let now = Self::now();
        for (chunk, vector) in points {
            let common = chunk.common();
            let chunk_id = common.chunk_id.to_hex();
            let content = chunk.searchable_text();
            let hash = content_hash(content.as_bytes());

            let existing_hash: Option<String> = tx
                .query_row(
                    "SELECT content_hash FROM points WHERE collection = ? AND chunk_id = ?",
                    params![collection.as_str(), chunk_id],
                    |row| row.get(0),
                )
                .ok();
            if let Some(existing) = existing_hash {
                if existing != hash {
                    return Err(StorageError::IdCollision { id: chunk_id }.into());
                }
            }

            let payload = serde_json::to_string(chunk).map_err(|e| StorageError::Serialization(e.to_string()))?;
            tx.execute(
                r"
                INSERT INTO points (
                    collection, chunk_id, document_id, archive_id, discipline,
                    doc_family, doc_number, confidentiality, content, content_hash,
                    payload, embedding, dims, created_at
                ) VALUES (?,?,?,?,?,?,?,?,?,?,?,?,?,?)
                ON CONFLICT(collection, chunk_id) DO UPDATE SET
                    content = excluded.content,
                    content_hash = excluded.content_hash,
                    payload = excluded.payload,
                    embedding = excluded.embedding,
                    dims = excluded.dims
                ",
                params![
                    collection.as_str(),
                    chunk_id,
                    common.document_id,
                    common.archive_id,
                    common.discipline,
                    common.doc_family,
                    common.doc_number,
                    common.confidentiality,
                    content,
                    hash,
                    payload,
                    Self::serialize_vector(vector),
                    vector.len() as i64,
                    now,
                ],
            )
            .map_err(StorageError::from)?;
        }
        tx.commit().map_err(StorageError::from)?;
        Ok(())
    }

    fn search(
        &self,
        collection: CollectionName,
        query: &[f32],
        filter: &Filter,
        limit: usize,
    ) -> Result<Vec<ScoredPoint>> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let mut stmt = conn
            .prepare("SELECT payload, embedding FROM points WHERE collection = ?")
            .map_err(StorageError::from)?;
        let rows = stmt
            .query_map(params![collection.as_str()], |row| {
                let payload: String = row.get(0)?;
                let embedding: Vec<u8> = row.get(1)?;
                Ok((payload, embedding))
            })
            .map_err(StorageError::from)?;

        let mut scored = Vec::new();
        for row in rows {
            let (payload, embedding) = row.map_err(StorageError::from)?;
            let chunk = Self::deserialize_payload(&payload)?;
            if !filter.matches(&chunk) {
                continue;
            }
            let vector = Self::deserialize_vector(&embedding);
            let score = crate::embed::cosine_similarity(query, &vector).max(0.0);
            scored.push(ScoredPoint { chunk, score });
        }
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk.id().to_hex().cmp(&b.chunk.id().to_hex()))
        });
        scored.truncate(limit);
        Ok(scored)
    }

    fn scroll(&self, collection: CollectionName, filter: &Filter, limit: usize) -> Result<Vec<Chunk>> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let mut stmt = conn
            .prepare("SELECT payload FROM points WHERE collection = ?")
            .map_err(StorageError::from)?;
        let rows = stmt
            .query_map(params![collection.as_str()], |row| row.get::<_, String>(0))
            .map_err(StorageError::from)?;

        let mut chunks = Vec::new();
        for row in rows {
            let payload = row.map_err(StorageError::from)?;
            let chunk = Self::deserialize_payload(&payload)?;
            if filter.matches(&chunk) {
                chunks.push(chunk);
                if chunks.len() >= limit {
                    break;
                }
            }
        }
        Ok(chunks)
    }

    fn delete_points(&self, collection: CollectionName, selector: &DeleteSelector) -> Result<usize> {
        match selector {
            DeleteSelector::Ids(ids) => {
                let conn = self.conn.lock().expect("store mutex poisoned");
                let mut deleted = 0usize;
                for id in ids {
                    deleted += conn
                        .execute(
                            "DELETE FROM points WHERE collection = ? AND chunk_id = ?",
                            params![collection.as_str(), id.to_hex()],
                        )
                        .map_err(StorageError::from)?;
                }
                Ok(deleted)
            }
            DeleteSelector::Filter(filter) => {
                let matching = self.scroll(collection, filter, usize::MAX)?;
                let ids: Vec<ChunkId> = matching.iter().map(Chunk::id).collect();
                self.delete_points(collection, &DeleteSelector::Ids(ids))
            }
        }
    }

    fn get_collection_info(&self, collection: CollectionName) -> Result<CollectionInfo> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM points WHERE collection = ?",
                params![collection.as_str()],
                |row| row.get(0),
            )
            .map_err(StorageError::from)?;
        let dims: Option<i64> = conn
            .query_row(
                "SELECT dims FROM points WHERE collection = ? LIMIT 1",
                params![collection.as_str()],
                |row| row.get(0),
            )
            .ok();
        Ok(CollectionInfo {
            point_count: count as usize,
            vector_width: dims.map(|d| d as usize),
        })
    }
}

impl LexicalStore for SqliteStore {
    fn upsert_documents(&self, collection: CollectionName, chunks: &[Chunk]) -> Result<()> {
        let mut conn = self.conn.lock().expect("store mutex poisoned");
        let tx = conn.transaction().map_err(StorageError::from)?;
        for chunk in chunks {
            let text = chunk.searchable_text();
            if text.is_empty() {
                continue;
            }
            let chunk_id = chunk.id().to_hex();
            tx.execute(
                "DELETE FROM lexical_fts WHERE collection = ? AND chunk_id = ?",
                params![collection.as_str(), chunk_id],
            )
            .map_err(StorageError::from)?;
            tx.execute(
                "INSERT INTO lexical_fts (content, collection, chunk_id) VALUES (?, ?, ?)",
                params![text, collection.as_str(), chunk_id],
            )
            .map_err(StorageError::from)?;
        }
        tx.commit().map_err(StorageError::from)?;
        Ok(())
    }

    fn delete(&self, collection: CollectionName, selector: &DeleteSelector) -> Result<usize> {
        match selector {
            DeleteSelector::Ids(ids) => {
                let conn = self.conn.lock().expect("store mutex poisoned");
                let mut deleted = 0usize;
                for id in ids {
                    deleted += conn
                        .execute(
                            "DELETE FROM lexical_fts WHERE collection = ? AND chunk_id = ?",
                            params![collection.as_str(), id.to_hex()],
                        )
                        .map_err(StorageError::from)?;
                }
                Ok(deleted)
            }
            DeleteSelector::Filter(filter) => {
                let matching = VectorStore::scroll(self, collection, filter, usize::MAX)?;
                let ids: Vec<ChunkId> = matching.iter().map(Chunk::id).collect();
                self.delete(collection, &DeleteSelector::Ids(ids))
            }
        }
    }

    fn search(
        &self,
        collection: CollectionName,
        query: &str,
        filter: &Filter,
        limit: usize,
    ) -> Result<Vec<LexicalHit>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let fts_query = query
            .split_whitespace()
            .map(|term| format!("\"{}\"", term.replace('"', "\"\"")))
            .collect::<Vec<_>>()
            .join(" OR ");

        let conn = self.conn.lock().expect("store mutex poisoned");
        let mut stmt = conn
            .prepare(
                r"
                SELECT f.chunk_id, -bm25(lexical_fts) as score
                FROM lexical_fts f
                WHERE f.collection = ? AND lexical_fts MATCH ?
                ORDER BY score DESC
                LIMIT ?
                ",
            )
            .map_err(StorageError::from)?;
        let hits: Vec<(String, f64)> = stmt
            .query_map(
                params![collection.as_str(), fts_query, (limit * 4).max(limit) as i64],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?)),
            )
            .map_err(StorageError::from)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StorageError::from)?;

        let top_score = hits.first().map_or(1.0, |(_, s)| s.max(f64::EPSILON));

        let mut results = Vec::new();
        for (chunk_id, score) in hits {
            let payload: Option<String> = conn
                .query_row(
                    "SELECT payload FROM points WHERE collection = ? AND chunk_id = ?",
                    params![collection.as_str(), chunk_id],
                    |row| row.get(0),
                )
                .ok();
            let Some(payload) = payload else { continue };
            let chunk = Self::deserialize_payload(&payload)?;
            if !filter.matches(&chunk) {
                continue;
            }
            #[allow(clippy::cast_possible_truncation)]
            let normalized = (score / top_score) as f32;
            results.push(LexicalHit {
                chunk,
                score: normalized.clamp(0.0, 1.0),
            });
            if results.len() >= limit {
                break;
            }
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chunk::{CommonPayload, TextChunk};

    fn sample_chunk(position: usize, content: &str, discipline: &str) -> Chunk {
        Chunk::Text(TextChunk {
            common: CommonPayload {
                discipline: Some(discipline.to_string()),
                ..CommonPayload::minimal("doc-1", position)
            },
            content: content.to_string(),
            token_count: 4,
            page: None,
            overlap: 0,
        })
    }

    #[test]
    fn test_upsert_and_search_round_trip() {
        let store = SqliteStore::in_memory().unwrap();
        let chunk = sample_chunk(0, "centrifugal pump flow rate", "process");
        store
            .upsert_points(CollectionName::Text, &[(chunk.clone(), vec![1.0, 0.0, 0.0])])
            .unwrap();
        let hits = store
            .search(CollectionName::Text, &[1.0, 0.0, 0.0], &Filter::new(), 5)
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert!((hits[0].score - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_upsert_idempotent() {
        let store = SqliteStore::in_memory().unwrap();
        let chunk = sample_chunk(0, "centrifugal pump", "process");
        store
            .upsert_points(CollectionName::Text, &[(chunk.clone(), vec![1.0, 0.0])])
            .unwrap();
        store
            .upsert_points(CollectionName::Text, &[(chunk, vec![1.0, 0.0])])
            .unwrap();
        let info = store.get_collection_info(CollectionName::Text).unwrap();
        assert_eq!(info.point_count, 1);
    }

    #[test]
    fn test_upsert_rejects_id_collision_with_differing_content() {
        let store = SqliteStore::in_memory().unwrap();
        let a = sample_chunk(0, "pump A", "process");
        let mut b = sample_chunk(0, "pump B, totally different content", "process");
        // Force the same chunk id despite different content.
        b.common_mut().chunk_id = a.id();
        store.upsert_points(CollectionName::Text, &[(a, vec![1.0])]).unwrap();
        let result = store.upsert_points(CollectionName::Text, &[(b, vec![1.0])]);
        assert!(result.is_err());
    }

    #[test]
    fn test_filter_restricts_search_results() {
        let store = SqliteStore::in_memory().unwrap();
        let process_chunk = sample_chunk(0, "pump", "process");
        let piping_chunk = sample_chunk(1, "pipe", "piping");
        store
            .upsert_points(
                CollectionName::Text,
                &[(process_chunk, vec![1.0, 0.0]), (piping_chunk, vec![1.0, 0.0])],
            )
            .unwrap();
        let filter = Filter::new().with_equals("discipline", "piping");
        let hits = store.search(CollectionName::Text, &[1.0, 0.0], &filter, 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chunk.common().discipline.as_deref(), Some("piping"));
    }

    #[test]
    fn test_lexical_search_finds_content() {
        let store = SqliteStore::in_memory().unwrap();
        let chunk = sample_chunk(0, "centrifugal pump ammonia transfer", "process");
        store.upsert_points(CollectionName::Text, &[(chunk.clone(), vec![1.0])]).unwrap();
        store.upsert_documents(CollectionName::Text, &[chunk]).unwrap();
        let hits = store
            .search(CollectionName::Text, "ammonia", &Filter::new(), 10)
            .unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_delete_by_filter() {
        let store = SqliteStore::in_memory().unwrap();
        let chunk = sample_chunk(0, "pump", "process");
        store.upsert_points(CollectionName::Text, &[(chunk.clone(), vec![1.0])]).unwrap();
        let filter = Filter::new().with_equals("archive_id", "arc-1");
        let deleted = store
            .delete_points(CollectionName::Text, &DeleteSelector::Filter(filter))
            .unwrap();
        assert_eq!(deleted, 1);
        let info = store.get_collection_info(CollectionName::Text).unwrap();
        assert_eq!(info.point_count, 0);
    }
}
