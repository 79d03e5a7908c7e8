//! Vector store + lexical store (C6 dual-index write path).
//!
//! Grounded on `storage::traits::Storage`/`storage::schema`/`storage::sqlite`
//! (FTS5 `porter unicode61` schema + sync triggers, BLOB f32 embedding
//! storage, brute-force cosine scan), generalized from the teacher's single
//! buffer/chunk schema to per-collection tables keyed by `(collection,
//! chunk_id)`, per `spec.md` §3/§4.6. [`VectorStore`] and [`LexicalStore`]
//! are the two capability traits every other write/read path in the crate
//! depends on; [`writer::DualIndexWriter`] is the only component allowed to
//! call their mutating methods (`spec.md` §3's "the dual-index writer is
//! the only component allowed to mutate either store").

pub mod filter;
pub mod schema;
pub mod sqlite;
pub mod writer;

pub use filter::Filter;
pub use sqlite::SqliteStore;
pub use writer::DualIndexWriter;

use crate::core::chunk::{Chunk, CollectionName};
use crate::error::Result;

/// A vector-store hit: the matched chunk and its similarity score.
#[derive(Debug, Clone)]
pub struct ScoredPoint {
    /// The matched chunk, including its common payload.
    pub chunk: Chunk,
    /// Cosine similarity in `[0.0, 1.0]` (clamped; raw cosine is `[-1, 1]`
    /// but embeddings in this domain are expected non-negative-dominant).
    pub score: f32,
}

/// A lexical-store hit: the matched chunk and its normalised BM25-style
/// score.
#[derive(Debug, Clone)]
pub struct LexicalHit {
    /// The matched chunk.
    pub chunk: Chunk,
    /// Score normalised to `[0.0, 1.0]` by the top hit within one call, per
    /// `spec.md` §4.9.
    pub score: f32,
}

/// Summary statistics for one collection.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionInfo {
    /// Number of points currently stored.
    pub point_count: usize,
    /// Configured vector width, if any points have been written.
    pub vector_width: Option<usize>,
}

/// A selector for points to delete: either an explicit id list or an
/// equality filter over common-payload fields (`spec.md` §4.6).
#[derive(Debug, Clone)]
pub enum DeleteSelector {
    /// Delete exactly these chunk ids.
    Ids(Vec<crate::core::chunk_id::ChunkId>),
    /// Delete every point matching this filter.
    Filter(Filter),
}

/// The dense vector index: one named collection per chunk type (`spec.md`
/// §3). Collections are created idempotently and never re-typed.
pub trait VectorStore: Send + Sync {
    /// Creates a collection if it does not already exist. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::StorageError`] if schema creation fails.
    fn create_collection(&self, collection: CollectionName) -> Result<()>;

    /// Upserts points into a collection. Idempotent: re-applying the same
    /// `(collection, chunk_id)` pairs with identical content yields the same
    /// state. Rejects a chunk id collision against differing content with
    /// [`crate::error::StorageError::IdCollision`] (fatal, per `spec.md`
    /// §4.6).
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::StorageError`] on a write failure or an id
    /// collision.
    fn upsert_points(&self, collection: CollectionName, points: &[(Chunk, Vec<f32>)]) -> Result<()>;

    /// Dense search: top-`limit` points by cosine similarity to `query`,
    /// restricted to points matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::StorageError`] on a read failure.
    fn search(
        &self,
        collection: CollectionName,
        query: &[f32],
        filter: &Filter,
        limit: usize,
    ) -> Result<Vec<ScoredPoint>>;

    /// Scrolls (filter-only, no ranking) up to `limit` points.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::StorageError`] on a read failure.
    fn scroll(&self, collection: CollectionName, filter: &Filter, limit: usize) -> Result<Vec<Chunk>>;

    /// Deletes points by id list or filter.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::StorageError`] on a write failure.
    fn delete_points(&self, collection: CollectionName, selector: &DeleteSelector) -> Result<usize>;

    /// Returns summary statistics for a collection.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::StorageError`] on a read failure.
    fn get_collection_info(&self, collection: CollectionName) -> Result<CollectionInfo>;
}

/// The lexical (full-text) index.
pub trait LexicalStore: Send + Sync {
    /// Indexes or replaces the lexical document for each chunk.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::StorageError`] on a write failure.
    fn upsert_documents(&self, collection: CollectionName, chunks: &[Chunk]) -> Result<()>;

    /// Deletes lexical documents by id list or filter.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::StorageError`] on a write failure.
    fn delete(&self, collection: CollectionName, selector: &DeleteSelector) -> Result<usize>;

    /// BM25-equivalent full-text search, scores normalised to `[0, 1]` by
    /// the top hit per call (`spec.md` §4.9).
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::StorageError`] on a read failure.
    fn search(
        &self,
        collection: CollectionName,
        query: &str,
        filter: &Filter,
        limit: usize,
    ) -> Result<Vec<LexicalHit>>;
}
