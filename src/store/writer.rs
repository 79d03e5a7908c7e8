//! The dual-index writer: the only component allowed to mutate a
//! [`super::VectorStore`] or [`super::LexicalStore`] (`spec.md` §3/§4.6).
//!
//! Grounded on `storage::sqlite::SqliteStorage::store_embeddings_batch`'s
//! transaction-then-trigger-sync idiom, generalized to two independent
//! stores written in a fixed order (vector first, then lexical) with a
//! per-collection write lease serializing concurrent batches so readers
//! never observe a chunk indexed in one store but not the other for longer
//! than a single batch commit.

use crate::core::chunk::{Chunk, CollectionName};
use crate::core::job::Job;
use crate::error::Result;
use crate::store::{DeleteSelector, LexicalStore, VectorStore};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Writes chunks through both indexes in the fixed order `spec.md` §4.6
/// requires: vector store first, lexical store second, so that a crash
/// mid-batch never leaves a chunk lexically findable but absent from dense
/// search (the hybrid retriever's fallback order assumes the reverse is the
/// only possible skew).
pub struct DualIndexWriter<V, L> {
    vector: Arc<V>,
    lexical: Arc<L>,
    leases: Mutex<HashMap<CollectionName, Arc<Mutex<()>>>>,
}

impl<V, L> DualIndexWriter<V, L>
where
    V: VectorStore,
    L: LexicalStore,
{
    /// Creates a writer over the given vector and lexical stores.
    pub fn new(vector: Arc<V>, lexical: Arc<L>) -> Self {
        Self {
            vector,
            lexical,
            leases: Mutex::new(HashMap::new()),
        }
    }

    fn lease(&self, collection: CollectionName) -> Arc<Mutex<()>> {
        let mut leases = self.leases.lock().expect("lease map poisoned");
        leases
            .entry(collection)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Writes one batch of chunks-with-vectors into `collection`, then
    /// advances `job`'s counters as the batch's visibility marker — callers
    /// observing `job.counters.chunks_indexed` can rely on every counted
    /// chunk being present in both stores.
    ///
    /// Idempotent: re-applying the same batch (same chunk ids, same
    /// content) is a no-op past the first application; applying it with
    /// differing content for an existing id surfaces
    /// [`crate::error::StorageError::IdCollision`] from the vector store.
    ///
    /// # Errors
    ///
    /// Returns an error if either store's write fails.
    pub fn upsert_batch(
        &self,
        collection: CollectionName,
        job: &mut Job,
        batch: &[(Chunk, Vec<f32>)],
    ) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let lease = self.lease(collection);
        let _guard = lease.lock().expect("collection lease poisoned");

        self.vector.create_collection(collection)?;
        self.vector.upsert_points(collection, batch)?;

        let chunks: Vec<Chunk> = batch.iter().map(|(chunk, _)| chunk.clone()).collect();
        self.lexical.upsert_documents(collection, &chunks)?;

        #[allow(clippy::cast_possible_truncation)]
        let count = chunks.len() as u64;
        job.counters.chunks_indexed += count;
        Ok(())
    }

    /// Deletes from both stores under the collection's write lease. Vector
    /// deletion runs first to match the write order.
    ///
    /// # Errors
    ///
    /// Returns an error if either store's delete fails.
    pub fn delete(&self, collection: CollectionName, selector: &DeleteSelector) -> Result<usize> {
        let lease = self.lease(collection);
        let _guard = lease.lock().expect("collection lease poisoned");
        let deleted = self.vector.delete_points(collection, selector)?;
        self.lexical.delete(collection, selector)?;
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chunk::{CommonPayload, TextChunk};
    use crate::store::filter::Filter;
    use crate::store::sqlite::SqliteStore;

    fn chunk(position: usize, content: &str) -> Chunk {
        Chunk::Text(TextChunk {
            common: CommonPayload::minimal("doc-1", position),
            content: content.to_string(),
            token_count: 2,
            page: None,
            overlap: 0,
        })
    }

    fn writer() -> DualIndexWriter<SqliteStore, SqliteStore> {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        DualIndexWriter::new(store.clone(), store)
    }

    #[test]
    fn test_upsert_batch_writes_both_indexes_and_advances_counters() {
        let writer = writer();
        let mut job = Job::new("job-1", "arc-1", 0);
        let batch = vec![(chunk(0, "centrifugal pump"), vec![1.0, 0.0])];
        writer.upsert_batch(CollectionName::Text, &mut job, &batch).unwrap();
        assert_eq!(job.counters.chunks_indexed, 1);

        let dense = writer.vector.search(CollectionName::Text, &[1.0, 0.0], &Filter::new(), 10).unwrap();
        assert_eq!(dense.len(), 1);
        let lexical = writer.lexical.search(CollectionName::Text, "pump", &Filter::new(), 10).unwrap();
        assert_eq!(lexical.len(), 1);
    }

    #[test]
    fn test_upsert_batch_empty_is_noop() {
        let writer = writer();
        let mut job = Job::new("job-1", "arc-1", 0);
        writer.upsert_batch(CollectionName::Text, &mut job, &[]).unwrap();
        assert_eq!(job.counters.chunks_indexed, 0);
    }

    #[test]
    fn test_upsert_batch_idempotent_reapply() {
        let writer = writer();
        let mut job = Job::new("job-1", "arc-1", 0);
        let batch = vec![(chunk(0, "centrifugal pump"), vec![1.0, 0.0])];
        writer.upsert_batch(CollectionName::Text, &mut job, &batch).unwrap();
        writer.upsert_batch(CollectionName::Text, &mut job, &batch).unwrap();
        let info = writer.vector.get_collection_info(CollectionName::Text).unwrap();
        assert_eq!(info.point_count, 1);
    }

    #[test]
    fn test_delete_removes_from_both_indexes() {
        let writer = writer();
        let mut job = Job::new("job-1", "arc-1", 0);
        let batch = vec![(chunk(0, "centrifugal pump"), vec![1.0, 0.0])];
        writer.upsert_batch(CollectionName::Text, &mut job, &batch).unwrap();
        let deleted = writer
            .delete(CollectionName::Text, &DeleteSelector::Ids(vec![chunk(0, "x").id()]))
            .unwrap();
        assert_eq!(deleted, 1);
        let info = writer.vector.get_collection_info(CollectionName::Text).unwrap();
        assert_eq!(info.point_count, 0);
        let lexical = writer.lexical.search(CollectionName::Text, "pump", &Filter::new(), 10).unwrap();
        assert!(lexical.is_empty());
    }
}
