//! Per-process application value: owns every capability this crate's
//! public API (`spec.md` §6) needs and exposes `ingest`/`search`/
//! `analog_search`/`job_status` as plain methods over them.
//!
//! Grounded on `spec.md` §9's redesign flag "global module-level state ...
//! is replaced by a per-process `Core` value owning all capabilities and
//! background workers; its lifecycle is init at process start, orderly
//! drain on shutdown" — this struct is that value. It is generic over the
//! object store and index stores exactly like
//! [`crate::orchestrator::JobOrchestrator`], so the CLI wires production
//! implementations (`LocalObjectStore`, `SqliteStore`) and tests wire fakes
//! (`FakeObjectStore`, in-memory `SqliteStore`) through the same path.

use crate::config::Config;
use crate::core::job::Job;
use crate::embed::TextEmbedder;
use crate::error::Result;
use crate::orchestrator::{JobOrchestrator, JobStore, ObjectStore};
use crate::query::analog::{AnalogHit, AnalogRequest};
use crate::query::engine::{self, QueryOutcome};
use crate::query::rerank::CrossEncoder;
use crate::store::{Filter, LexicalStore, VectorStore};
use std::sync::Arc;
use std::time::Duration;

/// Owns the ingestion orchestrator and every capability the query engine
/// needs, sharing one pair of index stores between the write path (C6/C7)
/// and the read path (C8-C12), per `spec.md` §5's "the vector store and
/// lexical store are shared across pipelines".
pub struct Core<O, V, L, J> {
    orchestrator: JobOrchestrator<O, V, L, J>,
    vector_store: Arc<V>,
    lexical_store: Arc<L>,
    embedder: Arc<dyn TextEmbedder>,
    cross_encoder: Box<dyn CrossEncoder>,
    config: Config,
}

#[cfg(test)]
impl<O, V, L, J> Core<O, V, L, J> {
    fn vector_store_for_test(&self) -> &V {
        &self.vector_store
    }
}

impl<O, V, L, J> Core<O, V, L, J>
where
    O: ObjectStore + 'static,
    V: VectorStore + 'static,
    L: LexicalStore + 'static,
    J: JobStore + 'static,
{
    /// Assembles a `Core` from its capabilities. `embedder` is shared
    /// between the ingestion orchestrator (embedding chunks) and the query
    /// engine (embedding queries); `cross_encoder` powers re-ranking
    /// (C10) and is query-path-only.
    pub fn new(
        object_store: Arc<O>,
        vector_store: Arc<V>,
        lexical_store: Arc<L>,
        embedder: Arc<dyn TextEmbedder>,
        cross_encoder: Box<dyn CrossEncoder>,
        job_store: Arc<J>,
        config: Config,
    ) -> Self {
        let orchestrator = JobOrchestrator::new(
            object_store,
            vector_store.clone(),
            lexical_store.clone(),
            embedder.clone(),
            job_store,
            config.worker_pool_size,
        );
        Self {
            orchestrator,
            vector_store,
            lexical_store,
            embedder,
            cross_encoder,
            config,
        }
    }

    /// Ingests one archive from its raw manifest bytes (`spec.md` §4.7).
    ///
    /// # Errors
    ///
    /// Returns an error only if the job record itself could not be
    /// persisted; per-document failures are folded into the returned
    /// [`Job`] instead.
    pub fn ingest(&self, manifest_bytes: &[u8], now: i64) -> Result<Job> {
        self.orchestrator.ingest(manifest_bytes, now)
    }

    /// Reads back a job's current progress (`spec.md` §6 `job_status`).
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ErrorKind::NotFound`]-classified error if no
    /// job with `id` exists.
    pub fn job_status(&self, id: &str) -> Result<Job> {
        self.orchestrator.job_status(id)
    }

    /// Answers a natural-language query (`spec.md` §6 `search`).
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Timeout`] if the configured query
    /// deadline elapses before fan-out completes.
    pub fn search(&self, query: &str, filter: Filter) -> Result<QueryOutcome> {
        engine::search(
            self.vector_store.as_ref(),
            self.lexical_store.as_ref(),
            self.embedder.as_ref(),
            self.cross_encoder.as_ref(),
            query,
            filter,
            self.config.similarity_floor,
            Duration::from_millis(self.config.query_deadline_ms),
        )
    }

    /// Runs an analog-equipment search (`spec.md` §6 `analog_search`).
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Timeout`] if the configured query
    /// deadline elapses before the pipeline completes.
    pub fn analog_search(&self, request: &AnalogRequest) -> Result<Vec<AnalogHit>> {
        engine::analog_search(
            self.vector_store.as_ref(),
            self.lexical_store.as_ref(),
            self.embedder.as_ref(),
            self.cross_encoder.as_ref(),
            request,
            self.config.analog_tolerance,
            Duration::from_millis(self.config.query_deadline_ms),
        )
    }

    /// The effective configuration this `Core` was built with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chunk::CollectionName;
    use crate::embed::FallbackTextEmbedder;
    use crate::orchestrator::{FakeObjectStore, InMemoryJobStore};
    use crate::query::rerank::FakeCrossEncoder;
    use crate::store::sqlite::SqliteStore;
    use serde_json::json;

    fn harness() -> (Core<FakeObjectStore, SqliteStore, SqliteStore, InMemoryJobStore>, Arc<FakeObjectStore>) {
        let objects = Arc::new(FakeObjectStore::new());
        let vector = Arc::new(SqliteStore::in_memory().unwrap());
        let lexical = vector.clone();
        let embedder: Arc<dyn TextEmbedder> = Arc::new(FallbackTextEmbedder::new(16));
        let core = Core::new(
            objects.clone(),
            vector,
            lexical,
            embedder,
            Box::new(FakeCrossEncoder),
            Arc::new(InMemoryJobStore::new()),
            Config::default(),
        );
        (core, objects)
    }

    fn manifest_bytes() -> Vec<u8> {
        serde_json::to_vec(&json!({
            "archive_id": "arc-1",
            "project_id": "proj-1",
            "object_id": "obj-1",
            "phase": "pd",
            "customer": "Acme",
            "language": ["ru"],
            "confidentiality": "internal",
            "default_discipline": "process",
            "documents": [
                {"path": "process/pump.txt", "media_type": "text/plain", "permissions": ["internal"]}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_ingest_then_search_round_trip() {
        let (core, objects) = harness();
        objects.seed(
            "process/pump.txt",
            "Центробежный насос для перекачки аммиака. Производительность 1000 m3/h, напор 50 m.".as_bytes(),
        );
        let job = core.ingest(&manifest_bytes(), 1_000).unwrap();
        assert_eq!(job.counters.files_failed, 0);

        let outcome = core.search("центробежный насос", Filter::new()).unwrap();
        assert!(!outcome.answer.sources.is_empty());
    }

    #[test]
    fn test_job_status_roundtrip() {
        let (core, _objects) = harness();
        let job = core.ingest(&manifest_bytes(), 1_000).unwrap();
        let fetched = core.job_status(&job.id).unwrap();
        assert_eq!(fetched.id, job.id);
    }

    #[test]
    fn test_search_no_evidence() {
        let (core, _objects) = harness();
        let outcome = core.search("unrelated xyz123 qqqq", Filter::new()).unwrap();
        assert_eq!(outcome.answer.confidence, 0.0);
    }

    #[test]
    fn test_analog_search_empty_index() {
        let (core, _objects) = harness();
        let request = AnalogRequest {
            equipment_type: "насос".to_string(),
            numeric_params: vec![],
            filters: Filter::new(),
            limit: 5,
        };
        let hits = core.analog_search(&request).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_collections_created_idempotently() {
        let (core, _objects) = harness();
        for &collection in &[CollectionName::Text, CollectionName::Table, CollectionName::Drawing, CollectionName::Ifc] {
            core.vector_store_for_test().create_collection(collection).unwrap();
            core.vector_store_for_test().create_collection(collection).unwrap();
        }
    }
}
