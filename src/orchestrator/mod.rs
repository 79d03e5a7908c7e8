//! Job orchestrator (C7): drives one archive through
//! classify → fetch → parse → normalise → chunk → embed → index,
//! per `spec.md` §4.7.
//!
//! Grounded on `chunking::parallel::ParallelChunker`'s rayon fan-out idiom,
//! generalized from "parallelise one chunker over text segments" to
//! "parallelise the whole per-document pipeline over an archive's document
//! list", bounded to a fixed-size worker pool (default 4) with a bounded
//! `mpsc::sync_channel` carrying finished-document results back to the
//! single thread allowed to mutate [`Job`] and call
//! [`crate::store::writer::DualIndexWriter`] — back-pressure keeps memory
//! bounded when the embedder or index lags the parser/chunker stage.

pub mod job_store;
pub mod object_store;
pub mod retry;

pub use job_store::{InMemoryJobStore, JobStore, SqliteJobStore};
pub use object_store::{FakeObjectStore, LocalObjectStore, ObjectStore, now_unix};
pub use retry::with_retry;

use crate::chunk::{ChunkContext, chunk_document};
use crate::core::archive::Archive;
use crate::core::chunk::{Chunk, CollectionName};
use crate::core::chunk_id::content_hash;
use crate::core::document::Document;
use crate::core::job::{Job, JobPhase};
use crate::core::manifest::{Confidentiality, Manifest};
use crate::embed::TextEmbedder;
use crate::error::{Error, Result};
use crate::parse::{Block, parser_for_media_type};
use crate::store::writer::DualIndexWriter;
use crate::store::{LexicalStore, VectorStore};
use crate::text::language::Language;
use crate::text::normalize_block;
use rayon::ThreadPoolBuilder;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc;
use tracing::{info, warn};

fn confidentiality_tag(c: Confidentiality) -> &'static str {
    match c {
        Confidentiality::Public => "public",
        Confidentiality::Internal => "internal",
        Confidentiality::Confidential => "confidential",
        Confidentiality::Secret => "secret",
    }
}

struct DocumentOutcome {
    path: String,
    by_collection: Vec<(CollectionName, Vec<(Chunk, Vec<f32>)>)>,
    chunk_count: usize,
}

type DocResult = std::result::Result<DocumentOutcome, (String, String)>;

/// Drives the full ingestion pipeline for one archive at a time.
///
/// Generic over the object store and the two index stores so the CLI can
/// wire production (`LocalObjectStore`/`SqliteStore`) and tests can wire
/// fakes (`FakeObjectStore`/in-memory `SqliteStore`) through the same code
/// path.
pub struct JobOrchestrator<O, V, L, J> {
    object_store: Arc<O>,
    writer: DualIndexWriter<V, L>,
    embedder: Arc<dyn TextEmbedder>,
    job_store: Arc<J>,
    worker_pool_size: usize,
}

impl<O, V, L, J> JobOrchestrator<O, V, L, J>
where
    O: ObjectStore + 'static,
    V: VectorStore + 'static,
    L: LexicalStore + 'static,
    J: JobStore + 'static,
{
    /// Creates an orchestrator over the given capabilities.
    pub fn new(
        object_store: Arc<O>,
        vector_store: Arc<V>,
        lexical_store: Arc<L>,
        embedder: Arc<dyn TextEmbedder>,
        job_store: Arc<J>,
        worker_pool_size: usize,
    ) -> Self {
        Self {
            object_store,
            writer: DualIndexWriter::new(vector_store, lexical_store),
            embedder,
            job_store,
            worker_pool_size: worker_pool_size.max(1),
        }
    }

    /// Returns the current job, if one exists with this id.
    ///
    /// # Errors
    ///
    /// Returns an error classified as [`crate::error::ErrorKind::NotFound`]
    /// if no job with `id` exists.
    pub fn job_status(&self, id: &str) -> Result<Job> {
        self.job_store.get(id)
    }

    /// Ingests one archive: validates its manifest, then fetches, parses,
    /// normalises, chunks, embeds, and indexes every declared document.
    ///
    /// A malformed or missing manifest is a hard job failure (`spec.md`
    /// §6); a single document's failure is recorded on the job and does
    /// not abort the rest of the archive (`spec.md` §4.2/§4.7).
    ///
    /// # Errors
    ///
    /// Returns an error only if the job record itself could not be
    /// persisted; per-document failures are folded into the returned
    /// [`Job`] instead of propagated.
    pub fn ingest(&self, manifest_bytes: &[u8], now: i64) -> Result<Job> {
        let manifest_hash = content_hash(manifest_bytes);
        let job_id = format!("job-{manifest_hash}");

        let manifest = match Manifest::parse(manifest_bytes) {
            Ok(m) => m,
            Err(e) => {
                let mut job = Job::new(job_id, "unknown", now);
                job.fail(now, e.to_string());
                self.job_store.save(&job)?;
                warn!(error = %e, "manifest validation failed, job failed");
                return Ok(job);
            }
        };

        let mut job = Job::new(job_id, manifest.archive_id.clone(), now);
        let archive = Archive::from_manifest(&manifest, manifest_hash, now);
        job.counters.files_seen = archive.document_count() as u64;
        job.advance(JobPhase::Extracting);
        self.job_store.save(&job)?;
        info!(archive_id = %archive.id, files = archive.document_count(), "job started");

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.worker_pool_size)
            .build()
            .map_err(|e| Error::InvalidState {
                message: format!("failed to build worker pool: {e}"),
            })?;

        let (tx, rx) = mpsc::sync_channel::<DocResult>(self.worker_pool_size * 2);

        std::thread::scope(|scope| {
            scope.spawn(move || {
                pool.scope(|s| {
                    for doc in &archive.documents {
                        let tx = tx.clone();
                        s.spawn(move |_| {
                            let outcome = self.process_document(&archive, doc, now);
                            let _ = tx.send(outcome);
                        });
                    }
                });
            });

            job.advance(JobPhase::Indexing);
            for result in &rx {
                match result {
                    Ok(outcome) => {
                        job.counters.files_parsed += 1;
                        if outcome.chunk_count > 0 {
                            job.counters.files_chunked += 1;
                        }
                        job.counters.chunks_embedded += outcome.chunk_count as u64;
                        for (collection, batch) in outcome.by_collection {
                            if let Err(e) = self.writer.upsert_batch(collection, &mut job, &batch) {
                                job.record_failure(outcome.path.clone(), e.to_string());
                            }
                        }
                    }
                    Err((path, message)) => {
                        warn!(path = %path, error = %message, "document failed");
                        job.record_failure(path, message);
                    }
                }
            }
        });

        job.complete(now);
        self.job_store.save(&job)?;
        info!(
            job_id = %job.id,
            chunks_indexed = job.counters.chunks_indexed,
            files_failed = job.counters.files_failed,
            "job completed"
        );
        Ok(job)
    }

    fn process_document(&self, archive: &Archive, doc: &Document, now: i64) -> DocResult {
        let bytes = with_retry("object_store.fetch", || self.object_store.fetch(&doc.path))
            .map_err(|e| (doc.path.clone(), e.to_string()))?;
        let doc_hash = content_hash(&bytes);

        let parser = parser_for_media_type(&doc.media_type).ok_or_else(|| {
            (
                doc.path.clone(),
                format!("no parser registered for media type {}", doc.media_type),
            )
        })?;
        let parsed = parser.parse(&bytes).map_err(|e| (doc.path.clone(), e.to_string()))?;
        let method = parsed.method;

        let mut ru_count = 0usize;
        let mut en_count = 0usize;
        let normalized_blocks: Vec<Block> = parsed
            .blocks
            .into_iter()
            .map(|block| match block {
                Block::TextParagraph(text) => {
                    let normalized = normalize_block(&text);
                    match normalized.language {
                        Language::Ru => ru_count += 1,
                        Language::En => en_count += 1,
                    }
                    Block::TextParagraph(normalized.text)
                }
                other => other,
            })
            .collect();
        let dominant_language = if ru_count > en_count { Language::Ru } else { Language::En };

        let ctx = ChunkContext::new(doc.id.clone(), archive.id.clone(), doc_hash, now)
            .with_discipline(doc.discipline.as_str())
            .with_permissions(doc.permissions.clone())
            .with_confidentiality(confidentiality_tag(archive.confidentiality))
            .with_project(archive.project_id.clone(), archive.object_id.clone())
            .with_source_path(doc.path.clone())
            .with_language(dominant_language)
            .with_extraction_method(method)
            .with_issued_at(doc.issued_at)
            .with_vendor(doc.vendor.clone())
            .with_tags(doc.tags.clone());

        let chunks = chunk_document(&normalized_blocks, &ctx).map_err(|e| (doc.path.clone(), e.to_string()))?;

        let texts: Vec<&str> = chunks.iter().map(Chunk::searchable_text).collect();
        let vectors = with_retry("embedder.embed_batch", || self.embedder.embed_batch(&texts))
            .map_err(|e| (doc.path.clone(), e.to_string()))?;

        let mut grouped: HashMap<CollectionName, Vec<(Chunk, Vec<f32>)>> = HashMap::new();
        for (chunk, vector) in chunks.into_iter().zip(vectors) {
            grouped.entry(chunk.collection()).or_default().push((chunk, vector));
        }
        let chunk_count = grouped.values().map(Vec::len).sum();

        Ok(DocumentOutcome {
            path: doc.path.clone(),
            by_collection: grouped.into_iter().collect(),
            chunk_count,
        })
    }
}
