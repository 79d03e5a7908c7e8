//! Query engine facade: composes the rewriter/intent classifier (C8), the
//! hybrid retriever (C9), the re-ranker (C10), and the answer assembler
//! (C11) into the public `search` operation `spec.md` §6 names, plus the
//! query-deadline and partial-collection-failure behaviour `spec.md` §5/§7
//! require.
//!
//! Grounded on `search::mod.rs::hybrid_search`'s single-function
//! orchestration shape (query in, ranked+assembled result out), widened to
//! call each collection independently so one collection's failure can be
//! isolated and downgrade confidence rather than aborting the whole query
//! (`spec.md` §7: "partial retrieval errors ... downgrade confidence by 0.2
//! per failed collection and annotate the response, they do not abort the
//! query").

use crate::core::chunk::CollectionName;
use crate::embed::TextEmbedder;
use crate::error::{Error, QueryError, Result};
use crate::query::analog::{AnalogHit, AnalogRequest, analog_search as run_analog_search};
use crate::query::assembler::{Answer, assemble_answer};
use crate::query::intent::{Intent, classify_intent};
use crate::query::rerank::{CrossEncoder, rerank};
use crate::query::retriever::{Candidate, RetrievalRequest, retrieve};
use crate::query::rewriter::rewrite_query;
use crate::store::{Filter, LexicalStore, VectorStore};
use std::cmp::Ordering;
use std::time::{Duration, Instant};
use tracing::warn;

/// The four collections a general query fans out across, per `spec.md`
/// §3's canonical collection list.
const ALL_COLLECTIONS: [CollectionName; 4] = [
    CollectionName::Text,
    CollectionName::Table,
    CollectionName::Drawing,
    CollectionName::Ifc,
];

/// Confidence penalty applied per collection that failed during fan-out
/// (`spec.md` §7).
const PARTIAL_FAILURE_PENALTY: f32 = 0.2;

/// One assembled query result: the answer plus the intent and confidence
/// penalty diagnostics that produced it.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    /// The classified intent used to shape the answer.
    pub intent: Intent,
    /// Number of collections that failed during fan-out (`spec.md` §7).
    pub failed_collections: usize,
    /// The assembled, intent-shaped, cited answer.
    pub answer: Answer,
}

fn merge_into(pool: &mut Vec<Candidate>, mut more: Vec<Candidate>) {
    pool.append(&mut more);
}

/// Runs the full query pipeline: rewrite → classify intent → per-collection
/// retrieval fan-out (each collection's failure is isolated and recorded,
/// not fatal) → re-rank → assemble.
///
/// A query that exceeds `deadline` before fan-out completes fails with
/// [`crate::error::Error::Timeout`] and returns no partial results, per
/// `spec.md` §5.
///
/// # Errors
///
/// Returns [`crate::error::Error::Timeout`] if `deadline` elapses during
/// fan-out. Does not fail merely because some collections errored — those
/// are folded into [`QueryOutcome::failed_collections`] instead.
pub fn search(
    vector: &dyn VectorStore,
    lexical: &dyn LexicalStore,
    embedder: &dyn TextEmbedder,
    cross_encoder: &dyn CrossEncoder,
    query: &str,
    filter: Filter,
    similarity_floor: f32,
    deadline: Duration,
) -> Result<QueryOutcome> {
    let started = Instant::now();
    let rewrites = rewrite_query(query);
    let (intent, _confidence) = classify_intent(&rewrites.original, &rewrites.references);

    let mut pool: Vec<Candidate> = Vec::new();
    let mut failed_collections = 0usize;
    for &collection in &ALL_COLLECTIONS {
        if started.elapsed() > deadline {
            return Err(Error::Query(QueryError::DeadlineExceeded));
        }
        let request = RetrievalRequest::new(&rewrites, std::slice::from_ref(&collection), filter.clone());
        match retrieve(vector, lexical, embedder, &request) {
            Ok(hits) => merge_into(&mut pool, hits),
            Err(e) => {
                warn!(collection = collection.as_str(), error = %e, "collection fan-out failed");
                failed_collections += 1;
            }
        }
    }

    if started.elapsed() > deadline {
        return Err(Error::Query(QueryError::DeadlineExceeded));
    }

    pool.sort_by(|a, b| {
        b.fused_score
            .partial_cmp(&a.fused_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.chunk.common().document_id.cmp(&b.chunk.common().document_id))
    });
    pool.truncate(crate::query::retriever::RERANK_TOP_K);

    let ranked = rerank(query, pool, cross_encoder, similarity_floor)?;
    let mut answer = assemble_answer(intent, &ranked);
    if failed_collections > 0 && answer.confidence > 0.0 {
        answer.confidence = (answer.confidence - PARTIAL_FAILURE_PENALTY * failed_collections as f32).max(0.0);
    }

    Ok(QueryOutcome {
        intent,
        failed_collections,
        answer,
    })
}

/// Runs the analog-search pipeline (`spec.md` §4.12) with the same
/// query-deadline behaviour as [`search`].
///
/// # Errors
///
/// Returns [`crate::error::Error::Timeout`] if `deadline` elapses before
/// the pipeline completes; otherwise propagates store/embedder/rerank
/// errors.
pub fn analog_search(
    vector: &dyn VectorStore,
    lexical: &dyn LexicalStore,
    embedder: &dyn TextEmbedder,
    cross_encoder: &dyn CrossEncoder,
    request: &AnalogRequest,
    tolerance: f64,
    deadline: Duration,
) -> Result<Vec<AnalogHit>> {
    let started = Instant::now();
    let hits = run_analog_search(vector, lexical, embedder, cross_encoder, request, tolerance)?;
    if started.elapsed() > deadline {
        return Err(Error::Query(QueryError::DeadlineExceeded));
    }
    Ok(hits)
}
