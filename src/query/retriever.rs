//! Hybrid retriever (C9): parallel direct-reference, dense, and lexical
//! fan-out with weighted score fusion, per `spec.md` §4.9.
//!
//! Grounded on the teacher's `search::mod.rs` `hybrid_search` orchestration
//! shape, generalized from a single-collection, single-query search to
//! multi-collection fan-out over a rewrite set, with
//! `search::rrf`-style weighted combination replaced by the spec's direct
//! weighted-score fusion (not rank-based — reciprocal rank fusion assumes
//! homogeneous rank lists, which dense/lexical/reference lookups are not
//! here since reference hits bypass ranking entirely).

use crate::core::chunk::{Chunk, CollectionName};
use crate::embed::TextEmbedder;
use crate::error::Result;
use crate::query::rewriter::RewriteSet;
use crate::store::{Filter, LexicalStore, VectorStore};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Weight given to lexical (BM25-equivalent) contributions in fusion.
pub const W_BM25: f32 = 0.3;
/// Weight given to dense (cosine) contributions in fusion.
pub const W_DENSE: f32 = 0.4;
/// Candidates retained after fusion, before re-ranking.
pub const RERANK_TOP_K: usize = 50;
/// Default per-collection, per-rewrite hit cap for dense/lexical search.
pub const DEFAULT_TOP_N: usize = 30;

/// How a candidate entered the pool. Upgrades to `Hybrid` when a chunk is
/// found by more than one search type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    /// Found via direct document-reference lookup.
    Reference,
    /// Found via dense (cosine) search only.
    Dense,
    /// Found via lexical (BM25-equivalent) search only.
    Lexical,
    /// Found via more than one search type; contributions summed.
    Hybrid,
}

/// One fused candidate prior to re-ranking.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// The matched chunk.
    pub chunk: Chunk,
    /// Fused score, summed across contributing search types, clamped to
    /// `[0.0, 1.0]`.
    pub fused_score: f32,
    /// How this candidate was found.
    pub search_type: SearchType,
}

/// Parameters for one retrieval call.
pub struct RetrievalRequest<'a> {
    /// The query's rewrite set (from [`crate::query::rewriter::rewrite_query`]).
    pub rewrites: &'a RewriteSet,
    /// Collections to fan out across.
    pub collections: &'a [CollectionName],
    /// Caller/always-on filter, ANDed into every sub-search.
    pub filter: Filter,
    /// Per-collection, per-rewrite hit cap for dense/lexical search.
    pub top_n: usize,
}

impl<'a> RetrievalRequest<'a> {
    /// Builds a request with the default `top_n` (30).
    #[must_use]
    pub fn new(rewrites: &'a RewriteSet, collections: &'a [CollectionName], filter: Filter) -> Self {
        Self {
            rewrites,
            collections,
            filter,
            top_n: DEFAULT_TOP_N,
        }
    }
}

type PoolKey = (String, Option<String>, Option<String>, String);

fn pool_key(chunk: &Chunk) -> PoolKey {
    let common = chunk.common();
    (
        common.document_id.clone(),
        common.section.clone(),
        common.clause.clone(),
        chunk.id().to_hex(),
    )
}

fn merge_contribution(
    pool: &mut HashMap<PoolKey, Candidate>,
    chunk: Chunk,
    contribution: f32,
    search_type: SearchType,
) {
    let key = pool_key(&chunk);
    pool.entry(key)
        .and_modify(|existing| {
            existing.fused_score = (existing.fused_score + contribution).min(1.0);
            if existing.search_type != search_type {
                existing.search_type = SearchType::Hybrid;
            }
        })
        .or_insert(Candidate {
            chunk,
            fused_score: contribution.clamp(0.0, 1.0),
            search_type,
        });
}

/// Executes the hybrid retrieval fan-out for one query, returning up to
/// [`RERANK_TOP_K`] fused candidates sorted by `fused_score` descending,
/// ties broken by `(document_id, chunk_id)` for determinism.
///
/// # Errors
///
/// Returns an error if any store or the embedder fails.
pub fn retrieve(
    vector: &dyn VectorStore,
    lexical: &dyn LexicalStore,
    embedder: &dyn TextEmbedder,
    request: &RetrievalRequest<'_>,
) -> Result<Vec<Candidate>> {
    let mut pool: HashMap<PoolKey, Candidate> = HashMap::new();

    for reference in &request.rewrites.references {
        let mut ref_filter = request.filter.clone().with_equals("doc_family", &reference.family);
        if let Some(year) = &reference.year {
            ref_filter = ref_filter.with_equals("doc_number", format!("{}-{}", reference.number, year));
        }
        for &collection in request.collections {
            let hits = vector.scroll(collection, &ref_filter, 10)?;
            for chunk in hits {
                merge_contribution(&mut pool, chunk, 1.0, SearchType::Reference);
            }
        }
    }

    for candidate in &request.rewrites.candidates {
        let confidence = candidate.confidence;
        let embedding = embedder.embed(&candidate.text)?;
        for &collection in request.collections {
            let dense_hits = vector.search(collection, &embedding, &request.filter, request.top_n)?;
            for hit in dense_hits {
                let contribution = hit.score * W_DENSE * confidence;
                merge_contribution(&mut pool, hit.chunk, contribution, SearchType::Dense);
            }

            let lexical_hits = lexical.search(collection, &candidate.text, &request.filter, request.top_n)?;
            for hit in lexical_hits {
                let contribution = hit.score * W_BM25 * confidence;
                merge_contribution(&mut pool, hit.chunk, contribution, SearchType::Lexical);
            }
        }
    }

    let mut candidates: Vec<Candidate> = pool.into_values().collect();
    candidates.sort_by(|a, b| {
        b.fused_score
            .partial_cmp(&a.fused_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.chunk.common().document_id.cmp(&b.chunk.common().document_id))
            .then_with(|| a.chunk.id().to_hex().cmp(&b.chunk.id().to_hex()))
    });
    candidates.truncate(RERANK_TOP_K);
    Ok(candidates)
}
