//! Re-ranker (C10): cross-encoder scoring over fused candidates, per
//! `spec.md` §4.10.
//!
//! Grounded on `embed::fallback::FallbackTextEmbedder`'s
//! deterministic-hash-based-but-dependency-free idiom: [`FakeCrossEncoder`]
//! scores by normalised lexical token overlap rather than a hash, since a
//! cross-encoder's contract (`score(query, doc) -> similarity`) is better
//! approximated by overlap than by a hash for tests that assert ranking
//! order.

use crate::core::chunk::Chunk;
use crate::error::Result;
use crate::query::retriever::{Candidate, SearchType};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Results retained after re-ranking, carrying the final combined score.
#[derive(Debug, Clone)]
pub struct RankedResult {
    /// The matched chunk.
    pub chunk: Chunk,
    /// How the chunk was originally found.
    pub search_type: SearchType,
    /// `0.3 * fused_score + 0.7 * rerank_score` (`spec.md` §4.10).
    pub final_score: f32,
}

/// Candidates retained after the similarity floor and `final_top_k` cap.
pub const FINAL_TOP_K: usize = 10;
/// Default similarity floor below which a result is dropped before
/// reaching the answer assembler.
pub const DEFAULT_SIMILARITY_FLOOR: f32 = 0.7;
/// Characters of `candidate_text` passed to the cross-encoder.
const CONTEXT_WINDOW: usize = 2000;

/// Scores `(query, doc)` pairs for relevance. No normalisation is required
/// of implementations; [`rerank`] min-max normalises per call.
pub trait CrossEncoder: Send + Sync {
    /// Scores every pair, returning one raw score per input pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn score(&self, pairs: &[(String, String)]) -> Result<Vec<f32>>;
}

/// Deterministic fake scoring by normalised token overlap between query and
/// document, for tests and environments without a model.
pub struct FakeCrossEncoder;

impl CrossEncoder for FakeCrossEncoder {
    fn score(&self, pairs: &[(String, String)]) -> Result<Vec<f32>> {
        Ok(pairs.iter().map(|(q, d)| token_overlap(q, d)).collect())
    }
}

fn token_overlap(query: &str, doc: &str) -> f32 {
    let query_tokens: HashSet<String> = query.to_lowercase().split_whitespace().map(String::from).collect();
    if query_tokens.is_empty() {
        return 0.0;
    }
    let doc_lower = doc.to_lowercase();
    let doc_tokens: HashSet<&str> = doc_lower.split_whitespace().collect();
    let overlap = query_tokens.iter().filter(|t| doc_tokens.contains(t.as_str())).count();
    #[allow(clippy::cast_precision_loss)]
    {
        overlap as f32 / query_tokens.len() as f32
    }
}

/// Builds the text passed to the cross-encoder:
/// `doc_title ⊕ section ⊕ clause ⊕ content`, truncated to
/// [`CONTEXT_WINDOW`] characters.
#[must_use]
pub fn candidate_text(chunk: &Chunk) -> String {
    let common = chunk.common();
    let mut text = String::new();
    if let Some(title) = &common.doc_title {
        text.push_str(title);
        text.push(' ');
    }
    if let Some(section) = &common.section {
        text.push_str(section);
        text.push(' ');
    }
    if let Some(clause) = &common.clause {
        text.push_str(clause);
        text.push(' ');
    }
    text.push_str(chunk.searchable_text());
    text.chars().take(CONTEXT_WINDOW).collect()
}

fn min_max(scores: &[f32]) -> (f32, f32) {
    let min = scores.iter().copied().fold(f32::INFINITY, f32::min);
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    (min, max)
}

/// Re-ranks `candidates` against `query`, combining fused and rerank
/// scores, dropping results below `similarity_floor`, and truncating to
/// [`FINAL_TOP_K`].
///
/// # Errors
///
/// Returns an error if the cross-encoder fails.
pub fn rerank(
    query: &str,
    candidates: Vec<Candidate>,
    cross_encoder: &dyn CrossEncoder,
    similarity_floor: f32,
) -> Result<Vec<RankedResult>> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let pairs: Vec<(String, String)> = candidates
        .iter()
        .map(|c| (query.to_string(), candidate_text(&c.chunk)))
        .collect();
    let raw_scores = cross_encoder.score(&pairs)?;
    let (min, max) = min_max(&raw_scores);
    let spread = max - min;

    let mut results: Vec<RankedResult> = candidates
        .into_iter()
        .zip(raw_scores)
        .map(|(candidate, raw)| {
            let normalized = if spread.abs() < f32::EPSILON { 0.5 } else { (raw - min) / spread };
            let final_score = 0.3 * candidate.fused_score + 0.7 * normalized;
            RankedResult {
                chunk: candidate.chunk,
                search_type: candidate.search_type,
                final_score,
            }
        })
        .collect();

    results.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.chunk.common().document_id.cmp(&b.chunk.common().document_id))
            .then_with(|| a.chunk.id().to_hex().cmp(&b.chunk.id().to_hex()))
    });
    results.retain(|r| r.final_score >= similarity_floor);
    results.truncate(FINAL_TOP_K);
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chunk::{CommonPayload, TextChunk};

    fn candidate(position: usize, content: &str, fused_score: f32) -> Candidate {
        Candidate {
            chunk: Chunk::Text(TextChunk {
                common: CommonPayload::minimal(&format!("doc-{position}"), position),
                content: content.to_string(),
                token_count: 4,
                page: None,
                overlap: 0,
            }),
            fused_score,
            search_type: SearchType::Hybrid,
        }
    }

    #[test]
    fn test_rerank_drops_below_floor() {
        let candidates = vec![candidate(0, "totally unrelated content", 0.1)];
        let results = rerank("centrifugal pump", candidates, &FakeCrossEncoder, 0.7).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_rerank_keeps_relevant_above_floor() {
        let candidates = vec![
            candidate(0, "centrifugal pump ammonia transfer", 0.8),
            candidate(1, "unrelated text about valves", 0.2),
        ];
        let results = rerank("centrifugal pump", candidates, &FakeCrossEncoder, 0.3).unwrap();
        assert!(!results.is_empty());
        assert_eq!(results[0].chunk.common().document_id, "doc-0");
    }

    #[test]
    fn test_rerank_empty_input() {
        let results = rerank("query", vec![], &FakeCrossEncoder, 0.7).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_rerank_truncates_to_final_top_k() {
        let candidates: Vec<Candidate> = (0..20).map(|i| candidate(i, "pump pump pump", 0.9)).collect();
        let results = rerank("pump", candidates, &FakeCrossEncoder, 0.0).unwrap();
        assert_eq!(results.len(), FINAL_TOP_K);
    }

    #[test]
    fn test_candidate_text_includes_title_and_content() {
        let mut chunk = candidate(0, "flow rate 1000", 0.5).chunk;
        chunk.common_mut().doc_title = Some("Pump Spec".to_string());
        let text = candidate_text(&chunk);
        assert!(text.contains("Pump Spec"));
        assert!(text.contains("flow rate"));
    }
}
