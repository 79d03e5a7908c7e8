//! Analog search (C12): specialised hybrid search for equipment lookups,
//! per `spec.md` §4.12.

use crate::core::chunk::{Chunk, CollectionName};
use crate::embed::TextEmbedder;
use crate::error::Result;
use crate::query::rerank::{CrossEncoder, rerank};
use crate::query::retriever::{RetrievalRequest, retrieve};
use crate::query::rewriter::rewrite_query;
use crate::store::{Filter, LexicalStore, VectorStore};
use std::cmp::Ordering;

/// Default tolerance applied to each numeric parameter's range filter.
pub const DEFAULT_TOLERANCE: f64 = 0.20;

/// Curated bilingual equipment keyword list used to suppress false
/// positives that pass only on weak lexical/dense overlap.
const EQUIPMENT_KEYWORDS: &[&str] = &[
    "насос", "pump", "клапан", "valve", "компрессор", "compressor", "резервуар", "tank",
    "теплообменник", "heat exchanger", "двигатель", "motor", "вентилятор", "fan",
    "задвижка", "gate valve", "фланец", "flange",
];

/// One equipment parameter in an analog search request: value + canonical
/// unit.
#[derive(Debug, Clone)]
pub struct NumericParam {
    /// Quantity name, e.g. `flow_rate`.
    pub name: String,
    /// Query value.
    pub value: f64,
    /// Canonical unit the value is expressed in.
    pub unit: String,
}

/// Input to [`analog_search`].
#[derive(Debug, Clone)]
pub struct AnalogRequest {
    /// Equipment type term, e.g. `центробежный насос`.
    pub equipment_type: String,
    /// Numeric parameters to match within tolerance.
    pub numeric_params: Vec<NumericParam>,
    /// Caller-supplied filter (e.g. discipline), ANDed with the generated
    /// numeric-range filter.
    pub filters: Filter,
    /// Maximum number of hits to return.
    pub limit: usize,
}

/// One analog search result.
#[derive(Debug, Clone)]
pub struct AnalogHit {
    /// The matched chunk.
    pub chunk: Chunk,
    /// The re-ranked `final` score.
    pub final_score: f32,
    /// Mean parameter similarity over matched params.
    pub param_sim: f32,
    /// `(final_score + param_sim) / 2`.
    pub analog_score: f32,
}

fn build_query_text(request: &AnalogRequest) -> String {
    let mut text = request.equipment_type.clone();
    for param in &request.numeric_params {
        text.push(' ');
        text.push_str(&format!("{} {} {}", param.name, param.value, param.unit));
    }
    text
}

fn build_filter(request: &AnalogRequest, tolerance: f64) -> Filter {
    let mut filter = request.filters.clone();
    for param in &request.numeric_params {
        let lower = param.value * (1.0 - tolerance);
        let upper = param.value * (1.0 + tolerance);
        filter = filter.with_numeric_range(&param.name, lower, upper);
    }
    filter
}

fn contains_equipment_keyword(content: &str) -> bool {
    let lower = content.to_lowercase();
    EQUIPMENT_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

fn param_similarity(chunk: &Chunk, params: &[NumericParam]) -> f32 {
    let mut matched = 0usize;
    let mut sum = 0.0_f32;
    for param in params {
        if let Some(actual) = chunk.common().numeric_facts.get(&param.name) {
            matched += 1;
            #[allow(clippy::cast_possible_truncation)]
            let delta = (actual.value - param.value).abs() / param.value.abs();
            sum += (1.0 - delta as f32).max(0.0);
        }
    }
    if matched == 0 {
        0.0
    } else {
        sum / matched as f32
    }
}

/// Runs the analog-search pipeline: build query + numeric-range filter,
/// retrieve over text/table/IFC collections (never drawings), re-rank,
/// score parameter similarity, and combine into the final analog score.
///
/// # Errors
///
/// Returns an error if retrieval, embedding, or re-ranking fails.
pub fn analog_search(
    vector: &dyn VectorStore,
    lexical: &dyn LexicalStore,
    embedder: &dyn TextEmbedder,
    cross_encoder: &dyn CrossEncoder,
    request: &AnalogRequest,
    tolerance: f64,
) -> Result<Vec<AnalogHit>> {
    let query_text = build_query_text(request);
    let filter = build_filter(request, tolerance);
    let rewrites = rewrite_query(&query_text);

    let collections = [CollectionName::Text, CollectionName::Table, CollectionName::Ifc];
    let retrieval = RetrievalRequest::new(&rewrites, &collections, filter);
    let candidates = retrieve(vector, lexical, embedder, &retrieval)?;
    let ranked = rerank(&query_text, candidates, cross_encoder, 0.0)?;

    let mut hits: Vec<AnalogHit> = ranked
        .into_iter()
        .filter_map(|result| {
            let has_keyword = contains_equipment_keyword(result.chunk.searchable_text());
            if !has_keyword && result.final_score < 0.3 {
                return None;
            }
            let param_sim = param_similarity(&result.chunk, &request.numeric_params);
            let analog_score = (result.final_score + param_sim) / 2.0;
            Some(AnalogHit {
                chunk: result.chunk,
                final_score: result.final_score,
                param_sim,
                analog_score,
            })
        })
        .collect();

    hits.sort_by(|a, b| {
        b.analog_score
            .partial_cmp(&a.analog_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.chunk.common().document_id.cmp(&b.chunk.common().document_id))
            .then_with(|| a.chunk.id().to_hex().cmp(&b.chunk.id().to_hex()))
    });
    hits.truncate(request.limit);
    Ok(hits)
}
