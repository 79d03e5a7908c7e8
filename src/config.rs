//! Runtime configuration.
//!
//! SPEC_FULL.md's ambient addition: a single overridable struct for the
//! constants `spec.md` §4 scatters as prose numbers (chunk sizing, worker
//! pool size, fusion weights, rerank floor, analog tolerance, query
//! deadline). Grounded on the teacher's own dependency on `toml` (declared
//! in `Cargo.toml` but unused by any teacher module) plus the
//! scattered-`pub const`-per-module pattern the teacher uses elsewhere
//! (`DEFAULT_DIMENSIONS` in `embed::mod`, `TARGET_TOKENS` in `chunk::mod`),
//! generalized here into one deserializable struct with the same defaults.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Chunking, retrieval, and concurrency defaults, overridable from a TOML
/// file with environment-variable overrides applied on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target chunk size in tokens (`spec.md` §4.4, `T`).
    pub chunk_target_tokens: usize,
    /// Minimum tokens for a non-terminal chunk (`T / 8`).
    pub chunk_min_tokens: usize,
    /// Maximum tokens for any chunk (`T * 1.25`).
    pub chunk_max_tokens: usize,
    /// Overlap, in tokens, between adjacent text chunks (`spec.md` §4.4, `O`).
    pub chunk_overlap_tokens: usize,
    /// Ingestion worker pool size (`spec.md` §4.7/§5).
    pub worker_pool_size: usize,
    /// Minimum batch size the embedder must accept (`spec.md` §4.5).
    pub embed_batch_size: usize,
    /// Lexical fusion weight (`spec.md` §4.9, `w_bm25`).
    pub fusion_weight_bm25: f32,
    /// Dense fusion weight (`spec.md` §4.9, `w_dense`).
    pub fusion_weight_dense: f32,
    /// Candidates retained after fusion, before re-ranking (`spec.md` §4.9).
    pub rerank_top_k: usize,
    /// Results retained after re-ranking (`spec.md` §4.10).
    pub final_top_k: usize,
    /// Similarity floor below which a re-ranked result is dropped
    /// (`spec.md` §4.10).
    pub similarity_floor: f32,
    /// Default analog-search parameter tolerance (`spec.md` §4.12, `τ`).
    pub analog_tolerance: f64,
    /// Per-collection, per-rewrite hit cap for dense/lexical search
    /// (`spec.md` §4.9, top-N).
    pub retrieval_top_n: usize,
    /// Query deadline in milliseconds (`spec.md` §5).
    pub query_deadline_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_target_tokens: crate::chunk::TARGET_TOKENS,
            chunk_min_tokens: crate::chunk::MIN_TOKENS,
            chunk_max_tokens: crate::chunk::MAX_TOKENS,
            chunk_overlap_tokens: crate::chunk::OVERLAP_TOKENS,
            worker_pool_size: 4,
            embed_batch_size: 64,
            fusion_weight_bm25: crate::query::retriever::W_BM25,
            fusion_weight_dense: crate::query::retriever::W_DENSE,
            rerank_top_k: crate::query::retriever::RERANK_TOP_K,
            final_top_k: crate::query::rerank::FINAL_TOP_K,
            similarity_floor: crate::query::rerank::DEFAULT_SIMILARITY_FLOOR,
            analog_tolerance: crate::query::analog::DEFAULT_TOLERANCE,
            retrieval_top_n: crate::query::retriever::DEFAULT_TOP_N,
            query_deadline_ms: 10_000,
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file, falling back to defaults for
    /// any field the file omits. Never panics on a missing file — returns
    /// the defaults unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file exists but fails to parse.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| Error::Config {
            message: format!("failed to parse config at {}: {e}", path.display()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_spec_constants() {
        let config = Config::default();
        assert_eq!(config.chunk_target_tokens, 800);
        assert_eq!(config.chunk_overlap_tokens, 200);
        assert_eq!(config.worker_pool_size, 4);
        assert!((config.analog_tolerance - 0.20).abs() < 1e-9);
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let config = Config::load(Path::new("/nonexistent/archintel.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_overrides_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archintel.toml");
        std::fs::write(&path, "worker_pool_size = 8\nanalog_tolerance = 0.1\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.worker_pool_size, 8);
        assert!((config.analog_tolerance - 0.1).abs() < 1e-9);
        assert_eq!(config.chunk_target_tokens, 800);
    }
}
