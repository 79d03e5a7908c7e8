//! Hybrid query engine: rewriter/intent classifier (C8), hybrid retriever
//! (C9), re-ranker (C10), answer assembler (C11), analog search (C12).
//!
//! Grounded on the teacher's `search` module (`SearchResult`/`SearchConfig`
//! score-bearing-result shape, `rrf.rs`'s weighted-combination idiom
//! generalized from rank fusion to the spec's direct weighted-score
//! fusion) and `chunking`'s regex-pattern-matching style for the intent
//! classifier.

pub mod analog;
pub mod assembler;
pub mod engine;
pub mod intent;
pub mod rerank;
pub mod retriever;
pub mod rewriter;

pub use analog::{AnalogHit, AnalogRequest, analog_search};
pub use assembler::{Answer, Source, assemble_answer};
pub use engine::QueryOutcome;
pub use intent::{Intent, classify_intent};
pub use rerank::{CrossEncoder, FakeCrossEncoder, rerank};
pub use retriever::{Candidate, RetrievalRequest, retrieve};
pub use rewriter::{RewriteSet, rewrite_query};
