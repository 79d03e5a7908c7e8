//! Normaliser (C3): the single place raw extracted text passes through
//! before it reaches the chunker.
//!
//! Grounded on `original_source/services/chat-service/services/
//! smart_tokenizer.py`'s regex pattern groups, reimplemented with the
//! `regex` crate the teacher already depends on (`error.rs::From<regex::Error>`
//! shows it is an established dependency) and lazily-compiled statics in the
//! teacher's "precompute once, scan with a cheap method" idiom
//! (`chunking/fixed.rs::find_boundary`).

pub mod language;
pub mod normalize;
pub mod reference;

pub use language::{Language, detect_language};
pub use normalize::normalize;
pub use reference::{Reference, extract_references};

/// Output of running the normaliser over one extracted block.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedBlock {
    /// Normalised text.
    pub text: String,
    /// Dominant language detected in the block.
    pub language: Language,
    /// Standard/document references found in the block.
    pub references: Vec<Reference>,
}

/// Runs the full normaliser pipeline over one raw extracted text block:
/// whitespace collapse, dehyphenation, unit rewrite, decimal-separator
/// rewrite, language detection, and reference extraction, in that order
/// (each step is idempotent on its own output, so the whole pipeline is too
/// — see `spec.md` §8 "Normaliser is idempotent on its own output").
#[must_use]
pub fn normalize_block(raw: &str) -> NormalizedBlock {
    let text = normalize(raw);
    let language = detect_language(&text);
    let references = extract_references(&text);
    NormalizedBlock {
        text,
        language,
        references,
    }
}
