//! # archintel
//!
//! Engineering-document retrieval platform: a content-addressed ingestion
//! pipeline for process/piping/IFC/drawing archives and a hybrid (dense +
//! lexical + reference) query engine over the indexed chunks.
//!
//! ## Modules
//!
//! - [`core`]: archive/document/job/manifest types and the tagged-union
//!   [`core::chunk::Chunk`].
//! - [`text`], [`parse`], [`chunk`], [`embed`]: the per-document ingestion
//!   stages (normalise, parse, chunk, embed).
//! - [`store`]: the dual vector/lexical index and its `SQLite`-backed
//!   implementation.
//! - [`orchestrator`]: drives one archive through the full pipeline.
//! - [`query`]: the hybrid query engine (rewrite, retrieve, re-rank,
//!   assemble, analog search).
//! - [`app`]: the per-process [`app::Core`] value wiring every capability
//!   together behind the four public operations.
//! - [`cli`]: the `archintel` command-line shim.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![warn(unsafe_code)]

pub mod app;
pub mod chunk;
pub mod cli;
pub mod config;
pub mod core;
pub mod embed;
pub mod error;
pub mod orchestrator;
pub mod parse;
pub mod query;
pub mod store;
pub mod text;
pub mod units;

// Re-export commonly used types at crate root.
pub use error::{Error, Result};

pub use app::Core;
pub use config::Config;

// Re-export core domain types.
pub use core::chunk::{Chunk, CollectionName, CommonPayload};
pub use core::{Archive, Document, Job, JobPhase, JobState, Manifest};

// Re-export store types.
pub use store::{Filter, LexicalStore, SqliteStore, VectorStore};

// Re-export embedding types.
#[cfg(feature = "fastembed-embeddings")]
pub use embed::FastEmbedTextEmbedder;
pub use embed::{
    DEFAULT_DIMENSIONS, FallbackTextEmbedder, TextEmbedder, cosine_similarity, default_text_embedder,
};

// Re-export query types.
pub use query::{AnalogHit, AnalogRequest, Answer, QueryOutcome, Source};

// Re-export CLI types.
pub use cli::{Cli, Commands, OutputFormat};
