//! Core domain models for the retrieval platform.
//!
//! Pure data structures with no I/O: the tagged-union [`Chunk`] and its
//! variants, content-addressed [`ChunkId`]s, [`Archive`]/[`Document`]/
//! [`Manifest`], [`NumericFacts`], and the ingestion [`Job`] record. These
//! types have no dependency on any store, parser, or embedder — every other
//! module in the crate is built around moving, producing, or persisting
//! them.

pub mod archive;
pub mod chunk;
pub mod chunk_id;
pub mod document;
pub mod job;
pub mod manifest;
pub mod numeric_facts;

pub use archive::Archive;
pub use chunk::{
    Chunk, CollectionName, CommonPayload, DrawingChunk, IfcChunk, TableChunk, TextChunk,
};
pub use chunk_id::{ChunkId, content_hash};
pub use document::Document;
pub use job::{Job, JobCounters, JobPhase, JobState};
pub use manifest::{Confidentiality, DocType, Discipline, Manifest, ManifestEntry, Phase};
pub use numeric_facts::{NumericFacts, NumericValue};
