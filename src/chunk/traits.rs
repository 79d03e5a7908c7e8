//! The chunker trait every strategy implements.
//!
//! Method names (`name`, `description`, `chunk`) are kept from the teacher's
//! `chunking::traits::Chunker`; `chunker_version` is new, feeding
//! [`crate::core::chunk_id::ChunkId::derive`] so a chunking-logic change can
//! be rolled out as a version bump that reliably produces new ids rather than
//! colliding with stale ones.

use crate::chunk::context::ChunkContext;
use crate::core::chunk::Chunk;
use crate::error::Result;
use crate::parse::Block;

/// Produces typed chunks from a document's normalised blocks.
pub trait Chunker: Send + Sync {
    /// Short machine-readable name, e.g. `"text"`, `"table"`.
    fn name(&self) -> &'static str;

    /// Human-readable description, used in logs.
    fn description(&self) -> &'static str;

    /// Version tag folded into every produced chunk's id. Bump this whenever
    /// this strategy's chunking logic changes in a way that should be
    /// treated as producing a disjoint id space from prior output.
    fn chunker_version(&self) -> &'static str;

    /// Splits `blocks` into chunks for the document described by `ctx`.
    ///
    /// # Errors
    ///
    /// Returns an error if a block cannot be chunked at all (malformed
    /// input); callers treat this as a per-document failure, not a crash.
    fn chunk(&self, blocks: &[Block], ctx: &ChunkContext) -> Result<Vec<Chunk>>;
}
