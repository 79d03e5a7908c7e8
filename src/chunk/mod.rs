//! Chunker (C4): splits normalised content into typed, bounded,
//! contextually-aware chunks.
//!
//! Four strategies behind one [`traits::Chunker`] trait, directly grounded
//! on `chunking::traits::Chunker` (kept method names: `chunk`, `name`,
//! `description`) and `chunking::fixed::find_boundary`'s UTF-8-safe boundary
//! search style, generalized to the token-bounded, structural-boundary,
//! per-variant scheme `spec.md` §4.4 requires.

pub mod context;
pub mod drawing;
pub mod ifc;
pub mod importance;
pub mod keywords;
pub mod numeric;
pub mod table;
pub mod text;
pub mod tokens;
pub mod traits;

pub use context::ChunkContext;
pub use traits::Chunker;

use crate::core::chunk::Chunk;
use crate::error::Result;
use crate::parse::Block;

/// Runs every chunker strategy over `blocks` and concatenates their output.
/// Each strategy ignores block variants it does not handle, so a document
/// mixing prose, tables, drawings, and IFC entities produces chunks from
/// all four without any dispatch logic here beyond composing them.
///
/// # Errors
///
/// Propagates the first chunker error encountered.
pub fn chunk_document(blocks: &[Block], ctx: &ChunkContext) -> Result<Vec<Chunk>> {
    let mut chunks = text::TextChunker.chunk(blocks, ctx)?;
    chunks.extend(table::TableChunker.chunk(blocks, ctx)?);
    chunks.extend(drawing::DrawingChunker.chunk(blocks, ctx)?);
    chunks.extend(ifc::IfcChunker.chunk(blocks, ctx)?);
    Ok(chunks)
}

/// Target chunk size in tokens.
pub const TARGET_TOKENS: usize = 800;
/// Minimum tokens for a non-terminal chunk (`T / 8`).
pub const MIN_TOKENS: usize = TARGET_TOKENS / 8;
/// Maximum tokens for any chunk (`T * 1.25`).
pub const MAX_TOKENS: usize = TARGET_TOKENS + TARGET_TOKENS / 4;
/// Overlap, in tokens, prepended from the tail of the previous chunk.
pub const OVERLAP_TOKENS: usize = 200;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_document_combines_all_modalities() {
        let ctx = ChunkContext::new("doc-1", "arc-1", "hash-abc", 0);
        let blocks = vec![
            Block::TextParagraph("Насос должен обеспечивать расход 1000 м3/ч.".to_string()),
            Block::TableRow {
                sheet: Some("Pumps".to_string()),
                row_index: 0,
                cells: vec!["parameter".to_string(), "value".to_string()],
            },
            Block::TableRow {
                sheet: Some("Pumps".to_string()),
                row_index: 1,
                cells: vec!["flow_rate".to_string(), "1000 m3/h".to_string()],
            },
            Block::DrawingRegion {
                caption: Some("P-101".to_string()),
                image_ref: "arc/p1.png".to_string(),
                page: Some(1),
            },
            Block::IfcEntity {
                entity_type: "IfcPump".to_string(),
                guid: Some("g1".to_string()),
                properties: vec![("flow_rate".to_string(), "1000 m3/h".to_string())],
            },
        ];
        let chunks = chunk_document(&blocks, &ctx).unwrap();
        let has = |pred: fn(&Chunk) -> bool| chunks.iter().any(pred);
        assert!(has(|c| matches!(c, Chunk::Text(_))));
        assert!(has(|c| matches!(c, Chunk::Table(_))));
        assert!(has(|c| matches!(c, Chunk::Drawing(_))));
        assert!(has(|c| matches!(c, Chunk::Ifc(_))));
    }
}
