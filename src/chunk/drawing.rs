//! Drawing chunker: one chunk per drawing caption/annotation region, per
//! `spec.md` §4.4.

use crate::chunk::context::ChunkContext;
use crate::chunk::importance::score_importance;
use crate::chunk::keywords::extract_keywords;
use crate::chunk::tokens::count_tokens;
use crate::chunk::traits::Chunker;
use crate::core::chunk::{Chunk, CollectionName, CommonPayload, DrawingChunk};
use crate::core::chunk_id::ChunkId;
use crate::core::numeric_facts::NumericFacts;
use crate::error::Result;
use crate::parse::Block;

/// Version tag folded into drawing-chunk ids.
pub const VERSION: &str = "drawing-v1";

/// Drawing chunker for captioned/annotated image regions.
#[derive(Default)]
pub struct DrawingChunker;

impl Chunker for DrawingChunker {
    fn name(&self) -> &'static str {
        "drawing"
    }

    fn description(&self) -> &'static str {
        "One chunk per drawing caption/annotation region"
    }

    fn chunker_version(&self) -> &'static str {
        VERSION
    }

    fn chunk(&self, blocks: &[Block], ctx: &ChunkContext) -> Result<Vec<Chunk>> {
        let mut chunks = Vec::new();
        let mut position = 0usize;

        for block in blocks {
            let Block::DrawingRegion {
                caption,
                image_ref,
                page,
            } = block
            else {
                continue;
            };

            let text = caption.clone().unwrap_or_default();
            let token_count = count_tokens(&text);
            let numeric_facts = NumericFacts::new();
            let importance = score_importance(&text, token_count, &numeric_facts, false);
            let keywords = extract_keywords(&text);

            let chunk_id = ChunkId::derive(&ctx.document_content_hash, VERSION, position);
            chunks.push(Chunk::Drawing(DrawingChunk {
                common: CommonPayload {
                    chunk_id,
                    document_id: ctx.document_id.clone(),
                    archive_id: ctx.archive_id.clone(),
                    project_id: ctx.project_id.clone(),
                    object_id: ctx.object_id.clone(),
                    collection: CollectionName::Drawing,
                    position,
                    section: page.map(|p| format!("page {p}")),
                    clause: None,
                    discipline: ctx.discipline.clone(),
                    doc_title: ctx.doc_title.clone(),
                    doc_family: ctx.doc_family.clone(),
                    doc_number: ctx.doc_number.clone(),
                    revision: ctx.revision.clone(),
                    language: ctx.language.as_str().to_string(),
                    extraction_method: ctx.extraction_method.as_str().to_string(),
                    source_path: ctx.source_path.clone(),
                    source_content_hash: ctx.document_content_hash.clone(),
                    issued_at: ctx.issued_at,
                    vendor: ctx.vendor.clone(),
                    confidentiality: ctx.confidentiality.clone(),
                    permissions: ctx.permissions.clone(),
                    tags: ctx.tags.clone(),
                    keywords,
                    importance,
                    numeric_facts,
                    created_at: ctx.created_at,
                },
                caption: caption.clone(),
                image_ref: image_ref.clone(),
                page: *page,
            }));
            position += 1;
        }

        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ChunkContext {
        ChunkContext::new("doc-1", "arc-1", "hash-abc", 0)
    }

    #[test]
    fn test_one_chunk_per_region() {
        let chunker = DrawingChunker;
        let blocks = vec![
            Block::DrawingRegion {
                caption: Some("P-101 centrifugal pump".to_string()),
                image_ref: "archive/p1.png".to_string(),
                page: Some(1),
            },
            Block::DrawingRegion {
                caption: None,
                image_ref: "archive/p2.png".to_string(),
                page: Some(2),
            },
        ];
        let chunks = chunker.chunk(&blocks, &ctx()).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].searchable_text(), "");
    }

    #[test]
    fn test_ignores_non_drawing_blocks() {
        let chunker = DrawingChunker;
        let blocks = vec![Block::TextParagraph("not a drawing".to_string())];
        let chunks = chunker.chunk(&blocks, &ctx()).unwrap();
        assert!(chunks.is_empty());
    }
}
