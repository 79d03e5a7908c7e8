//! Text chunker: token-bounded splitting with structural-boundary forcing
//! and overlap, per `spec.md` §4.4.
//!
//! Grounded on `chunking::fixed::find_boundary`'s UTF-8-safe "search for a
//! break point, never split mid-codepoint" idiom, generalized from a
//! character budget to a token budget with heading-aware forced boundaries.

use crate::chunk::context::ChunkContext;
use crate::chunk::importance::score_importance;
use crate::chunk::keywords::extract_keywords;
use crate::chunk::numeric::extract_facts_from_text;
use crate::chunk::tokens::{count_tokens, tail_tokens};
use crate::chunk::traits::Chunker;
use crate::chunk::{MAX_TOKENS, MIN_TOKENS, OVERLAP_TOKENS, TARGET_TOKENS};
use crate::core::chunk::{Chunk, CollectionName, CommonPayload, TextChunk};
use crate::core::chunk_id::ChunkId;
use crate::error::Result;
use crate::parse::Block;
use crate::text::reference::extract_references;
use regex::Regex;
use std::sync::OnceLock;
use unicode_segmentation::UnicodeSegmentation;

/// Version tag folded into text-chunk ids; bump on any change to the
/// segmentation algorithm below.
pub const VERSION: &str = "text-v1";

fn numbered_heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+(?:\.\d+)*[.)]?\s+\S").expect("heading regex"))
}

fn is_all_caps_heading(line: &str) -> bool {
    let trimmed = line.trim();
    let letters: Vec<char> = trimmed.chars().filter(|c| c.is_alphabetic()).collect();
    letters.len() >= 4
        && trimmed.chars().count() <= 80
        && letters.iter().all(|c| c.is_uppercase())
}

fn is_heading(paragraph: &str) -> bool {
    let first_line = paragraph.lines().next().unwrap_or(paragraph);
    numbered_heading_re().is_match(first_line) || is_all_caps_heading(first_line)
}

/// Splits an oversized single paragraph into `TARGET_TOKENS`-sized pieces on
/// word boundaries, so no emitted segment ever exceeds [`MAX_TOKENS`].
fn split_oversized(paragraph: &str) -> Vec<String> {
    if count_tokens(paragraph) <= MAX_TOKENS {
        return vec![paragraph.to_string()];
    }
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_tokens = 0usize;
    for word in paragraph.split_word_bounds() {
        current.push_str(word);
        if word.chars().any(char::is_alphanumeric) {
            current_tokens += 1;
        }
        if current_tokens >= TARGET_TOKENS {
            pieces.push(std::mem::take(&mut current));
            current_tokens = 0;
        }
    }
    if !current.trim().is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Text chunker for prose blocks.
#[derive(Default)]
pub struct TextChunker;

struct Segment {
    text: String,
    section: Option<String>,
    /// Page the segment's first paragraph came from.
    page: u32,
}

/// Pairs each non-blank paragraph with the page it appeared on. Pages start
/// at 1 and increment on every [`Block::PageBreak`]; formats that never emit
/// a page break (plain text, DOCX) leave every paragraph on page 1.
fn paragraphs_with_pages(blocks: &[Block]) -> Vec<(String, u32)> {
    let mut page = 1u32;
    let mut out = Vec::new();
    for block in blocks {
        match block {
            Block::PageBreak => page += 1,
            Block::TextParagraph(text) if !text.trim().is_empty() => out.push((text.clone(), page)),
            _ => {}
        }
    }
    out
}

impl TextChunker {
    fn build_segments(paragraphs: &[(String, u32)]) -> Vec<Segment> {
        let mut segments: Vec<Segment> = Vec::new();
        let mut current = String::new();
        let mut current_tokens = 0usize;
        let mut current_section: Option<String> = None;
        let mut current_page = 1u32;
        let mut active_section: Option<String> = None;

        let flush = |segments: &mut Vec<Segment>, text: &mut String, section: Option<String>, page: u32| {
            if !text.trim().is_empty() {
                segments.push(Segment {
                    text: std::mem::take(text),
                    section,
                    page,
                });
            } else {
                text.clear();
            }
        };

        for (paragraph, page) in paragraphs {
            let page = *page;
            if is_heading(paragraph) {
                active_section = Some(paragraph.lines().next().unwrap_or(paragraph).trim().to_string());
            }

            let paragraph_tokens = count_tokens(paragraph);

            if paragraph_tokens > MAX_TOKENS {
                flush(&mut segments, &mut current, current_section.take(), current_page);
                current_tokens = 0;
                for piece in split_oversized(paragraph) {
                    segments.push(Segment {
                        text: piece,
                        section: active_section.clone(),
                        page,
                    });
                }
                continue;
            }

            if current_tokens == 0 {
                current.push_str(paragraph);
                current_tokens = paragraph_tokens;
                current_section = active_section.clone();
                current_page = page;
                continue;
            }

            let would_exceed_max = current_tokens + paragraph_tokens > MAX_TOKENS;
            let force_at_heading = current_tokens >= TARGET_TOKENS && is_heading(paragraph);

            if would_exceed_max || force_at_heading {
                flush(&mut segments, &mut current, current_section.take(), current_page);
                current_tokens = paragraph_tokens;
                current.push_str(paragraph);
                current_section = active_section.clone();
                current_page = page;
            } else {
                current.push_str("\n\n");
                current.push_str(paragraph);
                current_tokens += paragraph_tokens;
            }
        }
        flush(&mut segments, &mut current, current_section.take(), current_page);

        Self::merge_undersized_non_terminal(segments)
    }

    /// Forward-merges any non-terminal segment below [`MIN_TOKENS`] into the
    /// segment that follows it. The terminal segment is left untouched even
    /// if small, since the minimum only binds non-terminal chunks.
    fn merge_undersized_non_terminal(segments: Vec<Segment>) -> Vec<Segment> {
        let len = segments.len();
        let mut result: Vec<Segment> = Vec::with_capacity(len);
        let mut pending: Option<Segment> = None;

        for (i, seg) in segments.into_iter().enumerate() {
            let seg = match pending.take() {
                Some(prev) => Segment {
                    text: format!("{}\n\n{}", prev.text, seg.text),
                    section: seg.section.or(prev.section),
                    page: prev.page,
                },
                None => seg,
            };
            if i < len - 1 && count_tokens(&seg.text) < MIN_TOKENS {
                pending = Some(seg);
            } else {
                result.push(seg);
            }
        }
        if let Some(last) = pending {
            result.push(last);
        }
        result
    }
}

impl Chunker for TextChunker {
    fn name(&self) -> &'static str {
        "text"
    }

    fn description(&self) -> &'static str {
        "Token-bounded prose chunker with heading-aware forced boundaries and overlap"
    }

    fn chunker_version(&self) -> &'static str {
        VERSION
    }

    fn chunk(&self, blocks: &[Block], ctx: &ChunkContext) -> Result<Vec<Chunk>> {
        let paragraphs = paragraphs_with_pages(blocks);
        if paragraphs.is_empty() {
            return Ok(Vec::new());
        }

        let segments = Self::build_segments(&paragraphs);

        let mut chunks = Vec::with_capacity(segments.len());
        let mut previous_segment_text: Option<String> = None;
        for (position, segment) in segments.into_iter().enumerate() {
            let (content, overlap) = match &previous_segment_text {
                Some(prev) => {
                    let tail = tail_tokens(prev, OVERLAP_TOKENS);
                    if tail.trim().is_empty() {
                        (segment.text.clone(), 0)
                    } else {
                        (format!("{tail}\n\n{}", segment.text), count_tokens(&tail))
                    }
                }
                None => (segment.text.clone(), 0),
            };

            let token_count = count_tokens(&content);
            let references = extract_references(&content);
            let numeric_facts = extract_facts_from_text(&content);
            let importance = score_importance(&content, token_count, &numeric_facts, !references.is_empty());
            let keywords = extract_keywords(&content);
            let clause = references.iter().find_map(|r| r.clause.clone());

            let chunk_id = ChunkId::derive(&ctx.document_content_hash, VERSION, position);
            chunks.push(Chunk::Text(TextChunk {
                common: CommonPayload {
                    chunk_id,
                    document_id: ctx.document_id.clone(),
                    archive_id: ctx.archive_id.clone(),
                    project_id: ctx.project_id.clone(),
                    object_id: ctx.object_id.clone(),
                    collection: CollectionName::Text,
                    position,
                    section: segment.section,
                    clause,
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
                content,
                token_count,
                page: Some(segment.page),
                overlap,
            }));
            previous_segment_text = Some(segment.text);
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

    fn make(paragraphs: &[&str]) -> Vec<Block> {
        paragraphs
            .iter()
            .map(|p| Block::TextParagraph((*p).to_string()))
            .collect()
    }

    #[test]
    fn test_empty_blocks_produce_no_chunks() {
        let chunker = TextChunker;
        let chunks = chunker.chunk(&[], &ctx()).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_short_document_is_one_chunk() {
        let chunker = TextChunker;
        let blocks = make(&["Центробежный насос должен обеспечивать расход 1000 м3/ч."]);
        let chunks = chunker.chunk(&blocks, &ctx()).unwrap();
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_deterministic_ids_for_same_content() {
        let chunker = TextChunker;
        let blocks = make(&["Paragraph one.", "Paragraph two."]);
        let a = chunker.chunk(&blocks, &ctx()).unwrap();
        let b = chunker.chunk(&blocks, &ctx()).unwrap();
        assert_eq!(a[0].id(), b[0].id());
    }

    #[test]
    fn test_heading_forces_boundary_once_target_reached() {
        let chunker = TextChunker;
        let filler = "слово ".repeat(850);
        let blocks = make(&[filler.as_str(), "5.1 ТРЕБОВАНИЯ К НАСОСАМ", "Далее текст раздела."]);
        let chunks = chunker.chunk(&blocks, &ctx()).unwrap();
        assert!(chunks.len() >= 2);
    }

    #[test]
    fn test_prose_numeric_facts_surfaced_for_analog_search() {
        let chunker = TextChunker;
        let blocks = make(&[
            "Центробежный насос для перекачки аммиака. Производительность 1000 m3/h, напор 50 m. Материал корпуса - 316L.",
        ]);
        let chunks = chunker.chunk(&blocks, &ctx()).unwrap();
        let Chunk::Text(t) = &chunks[0] else {
            panic!("expected text chunk");
        };
        assert!(t.common.numeric_facts.get("flow_rate").is_some());
        assert!(t.common.numeric_facts.get("head").is_some());
    }

    #[test]
    fn test_no_chunk_exceeds_max_tokens_for_oversized_paragraph() {
        let chunker = TextChunker;
        let huge = "слово ".repeat(3000);
        let blocks = make(&[huge.as_str()]);
        let chunks = chunker.chunk(&blocks, &ctx()).unwrap();
        for chunk in &chunks {
            if let Chunk::Text(t) = chunk {
                assert!(t.token_count <= MAX_TOKENS + OVERLAP_TOKENS);
            }
        }
    }
}
