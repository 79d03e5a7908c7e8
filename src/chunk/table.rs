//! Table chunker: one chunk per data row, per `spec.md` §4.4.
//!
//! The first row seen for each sheet is treated as a header row supplying
//! column names for numeric-fact extraction; it is not itself chunked.

use crate::chunk::context::ChunkContext;
use crate::chunk::importance::score_importance;
use crate::chunk::keywords::extract_keywords;
use crate::chunk::numeric::facts_from_pairs;
use crate::chunk::tokens::count_tokens;
use crate::chunk::traits::Chunker;
use crate::core::chunk::{Chunk, CollectionName, CommonPayload, TableChunk};
use crate::core::chunk_id::{ChunkId, content_hash};
use crate::error::Result;
use crate::parse::Block;
use std::collections::HashMap;

/// Version tag folded into table-chunk ids.
pub const VERSION: &str = "table-v1";

/// Table chunker for spreadsheet rows.
#[derive(Default)]
pub struct TableChunker;

const PARAMETER_COLUMN_NAMES: &[&str] = &["parameter", "параметр", "показатель"];
const VALUE_COLUMN_NAMES: &[&str] = &["value", "значение"];

/// Builds `(quantity_name, raw_value)` pairs for numeric-fact extraction.
///
/// Datasheet tables commonly use one of two shapes: a `parameter`/`value`
/// column pair naming the quantity in one cell (e.g. `flow_rate | 1000
/// m3/h`), or column headers that are themselves quantity names (e.g.
/// `flow_rate | head` with the row holding both values). Both are
/// supported; the `parameter`/`value` shape takes precedence when present.
fn fact_pairs(header: &[String], cells: &[String]) -> Vec<(String, String)> {
    let param_idx = header
        .iter()
        .position(|h| PARAMETER_COLUMN_NAMES.contains(&h.trim().to_lowercase().as_str()));
    let value_idx = header
        .iter()
        .position(|h| VALUE_COLUMN_NAMES.contains(&h.trim().to_lowercase().as_str()));

    if let (Some(p), Some(v)) = (param_idx, value_idx) {
        if let (Some(name), Some(raw)) = (cells.get(p), cells.get(v)) {
            return vec![(name.clone(), raw.clone())];
        }
    }

    header
        .iter()
        .zip(cells.iter())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn render_row(header: Option<&[String]>, cells: &[String]) -> String {
    match header {
        Some(header) => cells
            .iter()
            .enumerate()
            .map(|(i, cell)| match header.get(i) {
                Some(name) if !name.trim().is_empty() => format!("{name}: {cell}"),
                _ => cell.clone(),
            })
            .collect::<Vec<_>>()
            .join(" | "),
        None => cells.join(" | "),
    }
}

impl Chunker for TableChunker {
    fn name(&self) -> &'static str {
        "table"
    }

    fn description(&self) -> &'static str {
        "One chunk per spreadsheet data row, header-aware numeric-fact extraction"
    }

    fn chunker_version(&self) -> &'static str {
        VERSION
    }

    fn chunk(&self, blocks: &[Block], ctx: &ChunkContext) -> Result<Vec<Chunk>> {
        let mut headers: HashMap<Option<String>, Vec<String>> = HashMap::new();
        let mut chunks = Vec::new();
        let mut position = 0usize;

        for block in blocks {
            let Block::TableRow {
                sheet,
                row_index,
                cells,
            } = block
            else {
                continue;
            };
            if cells.iter().all(|c| c.trim().is_empty()) {
                continue;
            }

            if *row_index == 0 {
                headers.insert(sheet.clone(), cells.clone());
                continue;
            }

            let header = headers.get(sheet);
            let content = render_row(header.map(Vec::as_slice), cells);
            let pairs = header.map(|h| fact_pairs(h, cells)).unwrap_or_default();
            let numeric_facts =
                facts_from_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
            let token_count = count_tokens(&content);
            let importance = score_importance(&content, token_count, &numeric_facts, false);
            let keywords = extract_keywords(&content);
            let row_hash = content_hash(cells.join("\u{1}").as_bytes());

            let chunk_id = ChunkId::derive(&ctx.document_content_hash, VERSION, position);
            chunks.push(Chunk::Table(TableChunk {
                common: CommonPayload {
                    chunk_id,
                    document_id: ctx.document_id.clone(),
                    archive_id: ctx.archive_id.clone(),
                    project_id: ctx.project_id.clone(),
                    object_id: ctx.object_id.clone(),
                    collection: CollectionName::Table,
                    position,
                    section: sheet.clone(),
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
                content,
                sheet: sheet.clone(),
                row: *row_index,
                row_hash,
                page: None,
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

    fn row(sheet: &str, row_index: usize, cells: &[&str]) -> Block {
        Block::TableRow {
            sheet: Some(sheet.to_string()),
            row_index,
            cells: cells.iter().map(|c| (*c).to_string()).collect(),
        }
    }

    #[test]
    fn test_header_row_not_chunked() {
        let chunker = TableChunker;
        let blocks = vec![
            row("Pumps", 0, &["parameter", "value"]),
            row("Pumps", 1, &["flow_rate", "1000 m3/h"]),
        ];
        let chunks = chunker.chunk(&blocks, &ctx()).unwrap();
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_extracts_numeric_fact_from_header_pairing() {
        let chunker = TableChunker;
        let blocks = vec![
            row("Pumps", 0, &["parameter", "value"]),
            row("Pumps", 1, &["flow_rate", "1000 m3/h"]),
        ];
        let chunks = chunker.chunk(&blocks, &ctx()).unwrap();
        let Chunk::Table(t) = &chunks[0] else {
            panic!("expected table chunk");
        };
        assert!(t.common.numeric_facts.get("flow_rate").is_some());
    }

    #[test]
    fn test_blank_row_skipped() {
        let chunker = TableChunker;
        let blocks = vec![
            row("Pumps", 0, &["a", "b"]),
            row("Pumps", 1, &["", ""]),
            row("Pumps", 2, &["x", "y"]),
        ];
        let chunks = chunker.chunk(&blocks, &ctx()).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].common().position, 0);
    }

    #[test]
    fn test_separate_sheets_have_independent_headers() {
        let chunker = TableChunker;
        let blocks = vec![
            row("Pumps", 0, &["flow_rate", "x"]),
            row("Pumps", 1, &["1000 m3/h", "irrelevant"]),
            row("Valves", 0, &["diameter", "x"]),
            row("Valves", 1, &["50 mm", "irrelevant"]),
        ];
        let chunks = chunker.chunk(&blocks, &ctx()).unwrap();
        assert_eq!(chunks.len(), 2);
    }
}
