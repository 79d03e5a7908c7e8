//! IFC chunker: one chunk per entity *type*, aggregating every instance of
//! that type into an instance count plus a representative instance's
//! property set, per `spec.md` §4.4's "IFC one-chunk-per-entity-type" rule.
//!
//! Aggregating rather than emitting one chunk per instance keeps a model
//! carrying thousands of `IfcFlowFitting` instances from flooding the index
//! with near-duplicate chunks that all say the same thing.

use crate::chunk::context::ChunkContext;
use crate::chunk::importance::score_importance;
use crate::chunk::keywords::extract_keywords;
use crate::chunk::numeric::facts_from_pairs;
use crate::chunk::tokens::count_tokens;
use crate::chunk::traits::Chunker;
use crate::core::chunk::{Chunk, CollectionName, CommonPayload, IfcChunk};
use crate::core::chunk_id::ChunkId;
use crate::error::Result;
use crate::parse::Block;
use std::collections::BTreeMap;

/// Version tag folded into IFC-chunk ids.
pub const VERSION: &str = "ifc-v1";

struct Aggregate {
    count: usize,
    representative: Vec<(String, String)>,
}

fn render_content(entity_type: &str, count: usize, properties: &[(String, String)]) -> String {
    let props = properties
        .iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join(" | ");
    if props.is_empty() {
        format!("{entity_type} ({count} instances)")
    } else {
        format!("{entity_type} ({count} instances) — {props}")
    }
}

/// IFC chunker aggregating entity instances by type.
#[derive(Default)]
pub struct IfcChunker;

impl Chunker for IfcChunker {
    fn name(&self) -> &'static str {
        "ifc"
    }

    fn description(&self) -> &'static str {
        "One chunk per IFC entity type, aggregating instance count and a representative property set"
    }

    fn chunker_version(&self) -> &'static str {
        VERSION
    }

    fn chunk(&self, blocks: &[Block], ctx: &ChunkContext) -> Result<Vec<Chunk>> {
        let mut by_type: BTreeMap<String, Aggregate> = BTreeMap::new();

        for block in blocks {
            let Block::IfcEntity {
                entity_type,
                guid: _,
                properties,
            } = block
            else {
                continue;
            };
            if entity_type.trim().is_empty() {
                continue;
            }
            by_type
                .entry(entity_type.clone())
                .and_modify(|agg| agg.count += 1)
                .or_insert_with(|| Aggregate {
                    count: 1,
                    representative: properties.clone(),
                });
        }

        let mut chunks = Vec::with_capacity(by_type.len());
        for (position, (entity_type, agg)) in by_type.into_iter().enumerate() {
            let content = render_content(&entity_type, agg.count, &agg.representative);
            let numeric_facts = facts_from_pairs(
                agg.representative
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str())),
            );
            let token_count = count_tokens(&content);
            let importance = score_importance(&content, token_count, &numeric_facts, false);
            let keywords = extract_keywords(&content);

            let chunk_id = ChunkId::derive(&ctx.document_content_hash, VERSION, position);
            chunks.push(Chunk::Ifc(IfcChunk {
                common: CommonPayload {
                    chunk_id,
                    document_id: ctx.document_id.clone(),
                    archive_id: ctx.archive_id.clone(),
                    project_id: ctx.project_id.clone(),
                    object_id: ctx.object_id.clone(),
                    collection: CollectionName::Ifc,
                    position,
                    section: None,
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
                entity_type,
                content,
            }));
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

    fn entity(entity_type: &str, guid: &str, props: &[(&str, &str)]) -> Block {
        Block::IfcEntity {
            entity_type: entity_type.to_string(),
            guid: Some(guid.to_string()),
            properties: props
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_aggregates_instances_of_same_type() {
        let chunker = IfcChunker;
        let blocks = vec![
            entity("IfcPump", "g1", &[("flow_rate", "1000 m3/h")]),
            entity("IfcPump", "g2", &[("flow_rate", "800 m3/h")]),
            entity("IfcValve", "g3", &[("diameter", "50 mm")]),
        ];
        let chunks = chunker.chunk(&blocks, &ctx()).unwrap();
        assert_eq!(chunks.len(), 2);
        let Chunk::Ifc(pump) = chunks
            .iter()
            .find(|c| matches!(c, Chunk::Ifc(i) if i.entity_type == "IfcPump"))
            .unwrap()
        else {
            panic!("expected ifc chunk");
        };
        assert!(pump.content.contains("2 instances"));
    }

    #[test]
    fn test_representative_properties_carry_numeric_facts() {
        let chunker = IfcChunker;
        let blocks = vec![entity("IfcPump", "g1", &[("flow_rate", "1000 m3/h")])];
        let chunks = chunker.chunk(&blocks, &ctx()).unwrap();
        assert!(chunks[0].common().numeric_facts.get("flow_rate").is_some());
    }

    #[test]
    fn test_skips_unnamed_entities() {
        let chunker = IfcChunker;
        let blocks = vec![Block::IfcEntity {
            entity_type: String::new(),
            guid: None,
            properties: vec![],
        }];
        let chunks = chunker.chunk(&blocks, &ctx()).unwrap();
        assert!(chunks.is_empty());
    }
}
