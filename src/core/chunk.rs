//! Chunk representation: a closed tagged union over content modality.
//!
//! The teacher's `Chunk` was a single flat struct with a `metadata.strategy`
//! string field. That works when every chunk is "some text with a byte
//! range", but table rows, drawing captions, and IFC entities each carry
//! different addressable fields (sheet/row, image reference, entity type).
//! Representing them as one struct with a pile of `Option` fields lets
//! invalid combinations compile; a closed enum does not.

use crate::core::chunk_id::ChunkId;
use crate::core::numeric_facts::NumericFacts;
use serde::{Deserialize, Serialize};

/// Name of the collection a chunk belongs to: one of `text`, `table`,
/// `drawing`, or `ifc`. Kept as distinct collections per document sharing
/// a text embedder, rather than fused with a discriminator column — see
/// `DESIGN.md`'s Open Question resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectionName {
    /// Prose and normalised text blocks.
    Text,
    /// Spreadsheet/table rows.
    Table,
    /// Drawing captions and extracted annotation text.
    Drawing,
    /// IFC entity property sets.
    Ifc,
}

impl CollectionName {
    /// Returns the canonical lowercase name used as a storage key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Table => "table",
            Self::Drawing => "drawing",
            Self::Ifc => "ifc",
        }
    }
}

/// Fields shared by every chunk variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonPayload {
    /// Deterministic content-addressed identifier.
    pub chunk_id: ChunkId,
    /// Id of the document this chunk was produced from.
    pub document_id: String,
    /// Id of the archive the document belongs to.
    pub archive_id: String,
    /// Id of the project the owning archive belongs to (`spec.md` §3).
    pub project_id: String,
    /// Id of the object/facility within the project (`spec.md` §3).
    pub object_id: String,
    /// Which collection this chunk is indexed into.
    pub collection: CollectionName,
    /// Sequential position within the document (0-based); part of the
    /// chunk id derivation input.
    pub position: usize,
    /// Section heading, if the normaliser could locate one.
    pub section: Option<String>,
    /// Clause/paragraph number, if extracted.
    pub clause: Option<String>,
    /// Engineering discipline tag (e.g. "mechanical", "electrical"), if
    /// classified upstream. Used as a retrieval filter.
    pub discipline: Option<String>,
    /// Document title, e.g. a drawing/spec title, if known.
    pub doc_title: Option<String>,
    /// Standard/document family, e.g. `ГОСТ`/`СП`, used by the hybrid
    /// retriever's direct document-reference lookup (C9).
    pub doc_family: Option<String>,
    /// Standard/document number, e.g. `21.201-2018`.
    pub doc_number: Option<String>,
    /// Revision tag, if declared.
    pub revision: Option<String>,
    /// Dominant language detected in this chunk's source text, `"ru"` or
    /// `"en"` (`spec.md` §3/§4.3).
    pub language: String,
    /// Which text-extraction provider produced this chunk's content:
    /// `"native-text"`, `"ocr"`, or `"empty"` (`spec.md` §4.2).
    pub extraction_method: String,
    /// Logical object-store path of the source document (`spec.md` §3).
    pub source_path: String,
    /// Content hash of the source document's bytes (`spec.md` §3),
    /// distinct from the per-point content hash the writer uses to detect
    /// chunk-id collisions.
    pub source_content_hash: String,
    /// Unix timestamp (seconds) the source document was issued, if known.
    pub issued_at: Option<i64>,
    /// Equipment/document vendor, if known.
    pub vendor: Option<String>,
    /// Confidentiality tier, always at least `"internal"` (`spec.md` §3).
    pub confidentiality: String,
    /// Opaque permission tags, round-tripped but never interpreted by this
    /// crate (see `DESIGN.md` Open Question resolution).
    pub permissions: Vec<String>,
    /// Free-form tags declared upstream (distinct from `keywords`, which
    /// this crate extracts itself at chunk time per `spec.md` §4.4).
    pub tags: Vec<String>,
    /// Up to 10 extracted keywords, ranked by relevance.
    pub keywords: Vec<String>,
    /// Importance score in `[0.0, 1.0]`, used to bias ranking.
    pub importance: f32,
    /// Numeric facts found in or near this chunk (primarily populated for
    /// table/IFC chunks describing equipment parameters).
    pub numeric_facts: NumericFacts,
    /// Unix timestamp (seconds) when the chunk was produced.
    pub created_at: i64,
}

/// A segment of normalised prose text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextChunk {
    /// Fields shared with every chunk variant.
    pub common: CommonPayload,
    /// The chunk's text content.
    pub content: String,
    /// Token count as measured by the chunker (not an estimate).
    pub token_count: usize,
    /// Page number this chunk was extracted from, if the source format
    /// carries page boundaries.
    pub page: Option<u32>,
    /// Number of tokens prepended from the tail of the previous chunk
    /// (`spec.md` §4.4, `O`); zero for a document's first chunk.
    pub overlap: usize,
}

/// A single table row (or small group of rows) from a spreadsheet source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableChunk {
    /// Fields shared with every chunk variant.
    pub common: CommonPayload,
    /// Rendered textual form of the row(s), used for lexical/dense search.
    pub content: String,
    /// Source sheet name, if known.
    pub sheet: Option<String>,
    /// 0-based row index within the sheet.
    pub row: usize,
    /// Stable digest of the row's ordered cell strings (`spec.md` §3/§4.4).
    pub row_hash: String,
    /// Page number the table appeared on, if the source format carries
    /// page boundaries.
    pub page: Option<u32>,
}

/// A caption or annotation extracted from a drawing/image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingChunk {
    /// Fields shared with every chunk variant.
    pub common: CommonPayload,
    /// Caption or OCR'd annotation text, if any.
    pub caption: Option<String>,
    /// Object-store key of the rendered image this chunk indexes.
    pub image_ref: String,
    /// Page number this drawing region appeared on, if known.
    pub page: Option<u32>,
}

/// A single IFC entity (or one instance of an entity type), property-set
/// flattened into text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfcChunk {
    /// Fields shared with every chunk variant.
    pub common: CommonPayload,
    /// IFC entity type, e.g. `IfcPump`, `IfcValve`.
    pub entity_type: String,
    /// Flattened property-set text.
    pub content: String,
}

/// A chunk of any modality, tagged by variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Chunk {
    /// Prose text.
    Text(TextChunk),
    /// Table row.
    Table(TableChunk),
    /// Drawing caption/annotation.
    Drawing(DrawingChunk),
    /// IFC entity.
    Ifc(IfcChunk),
}

impl Chunk {
    /// Returns the fields common to every variant.
    #[must_use]
    pub const fn common(&self) -> &CommonPayload {
        match self {
            Self::Text(c) => &c.common,
            Self::Table(c) => &c.common,
            Self::Drawing(c) => &c.common,
            Self::Ifc(c) => &c.common,
        }
    }

    /// Returns a mutable reference to the fields common to every variant.
    pub const fn common_mut(&mut self) -> &mut CommonPayload {
        match self {
            Self::Text(c) => &mut c.common,
            Self::Table(c) => &mut c.common,
            Self::Drawing(c) => &mut c.common,
            Self::Ifc(c) => &mut c.common,
        }
    }

    /// Returns the chunk id.
    #[must_use]
    pub fn id(&self) -> ChunkId {
        self.common().chunk_id
    }

    /// Returns the collection this chunk belongs to.
    #[must_use]
    pub fn collection(&self) -> CollectionName {
        self.common().collection
    }

    /// Returns the text to embed and index: the prose content for text
    /// chunks, the rendered row for table chunks, the caption for drawing
    /// chunks (empty string if none), and the flattened property text for
    /// IFC chunks.
    #[must_use]
    pub fn searchable_text(&self) -> &str {
        match self {
            Self::Text(c) => &c.content,
            Self::Table(c) => &c.content,
            Self::Drawing(c) => c.caption.as_deref().unwrap_or(""),
            Self::Ifc(c) => &c.content,
        }
    }
}

#[cfg(test)]
impl CommonPayload {
    /// Test-only fixture constructor with minimal/default field values,
    /// used across the crate's test modules to avoid repeating every field
    /// of a struct whose shape is dictated by `spec.md` §3 rather than by
    /// any one test's concerns. Callers override only the fields their
    /// test cares about via struct-update syntax.
    pub fn minimal(document_id: &str, position: usize) -> Self {
        Self {
            chunk_id: ChunkId::derive("doc-hash", "text-v1", position),
            document_id: document_id.to_string(),
            archive_id: "arc-1".to_string(),
            project_id: "proj-1".to_string(),
            object_id: "obj-1".to_string(),
            collection: CollectionName::Text,
            position,
            section: None,
            clause: None,
            discipline: None,
            doc_title: None,
            doc_family: None,
            doc_number: None,
            revision: None,
            language: "en".to_string(),
            extraction_method: "native-text".to_string(),
            source_path: format!("{document_id}.txt"),
            source_content_hash: "doc-hash".to_string(),
            issued_at: None,
            vendor: None,
            confidentiality: "internal".to_string(),
            permissions: vec![],
            tags: vec![],
            keywords: vec![],
            importance: 0.5,
            numeric_facts: NumericFacts::default(),
            created_at: 0,
        }
    }
}
