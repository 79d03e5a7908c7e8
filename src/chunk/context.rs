//! Per-document context threaded through every chunker strategy.

use crate::parse::ExtractionMethod;
use crate::text::language::Language;

/// Document-level fields every chunk variant needs in its [`crate::core::chunk::CommonPayload`],
/// gathered once per document rather than re-derived per chunk.
#[derive(Debug, Clone)]
pub struct ChunkContext {
    /// Id of the document being chunked.
    pub document_id: String,
    /// Id of the archive the document belongs to.
    pub archive_id: String,
    /// Id of the project the owning archive belongs to.
    pub project_id: String,
    /// Id of the object/facility within the project.
    pub object_id: String,
    /// Logical object-store path of the source document.
    pub source_path: String,
    /// Content hash of the document's normalised bytes, the chunk id's
    /// deterministic seed and the chunk payload's `source_content_hash`.
    pub document_content_hash: String,
    /// Engineering discipline classification, if known.
    pub discipline: Option<String>,
    /// Document title, if known.
    pub doc_title: Option<String>,
    /// Standard/document family (e.g. `ГОСТ`), if this document is itself a
    /// cited standard.
    pub doc_family: Option<String>,
    /// Standard/document number (e.g. `21.201-2018`).
    pub doc_number: Option<String>,
    /// Revision tag, if declared.
    pub revision: Option<String>,
    /// Dominant language of the document's normalised text blocks, per
    /// `spec.md` §4.3 (block-level detection aggregated to the one chunk
    /// id space a document's chunker strategies share).
    pub language: Language,
    /// Which text-extraction provider produced this document's content
    /// (`spec.md` §4.2).
    pub extraction_method: ExtractionMethod,
    /// Unix timestamp (seconds) the source document was issued, if known.
    pub issued_at: Option<i64>,
    /// Equipment/document vendor, if known.
    pub vendor: Option<String>,
    /// Confidentiality tier; defaults to `"internal"`.
    pub confidentiality: String,
    /// Permission tags to round-trip onto every chunk produced.
    pub permissions: Vec<String>,
    /// Free-form tags to round-trip onto every chunk produced, distinct
    /// from the keywords this crate extracts itself.
    pub tags: Vec<String>,
    /// Unix timestamp (seconds) to stamp onto produced chunks.
    pub created_at: i64,
}

impl ChunkContext {
    /// Creates a new chunking context.
    #[must_use]
    pub fn new(
        document_id: impl Into<String>,
        archive_id: impl Into<String>,
        document_content_hash: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            archive_id: archive_id.into(),
            project_id: String::new(),
            object_id: String::new(),
            source_path: String::new(),
            document_content_hash: document_content_hash.into(),
            discipline: None,
            doc_title: None,
            doc_family: None,
            doc_number: None,
            revision: None,
            language: Language::En,
            extraction_method: ExtractionMethod::NativeText,
            issued_at: None,
            vendor: None,
            confidentiality: "internal".to_string(),
            permissions: Vec::new(),
            tags: Vec::new(),
            created_at,
        }
    }

    /// Sets the discipline tag, builder-style.
    #[must_use]
    pub fn with_discipline(mut self, discipline: impl Into<String>) -> Self {
        self.discipline = Some(discipline.into());
        self
    }

    /// Sets the permission tags, builder-style.
    #[must_use]
    pub fn with_permissions(mut self, permissions: Vec<String>) -> Self {
        self.permissions = permissions;
        self
    }

    /// Sets the document identity fields (title/family/number/revision),
    /// builder-style. Family/number are typically populated only for
    /// documents that are themselves a cited standard (e.g. a ГОСТ text).
    #[must_use]
    pub fn with_document_identity(
        mut self,
        doc_title: Option<String>,
        doc_family: Option<String>,
        doc_number: Option<String>,
        revision: Option<String>,
    ) -> Self {
        self.doc_title = doc_title;
        self.doc_family = doc_family;
        self.doc_number = doc_number;
        self.revision = revision;
        self
    }

    /// Sets the confidentiality tier, builder-style; always clamped to at
    /// least `"internal"`.
    #[must_use]
    pub fn with_confidentiality(mut self, confidentiality: impl Into<String>) -> Self {
        let tag = confidentiality.into();
        self.confidentiality = if tag == "public" { "internal".to_string() } else { tag };
        self
    }

    /// Sets the owning project/object ids, builder-style.
    #[must_use]
    pub fn with_project(mut self, project_id: impl Into<String>, object_id: impl Into<String>) -> Self {
        self.project_id = project_id.into();
        self.object_id = object_id.into();
        self
    }

    /// Sets the source document's logical object-store path, builder-style.
    #[must_use]
    pub fn with_source_path(mut self, source_path: impl Into<String>) -> Self {
        self.source_path = source_path.into();
        self
    }

    /// Sets the dominant detected language, builder-style.
    #[must_use]
    pub const fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Sets the text-extraction method the parser reported, builder-style.
    #[must_use]
    pub const fn with_extraction_method(mut self, method: ExtractionMethod) -> Self {
        self.extraction_method = method;
        self
    }

    /// Sets the document's issued-at timestamp, builder-style.
    #[must_use]
    pub const fn with_issued_at(mut self, issued_at: Option<i64>) -> Self {
        self.issued_at = issued_at;
        self
    }

    /// Sets the document's vendor, builder-style.
    #[must_use]
    pub fn with_vendor(mut self, vendor: Option<String>) -> Self {
        self.vendor = vendor;
        self
    }

    /// Sets the free-form tags to round-trip onto every chunk, builder-style.
    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}
