//! Document: one source file within an archive.

use crate::core::manifest::{Discipline, DocType, ManifestEntry, Phase};
use serde::{Deserialize, Serialize};

/// A single source file to be ingested, as declared by the archive
/// manifest and confirmed once fetched from the object store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier, typically the manifest-declared path.
    pub id: String,
    /// Id of the owning archive.
    pub archive_id: String,
    /// Object-store key/path within the archive.
    pub path: String,
    /// Declared media type (e.g. `application/pdf`, `application/ifc`).
    pub media_type: String,
    /// Document type, inferred from path tokens per `spec.md` §6.
    pub doc_type: DocType,
    /// Engineering discipline, resolved from the entry's own tag, the
    /// manifest's `default_discipline`, or a path-token inference.
    pub discipline: Discipline,
    /// Project lifecycle phase inherited from the owning archive's
    /// manifest.
    pub phase: Phase,
    /// SHA-256 hash of the fetched bytes, computed during ingestion (not
    /// trusted from the manifest).
    pub content_hash: Option<String>,
    /// Opaque permission tags declared by the manifest.
    pub permissions: Vec<String>,
    /// Size in bytes, populated once fetched.
    pub size_bytes: Option<u64>,
    /// Equipment/document vendor, if declared.
    pub vendor: Option<String>,
    /// Unix timestamp (seconds) the document was issued, if declared.
    pub issued_at: Option<i64>,
    /// Free-form tags declared by the manifest.
    pub tags: Vec<String>,
}

impl Document {
    /// Creates a document from its manifest declaration, prior to fetch.
    #[must_use]
    pub fn from_manifest_entry(
        archive_id: impl Into<String>,
        entry: &ManifestEntry,
        default_discipline: Discipline,
        phase: Phase,
    ) -> Self {
        let path = entry.path.clone();
        Self {
            id: path.clone(),
            archive_id: archive_id.into(),
            path,
            media_type: entry.media_type.clone(),
            doc_type: entry.doc_type(),
            discipline: entry.effective_discipline(default_discipline),
            phase,
            content_hash: None,
            permissions: entry.permissions.clone(),
            size_bytes: None,
            vendor: entry.vendor.clone(),
            issued_at: entry.issued_at,
            tags: entry.tags.clone(),
        }
    }

    /// Records the content hash and size once the document has been fetched.
    pub fn mark_fetched(&mut self, content_hash: String, size_bytes: u64) {
        self.content_hash = Some(content_hash);
        self.size_bytes = Some(size_bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str) -> ManifestEntry {
        ManifestEntry {
            path: path.to_string(),
            media_type: "application/pdf".to_string(),
            discipline: None,
            permissions: vec!["internal".to_string()],
            vendor: None,
            issued_at: None,
            tags: vec![],
        }
    }

    #[test]
    fn test_from_manifest_entry_uses_path_as_id() {
        let doc = Document::from_manifest_entry(
            "arc-1",
            &entry("specs/pump-p101.pdf"),
            Discipline::Process,
            Phase::Rd,
        );
        assert_eq!(doc.id, "specs/pump-p101.pdf");
        assert!(doc.content_hash.is_none());
        assert_eq!(doc.doc_type, DocType::Spec);
    }

    #[test]
    fn test_mark_fetched_sets_hash_and_size() {
        let mut doc = Document::from_manifest_entry(
            "arc-1",
            &entry("a.pdf"),
            Discipline::Process,
            Phase::Pd,
        );
        doc.mark_fetched("abc123".to_string(), 4096);
        assert_eq!(doc.content_hash, Some("abc123".to_string()));
        assert_eq!(doc.size_bytes, Some(4096));
    }

    #[test]
    fn test_discipline_inferred_from_path_overrides_default() {
        let doc = Document::from_manifest_entry(
            "arc-1",
            &entry("piping/iso-1.pdf"),
            Discipline::Process,
            Phase::Pd,
        );
        assert_eq!(doc.discipline, Discipline::Piping);
    }
}
