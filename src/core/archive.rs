//! Archive: the unit of ingestion.

use crate::core::document::Document;
use crate::core::manifest::{Confidentiality, Discipline, Manifest, Phase};
use serde::{Deserialize, Serialize};

/// An archive is a named collection of documents ingested together and
/// queried together. Archive id is the partition key for every index
/// write and every retrieval filter. Immutable once created; deleted only
/// by an administrator (`spec.md` §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Archive {
    /// Stable archive identifier.
    pub id: String,
    /// Project identifier.
    pub project_id: String,
    /// Object/facility identifier within the project.
    pub object_id: String,
    /// Project lifecycle phase.
    pub phase: Phase,
    /// Confidentiality tier for the whole archive.
    pub confidentiality: Confidentiality,
    /// Content hash of the manifest, used to dedupe re-uploads.
    pub content_hash: String,
    /// Unix timestamp (seconds) the archive was received.
    pub received_at: i64,
    /// Documents belonging to this archive.
    pub documents: Vec<Document>,
}

impl Archive {
    /// Builds an archive from a validated manifest, constructing one
    /// [`Document`] per manifest entry with its discipline/doc-type/phase
    /// resolved.
    #[must_use]
    pub fn from_manifest(manifest: &Manifest, content_hash: String, received_at: i64) -> Self {
        let documents = manifest
            .documents
            .iter()
            .map(|entry| {
                Document::from_manifest_entry(
                    manifest.archive_id.clone(),
                    entry,
                    manifest.default_discipline,
                    manifest.phase,
                )
            })
            .collect();
        Self {
            id: manifest.archive_id.clone(),
            project_id: manifest.project_id.clone(),
            object_id: manifest.object_id.clone(),
            phase: manifest.phase,
            confidentiality: manifest.confidentiality.at_least_internal(),
            content_hash,
            received_at,
            documents,
        }
    }

    /// Returns the number of documents currently recorded.
    #[must_use]
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Returns documents matching a discipline filter.
    pub fn documents_with_discipline(&self, discipline: Discipline) -> impl Iterator<Item = &Document> {
        self.documents
            .iter()
            .filter(move |d| d.discipline.as_str() == discipline.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::manifest::ManifestEntry;

    fn manifest() -> Manifest {
        Manifest {
            archive_id: "arc-1".to_string(),
            project_id: "proj-9".to_string(),
            object_id: "p101".to_string(),
            phase: Phase::Rd,
            customer: "Acme".to_string(),
            language: vec!["ru".to_string()],
            confidentiality: Confidentiality::Public,
            default_discipline: Discipline::Process,
            documents: vec![ManifestEntry {
                path: "specs/a.pdf".to_string(),
                media_type: "application/pdf".to_string(),
                discipline: None,
                permissions: vec![],
                vendor: None,
                issued_at: None,
                tags: vec![],
            }],
        }
    }

    #[test]
    fn test_from_manifest_builds_documents() {
        let archive = Archive::from_manifest(&manifest(), "hash123".to_string(), 1000);
        assert_eq!(archive.document_count(), 1);
        assert_eq!(archive.documents[0].discipline, Discipline::Process);
    }

    #[test]
    fn test_confidentiality_floor_applied() {
        let archive = Archive::from_manifest(&manifest(), "hash123".to_string(), 1000);
        assert_eq!(archive.confidentiality, Confidentiality::Internal);
    }

    #[test]
    fn test_documents_with_discipline_filters() {
        let archive = Archive::from_manifest(&manifest(), "hash123".to_string(), 1000);
        assert_eq!(
            archive.documents_with_discipline(Discipline::Process).count(),
            1
        );
        assert_eq!(
            archive.documents_with_discipline(Discipline::Piping).count(),
            0
        );
    }
}
