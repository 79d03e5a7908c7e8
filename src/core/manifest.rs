//! Archive manifest schema (external interface, `spec.md` §6).
//!
//! The manifest is the caller-supplied description of what to ingest: an
//! archive id/name and the list of documents it contains. It is untrusted
//! input — every field is validated before a [`crate::core::Archive`] or any
//! [`crate::core::Document`] is constructed from it. A missing or malformed
//! manifest is a hard job failure (`spec.md` §6, "Missing manifest is a hard
//! job failure").

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Project lifecycle phase a manifest was issued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Preliminary design.
    Pd,
    /// Detailed/working design.
    Rd,
    /// As-built documentation.
    Asbuilt,
}

/// Confidentiality tier declared on a manifest; every chunk inherits at
/// least `Internal` per `spec.md` §3's invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidentiality {
    /// Publicly shareable.
    Public,
    /// Internal to the organisation; the floor for every chunk.
    Internal,
    /// Confidential, restricted distribution.
    Confidential,
    /// Secret, most restricted.
    Secret,
}

impl Confidentiality {
    /// Clamps to at least [`Confidentiality::Internal`], per the invariant
    /// in `spec.md` §3 ("Confidentiality tag on every chunk is at least
    /// `internal`").
    #[must_use]
    pub fn at_least_internal(self) -> Self {
        self.max(Self::Internal)
    }
}

/// Engineering discipline, inferred from manifest/path tokens or declared
/// explicitly (`spec.md` §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discipline {
    /// Process engineering.
    Process,
    /// Piping.
    Piping,
    /// Civil/structural.
    Civil,
    /// Electrical.
    Elec,
    /// Instrumentation & control.
    Instr,
    /// HVAC.
    Hvac,
    /// Procurement.
    Procurement,
}

impl Discipline {
    /// Returns the canonical lowercase tag stored on chunks and used as a
    /// retrieval filter value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Process => "process",
            Self::Piping => "piping",
            Self::Civil => "civil",
            Self::Elec => "elec",
            Self::Instr => "instr",
            Self::Hvac => "hvac",
            Self::Procurement => "procurement",
        }
    }

    /// Infers a discipline from a leading path token, per `spec.md` §6
    /// ("The orchestrator infers a document's discipline from path tokens").
    #[must_use]
    pub fn from_path_token(token: &str) -> Option<Self> {
        match token {
            "process" => Some(Self::Process),
            "piping" => Some(Self::Piping),
            "civil" => Some(Self::Civil),
            "elec" => Some(Self::Elec),
            "instr" => Some(Self::Instr),
            "hvac" => Some(Self::Hvac),
            "procurement" => Some(Self::Procurement),
            _ => None,
        }
    }
}

/// Document type, inferred from manifest path tokens per `spec.md` §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    /// Process flow diagram.
    Pfd,
    /// Piping & instrumentation diagram.
    Pid,
    /// Specification document.
    Spec,
    /// Bill of materials.
    Bom,
    /// Bill of quantities.
    Boq,
    /// General arrangement/detail drawing.
    Drawing,
    /// IFC building-information model.
    Ifc,
    /// Equipment/vendor manual.
    Manual,
    /// Falls through when no path token matches.
    Report,
}

impl DocType {
    /// Infers a document type from the leading path tokens of a manifest
    /// entry's path, per `spec.md` §6's token table (`pid/`→P&ID, `pfd/`→PFD,
    /// `spec/`→SPEC, `bom/`→BOM, `boq/`→BOQ, `drawing/`→DRAWING, `ifc/`→IFC,
    /// else REPORT).
    #[must_use]
    pub fn infer_from_path(path: &str) -> Self {
        let first = path.split('/').next().unwrap_or("").to_ascii_lowercase();
        match first.as_str() {
            "pid" => Self::Pid,
            "pfd" => Self::Pfd,
            "spec" => Self::Spec,
            "bom" => Self::Bom,
            "boq" => Self::Boq,
            "drawing" => Self::Drawing,
            "ifc" => Self::Ifc,
            "manual" => Self::Manual,
            _ => Self::Report,
        }
    }
}

/// One document entry in a manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Path of the document within the archive's object-store prefix.
    pub path: String,
    /// Declared media type.
    pub media_type: String,
    /// Optional discipline tag; falls back to the manifest's
    /// `default_discipline` when absent, per `spec.md` §6.
    #[serde(default)]
    pub discipline: Option<Discipline>,
    /// Opaque permission tags.
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Equipment/document vendor, if declared.
    #[serde(default)]
    pub vendor: Option<String>,
    /// Unix timestamp (seconds) the document was issued, if declared.
    #[serde(default)]
    pub issued_at: Option<i64>,
    /// Free-form tags to round-trip onto every chunk produced from this
    /// document.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ManifestEntry {
    /// Resolves this entry's effective discipline: its own declaration, or
    /// else the manifest's `default_discipline`, or else inferred from the
    /// leading path token.
    #[must_use]
    pub fn effective_discipline(&self, default_discipline: Discipline) -> Discipline {
        self.discipline
            .or_else(|| {
                self.path
                    .split('/')
                    .next()
                    .and_then(Discipline::from_path_token)
            })
            .unwrap_or(default_discipline)
    }

    /// Document type inferred from this entry's path.
    #[must_use]
    pub fn doc_type(&self) -> DocType {
        DocType::infer_from_path(&self.path)
    }
}

/// The full archive manifest as supplied by the caller (`spec.md` §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Stable archive identifier.
    pub archive_id: String,
    /// Project identifier this archive belongs to.
    pub project_id: String,
    /// Object/facility identifier within the project.
    pub object_id: String,
    /// Project lifecycle phase.
    pub phase: Phase,
    /// Customer/owner name.
    pub customer: String,
    /// Languages present in the archive.
    pub language: Vec<String>,
    /// Confidentiality tier for the whole archive.
    pub confidentiality: Confidentiality,
    /// Discipline assumed for any file not explicitly disciplined.
    pub default_discipline: Discipline,
    /// Documents declared in this archive.
    pub documents: Vec<ManifestEntry>,
}

impl Manifest {
    /// Parses and validates a manifest from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the manifest is empty of
    /// documents, declares duplicate paths, or fails to deserialize.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let manifest: Self = serde_json::from_slice(bytes).map_err(|e| Error::InvalidState {
            message: format!("malformed manifest: {e}"),
        })?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<()> {
        if self.archive_id.trim().is_empty() {
            return Err(Error::InvalidState {
                message: "manifest archive_id must not be empty".to_string(),
            });
        }
        if self.project_id.trim().is_empty() || self.object_id.trim().is_empty() {
            return Err(Error::InvalidState {
                message: "manifest project_id and object_id must not be empty".to_string(),
            });
        }
        if self.documents.is_empty() {
            return Err(Error::InvalidState {
                message: "manifest declares no documents".to_string(),
            });
        }
        let mut seen = std::collections::HashSet::new();
        for entry in &self.documents {
            if entry.path.trim().is_empty() {
                return Err(Error::InvalidState {
                    message: "manifest entry has an empty path".to_string(),
                });
            }
            if !seen.insert(&entry.path) {
                return Err(Error::InvalidState {
                    message: format!("manifest declares duplicate path: {}", entry.path),
                });
            }
        }
        Ok(())
    }
}
