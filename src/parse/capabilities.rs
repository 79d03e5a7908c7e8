//! Injected byte-level extraction capabilities, consumed but not
//! implemented by this crate (`spec.md` §1: "bytes-level format readers ...
//! are treated as text-extraction providers").

use crate::error::Result;

/// A table/sheet recovered by a [`SpreadsheetReader`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetData {
    /// Sheet name.
    pub name: String,
    /// Rows, in order; trailing all-blank rows must already be elided by
    /// the implementation per `spec.md` §4.2.
    pub rows: Vec<Vec<String>>,
}

/// An IFC entity instance recovered by an [`IfcEntityReader`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IfcEntityData {
    /// IFC entity type, e.g. `IfcPump`.
    pub entity_type: String,
    /// IFC GUID.
    pub guid: Option<String>,
    /// Flattened property set, insertion-ordered.
    pub properties: Vec<(String, String)>,
}

/// A text or attribute entity recovered by a [`DxfEntityReader`].
#[derive(Debug, Clone, PartialEq)]
pub struct DxfTextEntity {
    /// Extracted text content.
    pub text: String,
}

/// Extracts plain text from a document's native text layer (PDF/DOCX).
pub trait TextExtractor: Send + Sync {
    /// Returns the extracted text, or an empty string if none is present.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes cannot be opened as the expected
    /// container format at all (a corrupt file), as distinct from simply
    /// containing no text.
    fn extract(&self, bytes: &[u8]) -> Result<String>;
}

/// Reads spreadsheet sheets out of XLSX/XLS bytes.
pub trait SpreadsheetReader: Send + Sync {
    /// Returns every sheet found in the workbook.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a readable workbook.
    fn read(&self, bytes: &[u8]) -> Result<Vec<SheetData>>;
}

/// Performs OCR over page-image bytes, used as the PDF fallback when native
/// extraction yields too little text.
pub trait OcrEngine: Send + Sync {
    /// Returns the recognised text.
    ///
    /// # Errors
    ///
    /// Returns an error if OCR could not run at all.
    fn ocr(&self, bytes: &[u8]) -> Result<String>;
}

/// Walks IFC entity instances and their defining property sets.
pub trait IfcEntityReader: Send + Sync {
    /// Returns every named entity instance with a GUID.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a readable IFC model.
    fn read(&self, bytes: &[u8]) -> Result<Vec<IfcEntityData>>;
}

/// Enumerates text and attribute entities in a DXF drawing (no geometry is
/// extracted, per `spec.md` §4.2).
pub trait DxfEntityReader: Send + Sync {
    /// Returns every text/attribute entity found.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a readable DXF file.
    fn read(&self, bytes: &[u8]) -> Result<Vec<DxfTextEntity>>;
}
