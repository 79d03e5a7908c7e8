//! Format parsers (C2): one handler per media type, producing a typed,
//! provider-tagged [`ParseResult`] from raw bytes.
//!
//! Grounded on `chunking::Chunker`'s trait shape (name/validate/description)
//! generalized one level up the pipeline. The byte-level extraction
//! capabilities (PDF/DOCX/XLSX/IFC/DXF readers, OCR) are out of scope per
//! `spec.md` §1/§9 — consumed here as injected capability traits
//! (`TextExtractor`, `SpreadsheetReader`, `IfcEntityReader`,
//! `DxfEntityReader`, `OcrEngine`) with deterministic fakes in
//! [`fakes`] for tests, mirroring the teacher's own test-fixture style
//! (`search::mod.rs::setup_storage_with_chunks`).

pub mod capabilities;
pub mod dxf;
pub mod fakes;
pub mod ifc;
pub mod office;
pub mod pdf;
pub mod text;

use crate::error::Result;

/// One unit of raw extracted content, before normalisation.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// A paragraph of prose text.
    TextParagraph(String),
    /// An explicit page boundary.
    PageBreak,
    /// A 2-D grid of cell strings from a table/spreadsheet, one row at a
    /// time (per `spec.md` §4.2, "one sheet -> many table blocks").
    TableRow {
        /// Sheet or table name, if known.
        sheet: Option<String>,
        /// 0-based row index within the sheet.
        row_index: usize,
        /// Ordered cell values, rendered as their raw text (numeric cells
        /// keep their raw value, not a locale-formatted display string).
        cells: Vec<String>,
    },
    /// A drawing region with optional OCR'd annotation text.
    DrawingRegion {
        /// Caption or OCR string, if any was recovered.
        caption: Option<String>,
        /// Object-store key of the source image/page.
        image_ref: String,
        /// Page number, if known.
        page: Option<u32>,
    },
    /// One IFC entity instance with its flattened property set.
    IfcEntity {
        /// IFC entity type, e.g. `IfcPump`.
        entity_type: String,
        /// IFC GUID, if present.
        guid: Option<String>,
        /// Flattened `{property_name: value}` map, insertion-ordered.
        properties: Vec<(String, String)>,
    },
}

/// Which text-extraction provider produced a parse result, retained
/// downstream per `spec.md` §4.2 ("Both outcomes attach a `method` field
/// that downstream retains").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    /// Extracted directly from the document's text layer.
    NativeText,
    /// Extracted via OCR over a rendered page image.
    Ocr,
    /// No text could be extracted at all.
    Empty,
}

impl ExtractionMethod {
    /// Returns the canonical lowercase method tag stored on chunks.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NativeText => "native-text",
            Self::Ocr => "ocr",
            Self::Empty => "empty",
        }
    }
}

/// The output of running one format parser over a document's bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult {
    /// Typed raw blocks extracted from the document.
    pub blocks: Vec<Block>,
    /// Which provider produced the text content of `blocks`.
    pub method: ExtractionMethod,
}

impl ParseResult {
    /// An empty result tagged [`ExtractionMethod::Empty`].
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            blocks: Vec::new(),
            method: ExtractionMethod::Empty,
        }
    }
}

/// A parser for one media type: a pure function from bytes to a
/// [`ParseResult`]. Implementations never raise on a single malformed
/// document — the job orchestrator (C7) turns a returned `Err` into a
/// per-document failure that does not abort the archive.
pub trait FormatParser: Send + Sync {
    /// Human-readable name, used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Parses `bytes` (the document's full content) into a [`ParseResult`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Parse`] if the bytes cannot be
    /// interpreted as the declared format at all.
    fn parse(&self, bytes: &[u8]) -> Result<ParseResult>;
}

/// Selects a parser for a declared media type. Returns `None` for media
/// types with no registered handler (the caller should treat that as
/// [`crate::error::ParseError::UnsupportedMediaType`]).
#[must_use]
pub fn parser_for_media_type(media_type: &str) -> Option<Box<dyn FormatParser>> {
    match media_type {
        "text/plain" | "text/markdown" => Some(Box::new(text::TextParser)),
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
            Some(Box::new(office::DocxParser::new(Box::new(
                fakes::FakeTextExtractor::default(),
            ))))
        }
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        | "application/vnd.ms-excel" => Some(Box::new(office::XlsxParser::new(Box::new(
            fakes::FakeSpreadsheetReader::default(),
        )))),
        "application/pdf" => Some(Box::new(pdf::PdfParser::new(
            Box::new(fakes::FakeTextExtractor::default()),
            Box::new(fakes::FakeOcrEngine::default()),
        ))),
        "application/ifc" | "application/x-step" => Some(Box::new(ifc::IfcParser::new(Box::new(
            fakes::FakeIfcEntityReader::default(),
        )))),
        "image/vnd.dxf" | "application/dxf" => Some(Box::new(dxf::DxfParser::new(Box::new(
            fakes::FakeDxfEntityReader::default(),
        )))),
        _ => None,
    }
}
