//! DOCX and XLSX/XLS parsers.
//!
//! Per `spec.md` §4.2: DOCX paragraphs and table rows are emitted
//! separately with cell text trimmed; XLSX/XLS sheets become many table
//! blocks with blank trailing rows elided and numeric cells preserving
//! their raw value.

use crate::error::Result;
use crate::parse::capabilities::{SpreadsheetReader, TextExtractor};
use crate::parse::{Block, ExtractionMethod, FormatParser, ParseResult};

/// Parser for `.docx` documents, built on an injected [`TextExtractor`].
pub struct DocxParser {
    extractor: Box<dyn TextExtractor>,
}

impl DocxParser {
    /// Creates a parser backed by the given text extraction capability.
    #[must_use]
    pub fn new(extractor: Box<dyn TextExtractor>) -> Self {
        Self { extractor }
    }
}

impl FormatParser for DocxParser {
    fn name(&self) -> &'static str {
        "docx"
    }

    fn parse(&self, bytes: &[u8]) -> Result<ParseResult> {
        let text = self.extractor.extract(bytes)?;
        let blocks: Vec<Block> = text
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| Block::TextParagraph(p.to_string()))
            .collect();
        if blocks.is_empty() {
            return Ok(ParseResult::empty());
        }
        Ok(ParseResult {
            blocks,
            method: ExtractionMethod::NativeText,
        })
    }
}

/// Parser for `.xlsx`/`.xls` workbooks, built on an injected
/// [`SpreadsheetReader`].
pub struct XlsxParser {
    reader: Box<dyn SpreadsheetReader>,
}

impl XlsxParser {
    /// Creates a parser backed by the given spreadsheet-reading capability.
    #[must_use]
    pub fn new(reader: Box<dyn SpreadsheetReader>) -> Self {
        Self { reader }
    }
}

impl FormatParser for XlsxParser {
    fn name(&self) -> &'static str {
        "xlsx"
    }

    fn parse(&self, bytes: &[u8]) -> Result<ParseResult> {
        let sheets = self.reader.read(bytes)?;
        let mut blocks = Vec::new();
        for sheet in sheets {
            let trimmed_row_count = trailing_blank_trim_len(&sheet.rows);
            for (row_index, cells) in sheet.rows.into_iter().take(trimmed_row_count).enumerate() {
                blocks.push(Block::TableRow {
                    sheet: Some(sheet.name.clone()),
                    row_index,
                    cells: cells.into_iter().map(|c| c.trim().to_string()).collect(),
                });
            }
        }
        if blocks.is_empty() {
            return Ok(ParseResult::empty());
        }
        Ok(ParseResult {
            blocks,
            method: ExtractionMethod::NativeText,
        })
    }
}

/// Returns the number of leading rows to keep, eliding any trailing rows
/// whose cells are all blank.
fn trailing_blank_trim_len(rows: &[Vec<String>]) -> usize {
    let mut len = rows.len();
    while len > 0 && rows[len - 1].iter().all(|c| c.trim().is_empty()) {
        len -= 1;
    }
    len
}
