//! PDF parser: native-text-first, with page-image OCR fallback.
//!
//! Per `spec.md` §4.2: "first try native text extraction; if the result is
//! empty or below a configured character threshold, fall back to page-image
//! OCR. Both outcomes attach a `method` field that downstream retains."

use crate::error::Result;
use crate::parse::capabilities::{OcrEngine, TextExtractor};
use crate::parse::{Block, ExtractionMethod, FormatParser, ParseResult};

/// Below this many extracted characters, native extraction is considered
/// insufficient and OCR is attempted instead.
pub const MIN_NATIVE_CHARS: usize = 32;

/// Parser for PDF documents.
pub struct PdfParser {
    extractor: Box<dyn TextExtractor>,
    ocr: Box<dyn OcrEngine>,
}

impl PdfParser {
    /// Creates a parser backed by the given native-extraction and OCR
    /// capabilities.
    #[must_use]
    pub fn new(extractor: Box<dyn TextExtractor>, ocr: Box<dyn OcrEngine>) -> Self {
        Self { extractor, ocr }
    }
}

impl FormatParser for PdfParser {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn parse(&self, bytes: &[u8]) -> Result<ParseResult> {
        let native = self.extractor.extract(bytes)?;
        if native.trim().chars().count() >= MIN_NATIVE_CHARS {
            return Ok(ParseResult {
                blocks: vec![Block::TextParagraph(native)],
                method: ExtractionMethod::NativeText,
            });
        }

        let ocr_text = self.ocr.ocr(bytes)?;
        if ocr_text.trim().is_empty() {
            return Ok(ParseResult::empty());
        }
        Ok(ParseResult {
            blocks: vec![Block::TextParagraph(ocr_text)],
            method: ExtractionMethod::Ocr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result as CrateResult;

    struct FixedExtractor(&'static str);
    impl TextExtractor for FixedExtractor {
        fn extract(&self, _bytes: &[u8]) -> CrateResult<String> {
            Ok(self.0.to_string())
        }
    }

    struct FixedOcr(&'static str);
    impl OcrEngine for FixedOcr {
        fn ocr(&self, _bytes: &[u8]) -> CrateResult<String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_uses_native_text_when_sufficient() {
        let parser = PdfParser::new(
            Box::new(FixedExtractor(
                "This PDF has plenty of native text to extract cleanly.",
            )),
            Box::new(FixedOcr("should not be used")),
        );
        let result = parser.parse(b"ignored").unwrap();
        assert_eq!(result.method, ExtractionMethod::NativeText);
    }

    #[test]
    fn test_falls_back_to_ocr_when_native_too_short() {
        let parser = PdfParser::new(
            Box::new(FixedExtractor("")),
            Box::new(FixedOcr("Scanned pump datasheet text recovered by OCR.")),
        );
        let result = parser.parse(b"ignored").unwrap();
        assert_eq!(result.method, ExtractionMethod::Ocr);
        assert!(!result.blocks.is_empty());
    }

    #[test]
    fn test_empty_when_both_fail_to_produce_text() {
        let parser = PdfParser::new(Box::new(FixedExtractor("")), Box::new(FixedOcr("")));
        let result = parser.parse(b"ignored").unwrap();
        assert_eq!(result.method, ExtractionMethod::Empty);
    }
}
