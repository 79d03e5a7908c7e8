//! TXT/MD parser: one text block per input, UTF-8, BOM stripped.

use crate::error::Result;
use crate::parse::{Block, ExtractionMethod, FormatParser, ParseResult};

/// Parser for plain text and Markdown documents.
pub struct TextParser;

impl FormatParser for TextParser {
    fn name(&self) -> &'static str {
        "text"
    }

    fn parse(&self, bytes: &[u8]) -> Result<ParseResult> {
        let text = String::from_utf8_lossy(bytes);
        let stripped = text.strip_prefix('\u{feff}').unwrap_or(&text);
        if stripped.trim().is_empty() {
            return Ok(ParseResult::empty());
        }
        Ok(ParseResult {
            blocks: vec![Block::TextParagraph(stripped.to_string())],
            method: ExtractionMethod::NativeText,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("hello".as_bytes());
        let result = TextParser.parse(&bytes).unwrap();
        assert_eq!(result.blocks, vec![Block::TextParagraph("hello".to_string())]);
    }

    #[test]
    fn test_empty_input_yields_empty_result() {
        let result = TextParser.parse(b"   \n  ").unwrap();
        assert!(result.blocks.is_empty());
        assert_eq!(result.method, ExtractionMethod::Empty);
    }

    #[test]
    fn test_plain_text_is_native() {
        let result = TextParser.parse(b"Pump spec.").unwrap();
        assert_eq!(result.method, ExtractionMethod::NativeText);
    }
}
