//! DXF parser: text/attribute entities only, no geometry extracted.

use crate::error::Result;
use crate::parse::capabilities::DxfEntityReader;
use crate::parse::{Block, ExtractionMethod, FormatParser, ParseResult};

/// Parser for DXF drawing files.
pub struct DxfParser {
    reader: Box<dyn DxfEntityReader>,
}

impl DxfParser {
    /// Creates a parser backed by the given entity-reading capability.
    #[must_use]
    pub fn new(reader: Box<dyn DxfEntityReader>) -> Self {
        Self { reader }
    }
}

impl FormatParser for DxfParser {
    fn name(&self) -> &'static str {
        "dxf"
    }

    fn parse(&self, bytes: &[u8]) -> Result<ParseResult> {
        let entities = self.reader.read(bytes)?;
        let blocks: Vec<Block> = entities
            .into_iter()
            .filter(|e| !e.text.trim().is_empty())
            .map(|e| Block::DrawingRegion {
                caption: Some(e.text),
                image_ref: String::new(),
                page: None,
            })
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result as CrateResult;
    use crate::parse::capabilities::DxfTextEntity;

    struct FixtureReader(Vec<DxfTextEntity>);
    impl DxfEntityReader for FixtureReader {
        fn read(&self, _bytes: &[u8]) -> CrateResult<Vec<DxfTextEntity>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_skips_blank_text_entities() {
        let reader = FixtureReader(vec![
            DxfTextEntity {
                text: "P-101".to_string(),
            },
            DxfTextEntity {
                text: "   ".to_string(),
            },
        ]);
        let parser = DxfParser::new(Box::new(reader));
        let result = parser.parse(b"ignored").unwrap();
        assert_eq!(result.blocks.len(), 1);
    }
}
