//! IFC parser: enumerates named entity instances and their property sets.
//!
//! Per `spec.md` §4.2: "enumerate entity instances; for each entity with a
//! name and GUID, walk its defining property sets and emit a flat
//! `{property_name: value}` map."

use crate::error::Result;
use crate::parse::capabilities::IfcEntityReader;
use crate::parse::{Block, ExtractionMethod, FormatParser, ParseResult};

/// Parser for IFC/STEP building-model files.
pub struct IfcParser {
    reader: Box<dyn IfcEntityReader>,
}

impl IfcParser {
    /// Creates a parser backed by the given entity-reading capability.
    #[must_use]
    pub fn new(reader: Box<dyn IfcEntityReader>) -> Self {
        Self { reader }
    }
}

impl FormatParser for IfcParser {
    fn name(&self) -> &'static str {
        "ifc"
    }

    fn parse(&self, bytes: &[u8]) -> Result<ParseResult> {
        let entities = self.reader.read(bytes)?;
        let blocks: Vec<Block> = entities
            .into_iter()
            .filter(|e| e.guid.is_some() && !e.entity_type.is_empty())
            .map(|e| Block::IfcEntity {
                entity_type: e.entity_type,
                guid: e.guid,
                properties: e.properties,
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
    use crate::parse::capabilities::IfcEntityData;

    struct FixtureReader(Vec<IfcEntityData>);
    impl IfcEntityReader for FixtureReader {
        fn read(&self, _bytes: &[u8]) -> CrateResult<Vec<IfcEntityData>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_filters_unnamed_entities() {
        let reader = FixtureReader(vec![
            IfcEntityData {
                entity_type: "IfcPump".to_string(),
                guid: Some("abc123".to_string()),
                properties: vec![("flow_rate".to_string(), "1000 m3/h".to_string())],
            },
            IfcEntityData {
                entity_type: String::new(),
                guid: None,
                properties: vec![],
            },
        ]);
        let parser = IfcParser::new(Box::new(reader));
        let result = parser.parse(b"ignored").unwrap();
        assert_eq!(result.blocks.len(), 1);
    }
}
