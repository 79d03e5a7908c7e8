//! Filter expressions shared by the hybrid retriever (C9) and analog
//! search (C12), per `spec.md` §4.9: "always-on" equality filters, caller
//! equality/set-membership filters, and numeric-fact range filters.

use crate::core::chunk::Chunk;

/// A composed filter expression, matched against a chunk's common payload
/// and numeric facts. All clauses are ANDed together.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    /// Field-name → required value equality clauses.
    pub equals: Vec<(String, String)>,
    /// Field-name → allowed-value-set membership clauses.
    pub set_membership: Vec<(String, Vec<String>)>,
    /// Numeric-fact name → inclusive `[min, max]` range clauses.
    pub numeric_ranges: Vec<(String, f64, f64)>,
}

impl Filter {
    /// An empty filter that matches everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality clause, builder-style.
    #[must_use]
    pub fn with_equals(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.equals.push((field.into(), value.into()));
        self
    }

    /// Adds a set-membership clause, builder-style.
    #[must_use]
    pub fn with_set_membership(mut self, field: impl Into<String>, values: Vec<String>) -> Self {
        self.set_membership.push((field.into(), values));
        self
    }

    /// Adds a numeric-fact range clause, builder-style.
    #[must_use]
    pub fn with_numeric_range(mut self, quantity: impl Into<String>, min: f64, max: f64) -> Self {
        self.numeric_ranges.push((quantity.into(), min, max));
        self
    }

    /// Resolves one named field on a chunk's common payload to a comparable
    /// string, or `None` if the field does not exist on this chunk (which
    /// is treated as "no value" for equality/set-membership purposes, per
    /// `spec.md` §4.9's "where those fields exist").
    fn field_value(chunk: &Chunk, field: &str) -> Option<String> {
        let common = chunk.common();
        match field {
            "archive_id" => Some(common.archive_id.clone()),
            "document_id" => Some(common.document_id.clone()),
            "project_id" => Some(common.project_id.clone()),
            "object_id" => Some(common.object_id.clone()),
            "discipline" => common.discipline.clone(),
            "doc_family" => common.doc_family.clone(),
            "doc_number" => common.doc_number.clone(),
            "doc_title" => common.doc_title.clone(),
            "revision" => common.revision.clone(),
            "language" => Some(common.language.clone()),
            "extraction_method" => Some(common.extraction_method.clone()),
            "vendor" => common.vendor.clone(),
            "confidentiality" => Some(common.confidentiality.clone()),
            "section" => common.section.clone(),
            "clause" => common.clause.clone(),
            _ => None,
        }
    }

    /// Returns `true` if `chunk` satisfies every clause in this filter.
    #[must_use]
    pub fn matches(&self, chunk: &Chunk) -> bool {
        for (field, expected) in &self.equals {
            match Self::field_value(chunk, field) {
                Some(actual) if &actual == expected => {}
                _ => return false,
            }
        }
        for (field, allowed) in &self.set_membership {
            match Self::field_value(chunk, field) {
                Some(actual) if allowed.contains(&actual) => {}
                _ => return false,
            }
        }
        for (quantity, min, max) in &self.numeric_ranges {
            match chunk.common().numeric_facts.get(quantity) {
                Some(value) if value.value >= *min && value.value <= *max => {}
                _ => return false,
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chunk::{CommonPayload, TextChunk};
    use crate::core::numeric_facts::{NumericFacts, NumericValue};

    fn chunk(discipline: &str, flow_rate: Option<f64>) -> Chunk {
        let mut numeric_facts = NumericFacts::new();
        if let Some(v) = flow_rate {
            numeric_facts.insert("flow_rate", NumericValue::new(v, "m3/h"));
        }
        Chunk::Text(TextChunk {
            common: CommonPayload {
                discipline: Some(discipline.to_string()),
                numeric_facts,
                ..CommonPayload::minimal("doc-1", 0)
            },
            content: "pump".to_string(),
            token_count: 1,
            page: None,
            overlap: 0,
        })
    }

    #[test]
    fn test_language_field_filterable() {
        let filter = Filter::new().with_equals("language", "en");
        assert!(filter.matches(&chunk("process", None)));
    }

    #[test]
    fn test_equals_clause() {
        let filter = Filter::new().with_equals("discipline", "process");
        assert!(filter.matches(&chunk("process", None)));
        assert!(!filter.matches(&chunk("piping", None)));
    }

    #[test]
    fn test_set_membership_clause() {
        let filter = Filter::new().with_set_membership(
            "discipline",
            vec!["process".to_string(), "piping".to_string()],
        );
        assert!(filter.matches(&chunk("piping", None)));
        assert!(!filter.matches(&chunk("civil", None)));
    }

    #[test]
    fn test_numeric_range_clause() {
        let filter = Filter::new().with_numeric_range("flow_rate", 800.0, 1200.0);
        assert!(filter.matches(&chunk("process", Some(1000.0))));
        assert!(!filter.matches(&chunk("process", Some(1500.0))));
        assert!(!filter.matches(&chunk("process", None)));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(Filter::new().matches(&chunk("process", None)));
    }
}
