//! Intent classifier (C8, part 2): keyword-rule classification of a
//! normalised query into one of eight intents, per `spec.md` §4.8.

use crate::text::reference::Reference;

/// One of the eight retrieval intents a query can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// "What is X" style queries.
    Definition,
    /// "Where does X apply" style queries.
    Scope,
    /// "X must/shall" requirement lookups.
    Requirement,
    /// Direct standard-citation lookups.
    Reference,
    /// "X vs Y" comparisons.
    Comparison,
    /// Status/currency queries (`is_current`, `canceled_by`, ...).
    Relevance,
    /// Equipment analog search.
    Analog,
    /// Anything not matched by a more specific rule.
    General,
}

const DEFINITION_WORDS: &[&str] = &["что такое", "what is", "define", "определение", "means"];
const SCOPE_WORDS: &[&str] = &["область применения", "scope", "applies to", "распространяется"];
const REQUIREMENT_WORDS: &[&str] = &["должен", "требуется", "shall", "must", "required", "требование"];
const COMPARISON_WORDS: &[&str] = &["сравнение", "compare", "vs", "отличие", "разница"];
const RELEVANCE_WORDS: &[&str] = &["действует ли", "is current", "canceled", "отменен", "актуальн"];
const ANALOG_WORDS: &[&str] = &["аналог", "analog", "equivalent", "подбор", "similar equipment"];

/// Classifies a normalised query, returning the intent and a confidence in
/// `[0.5, 0.95]`. Direct standard-citation references (non-empty
/// `references`) force `Reference` at confidence 0.95.
#[must_use]
pub fn classify_intent(normalized_query: &str, references: &[Reference]) -> (Intent, f32) {
    if !references.is_empty() {
        return (Intent::Reference, 0.95);
    }

    let lower = normalized_query.to_lowercase();
    let rules: &[(&[&str], Intent)] = &[
        (ANALOG_WORDS, Intent::Analog),
        (DEFINITION_WORDS, Intent::Definition),
        (SCOPE_WORDS, Intent::Scope),
        (RELEVANCE_WORDS, Intent::Relevance),
        (COMPARISON_WORDS, Intent::Comparison),
        (REQUIREMENT_WORDS, Intent::Requirement),
    ];

    for (words, intent) in rules {
        if words.iter().any(|w| lower.contains(w)) {
            return (*intent, 0.8);
        }
    }

    (Intent::General, 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_citation_forces_reference_intent() {
        let refs = vec![Reference {
            family: "ГОСТ".to_string(),
            number: "21.201".to_string(),
            year: Some("2018".to_string()),
            clause: Some("4.2".to_string()),
        }];
        let (intent, confidence) = classify_intent("ГОСТ 21.201-2018 п. 4.2", &refs);
        assert_eq!(intent, Intent::Reference);
        assert!((confidence - 0.95).abs() < f32::EPSILON);
    }

    #[test]
    fn test_definition_keyword_classified() {
        let (intent, _) = classify_intent("что такое центробежный насос", &[]);
        assert_eq!(intent, Intent::Definition);
    }

    #[test]
    fn test_analog_keyword_classified() {
        let (intent, _) = classify_intent("подбор аналог насоса", &[]);
        assert_eq!(intent, Intent::Analog);
    }

    #[test]
    fn test_unmatched_query_is_general_with_low_confidence() {
        let (intent, confidence) = classify_intent("случайный текст без ключевых слов", &[]);
        assert_eq!(intent, Intent::General);
        assert!((confidence - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_confidence_always_in_range() {
        for query in ["что такое X", "требование Y", "сравнение A и B", "непонятно"] {
            let (_, confidence) = classify_intent(query, &[]);
            assert!((0.5..=0.95).contains(&confidence));
        }
    }
}
