//! Query rewriter (C8, part 1): synonym expansion, intent-hinted
//! reformulation, citation/unit spacing normalisation, and a rewrite-set
//! cache keyed by query hash.
//!
//! Grounded on `text::reference::extract_references` (reused unchanged
//! against raw queries per `spec.md` §4.8) and `text::normalize`'s
//! whitespace-collapse idiom, extended with a curated bilingual synonym
//! table in the style of
//! `original_source/services/chat-service/services/smart_tokenizer.py`'s
//! term-map pattern.

use crate::text::normalize::collapse_whitespace;
use crate::text::reference::{Reference, extract_references};
use regex::Regex;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, OnceLock};

/// One candidate rewrite of a query, with a confidence discounting its
/// contribution at fusion time.
#[derive(Debug, Clone, PartialEq)]
pub struct RewriteCandidate {
    /// The candidate query text.
    pub text: String,
    /// Confidence in `(0.0, 1.0]`; the original query is always 1.0.
    pub confidence: f32,
}

/// The full set of rewrites produced for one input query, plus any
/// document references extracted from the raw text.
#[derive(Debug, Clone, PartialEq)]
pub struct RewriteSet {
    /// The original, unmodified query.
    pub original: String,
    /// Every candidate to retrieve with, including the original.
    pub candidates: Vec<RewriteCandidate>,
    /// Document references extracted from the raw query (`spec.md` §4.8).
    pub references: Vec<Reference>,
}

/// Curated bilingual domain-terminology synonym table (~50 entries). Loaded
/// once at first use; entries are matched case-insensitively as whole
/// words.
#[rustfmt::skip]
const SYNONYMS: &[(&str, &str)] = &[
    ("насос", "pump"), ("pump", "насос"),
    ("клапан", "valve"), ("valve", "клапан"),
    ("труба", "pipe"), ("pipe", "труба"),
    ("трубопровод", "pipeline"), ("pipeline", "трубопровод"),
    ("резервуар", "tank"), ("tank", "резервуар"),
    ("компрессор", "compressor"), ("compressor", "компрессор"),
    ("теплообменник", "heat exchanger"), ("heat exchanger", "теплообменник"),
    ("двигатель", "motor"), ("motor", "двигатель"),
    ("производительность", "flow rate"), ("flow rate", "производительность"),
    ("напор", "head"), ("head", "напор"),
    ("давление", "pressure"), ("pressure", "давление"),
    ("температура", "temperature"), ("temperature", "температура"),
    ("диаметр", "diameter"), ("diameter", "диаметр"),
    ("мощность", "power"), ("power", "мощность"),
    ("материал", "material"), ("material", "материал"),
    ("требование", "requirement"), ("requirement", "требование"),
    ("определение", "definition"), ("definition", "определение"),
    ("область применения", "scope"), ("scope", "область применения"),
    ("чертёж", "drawing"), ("drawing", "чертёж"),
    ("оборудование", "equipment"), ("equipment", "оборудование"),
    ("задвижка", "gate valve"), ("gate valve", "задвижка"),
    ("фланец", "flange"), ("flange", "фланец"),
    ("сварка", "welding"), ("welding", "сварка"),
    ("изоляция", "insulation"), ("insulation", "изоляция"),
    ("вентилятор", "fan"), ("fan", "вентилятор"),
    ("электропривод", "electric actuator"), ("electric actuator", "электропривод"),
];

fn synonym_table() -> &'static HashMap<&'static str, &'static str> {
    static TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| SYNONYMS.iter().copied().collect())
}

/// Words that hint at `definition` intent; when present, the reformulation
/// step prepends `"определение"` as an additional rewrite.
const DEFINITION_HINTS: &[&str] = &["что такое", "what is", "define", "определение"];

fn citation_spacing_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([А-ЯA-Z]+)\s+(\d+(?:\.\d+)*)\s*-\s*(\d{4})").expect("citation spacing regex")
    })
}

/// Collapses spacing around unit/citation markers:
/// `ГОСТ  21.201 - 2011` → `ГОСТ 21.201-2011`.
fn normalize_terms(query: &str) -> String {
    let collapsed = collapse_whitespace(query);
    citation_spacing_re()
        .replace_all(&collapsed, "$1 $2-$3")
        .into_owned()
}

fn hash_query(query: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    query.hash(&mut hasher);
    hasher.finish()
}

fn rewrite_cache() -> &'static Mutex<HashMap<u64, RewriteSet>> {
    static CACHE: OnceLock<Mutex<HashMap<u64, RewriteSet>>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Builds the rewrite set for `query`: original, synonym expansions,
/// intent-hinted reformulation, normalised terms; cached by query hash.
#[must_use]
pub fn rewrite_query(query: &str) -> RewriteSet {
    let key = hash_query(query);
    if let Some(cached) = rewrite_cache().lock().expect("rewrite cache poisoned").get(&key) {
        return cached.clone();
    }

    let references = extract_references(query);
    let normalized = normalize_terms(query);

    let mut candidates = vec![RewriteCandidate {
        text: query.to_string(),
        confidence: 1.0,
    }];
    if normalized != query {
        candidates.push(RewriteCandidate {
            text: normalized.clone(),
            confidence: 0.9,
        });
    }

    let table = synonym_table();
    let lower = normalized.to_lowercase();
    for word in lower.split_whitespace() {
        let trimmed = word.trim_matches(|c: char| !c.is_alphanumeric());
        if trimmed.is_empty() {
            continue;
        }
        if let Some(translation) = table.get(trimmed) {
            let expanded = lower.replacen(trimmed, translation, 1);
            if expanded != lower && !candidates.iter().any(|c| c.text == expanded) {
                candidates.push(RewriteCandidate {
                    text: expanded,
                    confidence: 0.6,
                });
            }
        }
    }

    if DEFINITION_HINTS.iter().any(|hint| lower.contains(hint)) {
        candidates.push(RewriteCandidate {
            text: format!("определение {normalized}"),
            confidence: 0.7,
        });
    }

    let set = RewriteSet {
        original: query.to_string(),
        candidates,
        references,
    };
    rewrite_cache().lock().expect("rewrite cache poisoned").insert(key, set.clone());
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_original_query_always_present_with_confidence_one() {
        let set = rewrite_query("центробежный насос");
        assert_eq!(set.candidates[0].text, "центробежный насос");
        assert!((set.candidates[0].confidence - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_citation_spacing_normalised() {
        let set = rewrite_query("ГОСТ  21.201 - 2018 п. 4.2");
        assert!(set.candidates.iter().any(|c| c.text.contains("ГОСТ 21.201-2018")));
    }

    #[test]
    fn test_document_reference_extracted_from_raw_query() {
        let set = rewrite_query("ГОСТ 21.201-2018 п. 4.2");
        assert_eq!(set.references.len(), 1);
        assert_eq!(set.references[0].family, "ГОСТ");
        assert_eq!(set.references[0].clause.as_deref(), Some("4.2"));
    }

    #[test]
    fn test_synonym_expansion_produces_translated_candidate() {
        let set = rewrite_query("насос для аммиака");
        assert!(set.candidates.iter().any(|c| c.text.contains("pump")));
    }

    #[test]
    fn test_definition_hint_reformulates() {
        let set = rewrite_query("что такое клапан");
        assert!(set.candidates.iter().any(|c| c.text.starts_with("определение")));
    }

    #[test]
    fn test_rewrite_cache_returns_same_set() {
        let a = rewrite_query("уникальный запрос xyz");
        let b = rewrite_query("уникальный запрос xyz");
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_references_when_none_present() {
        let set = rewrite_query("общий вопрос без ссылок");
        assert!(set.references.is_empty());
    }
}
