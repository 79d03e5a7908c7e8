//! Standard-citation and clause reference extraction.
//!
//! Per `spec.md` §4.3: detect `ГОСТ N-YYYY`, `СП N.YYYY`, `СНиП N-YYYY`,
//! `ФНП-NNN-YYYY`, `ПУЭ N.M`, `п. N.M`, `раздел N` and attach them as
//! structured references. Grounded on
//! `original_source/services/chat-service/services/smart_tokenizer.py`'s
//! `content_patterns['reference']` group, extended with `ФНП`/`ПУЭ` per
//! `spec.md`. Reused unchanged by the query rewriter (§4.8) against raw
//! queries.

use regex::Regex;
use std::sync::OnceLock;

/// A structured document/clause reference extracted from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Standard family, e.g. `ГОСТ`, `СП`, `СНиП`, `ФНП`, `ПУЭ`.
    pub family: String,
    /// Document number within the family.
    pub number: String,
    /// Issue year, if present in the citation.
    pub year: Option<String>,
    /// Clause/paragraph number, if a `п. N.M` or `раздел N` follows nearby.
    pub clause: Option<String>,
}

struct Pattern {
    family: &'static str,
    regex: fn() -> &'static Regex,
}

fn gost_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"ГОСТ\s*(\d+(?:\.\d+)*)-(\d{4})").expect("gost regex"))
}

fn sp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"СП\s*(\d+(?:\.\d+)*)\.(\d{4})").expect("sp regex"))
}

fn snip_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"СНиП\s*(\d+(?:[.-]\d+)*)-(\d{2,4})").expect("snip regex"))
}

fn fnp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"ФНП-(\d+)-(\d{4})").expect("fnp regex"))
}

fn pue_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"ПУЭ\s*(\d+\.\d+)").expect("pue regex"))
}

fn clause_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"п\.\s*(\d+(?:\.\d+)*)").expect("clause regex"))
}

fn section_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"раздел(?:а|е)?\s*(\d+(?:\.\d+)*)").expect("section regex"))
}

const DOCUMENT_PATTERNS: &[Pattern] = &[
    Pattern {
        family: "ГОСТ",
        regex: gost_re,
    },
    Pattern {
        family: "СП",
        regex: sp_re,
    },
    Pattern {
        family: "СНиП",
        regex: snip_re,
    },
    Pattern {
        family: "ФНП",
        regex: fnp_re,
    },
];

/// Maximum distance (in bytes) a trailing `п. N.M`/`раздел N` may be from the
/// end of a document citation to be attached as its clause, rather than
/// producing its own clause-only reference.
const CLAUSE_ATTACH_WINDOW: usize = 30;

/// Extracts every standard citation and clause/section reference found in
/// `text`. A clause or section marker found within
/// [`CLAUSE_ATTACH_WINDOW`] bytes after a document citation is attached to
/// that citation; an unattached clause/section produces its own reference
/// with `family = "clause"` / `"section"`.
#[must_use]
pub fn extract_references(text: &str) -> Vec<Reference> {
    let mut hits: Vec<(usize, usize, Reference)> = Vec::new();

    for pattern in DOCUMENT_PATTERNS {
        for m in (pattern.regex)().captures_iter(text) {
            let whole = m.get(0).expect("whole match");
            let number = m.get(1).expect("number group").as_str().to_string();
            let year = m.get(2).map(|g| g.as_str().to_string());
            hits.push((
                whole.start(),
                whole.end(),
                Reference {
                    family: pattern.family.to_string(),
                    number,
                    year,
                    clause: None,
                },
            ));
        }
    }
    for m in pue_re().captures_iter(text) {
        let whole = m.get(0).expect("whole match");
        hits.push((
            whole.start(),
            whole.end(),
            Reference {
                family: "ПУЭ".to_string(),
                number: m.get(1).expect("number group").as_str().to_string(),
                year: None,
                clause: None,
            },
        ));
    }
    hits.sort_by_key(|(start, _, _)| *start);

    let mut clause_hits: Vec<(usize, usize, &'static str, String)> = Vec::new();
    for m in clause_re().captures_iter(text) {
        let whole = m.get(0).expect("whole match");
        clause_hits.push((
            whole.start(),
            whole.end(),
            "clause",
            m.get(1).expect("clause group").as_str().to_string(),
        ));
    }
    for m in section_re().captures_iter(text) {
        let whole = m.get(0).expect("whole match");
        clause_hits.push((
            whole.start(),
            whole.end(),
            "section",
            m.get(1).expect("section group").as_str().to_string(),
        ));
    }
    clause_hits.sort_by_key(|(start, _, _, _)| *start);

    let mut attached = vec![false; clause_hits.len()];
    let mut results: Vec<Reference> = Vec::new();
    for (start, end, reference) in hits {
        let mut reference = reference;
        for (idx, (c_start, _c_end, _kind, value)) in clause_hits.iter().enumerate() {
            if attached[idx] {
                continue;
            }
            if *c_start >= end && *c_start - end <= CLAUSE_ATTACH_WINDOW {
                reference.clause = Some(value.clone());
                attached[idx] = true;
                break;
            }
        }
        let _ = start;
        results.push(reference);
    }

    for (idx, (_, _, kind, value)) in clause_hits.into_iter().enumerate() {
        if !attached[idx] {
            results.push(Reference {
                family: kind.to_string(),
                number: value,
                year: None,
                clause: None,
            });
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_gost_with_clause() {
        let refs = extract_references("ГОСТ 21.201-2018 п. 4.2");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].family, "ГОСТ");
        assert_eq!(refs[0].number, "21.201");
        assert_eq!(refs[0].year.as_deref(), Some("2018"));
        assert_eq!(refs[0].clause.as_deref(), Some("4.2"));
    }

    #[test]
    fn test_extracts_sp() {
        let refs = extract_references("см. СП 45.13330.2017");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].family, "СП");
    }

    #[test]
    fn test_extracts_fnp() {
        let refs = extract_references("ФНП-123-2020 требует...");
        assert_eq!(refs[0].family, "ФНП");
        assert_eq!(refs[0].number, "123");
        assert_eq!(refs[0].year.as_deref(), Some("2020"));
    }

    #[test]
    fn test_extracts_pue() {
        let refs = extract_references("согласно ПУЭ 1.7");
        assert_eq!(refs[0].family, "ПУЭ");
        assert_eq!(refs[0].number, "1.7");
    }

    #[test]
    fn test_unattached_clause_is_its_own_reference() {
        let refs = extract_references("см. п. 4.2 выше");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].family, "clause");
        assert_eq!(refs[0].number, "4.2");
    }

    #[test]
    fn test_no_references_in_plain_text() {
        assert!(extract_references("Центробежный насос, без ссылок.").is_empty());
    }

    #[test]
    fn test_multiple_citations() {
        let refs = extract_references("ГОСТ 21.201-2018 и СНиП 2.04-2003");
        assert_eq!(refs.len(), 2);
    }
}
