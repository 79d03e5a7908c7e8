//! Answer assembler (C11): intent-shaped structured answers with mandatory
//! source citations, per `spec.md` §4.11.

use crate::query::intent::Intent;
use crate::query::rerank::RankedResult;

/// A structured source citation. Never emitted as free-form text.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    /// Id of the cited document.
    pub doc_id: String,
    /// Standard/document family, if the chunk carries one.
    pub doc_family: Option<String>,
    /// Document title, if known.
    pub doc_title: Option<String>,
    /// Section heading, if known.
    pub section: Option<String>,
    /// Clause/paragraph number, if known.
    pub clause: Option<String>,
    /// The chunk's final re-rank score.
    pub relevance_score: f32,
}

/// The assembled answer for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    /// Intent-shaped answer text.
    pub text: String,
    /// Mean `final` score of cited chunks, clamped to `[0.1, 0.95]`, or
    /// `0.0` if no evidence survived the similarity floor.
    pub confidence: f32,
    /// Structured source citations; empty only when `confidence == 0.0`.
    pub sources: Vec<Source>,
}

const NO_EVIDENCE_MESSAGE: &str = "No sufficiently relevant evidence was found for this query.";

fn excerpt(result: &RankedResult) -> String {
    let text = result.chunk.searchable_text();
    if text.chars().count() > 400 {
        let truncated: String = text.chars().take(400).collect();
        format!("{truncated}…")
    } else {
        text.to_string()
    }
}

fn source_from(result: &RankedResult) -> Source {
    let common = result.chunk.common();
    Source {
        doc_id: common.document_id.clone(),
        doc_family: common.doc_family.clone(),
        doc_title: common.doc_title.clone(),
        section: common.section.clone(),
        clause: common.clause.clone(),
        relevance_score: result.final_score,
    }
}

fn clamp_confidence(mean_final: f32) -> f32 {
    mean_final.clamp(0.1, 0.95)
}

fn mean_final_score(results: &[&RankedResult]) -> f32 {
    if results.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let sum: f32 = results.iter().map(|r| r.final_score).sum();
    #[allow(clippy::cast_precision_loss)]
    {
        sum / results.len() as f32
    }
}

/// Assembles the structured answer for `intent` from the re-ranked
/// results. If `ranked` is empty (the similarity floor dropped every
/// candidate), returns the canned no-evidence answer with
/// `confidence = 0.0` and no sources.
#[must_use]
pub fn assemble_answer(intent: Intent, ranked: &[RankedResult]) -> Answer {
    if ranked.is_empty() {
        return Answer {
            text: NO_EVIDENCE_MESSAGE.to_string(),
            confidence: 0.0,
            sources: Vec::new(),
        };
    }

    let top = &ranked[0];

    let (text, cited): (String, Vec<&RankedResult>) = match intent {
        Intent::Definition => (format!("Определение: {}", excerpt(top)), vec![top]),
        Intent::Scope => (format!("Область применения: {}", excerpt(top)), vec![top]),
        Intent::Requirement => {
            let supporting: Vec<&RankedResult> = ranked.iter().skip(1).take(2).collect();
            let mut text = excerpt(top);
            for support in &supporting {
                text.push_str("\n— ");
                text.push_str(&excerpt(support));
            }
            let mut cited = vec![top];
            cited.extend(supporting);
            (text, cited)
        }
        Intent::Reference => {
            let clause_label = top
                .chunk
                .common()
                .doc_family
                .as_deref()
                .zip(top.chunk.common().doc_number.as_deref())
                .map(|(family, number)| format!("{family} {number}"))
                .unwrap_or_default();
            let clause = top.chunk.common().clause.clone().unwrap_or_default();
            let prefix = if clause.is_empty() {
                clause_label
            } else {
                format!("{clause_label}, {clause}")
            };
            (format!("{prefix}: {}", excerpt(top)), vec![top])
        }
        Intent::Comparison => {
            let top3: Vec<&RankedResult> = ranked.iter().take(3).collect();
            let text = top3
                .iter()
                .map(|r| {
                    let title = r.chunk.common().doc_title.clone().unwrap_or_else(|| r.chunk.common().document_id.clone());
                    format!("- {title}: {}", excerpt(r))
                })
                .collect::<Vec<_>>()
                .join("\n");
            (text, top3)
        }
        Intent::Relevance => {
            let revision = top.chunk.common().revision.clone().unwrap_or_else(|| "unknown".to_string());
            (format!("Статус: ревизия {revision}"), vec![top])
        }
        Intent::Analog | Intent::General => {
            let supporting: Vec<&RankedResult> = ranked.iter().skip(1).take(2).collect();
            let mut text = excerpt(top);
            for support in &supporting {
                text.push_str("\n— ");
                text.push_str(&excerpt(support));
            }
            let mut cited = vec![top];
            cited.extend(supporting);
            (text, cited)
        }
    };

    Answer {
        text,
        confidence: clamp_confidence(mean_final_score(&cited)),
        sources: cited.into_iter().map(source_from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chunk::{Chunk, CommonPayload, TextChunk};
    use crate::query::retriever::SearchType;

    fn ranked(content: &str, final_score: f32, doc_family: Option<&str>, clause: Option<&str>) -> RankedResult {
        RankedResult {
            chunk: Chunk::Text(TextChunk {
                common: CommonPayload {
                    clause: clause.map(String::from),
                    doc_family: doc_family.map(String::from),
                    doc_number: doc_family.map(|_| "21.201-2018".to_string()),
                    ..CommonPayload::minimal("doc-1", 0)
                },
                content: content.to_string(),
                token_count: 4,
                page: None,
                overlap: 0,
            }),
            search_type: SearchType::Hybrid,
            final_score,
        }
    }

    #[test]
    fn test_empty_evidence_returns_canned_answer() {
        let answer = assemble_answer(Intent::General, &[]);
        assert_eq!(answer.confidence, 0.0);
        assert!(answer.sources.is_empty());
        assert_eq!(answer.text, NO_EVIDENCE_MESSAGE);
    }

    #[test]
    fn test_reference_answer_starts_with_citation() {
        let results = vec![ranked("Требования к насосам.", 0.9, Some("ГОСТ"), Some("4.2"))];
        let answer = assemble_answer(Intent::Reference, &results);
        assert!(answer.text.starts_with("ГОСТ 21.201-2018, 4.2"));
        assert_eq!(answer.sources.len(), 1);
    }

    #[test]
    fn test_confidence_clamped_to_range() {
        let results = vec![ranked("x", 0.02, None, None)];
        let answer = assemble_answer(Intent::General, &results);
        assert!((0.1..=0.95).contains(&answer.confidence));
    }

    #[test]
    fn test_requirement_includes_supporting_excerpts() {
        let results = vec![
            ranked("Primary requirement.", 0.9, None, None),
            ranked("Supporting one.", 0.8, None, None),
            ranked("Supporting two.", 0.75, None, None),
        ];
        let answer = assemble_answer(Intent::Requirement, &results);
        assert_eq!(answer.sources.len(), 3);
        assert!(answer.text.contains("Supporting one."));
    }

    #[test]
    fn test_comparison_lists_top_three() {
        let results = vec![
            ranked("A excerpt", 0.9, None, None),
            ranked("B excerpt", 0.8, None, None),
            ranked("C excerpt", 0.7, None, None),
            ranked("D excerpt", 0.6, None, None),
        ];
        let answer = assemble_answer(Intent::Comparison, &results);
        assert_eq!(answer.sources.len(), 3);
        assert!(!answer.text.contains("D excerpt"));
    }
}
