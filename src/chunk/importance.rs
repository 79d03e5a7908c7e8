//! Importance scoring: a `[0.0, 1.0]` signal used to bias ranking toward
//! chunks that state requirements rather than background prose.
//!
//! Per `spec.md` §4.4: combine presence of requirement-signal words,
//! presence of numeric facts, a length band, and presence of standard
//! references into one score. Grounded on the bilingual requirement-keyword
//! set already used by the normaliser's reference extraction
//! ([`crate::text::reference`]).

use crate::core::numeric_facts::NumericFacts;

const REQUIREMENT_WORDS: &[&str] = &[
    "shall", "must", "required", "mandatory", "prohibited", "forbidden",
    "требование", "обязательно", "запрещается", "должен", "должна", "должно",
    "необходимо", "следует",
];

/// Token-count band considered neither too short to carry a complete
/// statement nor so long it dilutes a single point.
const IDEAL_MIN_TOKENS: usize = 40;
const IDEAL_MAX_TOKENS: usize = 400;

fn has_requirement_word(text: &str) -> bool {
    let lower = text.to_lowercase();
    REQUIREMENT_WORDS.iter().any(|w| lower.contains(w))
}

fn length_band_score(token_count: usize) -> f32 {
    if token_count >= IDEAL_MIN_TOKENS && token_count <= IDEAL_MAX_TOKENS {
        1.0
    } else if token_count < IDEAL_MIN_TOKENS {
        token_count as f32 / IDEAL_MIN_TOKENS as f32
    } else {
        let over = (token_count - IDEAL_MAX_TOKENS) as f32;
        (1.0 - over / IDEAL_MAX_TOKENS as f32).max(0.0)
    }
}

/// Scores a chunk's importance in `[0.0, 1.0]` from four equally-weighted
/// signals: requirement wording, numeric-fact presence, length band, and
/// standard-reference presence.
#[must_use]
pub fn score_importance(
    text: &str,
    token_count: usize,
    numeric_facts: &NumericFacts,
    has_reference: bool,
) -> f32 {
    let requirement = f32::from(has_requirement_word(text));
    let numeric = f32::from(!numeric_facts.is_empty());
    let length = length_band_score(token_count);
    let reference = f32::from(has_reference);

    let score = (requirement + numeric + length + reference) / 4.0;
    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requirement_wording_raises_score() {
        let plain = score_importance("The pump is blue.", 60, &NumericFacts::new(), false);
        let requirement = score_importance(
            "The pump shall operate continuously.",
            60,
            &NumericFacts::new(),
            false,
        );
        assert!(requirement > plain);
    }

    #[test]
    fn test_score_bounded() {
        let mut facts = NumericFacts::new();
        facts.insert(
            "flow_rate",
            crate::core::numeric_facts::NumericValue::new(1000.0, "m3/h"),
        );
        let score = score_importance("Насос должен обеспечивать 1000 м3/ч.", 120, &facts, true);
        assert!((0.0..=1.0).contains(&score));
        assert!(score > 0.9);
    }

    #[test]
    fn test_very_short_chunk_scores_low_on_length() {
        let score = score_importance("ok", 2, &NumericFacts::new(), false);
        assert!(score < 0.1);
    }
}
