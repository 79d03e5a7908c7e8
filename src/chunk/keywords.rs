//! Up-to-10 keyword extraction by frequency, bilingual stopwords excluded.

use std::collections::HashMap;
use unicode_segmentation::UnicodeSegmentation;

const MAX_KEYWORDS: usize = 10;
const MIN_WORD_LEN: usize = 3;

const STOPWORDS: &[&str] = &[
    // English
    "the", "and", "for", "with", "that", "this", "from", "shall", "must", "are", "was", "were",
    "has", "have", "not", "all", "any", "its", "per", "into", "when", "where", "which", "will",
    // Russian
    "или", "как", "что", "для", "при", "это", "его", "она", "они", "также", "если", "под",
    "над", "без", "между", "который", "которая", "которое",
];

/// Extracts up to [`MAX_KEYWORDS`] keywords from `text`, ranked by descending
/// frequency (ties broken by first occurrence order).
#[must_use]
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for word in text.unicode_words() {
        if word.chars().count() < MIN_WORD_LEN {
            continue;
        }
        let lower = word.to_lowercase();
        if STOPWORDS.contains(&lower.as_str()) {
            continue;
        }
        if lower.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        if !counts.contains_key(&lower) {
            order.push(lower.clone());
        }
        *counts.entry(lower).or_insert(0) += 1;
    }

    let mut ranked: Vec<(String, usize)> = order
        .into_iter()
        .map(|w| {
            let c = counts[&w];
            (w, c)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().take(MAX_KEYWORDS).map(|(w, _)| w).collect()
}
