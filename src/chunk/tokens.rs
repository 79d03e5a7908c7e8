//! Token counting and boundary-safe slicing.
//!
//! There is no tokenizer model in scope here (per `spec.md` Non-goals, no
//! specific embedding-model tokenizer is mandated); chunk sizing uses a
//! whitespace/punctuation word count as its token unit, consistent with how
//! the teacher's `chunking::fixed` module measured chunk size by characters
//! before converting to a word-boundary scheme.

use unicode_segmentation::UnicodeSegmentation;

/// Counts "tokens" in `text`: word-boundary segments containing at least one
/// alphanumeric character. Punctuation-only and whitespace segments are not
/// counted, matching how a subword tokenizer would not spend a token on bare
/// whitespace.
#[must_use]
pub fn count_tokens(text: &str) -> usize {
    text.split_word_bounds()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .count()
}

/// Returns the last `n` tokens of `text` as a trailing substring, cut on a
/// word boundary. Returns the whole string if it has `n` tokens or fewer.
#[must_use]
pub fn tail_tokens(text: &str, n: usize) -> String {
    let words: Vec<&str> = text.split_word_bounds().collect();
    let mut token_positions = Vec::new();
    for (idx, w) in words.iter().enumerate() {
        if w.chars().any(char::is_alphanumeric) {
            token_positions.push(idx);
        }
    }
    if token_positions.len() <= n {
        return text.to_string();
    }
    let start_word_idx = token_positions[token_positions.len() - n];
    words[start_word_idx..].concat()
}
