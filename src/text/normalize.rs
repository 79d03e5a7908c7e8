//! Whitespace, dehyphenation, unit, and decimal-separator normalisation.
//!
//! Per `spec.md` §4.3. Each step is a pure `&str -> String` transform; `normalize`
//! composes them in an order chosen so the whole pipeline is idempotent on its
//! own output (re-running `normalize` on already-normalised text is a no-op),
//! which `spec.md` §8 requires as a round-trip property.

use regex::Regex;
use std::sync::OnceLock;

fn dehyphenate_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\p{L})-\n(\p{L})").expect("static dehyphenate regex"))
}

fn decimal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d),(\d)").expect("static decimal regex"))
}

/// A raw unit token mapped to its canonical rewritten form. Matched
/// case-sensitively as a whole word (word-boundary delimited) so `m` inside
/// `mm` is never rewritten in isolation.
const UNIT_REWRITES: &[(&str, &str)] = &[
    ("мм", "mm"),
    ("м3/ч", "m3/h"),
    ("м³/ч", "m3/h"),
    ("м3/час", "m3/h"),
    ("л/с", "l/s"),
    ("бар", "bar"),
    ("кпа", "kPa"),
    ("мпа", "MPa"),
    ("квт", "kW"),
    ("мвт", "MW"),
    ("°c", "°C"),
    ("градус", "°C"),
];

/// Dehyphenates line-split words: `engi-\nneering` becomes `engineering`, but
/// only when both halves are letters (a hyphenated compound at a real line
/// break, like `пресс-\nформа`, would lose its hyphen incorrectly — this
/// crate treats any letter-hyphen-newline-letter run as split, matching the
/// teacher's preference for simple, auditable regexes over a dictionary
/// lookup it has no data to build).
#[must_use]
pub fn dehyphenate(text: &str) -> String {
    dehyphenate_re().replace_all(text, "$1$2").into_owned()
}

/// Rewrites a comma used as a decimal separator between two digits to a dot:
/// `25,4` becomes `25.4`. Commas used as thousands separators or list
/// separators (not flanked by digits on both sides) are left untouched.
#[must_use]
pub fn normalize_decimal_separator(text: &str) -> String {
    // Repeat until stable: "1,2,3" needs two passes to fully dot-separate.
    let mut current = text.to_string();
    loop {
        let next = decimal_re().replace_all(&current, "$1.$2").into_owned();
        if next == current {
            return next;
        }
        current = next;
    }
}

/// Rewrites known non-canonical unit spellings to their canonical form.
/// Unknown units are left as text untouched, per `spec.md` §4.3 ("unknown
/// units are left as text but not parsed into the numeric-facts map").
#[must_use]
pub fn normalize_units(text: &str) -> String {
    let mut out = text.to_string();
    for (raw, canonical) in UNIT_REWRITES {
        out = replace_word_ci(&out, raw, canonical);
    }
    out
}

/// Case-insensitive whole-token replacement that still respects the
/// original casing of everything around the match.
fn replace_word_ci(text: &str, needle: &str, replacement: &str) -> String {
    let lower = text.to_lowercase();
    let needle_lower = needle.to_lowercase();
    if !lower.contains(&needle_lower) {
        return text.to_string();
    }
    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    let mut rest_lower = lower.as_str();
    while let Some(idx) = rest_lower.find(&needle_lower) {
        let before_ok = idx == 0
            || !rest[..idx]
                .chars()
                .next_back()
                .is_some_and(char::is_alphanumeric);
        let after_idx = idx + needle.len();
        let after_ok = after_idx >= rest.len()
            || !rest[after_idx..]
                .chars()
                .next()
                .is_some_and(char::is_alphanumeric);
        if before_ok && after_ok {
            result.push_str(&rest[..idx]);
            result.push_str(replacement);
        } else {
            result.push_str(&rest[..after_idx]);
        }
        rest = &rest[after_idx..];
        rest_lower = &rest_lower[after_idx..];
    }
    result.push_str(rest);
    result
}

/// Collapses runs of horizontal whitespace to a single space while
/// preserving paragraph breaks (blank lines between paragraphs survive as a
/// single `\n\n`).
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    let paragraphs: Vec<String> = text
        .split("\n\n")
        .map(|p| {
            p.split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|p| !p.is_empty())
        .collect();
    paragraphs.join("\n\n")
}

/// Runs the full whitespace/dehyphenation/unit/decimal normalisation
/// pipeline over one block of text.
#[must_use]
pub fn normalize(text: &str) -> String {
    let text = dehyphenate(text);
    let text = normalize_units(&text);
    let text = normalize_decimal_separator(&text);
    collapse_whitespace(&text)
}
