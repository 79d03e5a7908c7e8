//! Parses `"<value> <unit>"`-shaped cell/property strings into
//! [`NumericValue`]s and folds known equipment quantities into
//! [`NumericFacts`], converting to the canonical unit via [`crate::units`]
//! where a conversion is known.

use crate::core::numeric_facts::{NumericFacts, NumericValue};
use crate::units;
use regex::Regex;
use std::sync::OnceLock;

/// Quantity names recognised as equipment parameters worth indexing as
/// numeric facts (per `spec.md` §4.9's analog-search fixture set).
const KNOWN_QUANTITIES: &[&str] = &[
    "flow_rate",
    "head",
    "pressure",
    "temperature",
    "diameter",
    "heat_duty",
    "compression_ratio",
];

fn value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(-?\d+(?:[.,]\d+)?)\s*(.*?)\s*$").expect("numeric value regex")
    })
}

/// Parses a string like `"1000 m3/h"` or `"50"` into a numeric value. Returns
/// `None` if the string does not start with a number.
#[must_use]
pub fn parse_numeric_value(text: &str) -> Option<NumericValue> {
    let caps = value_re().captures(text.trim())?;
    let raw_value = caps.get(1)?.as_str().replace(',', ".");
    let value: f64 = raw_value.parse().ok()?;
    let unit = caps
        .get(2)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    Some(NumericValue::new(value, unit))
}

/// Normalises quantity name casing/spacing to match [`KNOWN_QUANTITIES`].
fn normalize_quantity(name: &str) -> String {
    name.trim().to_lowercase().replace([' ', '-'], "_")
}

/// Builds a [`NumericFacts`] set from `(quantity_name, raw_value)` pairs,
/// keeping only recognised quantities and converting each to its canonical
/// unit when a conversion is known.
#[must_use]
pub fn facts_from_pairs<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> NumericFacts {
    let mut facts = NumericFacts::new();
    for (key, raw) in pairs {
        let quantity = normalize_quantity(key);
        if !KNOWN_QUANTITIES.contains(&quantity.as_str()) {
            continue;
        }
        let Some(mut value) = parse_numeric_value(raw) else {
            continue;
        };
        if let Some(canonical) = units::to_canonical(&quantity, &value.unit, value.value) {
            let canon_unit = units::canonical_unit(&quantity).unwrap_or(value.unit.as_str());
            value = NumericValue::new(canonical, canon_unit);
        }
        facts.insert(quantity, value);
    }
    facts
}

/// Bilingual trigger words for each known quantity, used to recognise a
/// numeric fact embedded in free-running prose rather than a structured
/// `name: value` pair (`spec.md` §8 seed scenario 1: a text chunk whose
/// prose states "Производительность 1000 м3/ч, напор 50 м" must still
/// surface `flow_rate`/`head` numeric facts for analog search to match on).
const QUANTITY_KEYWORDS: &[(&str, &[&str])] = &[
    ("flow_rate", &["производительность", "расход", "flow rate", "flow"]),
    ("head", &["напор", "head"]),
    ("pressure", &["давление", "pressure"]),
    ("temperature", &["температура", "temperature"]),
    ("diameter", &["диаметр", "diameter"]),
    ("heat_duty", &["тепловая мощность", "heat duty", "duty"]),
    ("compression_ratio", &["степень сжатия", "compression ratio"]),
];

fn text_value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\D{0,12}?(-?\d+(?:[.,]\d+)?)\s*([a-z0-9°/]*)").expect("text value regex")
    })
}

/// Scans free-running text for `<keyword> ... <value> <unit>` patterns
/// naming one of [`KNOWN_QUANTITIES`], converting each match to its
/// canonical unit where a conversion is known. At most one fact per
/// quantity is kept (the first keyword match that parses).
///
/// Unlike [`facts_from_pairs`] (structured table/IFC `name: value` pairs),
/// this has no delimiter to anchor on, so it only looks a short window past
/// each keyword match and requires the normaliser to have already rewritten
/// units to their canonical spelling (`spec.md` §4.3) — it does not attempt
/// unit discovery beyond that window.
#[must_use]
pub fn extract_facts_from_text(text: &str) -> NumericFacts {
    let mut facts = NumericFacts::new();
    let lower = text.to_lowercase();
    for (quantity, keywords) in QUANTITY_KEYWORDS {
        if facts.get(quantity).is_some() {
            continue;
        }
        for kw in *keywords {
            let Some(kw_pos) = lower.find(kw) else {
                continue;
            };
            let after_start = kw_pos + kw.len();
            let window: String = lower[after_start..].chars().take(24).collect();
            let Some(caps) = text_value_re().captures(&window) else {
                continue;
            };
            let raw_value = caps.get(1).map_or("", |m| m.as_str()).replace(',', ".");
            let Ok(value) = raw_value.parse::<f64>() else {
                continue;
            };
            let unit = caps.get(2).map_or("", |m| m.as_str()).trim().to_string();
            let mut nv = NumericValue::new(value, unit.clone());
            if let Some(canonical) = units::to_canonical(quantity, &unit, value) {
                let canon_unit = units::canonical_unit(quantity).unwrap_or(unit.as_str());
                nv = NumericValue::new(canonical, canon_unit);
            }
            facts.insert((*quantity).to_string(), nv);
            break;
        }
    }
    facts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeric_value_with_unit() {
        let v = parse_numeric_value("1000 m3/h").unwrap();
        assert!((v.value - 1000.0).abs() < f64::EPSILON);
        assert_eq!(v.unit, "m3/h");
    }

    #[test]
    fn test_parse_numeric_value_comma_decimal() {
        let v = parse_numeric_value("12,5 bar").unwrap();
        assert!((v.value - 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_numeric_value_no_unit() {
        let v = parse_numeric_value("50").unwrap();
        assert_eq!(v.unit, "");
    }

    #[test]
    fn test_parse_numeric_value_rejects_non_numeric() {
        assert!(parse_numeric_value("Pump model X-100").is_none());
    }

    #[test]
    fn test_facts_from_pairs_filters_unknown_quantity() {
        let pairs = vec![("flow_rate", "1000 m3/h"), ("model", "X-100")];
        let facts = facts_from_pairs(pairs.into_iter());
        assert!(facts.get("flow_rate").is_some());
        assert_eq!(facts.iter().count(), 1);
    }

    #[test]
    fn test_facts_from_pairs_converts_to_canonical() {
        let pairs = vec![("pressure", "1000 kPa")];
        let facts = facts_from_pairs(pairs.into_iter());
        let v = facts.get("pressure").unwrap();
        assert!((v.value - 10.0).abs() < 1e-9);
        assert_eq!(v.unit, "bar");
    }

    #[test]
    fn test_extract_facts_from_text_pump_fixture() {
        let text = "Центробежный насос для перекачки аммиака. Производительность 1000 m3/h, напор 50 m. Материал корпуса - 316L.";
        let facts = extract_facts_from_text(text);
        let flow = facts.get("flow_rate").unwrap();
        assert!((flow.value - 1000.0).abs() < 1e-9);
        assert_eq!(flow.unit, "m3/h");
        let head = facts.get("head").unwrap();
        assert!((head.value - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_extract_facts_from_text_no_match() {
        let facts = extract_facts_from_text("Материал корпуса - нержавеющая сталь.");
        assert_eq!(facts.iter().count(), 0);
    }

    #[test]
    fn test_extract_facts_from_text_converts_units() {
        let facts = extract_facts_from_text("Pressure 1000 kpa at the outlet flange.");
        let v = facts.get("pressure").unwrap();
        assert!((v.value - 10.0).abs() < 1e-9);
        assert_eq!(v.unit, "bar");
    }
}
