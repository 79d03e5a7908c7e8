//! Canonical unit table for engineering numeric facts.
//!
//! Equipment parameters (`flow_rate`, `head`, `pressure`, ...) are recorded
//! with whatever unit the source document used; analog search (C12) and the
//! normaliser (C3) both need a single canonical unit per quantity to compare
//! values across documents. This module is the single source of truth for
//! that mapping, grounded on the unit strings confirmed against the
//! original fixtures (`flow_rate` in `m3/h`, `pressure` in `bar`, etc.).

use std::collections::HashMap;
use std::sync::OnceLock;

/// A quantity name paired with its canonical unit, e.g. `("flow_rate",
/// "m3/h")`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalUnit {
    /// The quantity this unit applies to.
    pub quantity: &'static str,
    /// The canonical unit string stored/compared against.
    pub unit: &'static str,
}

/// The fixed quantity → canonical-unit table.
const CANONICAL_UNITS: &[CanonicalUnit] = &[
    CanonicalUnit {
        quantity: "flow_rate",
        unit: "m3/h",
    },
    CanonicalUnit {
        quantity: "head",
        unit: "m",
    },
    CanonicalUnit {
        quantity: "pressure",
        unit: "bar",
    },
    CanonicalUnit {
        quantity: "temperature",
        unit: "°C",
    },
    CanonicalUnit {
        quantity: "diameter",
        unit: "mm",
    },
    CanonicalUnit {
        quantity: "heat_duty",
        unit: "kW",
    },
    CanonicalUnit {
        quantity: "compression_ratio",
        unit: "",
    },
];

/// A unit conversion factor to the canonical unit for a quantity:
/// `canonical_value = raw_value * factor + offset`.
#[derive(Debug, Clone, Copy)]
struct Conversion {
    factor: f64,
    offset: f64,
}

fn conversion_table() -> &'static HashMap<(&'static str, &'static str), Conversion> {
    static TABLE: OnceLock<HashMap<(&'static str, &'static str), Conversion>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut m = HashMap::new();
        // flow_rate
        m.insert(
            ("flow_rate", "l/s"),
            Conversion {
                factor: 3.6,
                offset: 0.0,
            },
        );
        m.insert(
            ("flow_rate", "m3/s"),
            Conversion {
                factor: 3600.0,
                offset: 0.0,
            },
        );
        // pressure
        m.insert(
            ("pressure", "kpa"),
            Conversion {
                factor: 0.01,
                offset: 0.0,
            },
        );
        m.insert(
            ("pressure", "mpa"),
            Conversion {
                factor: 10.0,
                offset: 0.0,
            },
        );
        m.insert(
            ("pressure", "pa"),
            Conversion {
                factor: 1e-5,
                offset: 0.0,
            },
        );
        // temperature
        m.insert(
            ("temperature", "k"),
            Conversion {
                factor: 1.0,
                offset: -273.15,
            },
        );
        m.insert(
            ("temperature", "f"),
            Conversion {
                factor: 5.0 / 9.0,
                offset: -(32.0 * 5.0 / 9.0),
            },
        );
        // diameter
        m.insert(
            ("diameter", "m"),
            Conversion {
                factor: 1000.0,
                offset: 0.0,
            },
        );
        m.insert(
            ("diameter", "cm"),
            Conversion {
                factor: 10.0,
                offset: 0.0,
            },
        );
        m.insert(
            ("diameter", "in"),
            Conversion {
                factor: 25.4,
                offset: 0.0,
            },
        );
        // heat_duty
        m.insert(
            ("heat_duty", "mw"),
            Conversion {
                factor: 1000.0,
                offset: 0.0,
            },
        );
        m.insert(
            ("heat_duty", "w"),
            Conversion {
                factor: 0.001,
                offset: 0.0,
            },
        );
        m
    })
}

/// Returns the canonical unit for a quantity name, if known.
#[must_use]
pub fn canonical_unit(quantity: &str) -> Option<&'static str> {
    CANONICAL_UNITS
        .iter()
        .find(|c| c.quantity.eq_ignore_ascii_case(quantity))
        .map(|c| c.unit)
}

/// Converts `value` in `from_unit` to the canonical unit for `quantity`.
///
/// Returns `None` if the unit is already canonical (no conversion needed),
/// in which case the caller should use the original value unchanged.
/// Returns `Some(converted)` when a known non-canonical unit was supplied.
/// Unknown units are passed through unchanged by the caller (normaliser
/// does not invent conversions it cannot ground).
#[must_use]
pub fn to_canonical(quantity: &str, from_unit: &str, value: f64) -> Option<f64> {
    let Some(canon) = canonical_unit(quantity) else {
        return None;
    };
    if from_unit.eq_ignore_ascii_case(canon) {
        return None;
    }
    conversion_table()
        .get(&(quantity, from_unit.to_ascii_lowercase().as_str()))
        .map(|c| value * c.factor + c.offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_units_cover_spec_fixtures() {
        assert_eq!(canonical_unit("flow_rate"), Some("m3/h"));
        assert_eq!(canonical_unit("head"), Some("m"));
        assert_eq!(canonical_unit("pressure"), Some("bar"));
        assert_eq!(canonical_unit("temperature"), Some("°C"));
        assert_eq!(canonical_unit("diameter"), Some("mm"));
        assert_eq!(canonical_unit("heat_duty"), Some("kW"));
        assert_eq!(canonical_unit("compression_ratio"), Some(""));
    }

    #[test]
    fn test_unknown_quantity() {
        assert_eq!(canonical_unit("viscosity"), None);
    }

    #[test]
    fn test_flow_rate_conversion_from_liters_per_second() {
        let converted = to_canonical("flow_rate", "l/s", 10.0).unwrap();
        assert!((converted - 36.0).abs() < 1e-9);
    }

    #[test]
    fn test_already_canonical_returns_none() {
        assert_eq!(to_canonical("pressure", "bar", 25.0), None);
        assert_eq!(to_canonical("pressure", "BAR", 25.0), None);
    }

    #[test]
    fn test_temperature_kelvin_conversion() {
        let converted = to_canonical("temperature", "K", 473.15).unwrap();
        assert!((converted - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_diameter_inches_conversion() {
        let converted = to_canonical("diameter", "in", 10.0).unwrap();
        assert!((converted - 254.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_unit_returns_none() {
        assert_eq!(to_canonical("pressure", "furlongs", 1.0), None);
    }
}
