//! Numbers, units and unit conversion.

use std::f64::consts::PI;
use std::fmt;

/// Fractional digits kept when formatting and comparing numbers.
pub const PRECISION: i32 = 10;

const EPSILON: f64 = 0.5e-10;

/// Dimensions with a fixed conversion table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dimension {
    Length,
    Angle,
    Time,
    Frequency,
    Resolution,
}

/// `(unit, dimension, size in the dimension's canonical unit)`
const CONVERSIONS: &[(&str, Dimension, f64)] = &[
    ("px", Dimension::Length, 1.0),
    ("in", Dimension::Length, 96.0),
    ("cm", Dimension::Length, 96.0 / 2.54),
    ("mm", Dimension::Length, 96.0 / 25.4),
    ("q", Dimension::Length, 96.0 / 101.6),
    ("pt", Dimension::Length, 4.0 / 3.0),
    ("pc", Dimension::Length, 16.0),
    ("deg", Dimension::Angle, 1.0),
    ("grad", Dimension::Angle, 0.9),
    ("rad", Dimension::Angle, 180.0 / PI),
    ("turn", Dimension::Angle, 360.0),
    ("ms", Dimension::Time, 1.0),
    ("s", Dimension::Time, 1000.0),
    ("hz", Dimension::Frequency, 1.0),
    ("khz", Dimension::Frequency, 1000.0),
    ("dppx", Dimension::Resolution, 1.0),
    ("x", Dimension::Resolution, 1.0),
    ("dpi", Dimension::Resolution, 1.0 / 96.0),
    ("dpcm", Dimension::Resolution, 2.54 / 96.0),
];

fn lookup(unit: &str) -> Option<(Dimension, f64)> {
    CONVERSIONS
        .iter()
        .find(|(name, _, _)| *name == unit)
        .map(|&(_, dim, size)| (dim, size))
}

/// Factor turning a magnitude in `from` into one in `to`.
pub fn conversion_factor(from: &str, to: &str) -> Option<f64> {
    if from == to {
        return Some(1.0);
    }
    let (from_dim, from_size) = lookup(from)?;
    let (to_dim, to_size) = lookup(to)?;
    (from_dim == to_dim).then(|| from_size / to_size)
}

pub fn fuzzy_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

pub fn fuzzy_is_int(a: f64) -> bool {
    fuzzy_eq(a, a.round())
}

/// A number with an optional, lowercase unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Number {
    pub value: f64,
    pub unit: Option<String>,
}

impl Number {
    pub fn new(value: f64, unit: Option<&str>) -> Self {
        Self {
            value,
            unit: unit.map(str::to_ascii_lowercase),
        }
    }

    pub fn unitless(value: f64) -> Self {
        Self { value, unit: None }
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn is_unitless(&self) -> bool {
        self.unit.is_none()
    }

    pub fn with_value(&self, value: f64) -> Self {
        Self {
            value,
            unit: self.unit.clone(),
        }
    }

    /// Either side unitless, equal units, or convertible units.
    pub fn is_compatible(&self, other: &Number) -> bool {
        match (self.unit(), other.unit()) {
            (None, _) | (_, None) => true,
            (Some(a), Some(b)) => conversion_factor(a, b).is_some(),
        }
    }

    /// Magnitude expressed in `unit`. Unitless numbers convert to anything.
    pub fn value_in(&self, unit: Option<&str>) -> Option<f64> {
        match (self.unit(), unit) {
            (None, _) | (_, None) => Some(self.value),
            (Some(from), Some(to)) => conversion_factor(from, to).map(|f| self.value * f),
        }
    }

    /// Strict unit equality after conversion, used by `==`.
    pub fn same_quantity(&self, other: &Number) -> bool {
        match (self.unit(), other.unit()) {
            (None, None) => fuzzy_eq(self.value, other.value),
            (Some(_), None) | (None, Some(_)) => false,
            (Some(a), Some(b)) => match conversion_factor(b, a) {
                Some(factor) => fuzzy_eq(self.value, other.value * factor),
                None => false,
            },
        }
    }
}

/// Format a magnitude with at most ten fractional digits.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return if value.is_nan() {
            "NaN".to_string()
        } else if value > 0.0 {
            "infinity".to_string()
        } else {
            "-infinity".to_string()
        };
    }
    if fuzzy_is_int(value) {
        let rounded = value.round();
        return if rounded == 0.0 { "0".to_string() } else { format!("{rounded}") };
    }
    let mut text = format!("{:.*}", PRECISION as usize, value);
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" { "0".to_string() } else { text }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", format_number(self.value), self.unit().unwrap_or(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(10.0), "10");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(1.0 / 3.0), "0.3333333333");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(2.50000000001), "2.5");
    }

    #[test]
    fn test_conversions() {
        assert_eq!(conversion_factor("in", "px"), Some(96.0));
        assert!(fuzzy_eq(conversion_factor("turn", "deg").unwrap(), 360.0));
        assert!(fuzzy_eq(conversion_factor("ms", "s").unwrap(), 0.001));
        assert_eq!(conversion_factor("px", "em"), None);
        assert_eq!(conversion_factor("px", "s"), None);
        assert_eq!(conversion_factor("em", "em"), Some(1.0));
    }

    #[test]
    fn test_compatibility() {
        let px = Number::new(1.0, Some("px"));
        assert!(px.is_compatible(&Number::new(1.0, Some("in"))));
        assert!(px.is_compatible(&Number::unitless(2.0)));
        assert!(!px.is_compatible(&Number::new(1.0, Some("em"))));
        assert!(Number::new(1.0, Some("in")).same_quantity(&Number::new(96.0, Some("px"))));
        assert!(!px.same_quantity(&Number::unitless(1.0)));
    }

    #[test]
    fn test_units_are_lowercased() {
        assert_eq!(Number::new(1.0, Some("PX")).to_string(), "1px");
    }
}
