//! Memory quantity normalization for scheduler output.
//!
//! Schedulers report memory as a number followed by an optional unit
//! suffix ("500M", "2T", "4.000G", "32000M"). Everything is brought onto a
//! single gigabyte scale with decimal factors, the way the qstat
//! complexes are reported.

/// Unit label attached to every normalized quantity.
pub const NORMALIZED_UNIT: &str = "G";

/// Memory unit, classified by the first letter of the suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryUnit {
    Tera,
    Giga,
    Mega,
    Kilo,
    /// Missing or unrecognized suffix, treated as already gigabytes
    Unknown,
}

impl MemoryUnit {
    /// Classify a unit suffix ("T", "Gb", "mib", ...), case-insensitive.
    pub fn from_suffix(suffix: &str) -> Self {
        match suffix.chars().next().map(|c| c.to_ascii_uppercase()) {
            Some('T') => Self::Tera,
            Some('G') => Self::Giga,
            Some('M') => Self::Mega,
            Some('K') => Self::Kilo,
            _ => Self::Unknown,
        }
    }

    /// Multiplier onto the gigabyte scale.
    pub fn to_gib_factor(self) -> f64 {
        match self {
            Self::Tera => 1000.0,
            Self::Giga | Self::Unknown => 1.0,
            Self::Mega => 0.001,
            Self::Kilo => 0.000001,
        }
    }
}

/// A memory quantity split into its numeric part and unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryQuantity {
    pub value: f64,
    pub unit: MemoryUnit,
}

impl MemoryQuantity {
    /// Parse a raw quantity such as "1.5G" or "500m".
    ///
    /// The unit is the trailing run of ASCII letters; the remainder must be
    /// a number, otherwise the value is 0.0.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let split = raw
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_ascii_alphabetic())
            .last()
            .map(|(i, _)| i)
            .unwrap_or(raw.len());
        let (number, suffix) = raw.split_at(split);
        let value = number.trim().parse::<f64>().unwrap_or(0.0);
        let value = if value.is_finite() { value } else { 0.0 };

        Self {
            value,
            unit: MemoryUnit::from_suffix(suffix),
        }
    }

    /// Value on the gigabyte scale.
    pub fn gib(&self) -> f64 {
        self.value * self.unit.to_gib_factor()
    }
}

/// Convert a raw memory string to the gigabyte scale.
///
/// Empty or unparsable strings yield 0.0.
pub fn parse_memory_gib(raw: &str) -> f64 {
    MemoryQuantity::parse(raw).gib()
}

/// Normalize a raw memory string into a `(value, unit)` pair on the
/// gigabyte scale. The unit label is always [`NORMALIZED_UNIT`].
pub fn normalize_memory(raw: &str) -> (f64, &'static str) {
    (parse_memory_gib(raw), NORMALIZED_UNIT)
}

/// Render a gigabyte value with three decimals, e.g. "1.000G".
pub fn format_gib(gib: f64) -> String {
    format!("{:.3}{}", gib, NORMALIZED_UNIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_memory_gib() {
        assert_eq!(parse_memory_gib("500M"), 0.5);
        assert_eq!(parse_memory_gib("1.5G"), 1.5);
        assert_eq!(parse_memory_gib("2T"), 2000.0);
        assert_eq!(parse_memory_gib("4.000G"), 4.0);
        assert_eq!(parse_memory_gib("16"), 16.0);
    }

    #[test]
    fn test_parse_memory_gib_lowercase_and_invalid() {
        assert_eq!(parse_memory_gib("500m"), 0.5);
        assert_eq!(parse_memory_gib("1t"), 1000.0);
        assert_eq!(parse_memory_gib("2g"), 2.0);
        assert_eq!(parse_memory_gib("bad"), 0.0);
        assert_eq!(parse_memory_gib(""), 0.0);
        assert_eq!(parse_memory_gib("  "), 0.0);
    }

    #[test]
    fn test_kilo_suffix() {
        let gib = parse_memory_gib("2000000K");
        assert!((gib - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_memory_unit_label() {
        assert_eq!(normalize_memory("500M"), (0.5, "G"));
        assert_eq!(normalize_memory(""), (0.0, "G"));
        assert_eq!(normalize_memory("bad"), (0.0, "G"));
    }

    #[test]
    fn test_memory_unit_from_suffix() {
        assert_eq!(MemoryUnit::from_suffix("GB"), MemoryUnit::Giga);
        assert_eq!(MemoryUnit::from_suffix("mib"), MemoryUnit::Mega);
        assert_eq!(MemoryUnit::from_suffix(""), MemoryUnit::Unknown);
        assert_eq!(MemoryUnit::from_suffix("x"), MemoryUnit::Unknown);
    }

    #[test]
    fn test_format_gib() {
        assert_eq!(format_gib(1.0), "1.000G");
        assert_eq!(format_gib(1.2), "1.200G");
        assert_eq!(format_gib(0.0), "0.000G");
    }
}
