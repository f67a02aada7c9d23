use crate::error::ConfigError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d+)(?:\.(\d+))?\s*(ns|us|µs|ms|s|m|h)\s*$").expect("valid duration regex")
});

// Largest first; format_duration picks the first unit that divides evenly.
const UNITS: &[(&str, u64)] = &[
    ("h", 3_600_000_000_000),
    ("m", 60_000_000_000),
    ("s", 1_000_000_000),
    ("ms", 1_000_000),
    ("us", 1_000),
    ("ns", 1),
];

fn unit_nanos(unit: &str) -> u64 {
    match unit {
        "µs" => 1_000,
        u => UNITS
            .iter()
            .find(|(name, _)| *name == u)
            .map(|(_, n)| *n)
            .unwrap_or(1),
    }
}

/// Parse `"250ms"`, `"10s"`, `"1.5s"` and friends into a [`Duration`].
pub fn parse_duration(input: &str) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::InvalidDuration(input.to_string());
    let caps = DURATION_RE.captures(input).ok_or_else(invalid)?;
    let scale = unit_nanos(&caps[3]);
    let whole: u64 = caps[1].parse().map_err(|_| invalid())?;

    let Some(frac) = caps.get(2) else {
        let nanos = whole.checked_mul(scale).ok_or_else(invalid)?;
        return Ok(Duration::from_nanos(nanos));
    };

    let value: f64 = format!("{}.{}", whole, frac.as_str())
        .parse()
        .map_err(|_| invalid())?;
    let nanos = (value * scale as f64).round();
    if !nanos.is_finite() || nanos >= u64::MAX as f64 {
        return Err(invalid());
    }
    Ok(Duration::from_nanos(nanos as u64))
}

/// Render a duration with the largest unit that represents it exactly.
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    for (name, scale) in UNITS {
        let scale = *scale as u128;
        if nanos % scale == 0 {
            return format!("{}{}", nanos / scale, name);
        }
    }
    format!("{}ns", nanos)
}

pub mod serde_duration {
    //! Serde adapter storing durations as text, e.g. `min: 100ms`.
    use super::{format_duration, parse_duration};
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format_duration(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(d)?;
        parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_units() {
        assert_eq!(parse_duration("100ms").unwrap(), Duration::from_millis(100));
        assert_eq!(parse_duration("10s").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("750us").unwrap(), Duration::from_micros(750));
        assert_eq!(parse_duration("5µs").unwrap(), Duration::from_micros(5));
        assert_eq!(parse_duration("42ns").unwrap(), Duration::from_nanos(42));
        assert_eq!(parse_duration(" 3 s ").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parses_fractions() {
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration("0.25ms").unwrap(), Duration::from_micros(250));
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "10", "ms", "-1s", "1d", "1.s", "abc", "99999999999999999999h"] {
            assert!(
                matches!(parse_duration(bad), Err(ConfigError::InvalidDuration(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn formats_with_largest_exact_unit() {
        assert_eq!(format_duration(Duration::ZERO), "0s");
        assert_eq!(format_duration(Duration::from_millis(100)), "100ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1500ms");
        assert_eq!(format_duration(Duration::from_secs(10)), "10s");
        assert_eq!(format_duration(Duration::from_secs(90)), "90s");
        assert_eq!(format_duration(Duration::from_secs(120)), "2m");
        assert_eq!(format_duration(Duration::from_nanos(1_001)), "1001ns");
    }
}
