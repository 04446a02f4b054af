use std::time::Duration;

use anyhow::{bail, Result};

/// Suffix to nanoseconds multiplier (order matters: longer suffixes first)
const UNITS: &[(&str, f64)] = &[
    ("ns", 1.0),
    ("µs", 1_000.0),
    ("us", 1_000.0),
    ("ms", 1_000_000.0),
    ("s", 1_000_000_000.0),
    ("m", 60_000_000_000.0),
];

/// Parse timeouts like "10s", "500ms", "1.5m". A bare number is seconds.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();

    let (val_str, multiplier) = UNITS
        .iter()
        .find_map(|(suffix, m)| s.strip_suffix(suffix).map(|v| (v, *m)))
        .unwrap_or((s, 1_000_000_000.0));

    let val: f64 = val_str.trim().parse()?;
    if !val.is_finite() || val <= 0.0 {
        bail!("Duration must be positive: {}", s);
    }
    Ok(Duration::from_nanos((val * multiplier) as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seconds() {
        let d = parse_duration("10s").unwrap();
        assert_eq!(d, Duration::from_secs(10));
    }

    #[test]
    fn test_parse_bare_number_is_seconds() {
        let d = parse_duration("2.5").unwrap();
        assert_eq!(d, Duration::from_millis(2500));
    }

    #[test]
    fn test_parse_milliseconds() {
        let d = parse_duration("750ms").unwrap();
        assert_eq!(d, Duration::from_millis(750));
    }

    #[test]
    fn test_parse_minutes() {
        let d = parse_duration("1.5m").unwrap();
        assert_eq!(d, Duration::from_secs(90));
    }

    #[test]
    fn test_rejects_zero_and_garbage() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("-1").is_err());
        assert!(parse_duration("soon").is_err());
    }
}
