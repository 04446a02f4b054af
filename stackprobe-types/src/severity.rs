//! Check severities and the exit-code convention.

use std::fmt;

/// Severity of a check outcome or of a single violation.
///
/// Variants are ordered so that `max()` yields the worst severity.
/// Rule evaluation never produces [`Severity::Unknown`]; it is reserved for
/// failures that happen before any measurement could be judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Severity {
    #[default]
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Severity {
    /// Process exit code for this severity (0 = OK, 1 = WARNING, 2 = CRITICAL, 3 = UNKNOWN).
    pub fn exit_code(&self) -> i32 {
        match self {
            Severity::Ok => 0,
            Severity::Warning => 1,
            Severity::Critical => 2,
            Severity::Unknown => 3,
        }
    }

    /// Upper-case label used in summary lines.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
            Severity::Unknown => "UNKNOWN",
        }
    }

    /// Whether a rule may report a violation at this severity.
    pub fn is_violation_level(&self) -> bool {
        matches!(self, Severity::Warning | Severity::Critical)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Severity::Ok.exit_code(), 0);
        assert_eq!(Severity::Warning.exit_code(), 1);
        assert_eq!(Severity::Critical.exit_code(), 2);
        assert_eq!(Severity::Unknown.exit_code(), 3);
    }

    #[test]
    fn test_ordering_is_worst_of() {
        let worst = [Severity::Warning, Severity::Ok, Severity::Critical]
            .into_iter()
            .max();
        assert_eq!(worst, Some(Severity::Critical));
        assert!(Severity::Ok < Severity::Warning);
    }

    #[test]
    fn test_violation_levels() {
        assert!(Severity::Warning.is_violation_level());
        assert!(Severity::Critical.is_violation_level());
        assert!(!Severity::Ok.is_violation_level());
        assert!(!Severity::Unknown.is_violation_level());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
    }
}
