//! Relational database connection thresholds.

use stackprobe_types::{ConnectionStats, Measurements, Severity};

use crate::evaluate::percent;
use crate::rule::{MeasurementRef, Rule, RuleError, RuleSet};

pub const CURRENT: &str = "current_connections";
pub const MAX_USED: &str = "max_used_connections";
pub const MAX_AVAILABLE: &str = "max_connections";

/// Percent-of-max thresholds. Unset thresholds are not checked.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConnectionThresholds {
    pub warn_current: Option<f64>,
    pub crit_current: Option<f64>,
    pub warn_max: Option<f64>,
    pub crit_max: Option<f64>,
}

pub fn rules(thresholds: &ConnectionThresholds) -> Result<RuleSet, RuleError> {
    // Critical rules first so the most severe message leads.
    RuleSet::new(vec![
        pct_rule(
            "current-conn-pct:critical",
            CURRENT,
            "current",
            Severity::Critical,
            thresholds.crit_current,
        )?,
        pct_rule(
            "max-used-pct:critical",
            MAX_USED,
            "max used",
            Severity::Critical,
            thresholds.crit_max,
        )?,
        pct_rule(
            "current-conn-pct:warning",
            CURRENT,
            "current",
            Severity::Warning,
            thresholds.warn_current,
        )?,
        pct_rule(
            "max-used-pct:warning",
            MAX_USED,
            "max used",
            Severity::Warning,
            thresholds.warn_max,
        )?,
    ])
}

fn pct_rule(
    id: &str,
    part: &str,
    label: &str,
    severity: Severity,
    threshold: Option<f64>,
) -> Result<Rule, RuleError> {
    let level = match severity {
        Severity::Critical => "critical",
        _ => "warning",
    };
    Rule::builder(id, MeasurementRef::percent(part, MAX_AVAILABLE))
        .greater_than(threshold)
        .severity(severity)
        .message(format!(
            "{label} connections exceed {level} threshold of {{threshold}}%"
        ))
        .build()
}

pub fn measurements(stats: &ConnectionStats) -> Measurements {
    Measurements::new()
        .count(CURRENT, stats.current)
        .count(MAX_USED, stats.max_used)
        .count(MAX_AVAILABLE, stats.max_available)
}

/// Performance summary appended to the status line.
pub fn summary(stats: &ConnectionStats) -> String {
    let pct = |n: u64| {
        if stats.max_available == 0 {
            0.0
        } else {
            percent(n as f64, stats.max_available as f64)
        }
    };
    format!(
        "Connections: current={}({:.1}%), max_used={}({:.1}%), max_available={}",
        stats.current,
        pct(stats.current),
        stats.max_used,
        pct(stats.max_used),
        stats.max_available
    )
}
