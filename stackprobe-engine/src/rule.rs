//! Declarative threshold rules.
//!
//! A [`Rule`] names the measurement it reads, how to compare it, and the
//! severity it reports when the comparison holds. Rules are type-checked
//! when they are built; evaluation itself cannot fail.

use std::collections::HashSet;
use std::fmt;

use stackprobe_types::{MeasurementKind, Severity};
use thiserror::Error;

use crate::template::{format_number, MessageTemplate};

/// Errors raised while building rules or rule sets.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    /// The comparator cannot be applied to the referenced measurement kind.
    #[error("rule '{id}': {comparator} cannot be applied to a {kind} measurement")]
    ComparatorMismatch {
        id: String,
        comparator: Comparator,
        kind: MeasurementKind,
    },

    /// The threshold shape does not fit the comparator.
    #[error("rule '{id}': {comparator} needs {expected} threshold")]
    ThresholdMismatch {
        id: String,
        comparator: Comparator,
        expected: &'static str,
    },

    /// Violations may only be reported as warning or critical.
    #[error("rule '{id}': {severity} is not a violation severity")]
    InvalidSeverity { id: String, severity: Severity },

    /// The comparator was never set on the builder.
    #[error("rule '{0}': no comparator given")]
    MissingComparator(String),

    /// Two rules in one set share an id.
    #[error("duplicate rule id '{0}'")]
    DuplicateId(String),
}

/// How a rule compares a measurement against its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    /// Violated iff value > threshold.
    GreaterThan,
    /// Violated iff value < threshold.
    LessThan,
    /// Violated for each threshold name missing from a list, or when a
    /// presence measurement is false.
    NotPresent,
    /// Violated once per element of a non-empty list.
    SetNonEmpty,
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Comparator::GreaterThan => "greater-than",
            Comparator::LessThan => "less-than",
            Comparator::NotPresent => "not-present",
            Comparator::SetNonEmpty => "set-non-empty",
        };
        f.write_str(s)
    }
}

/// An operator-supplied threshold.
#[derive(Debug, Clone, PartialEq)]
pub enum Threshold {
    Number(f64),
    Names(Vec<String>),
    /// Arms a rule that has no value to compare against.
    Enabled,
}

impl Threshold {
    /// Text substituted for `{threshold}` in messages.
    pub fn display(&self) -> String {
        match self {
            Threshold::Number(n) => format_number(*n),
            Threshold::Names(names) => names.join(", "),
            Threshold::Enabled => String::new(),
        }
    }
}

/// Which measurement a rule reads.
#[derive(Debug, Clone, PartialEq)]
pub enum MeasurementRef {
    /// A measurement collected under `name`, expected to be of `kind`.
    Named { name: String, kind: MeasurementKind },
    /// `part / whole * 100`, rounded to one decimal. Both operands must be
    /// numeric or count measurements.
    Percent { part: String, whole: String },
    /// Number of entries in a list measurement.
    Length { list: String },
}

impl MeasurementRef {
    pub fn numeric(name: impl Into<String>) -> Self {
        Self::named(name, MeasurementKind::Numeric)
    }

    pub fn count(name: impl Into<String>) -> Self {
        Self::named(name, MeasurementKind::Count)
    }

    pub fn presence(name: impl Into<String>) -> Self {
        Self::named(name, MeasurementKind::Presence)
    }

    pub fn names(name: impl Into<String>) -> Self {
        Self::named(name, MeasurementKind::ListOfNames)
    }

    pub fn named(name: impl Into<String>, kind: MeasurementKind) -> Self {
        MeasurementRef::Named {
            name: name.into(),
            kind,
        }
    }

    pub fn percent(part: impl Into<String>, whole: impl Into<String>) -> Self {
        MeasurementRef::Percent {
            part: part.into(),
            whole: whole.into(),
        }
    }

    pub fn length(list: impl Into<String>) -> Self {
        MeasurementRef::Length { list: list.into() }
    }

    /// Kind of the value this reference resolves to.
    pub fn kind(&self) -> MeasurementKind {
        match self {
            MeasurementRef::Named { kind, .. } => *kind,
            MeasurementRef::Percent { .. } => MeasurementKind::Numeric,
            MeasurementRef::Length { .. } => MeasurementKind::Count,
        }
    }

    /// Name used for `{measurement}` in messages.
    pub fn label(&self) -> String {
        match self {
            MeasurementRef::Named { name, .. } => name.clone(),
            MeasurementRef::Percent { part, whole } => format!("{part}/{whole}"),
            MeasurementRef::Length { list } => format!("len({list})"),
        }
    }
}

/// Rule families that the engine treats differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RuleFamily {
    #[default]
    Threshold,
    /// Minimum instance counts; subject to warning-to-critical escalation.
    MinimumCount,
}

/// A type-checked threshold rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    id: String,
    measurement: MeasurementRef,
    comparator: Comparator,
    threshold: Option<Threshold>,
    severity: Severity,
    family: RuleFamily,
    message: MessageTemplate,
}

impl Rule {
    /// Start building a rule reading `measurement`.
    pub fn builder(id: impl Into<String>, measurement: MeasurementRef) -> RuleBuilder {
        RuleBuilder::new(id, measurement)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn measurement(&self) -> &MeasurementRef {
        &self.measurement
    }

    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    pub fn threshold(&self) -> Option<&Threshold> {
        self.threshold.as_ref()
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn family(&self) -> RuleFamily {
        self.family
    }

    pub fn message(&self) -> &MessageTemplate {
        &self.message
    }

    /// A rule without a threshold is never evaluated.
    pub fn is_active(&self) -> bool {
        self.threshold.is_some()
    }
}

/// Builder for [`Rule`].
#[derive(Debug)]
pub struct RuleBuilder {
    id: String,
    measurement: MeasurementRef,
    comparator: Option<Comparator>,
    threshold: Option<Threshold>,
    severity: Severity,
    family: RuleFamily,
    message: Option<MessageTemplate>,
}

impl RuleBuilder {
    fn new(id: impl Into<String>, measurement: MeasurementRef) -> Self {
        Self {
            id: id.into(),
            measurement,
            comparator: None,
            threshold: None,
            severity: Severity::Warning,
            family: RuleFamily::Threshold,
            message: None,
        }
    }

    /// Violated when the value exceeds `threshold`. `None` leaves the rule inactive.
    pub fn greater_than(mut self, threshold: Option<f64>) -> Self {
        self.comparator = Some(Comparator::GreaterThan);
        self.threshold = threshold.map(Threshold::Number);
        self
    }

    /// Violated when the value is below `threshold`. `None` leaves the rule inactive.
    pub fn less_than(mut self, threshold: Option<f64>) -> Self {
        self.comparator = Some(Comparator::LessThan);
        self.threshold = threshold.map(Threshold::Number);
        self
    }

    /// Violated for each of `names` missing from a list measurement.
    pub fn requires_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.comparator = Some(Comparator::NotPresent);
        self.threshold = Some(Threshold::Names(names.into_iter().map(Into::into).collect()));
        self
    }

    /// Violated when a presence measurement is false, if `enabled`.
    pub fn requires_presence(mut self, enabled: bool) -> Self {
        self.comparator = Some(Comparator::NotPresent);
        self.threshold = enabled.then_some(Threshold::Enabled);
        self
    }

    /// Violated once per element of a list measurement, if `enabled`.
    pub fn set_non_empty(mut self, enabled: bool) -> Self {
        self.comparator = Some(Comparator::SetNonEmpty);
        self.threshold = enabled.then_some(Threshold::Enabled);
        self
    }

    /// Set comparator and threshold directly.
    pub fn compare(mut self, comparator: Comparator, threshold: Option<Threshold>) -> Self {
        self.comparator = Some(comparator);
        self.threshold = threshold;
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn family(mut self, family: RuleFamily) -> Self {
        self.family = family;
        self
    }

    pub fn message(mut self, template: impl Into<MessageTemplate>) -> Self {
        self.message = Some(template.into());
        self
    }

    /// Type-check and build the rule.
    pub fn build(self) -> Result<Rule, RuleError> {
        let comparator = self
            .comparator
            .ok_or_else(|| RuleError::MissingComparator(self.id.clone()))?;

        if !self.severity.is_violation_level() {
            return Err(RuleError::InvalidSeverity {
                id: self.id,
                severity: self.severity,
            });
        }

        let kind = self.measurement.kind();
        let kind_ok = match comparator {
            Comparator::GreaterThan | Comparator::LessThan => kind.is_numeric(),
            Comparator::NotPresent => {
                matches!(kind, MeasurementKind::ListOfNames | MeasurementKind::Presence)
            }
            Comparator::SetNonEmpty => kind == MeasurementKind::ListOfNames,
        };
        if !kind_ok {
            return Err(RuleError::ComparatorMismatch {
                id: self.id,
                comparator,
                kind,
            });
        }

        if let Some(threshold) = &self.threshold {
            let expected = match (comparator, kind) {
                (Comparator::GreaterThan | Comparator::LessThan, _) => {
                    (!matches!(threshold, Threshold::Number(n) if n.is_finite()))
                        .then_some("a finite numeric")
                }
                (Comparator::NotPresent, MeasurementKind::ListOfNames) => {
                    (!matches!(threshold, Threshold::Names(names) if !names.is_empty()))
                        .then_some("a non-empty name list")
                }
                _ => (*threshold != Threshold::Enabled).then_some("an on/off"),
            };
            if let Some(expected) = expected {
                return Err(RuleError::ThresholdMismatch {
                    id: self.id,
                    comparator,
                    expected,
                });
            }
        }

        let message = self
            .message
            .unwrap_or_else(|| MessageTemplate::new(default_message(comparator)));

        Ok(Rule {
            id: self.id,
            measurement: self.measurement,
            comparator,
            threshold: self.threshold,
            severity: self.severity,
            family: self.family,
            message,
        })
    }
}

fn default_message(comparator: Comparator) -> &'static str {
    match comparator {
        Comparator::GreaterThan => "{measurement} is {value}, above threshold of {threshold}",
        Comparator::LessThan => "{measurement} is {value}, below minimum of {threshold}",
        Comparator::NotPresent => "{item} not found in {measurement}",
        Comparator::SetNonEmpty => "{item}",
    }
}

/// An ordered rule list plus the run-level escalation modifier.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
    escalate_minimums: bool,
}

impl RuleSet {
    /// Create a rule set, rejecting duplicate ids.
    pub fn new(rules: Vec<Rule>) -> Result<Self, RuleError> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.id()) {
                return Err(RuleError::DuplicateId(rule.id().to_string()));
            }
        }
        Ok(Self {
            rules,
            escalate_minimums: false,
        })
    }

    /// Promote warning-level minimum-count violations to critical.
    pub fn escalate_minimums(mut self, escalate: bool) -> Self {
        self.escalate_minimums = escalate;
        self
    }

    pub fn escalates_minimums(&self) -> bool {
        self.escalate_minimums
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id() == id)
    }

    pub fn active(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| r.is_active())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inactive_without_threshold() {
        let rule = Rule::builder("warn-current", MeasurementRef::numeric("pct"))
            .greater_than(None)
            .build()
            .unwrap();
        assert!(!rule.is_active());
        assert_eq!(rule.severity(), Severity::Warning);
    }

    #[test]
    fn test_greater_than_on_list_is_rejected() {
        let err = Rule::builder("bad", MeasurementRef::names("image_names"))
            .greater_than(Some(3.0))
            .build()
            .unwrap_err();
        assert!(matches!(err, RuleError::ComparatorMismatch { .. }));
    }

    #[test]
    fn test_set_non_empty_on_count_is_rejected() {
        let err = Rule::builder("bad", MeasurementRef::count("image_count"))
            .set_non_empty(true)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            RuleError::ComparatorMismatch {
                kind: MeasurementKind::Count,
                ..
            }
        ));
    }

    #[test]
    fn test_threshold_shape_is_checked() {
        let err = Rule::builder("bad", MeasurementRef::count("n"))
            .compare(Comparator::LessThan, Some(Threshold::Enabled))
            .build()
            .unwrap_err();
        assert!(matches!(err, RuleError::ThresholdMismatch { .. }));

        let err = Rule::builder("bad", MeasurementRef::names("images"))
            .requires_names(Vec::<String>::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, RuleError::ThresholdMismatch { .. }));

        let err = Rule::builder("bad", MeasurementRef::numeric("t"))
            .greater_than(Some(f64::NAN))
            .build()
            .unwrap_err();
        assert!(matches!(err, RuleError::ThresholdMismatch { .. }));
    }

    #[test]
    fn test_ok_severity_is_rejected() {
        let err = Rule::builder("bad", MeasurementRef::count("n"))
            .less_than(Some(1.0))
            .severity(Severity::Ok)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            RuleError::InvalidSeverity {
                id: "bad".to_string(),
                severity: Severity::Ok
            }
        );
    }

    #[test]
    fn test_missing_comparator() {
        let err = Rule::builder("bare", MeasurementRef::count("n")).build().unwrap_err();
        assert_eq!(err, RuleError::MissingComparator("bare".to_string()));
    }

    #[test]
    fn test_presence_not_present() {
        let rule = Rule::builder("tenant-list", MeasurementRef::presence("tenants_listed"))
            .requires_presence(true)
            .severity(Severity::Critical)
            .build()
            .unwrap();
        assert_eq!(rule.comparator(), Comparator::NotPresent);
        assert_eq!(rule.threshold(), Some(&Threshold::Enabled));
    }

    #[test]
    fn test_derived_ref_kinds() {
        assert_eq!(
            MeasurementRef::percent("current", "max").kind(),
            MeasurementKind::Numeric
        );
        assert_eq!(MeasurementRef::length("images").kind(), MeasurementKind::Count);
        assert!(Rule::builder("n", MeasurementRef::length("images"))
            .less_than(Some(2.0))
            .build()
            .is_ok());
    }

    #[test]
    fn test_rule_set_rejects_duplicates() {
        let rule = Rule::builder("min-compute", MeasurementRef::count("nova-compute.active"))
            .less_than(Some(2.0))
            .build()
            .unwrap();
        let err = RuleSet::new(vec![rule.clone(), rule]).unwrap_err();
        assert_eq!(err, RuleError::DuplicateId("min-compute".to_string()));
    }

    #[test]
    fn test_threshold_display() {
        assert_eq!(Threshold::Number(70.0).display(), "70");
        assert_eq!(Threshold::Number(0.5).display(), "0.5");
        assert_eq!(
            Threshold::Names(vec!["cirros".into(), "ubuntu".into()]).display(),
            "cirros, ubuntu"
        );
    }
}
