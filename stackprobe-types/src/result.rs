//! Evaluation results and check outcomes.

use crate::Severity;

/// One violated condition, produced by a single rule.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Violation {
    pub rule_id: String,
    pub severity: Severity,
    pub message: String,
}

impl Violation {
    pub fn new(rule_id: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            message: message.into(),
        }
    }
}

/// Output of one evaluation run.
///
/// `violations` keeps rule declaration order so that reporters render
/// deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvaluationResult {
    pub severity: Severity,
    pub violations: Vec<Violation>,
}

impl EvaluationResult {
    /// A result with no violations.
    pub fn ok() -> Self {
        Self::default()
    }

    /// Build a result from violations, aggregating the worst severity.
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        let severity = violations
            .iter()
            .map(|v| v.severity)
            .max()
            .unwrap_or(Severity::Ok);
        Self {
            severity,
            violations,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.violations.iter().map(|v| v.message.as_str())
    }

    /// Number of violations at exactly `severity`.
    pub fn count(&self, severity: Severity) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == severity)
            .count()
    }

    /// Number of violations raised by rules whose id starts with `prefix`.
    pub fn count_rule_prefix(&self, prefix: &str) -> usize {
        self.violations
            .iter()
            .filter(|v| v.rule_id.starts_with(prefix))
            .count()
    }
}

/// What a check run produced: either an evaluation, or a collection failure
/// that pre-empted rule evaluation entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "outcome", rename_all = "snake_case"))]
pub enum CheckOutcome {
    Evaluated(EvaluationResult),
    CollectionFailed { reason: String },
}

impl CheckOutcome {
    pub fn collection_failed(reason: impl Into<String>) -> Self {
        CheckOutcome::CollectionFailed {
            reason: reason.into(),
        }
    }

    /// Overall severity. A collection failure is always critical.
    pub fn severity(&self) -> Severity {
        match self {
            CheckOutcome::Evaluated(result) => result.severity,
            CheckOutcome::CollectionFailed { .. } => Severity::Critical,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.severity().exit_code()
    }

    /// The messages a reporter should print, in order.
    pub fn messages(&self) -> Vec<&str> {
        match self {
            CheckOutcome::Evaluated(result) => result.messages().collect(),
            CheckOutcome::CollectionFailed { reason } => vec![reason.as_str()],
        }
    }
}

impl From<EvaluationResult> for CheckOutcome {
    fn from(result: EvaluationResult) -> Self {
        CheckOutcome::Evaluated(result)
    }
}
