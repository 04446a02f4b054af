//! Rule evaluation and severity aggregation.

use stackprobe_types::{
    EvaluationResult, MeasurementKind, MeasurementValue, Measurements, Severity, Violation,
};

use crate::rule::{Comparator, MeasurementRef, Rule, RuleFamily, RuleSet, Threshold};
use crate::template::{format_number, MessageContext};

/// Stateless evaluator for rule lists.
///
/// The only knob is the escalation modifier, which promotes warning-level
/// violations of [`RuleFamily::MinimumCount`] rules to critical before
/// aggregation. Violations of other families keep their own severity.
#[derive(Debug, Clone, Copy, Default)]
pub struct Engine {
    escalate_minimums: bool,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn escalate_minimums(mut self, escalate: bool) -> Self {
        self.escalate_minimums = escalate;
        self
    }

    /// Evaluate active rules in declaration order.
    ///
    /// Never fails: a measurement that cannot be resolved becomes a
    /// critical violation of the rule that asked for it.
    pub fn evaluate(&self, rules: &[Rule], measurements: &Measurements) -> EvaluationResult {
        let mut violations = Vec::new();

        for rule in rules.iter().filter(|r| r.is_active()) {
            match resolve(rule.measurement(), measurements) {
                Ok(resolved) => self.judge(rule, &resolved, &mut violations),
                Err(unresolved) => violations.push(Violation::new(
                    rule.id(),
                    Severity::Critical,
                    unresolved.message(),
                )),
            }
        }

        EvaluationResult::from_violations(violations)
    }

    fn judge(&self, rule: &Rule, resolved: &Resolved<'_>, out: &mut Vec<Violation>) {
        let Some(threshold) = rule.threshold() else {
            return;
        };
        let severity = self.severity_for(rule);
        let label = rule.measurement().label();
        let ctx = MessageContext {
            rule_id: rule.id(),
            measurement: &label,
            value: resolved.display(),
            threshold: Some(threshold.display()),
            item: None,
        };
        let mut emit = |item: Option<&str>| {
            let ctx = MessageContext { item, ..ctx.clone() };
            out.push(Violation::new(rule.id(), severity, rule.message().render(&ctx)));
        };

        match (rule.comparator(), resolved, threshold) {
            (Comparator::GreaterThan, Resolved::Number(v), Threshold::Number(t)) => {
                if v > t {
                    emit(None);
                }
            }
            (Comparator::LessThan, Resolved::Number(v), Threshold::Number(t)) => {
                if v < t {
                    emit(None);
                }
            }
            (Comparator::NotPresent, Resolved::Names(present), Threshold::Names(required)) => {
                for name in required {
                    if !present.contains(name) {
                        emit(Some(name.as_str()));
                    }
                }
            }
            (Comparator::NotPresent, Resolved::Flag(present), Threshold::Enabled) => {
                if !present {
                    emit(Some(label.as_str()));
                }
            }
            (Comparator::SetNonEmpty, Resolved::Names(items), Threshold::Enabled) => {
                for item in items.iter() {
                    emit(Some(item.as_str()));
                }
            }
            // Shapes are checked when the rule is built.
            _ => {}
        }
    }

    fn severity_for(&self, rule: &Rule) -> Severity {
        if self.escalate_minimums
            && rule.family() == RuleFamily::MinimumCount
            && rule.severity() == Severity::Warning
        {
            Severity::Critical
        } else {
            rule.severity()
        }
    }
}

/// Evaluate `rules` without escalation.
pub fn evaluate(rules: &[Rule], measurements: &Measurements) -> EvaluationResult {
    Engine::new().evaluate(rules, measurements)
}

impl RuleSet {
    /// Evaluate this set with its own escalation setting.
    pub fn evaluate(&self, measurements: &Measurements) -> EvaluationResult {
        Engine::new()
            .escalate_minimums(self.escalates_minimums())
            .evaluate(self.rules(), measurements)
    }
}

#[derive(Debug)]
enum Resolved<'a> {
    Number(f64),
    Names(&'a [String]),
    Flag(bool),
}

impl Resolved<'_> {
    fn display(&self) -> Option<String> {
        match self {
            Resolved::Number(n) => Some(format_number(*n)),
            Resolved::Names(names) => Some(names.join(", ")),
            Resolved::Flag(b) => Some(b.to_string()),
        }
    }
}

#[derive(Debug, PartialEq)]
enum Unresolved {
    Missing(String),
    WrongKind {
        name: String,
        expected: MeasurementKind,
        found: MeasurementKind,
    },
    ZeroDenominator(String),
}

impl Unresolved {
    fn message(&self) -> String {
        match self {
            Unresolved::Missing(name) => format!("{name} measurement unavailable"),
            Unresolved::WrongKind {
                name,
                expected,
                found,
            } => format!("{name} measurement has kind {found}, expected {expected}"),
            Unresolved::ZeroDenominator(name) => {
                format!("{name} is zero, cannot derive percentage")
            }
        }
    }
}

fn lookup<'a>(
    measurements: &'a Measurements,
    name: &str,
    expected: MeasurementKind,
) -> Result<&'a MeasurementValue, Unresolved> {
    let value = measurements
        .get(name)
        .ok_or_else(|| Unresolved::Missing(name.to_string()))?;
    let found = value.kind();
    // Counts and ratios compare the same way.
    if found == expected || (found.is_numeric() && expected.is_numeric()) {
        Ok(value)
    } else {
        Err(Unresolved::WrongKind {
            name: name.to_string(),
            expected,
            found,
        })
    }
}

fn lookup_number(measurements: &Measurements, name: &str) -> Result<f64, Unresolved> {
    lookup(measurements, name, MeasurementKind::Numeric).map(|v| v.as_f64().unwrap_or_default())
}

fn resolve<'a>(
    reference: &MeasurementRef,
    measurements: &'a Measurements,
) -> Result<Resolved<'a>, Unresolved> {
    match reference {
        MeasurementRef::Named { name, kind } => {
            let value = lookup(measurements, name, *kind)?;
            Ok(match value {
                MeasurementValue::Numeric(v) => Resolved::Number(*v),
                MeasurementValue::Count(c) => Resolved::Number(*c as f64),
                MeasurementValue::Presence(b) => Resolved::Flag(*b),
                MeasurementValue::ListOfNames(names) => Resolved::Names(names),
            })
        }
        MeasurementRef::Percent { part, whole } => {
            let part_value = lookup_number(measurements, part)?;
            let whole_value = lookup_number(measurements, whole)?;
            if whole_value == 0.0 {
                return Err(Unresolved::ZeroDenominator(whole.clone()));
            }
            Ok(Resolved::Number(percent(part_value, whole_value)))
        }
        MeasurementRef::Length { list } => {
            let value = lookup(measurements, list, MeasurementKind::ListOfNames)?;
            let len = value.as_names().map_or(0, <[String]>::len);
            Ok(Resolved::Number(len as f64))
        }
    }
}

/// `part / whole * 100`, rounded to one decimal.
pub fn percent(part: f64, whole: f64) -> f64 {
    (part / whole * 1000.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::RuleError;

    fn warn_above(id: &str, name: &str, t: f64) -> Rule {
        Rule::builder(id, MeasurementRef::numeric(name))
            .greater_than(Some(t))
            .severity(Severity::Warning)
            .message("{measurement} above {threshold}")
            .build()
            .unwrap()
    }

    fn crit_above(id: &str, name: &str, t: f64) -> Rule {
        Rule::builder(id, MeasurementRef::numeric(name))
            .greater_than(Some(t))
            .severity(Severity::Critical)
            .build()
            .unwrap()
    }

    fn minimum(id: &str, name: &str, min: f64) -> Rule {
        Rule::builder(id, MeasurementRef::count(name))
            .less_than(Some(min))
            .family(RuleFamily::MinimumCount)
            .message("{measurement} below threshold - {value} active / {threshold} minimum")
            .build()
            .unwrap()
    }

    fn down_rule() -> Rule {
        Rule::builder("services-down", MeasurementRef::names("services_down"))
            .set_non_empty(true)
            .severity(Severity::Critical)
            .message("{item} is down")
            .build()
            .unwrap()
    }

    #[test]
    fn test_no_rules_is_ok() {
        let result = evaluate(&[], &Measurements::new().numeric("x", 1.0));
        assert_eq!(result.severity, Severity::Ok);
        assert!(result.violations.is_empty());
    }

    #[test]
    fn test_inactive_rules_are_skipped() {
        let rules = vec![
            Rule::builder("warn", MeasurementRef::numeric("missing"))
                .greater_than(None)
                .build()
                .unwrap(),
            Rule::builder("down", MeasurementRef::names("missing_list"))
                .set_non_empty(false)
                .build()
                .unwrap(),
        ];
        let result = evaluate(&rules, &Measurements::new());
        assert_eq!(result, EvaluationResult::ok());
    }

    #[test]
    fn test_greater_than_is_strict() {
        let rules = vec![warn_above("w", "pct", 70.0)];
        let at = evaluate(&rules, &Measurements::new().numeric("pct", 70.0));
        assert!(at.is_ok());

        let above = evaluate(&rules, &Measurements::new().numeric("pct", 70.1));
        assert_eq!(above.severity, Severity::Warning);
        assert_eq!(above.violations[0].message, "pct above 70");
    }

    #[test]
    fn test_less_than_is_strict() {
        let rules = vec![minimum("min", "active", 4.0)];
        assert!(evaluate(&rules, &Measurements::new().count("active", 4)).is_ok());
        let below = evaluate(&rules, &Measurements::new().count("active", 3));
        assert_eq!(
            below.violations[0].message,
            "active below threshold - 3 active / 4 minimum"
        );
    }

    #[test]
    fn test_warning_then_critical_is_critical_in_any_order() {
        let m = Measurements::new().numeric("a", 10.0).numeric("b", 10.0);
        let forward = vec![warn_above("w", "a", 1.0), crit_above("c", "b", 1.0)];
        let backward = vec![crit_above("c", "b", 1.0), warn_above("w", "a", 1.0)];

        assert_eq!(evaluate(&forward, &m).severity, Severity::Critical);
        assert_eq!(evaluate(&backward, &m).severity, Severity::Critical);
        assert_eq!(evaluate(&forward, &m).violations[0].rule_id, "w");
        assert_eq!(evaluate(&backward, &m).violations[0].rule_id, "c");
    }

    #[test]
    fn test_adding_violations_never_lowers_severity() {
        let m = Measurements::new().numeric("a", 10.0);
        let mut rules = vec![crit_above("c", "a", 1.0)];
        assert_eq!(evaluate(&rules, &m).severity, Severity::Critical);

        rules.push(warn_above("w", "a", 1.0));
        assert_eq!(evaluate(&rules, &m).severity, Severity::Critical);

        let warn_only = vec![warn_above("w", "a", 1.0)];
        assert_eq!(evaluate(&warn_only, &m).severity, Severity::Warning);
    }

    #[test]
    fn test_missing_measurement_is_critical() {
        let rules = vec![
            Rule::builder(
                "max-used-pct:warning",
                MeasurementRef::percent("max_used_connections", "max_connections"),
            )
            .greater_than(Some(80.0))
            .severity(Severity::Warning)
            .build()
            .unwrap(),
            warn_above("other", "present", 1000.0),
        ];
        let m = Measurements::new().count("max_connections", 100).numeric("present", 1.0);
        let result = evaluate(&rules, &m);

        assert_eq!(result.severity, Severity::Critical);
        assert_eq!(result.len(), 1);
        assert_eq!(result.violations[0].rule_id, "max-used-pct:warning");
        assert_eq!(
            result.violations[0].message,
            "max_used_connections measurement unavailable"
        );
    }

    #[test]
    fn test_wrong_kind_is_critical() {
        let rules = vec![warn_above("w", "images", 1.0)];
        let m = Measurements::new().names("images", ["cirros"]);
        let result = evaluate(&rules, &m);
        assert_eq!(result.severity, Severity::Critical);
        assert_eq!(
            result.violations[0].message,
            "images measurement has kind list, expected numeric"
        );
    }

    #[test]
    fn test_count_satisfies_numeric_ref() {
        let rules = vec![warn_above("w", "n", 1.0)];
        let result = evaluate(&rules, &Measurements::new().count("n", 2));
        assert_eq!(result.severity, Severity::Warning);
    }

    #[test]
    fn test_percent_rounding_and_zero_denominator() {
        assert_eq!(percent(1.0, 3.0), 33.3);
        assert_eq!(percent(80.0, 100.0), 80.0);

        let rules = vec![Rule::builder("pct", MeasurementRef::percent("cur", "max"))
            .greater_than(Some(50.0))
            .build()
            .unwrap()];
        let m = Measurements::new().count("cur", 1).count("max", 0);
        let result = evaluate(&rules, &m);
        assert_eq!(result.severity, Severity::Critical);
        assert_eq!(result.violations[0].message, "max is zero, cannot derive percentage");
    }

    #[test]
    fn test_length_ref() {
        let rules = vec![Rule::builder("min-images", MeasurementRef::length("image_names"))
            .less_than(Some(3.0))
            .message("{value} of {threshold}")
            .build()
            .unwrap()];
        let m = Measurements::new().names("image_names", ["a", "b"]);
        assert_eq!(evaluate(&rules, &m).violations[0].message, "2 of 3");
    }

    #[test]
    fn test_set_non_empty_one_violation_per_element() {
        let m = Measurements::new().names(
            "services_down",
            ["nova-compute service on n1", "nova-compute service on n2", "nova-cert service on n3"],
        );
        let result = evaluate(&[down_rule()], &m);

        assert_eq!(result.len(), 3);
        assert_eq!(result.severity, Severity::Critical);
        let messages: Vec<_> = result.messages().collect();
        assert_eq!(
            messages,
            [
                "nova-compute service on n1 is down",
                "nova-compute service on n2 is down",
                "nova-cert service on n3 is down",
            ]
        );
    }

    #[test]
    fn test_empty_set_is_ok() {
        let m = Measurements::new().names("services_down", Vec::<String>::new());
        assert!(evaluate(&[down_rule()], &m).is_ok());
    }

    #[test]
    fn test_not_present_per_missing_name() {
        let rule = Rule::builder("required", MeasurementRef::names("image_names"))
            .requires_names(["cirros", "ubuntu", "fedora"])
            .severity(Severity::Critical)
            .message("required image '{item}' not found")
            .build()
            .unwrap();
        let m = Measurements::new().names("image_names", ["ubuntu"]);
        let result = evaluate(&[rule], &m);

        assert_eq!(
            result.messages().collect::<Vec<_>>(),
            [
                "required image 'cirros' not found",
                "required image 'fedora' not found"
            ]
        );
    }

    #[test]
    fn test_not_present_on_presence() {
        let rule = Rule::builder("tenant-list", MeasurementRef::presence("tenants_listed"))
            .requires_presence(true)
            .severity(Severity::Critical)
            .message("Tenant list is empty")
            .build()
            .unwrap();
        let listed = Measurements::new().presence("tenants_listed", true);
        assert!(evaluate(&[rule.clone()], &listed).is_ok());
        let result = evaluate(&[rule], &Measurements::new().presence("tenants_listed", false));
        assert_eq!(result.violations[0].message, "Tenant list is empty");
    }

    #[test]
    fn test_escalation_only_touches_minimums() {
        let rules = vec![down_rule(), minimum("min-compute", "nova-compute.active", 4.0)];
        let m = Measurements::new()
            .names("services_down", ["nova-compute service on n1"])
            .count("nova-compute.active", 3);

        let plain = Engine::new().evaluate(&rules, &m);
        assert_eq!(plain.violations[0].severity, Severity::Critical);
        assert_eq!(plain.violations[1].severity, Severity::Warning);

        let escalated = Engine::new().escalate_minimums(true).evaluate(&rules, &m);
        assert_eq!(escalated.violations[0].severity, Severity::Critical);
        assert_eq!(escalated.violations[1].severity, Severity::Critical);
        assert_eq!(escalated.severity, Severity::Critical);
    }

    #[test]
    fn test_escalation_ignores_threshold_family() {
        let rules = vec![warn_above("w", "a", 1.0)];
        let m = Measurements::new().numeric("a", 2.0);
        let result = Engine::new().escalate_minimums(true).evaluate(&rules, &m);
        assert_eq!(result.severity, Severity::Warning);
    }

    #[test]
    fn test_rule_set_carries_escalation() -> Result<(), RuleError> {
        let set = RuleSet::new(vec![minimum("min-cert", "nova-cert.active", 1.0)])?
            .escalate_minimums(true);
        let result = set.evaluate(&Measurements::new().count("nova-cert.active", 0));
        assert_eq!(result.severity, Severity::Critical);
        Ok(())
    }
}
