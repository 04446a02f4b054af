//! Compute service (Nova) checks.
//!
//! Three condition classes are layered here:
//!
//! - services that are enabled but down: always critical, one line each
//! - services that are administratively disabled: warning, opt-in
//! - per-binary minimum counts of up and enabled services: warning, or
//!   critical when minimums are escalated
//!
//! Per-binary counts come from a single fold over the service list
//! ([`active_counts`]) so that the minimum rules only look values up.

use std::collections::BTreeMap;

use stackprobe_types::{Measurements, ServiceRecord, Severity};

use crate::rule::{MeasurementRef, Rule, RuleError, RuleFamily, RuleSet};

pub const SERVICES_DOWN: &str = "services_down";
pub const SERVICES_DISABLED: &str = "services_disabled";
pub const SERVICE_COUNT: &str = "service_count";
pub const FLAVOR_COUNT: &str = "flavor_count";

/// Monitored service binaries, in the order their minimum rules are declared.
pub const MONITORED_BINARIES: [&str; 5] = [
    "nova-compute",
    "nova-cert",
    "nova-consoleauth",
    "nova-conductor",
    "nova-scheduler",
];

/// Name of the per-binary active count measurement.
pub fn active_measurement(binary: &str) -> String {
    format!("{binary}.active")
}

/// Minimum up-and-enabled instances per binary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceMinimums {
    pub compute: Option<u64>,
    pub cert: Option<u64>,
    pub consoleauth: Option<u64>,
    pub conductor: Option<u64>,
    pub scheduler: Option<u64>,
}

impl ServiceMinimums {
    /// `(rule id, binary, minimum)` for every monitored binary.
    pub fn entries(&self) -> [(&'static str, &'static str, Option<u64>); 5] {
        [
            ("min-compute", MONITORED_BINARIES[0], self.compute),
            ("min-cert", MONITORED_BINARIES[1], self.cert),
            ("min-consoleauth", MONITORED_BINARIES[2], self.consoleauth),
            ("min-conductor", MONITORED_BINARIES[3], self.conductor),
            ("min-scheduler", MONITORED_BINARIES[4], self.scheduler),
        ]
    }

    pub fn any(&self) -> bool {
        self.entries().iter().any(|(_, _, min)| min.is_some())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComputeConfig {
    pub minimums: ServiceMinimums,
    /// Report minimum shortfalls as critical rather than warning.
    pub critical_mins: bool,
    /// Warn about administratively disabled services.
    pub warn_disabled: bool,
    /// Inspect the service list. Without it only the flavor listing is probed.
    pub check_services: bool,
}

pub fn rules(config: &ComputeConfig) -> Result<RuleSet, RuleError> {
    let mut rules = vec![
        Rule::builder("flavors", MeasurementRef::count(FLAVOR_COUNT))
            .less_than((!config.check_services).then_some(1.0))
            .severity(Severity::Warning)
            .message("failed to list flavors")
            .build()?,
        Rule::builder("services-down", MeasurementRef::names(SERVICES_DOWN))
            .set_non_empty(config.check_services)
            .severity(Severity::Critical)
            .message("{item} is down")
            .build()?,
    ];

    for (id, binary, minimum) in config.minimums.entries() {
        let minimum = minimum.filter(|_| config.check_services);
        rules.push(
            Rule::builder(id, MeasurementRef::count(active_measurement(binary)))
                .less_than(minimum.map(|n| n as f64))
                .severity(Severity::Warning)
                .family(RuleFamily::MinimumCount)
                .message(format!(
                    "{binary} service below threshold - {{value}} active / {{threshold}} minimum"
                ))
                .build()?,
        );
    }

    rules.push(
        Rule::builder("services-disabled", MeasurementRef::names(SERVICES_DISABLED))
            .set_non_empty(config.check_services && config.warn_disabled)
            .severity(Severity::Warning)
            .message("{item} and disabled")
            .build()?,
    );

    Ok(RuleSet::new(rules)?.escalate_minimums(config.critical_mins))
}

/// Count up-and-enabled instances per monitored binary in one pass.
/// Every monitored binary is present in the result, zero when absent.
pub fn active_counts(services: &[ServiceRecord]) -> BTreeMap<&'static str, u64> {
    let mut counts: BTreeMap<&'static str, u64> =
        MONITORED_BINARIES.iter().map(|b| (*b, 0)).collect();

    for service in services.iter().filter(|s| s.is_enabled() && s.is_up()) {
        if let Some(count) = MONITORED_BINARIES
            .iter()
            .find(|b| **b == service.binary)
            .and_then(|b| counts.get_mut(b))
        {
            *count += 1;
        }
    }
    counts
}

pub fn measurements(services: &[ServiceRecord]) -> Measurements {
    let mut down = Vec::new();
    let mut disabled = Vec::new();
    for s in services {
        if s.is_enabled() && !s.is_up() {
            down.push(format!("{} service on {}", s.binary, s.host));
        } else if !s.is_enabled() {
            disabled.push(format!("{} service on {} is {}", s.binary, s.host, s.state));
        }
    }

    let mut m = Measurements::new()
        .count(SERVICE_COUNT, services.len() as u64)
        .names(SERVICES_DOWN, down)
        .names(SERVICES_DISABLED, disabled);
    for (binary, count) in active_counts(services) {
        m = m.count(active_measurement(binary), count);
    }
    m
}

/// Measurements for the flavor probe used when no service checks run.
pub fn flavor_measurements(flavor_count: usize) -> Measurements {
    Measurements::new().count(FLAVOR_COUNT, flavor_count as u64)
}
