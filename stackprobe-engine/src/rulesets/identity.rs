//! Identity service (Keystone) checks: catalog completeness, token latency
//! and the tenant listing probe.

use stackprobe_types::{Measurements, ServiceCatalog, Severity};

use crate::rule::{MeasurementRef, Rule, RuleError, RuleSet};

pub const CATALOG_SERVICES: &str = "catalog_services";
pub const EMPTY_SERVICES: &str = "empty_services";
pub const NO_PUBLIC_URL: &str = "services_without_public_url";
pub const TOKEN_SECONDS: &str = "token_seconds";
pub const TENANTS_LISTED: &str = "tenants_listed";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentityConfig {
    /// Service types that must be in the catalog. Empty means "whatever the
    /// catalog lists".
    pub services: Vec<String>,
    pub warn_time: Option<f64>,
    pub critical_time: Option<f64>,
    /// Require a non-empty tenant list (needs admin rights).
    pub check_tenants: bool,
}

pub fn rules(config: &IdentityConfig) -> Result<RuleSet, RuleError> {
    let mut rules = vec![
        Rule::builder("token-latency:critical", MeasurementRef::numeric(TOKEN_SECONDS))
            .greater_than(config.critical_time)
            .severity(Severity::Critical)
            .message("Received token in {value}s, exceeded critical threshold of {threshold}s")
            .build()?,
        Rule::builder("tenant-list", MeasurementRef::presence(TENANTS_LISTED))
            .requires_presence(config.check_tenants)
            .severity(Severity::Critical)
            .message("Tenant list is empty")
            .build()?,
        Rule::builder("token-latency:warning", MeasurementRef::numeric(TOKEN_SECONDS))
            .greater_than(config.warn_time)
            .severity(Severity::Warning)
            .message("Received token in {value}s, exceeded warning threshold of {threshold}s")
            .build()?,
    ];

    let mut seen: Vec<&str> = Vec::new();
    for service in &config.services {
        if seen.contains(&service.as_str()) {
            continue;
        }
        seen.push(service);
        rules.push(
            Rule::builder(
                format!("service-present:{service}"),
                MeasurementRef::names(CATALOG_SERVICES),
            )
            .requires_names([service.as_str()])
            .severity(Severity::Warning)
            .message("'{item}' service is missing")
            .build()?,
        );
    }

    rules.push(
        Rule::builder("empty-services", MeasurementRef::names(EMPTY_SERVICES))
            .set_non_empty(true)
            .severity(Severity::Warning)
            .message("{item} service is empty")
            .build()?,
    );
    rules.push(
        Rule::builder("no-public-url", MeasurementRef::names(NO_PUBLIC_URL))
            .set_non_empty(true)
            .severity(Severity::Warning)
            .message("{item} service has no publicURL")
            .build()?,
    );

    RuleSet::new(rules)
}

/// Fold the catalog into measurements.
///
/// Only `requested` service types are inspected for endpoints; when none
/// are requested every catalog type is. Types missing from the catalog are
/// left to the presence rules and never counted as empty.
pub fn measurements(
    catalog: &ServiceCatalog,
    requested: &[String],
    token_seconds: f64,
    tenants_listed: Option<bool>,
) -> Measurements {
    let inspected: Vec<&str> = if requested.is_empty() {
        catalog.service_types().collect()
    } else {
        requested.iter().map(String::as_str).collect()
    };

    let mut empty = Vec::new();
    let mut no_public = Vec::new();
    for service in inspected {
        let Some(endpoints) = catalog.endpoints(service) else {
            continue;
        };
        if empty.contains(&service) || no_public.contains(&service) {
            continue;
        }
        if endpoints.is_empty() {
            empty.push(service);
        } else if !endpoints.iter().any(|e| e.public_url.is_some()) {
            no_public.push(service);
        }
    }

    let mut m = Measurements::new()
        .names(CATALOG_SERVICES, catalog.service_types())
        .names(EMPTY_SERVICES, empty)
        .names(NO_PUBLIC_URL, no_public)
        .numeric(TOKEN_SECONDS, token_seconds);
    if let Some(listed) = tenants_listed {
        m = m.presence(TENANTS_LISTED, listed);
    }
    m
}
