//! Nova API reachability and compute service health.

use stackprobe_collectors::openstack::{NovaClient, ServiceFilter};
use stackprobe_engine::rulesets::compute::{self, ComputeConfig, ServiceMinimums};
use stackprobe_types::{EvaluationResult, ServiceRecord};

use super::{authenticate, CollectFailure, RunContext};
use crate::cli::NovaArgs;
use crate::config::ConfigError;
use crate::report::Report;

pub const PREFIX: &str = "Nova API";

pub fn compute_config(args: &NovaArgs) -> ComputeConfig {
    let minimums = ServiceMinimums {
        compute: args.min_compute,
        cert: args.min_cert,
        consoleauth: args.min_consoleauth,
        conductor: args.min_conductor,
        scheduler: args.min_scheduler,
    };
    // Any service-related flag switches from the flavor probe to the
    // service listing.
    let check_services =
        args.host.is_some() || args.binary.is_some() || args.warn_disabled || minimums.any();

    ComputeConfig {
        minimums,
        critical_mins: args.critical_mins,
        warn_disabled: args.warn_disabled,
        check_services,
    }
}

/// "services T total / D down / X disabled[ / B below minimum threshold]"
pub fn service_summary(services: &[ServiceRecord], result: &EvaluationResult) -> String {
    let down = services.iter().filter(|s| s.is_enabled() && !s.is_up()).count();
    let disabled = services.iter().filter(|s| !s.is_enabled()).count();
    let mut summary = format!(
        "services {} total / {down} down / {disabled} disabled",
        services.len()
    );
    let below = result.count_rule_prefix("min-");
    if below > 0 {
        summary.push_str(&format!(" / {below} below minimum threshold"));
    }
    summary
}

pub async fn run(args: &NovaArgs, ctx: &RunContext) -> Result<Report, ConfigError> {
    let config = compute_config(args);
    let rules = compute::rules(&config)?;
    let settings = ctx.file.openstack(&args.auth)?;

    let session = match authenticate(&settings, ctx.timeout).await {
        Ok(session) => session,
        Err(failure) => return Ok(failure.into_report(PREFIX)),
    };
    let client = match NovaClient::new(&session, args.nova_url.as_deref()) {
        Ok(client) => client,
        Err(e) => return Ok(CollectFailure::new("Nova", e).into_report(PREFIX)),
    };
    let host = client.management_host();

    if !config.check_services {
        let flavors = match client.flavor_count().await {
            Ok(n) => n,
            Err(e) => return Ok(CollectFailure::new("Nova", e).into_report(PREFIX)),
        };
        tracing::debug!(flavors, endpoint = client.endpoint(), "listed flavors");

        let result = rules.evaluate(&compute::flavor_measurements(flavors));
        return Ok(Report::new(PREFIX, result)
            .ok_summary("connection ok")
            .context(host));
    }

    let filter = ServiceFilter {
        host: args.host.clone(),
        binary: args.binary.clone(),
    };
    let services = match client.list_services(&filter).await {
        Ok(services) => services,
        Err(e) => return Ok(CollectFailure::new("Nova", e).into_report(PREFIX)),
    };
    tracing::debug!(services = services.len(), "listed compute services");

    let result = rules.evaluate(&compute::measurements(&services));
    let summary = service_summary(&services, &result);
    Ok(Report::new(PREFIX, result)
        .ok_summary(summary.clone())
        .detail(summary)
        .context(host))
}
