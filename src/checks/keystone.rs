//! Keystone token latency and service catalog.

use stackprobe_engine::format_number;
use stackprobe_engine::rulesets::identity::{self, IdentityConfig};

use super::{authenticate, CollectFailure, RunContext};
use crate::cli::KeystoneArgs;
use crate::config::ConfigError;
use crate::report::Report;

pub const PREFIX: &str = "Keystone";

pub fn identity_config(args: &KeystoneArgs) -> IdentityConfig {
    IdentityConfig {
        services: args.services.clone(),
        warn_time: args.warn_time,
        critical_time: args.critical_time,
        check_tenants: !args.no_admin,
    }
}

/// Token latency in seconds, to millisecond precision.
fn latency_seconds(elapsed: std::time::Duration) -> f64 {
    (elapsed.as_secs_f64() * 1000.0).round() / 1000.0
}

pub async fn run(args: &KeystoneArgs, ctx: &RunContext) -> Result<Report, ConfigError> {
    let config = identity_config(args);
    let rules = identity::rules(&config)?;
    let settings = ctx.file.openstack(&args.auth)?;

    let session = match authenticate(&settings, ctx.timeout).await {
        Ok(session) => session,
        Err(failure) => return Ok(failure.into_report(PREFIX)),
    };
    let token_seconds = latency_seconds(session.elapsed());

    let tenants_listed = if config.check_tenants {
        match session.tenant_count().await {
            Ok(count) => Some(count > 0),
            Err(e) => return Ok(CollectFailure::new("Keystone", e).into_report(PREFIX)),
        }
    } else {
        None
    };

    let measurements = identity::measurements(
        session.catalog(),
        &config.services,
        token_seconds,
        tenants_listed,
    );
    tracing::debug!(services = session.catalog().len(), token_seconds, "catalog received");

    let result = rules.evaluate(&measurements);
    Ok(Report::new(PREFIX, result)
        .ok_summary(format!("Received token in {} seconds", format_number(token_seconds)))
        .context(settings.auth_url))
}
