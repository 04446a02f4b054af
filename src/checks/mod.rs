//! Check runners: build rules, collect once, evaluate once.
//!
//! Rules are built before anything touches the network so a bad rule
//! configuration is reported as a configuration error, never as a
//! collection failure.

pub mod glance;
pub mod keystone;
pub mod mysql;
pub mod nova;

use std::time::Duration;

use thiserror::Error;

use stackprobe_collectors::openstack::{KeystoneClient, Session};
use stackprobe_collectors::CollectError;

use crate::cli::Command;
use crate::config::{ConfigError, FileConfig, OpenStackSettings};
use crate::report::Report;

/// Settings shared by every check in one invocation.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub timeout: Duration,
    pub file: FileConfig,
}

/// A collection error tagged with the system that produced it.
#[derive(Debug, Error)]
#[error("{stage} Error: {source}")]
pub struct CollectFailure {
    stage: &'static str,
    #[source]
    source: CollectError,
}

impl CollectFailure {
    pub fn new(stage: &'static str, source: CollectError) -> Self {
        Self { stage, source }
    }

    /// Log the failure and turn it into a critical report.
    pub fn into_report(self, prefix: &'static str) -> Report {
        tracing::warn!(stage = self.stage, error = %self.source, "collection failed");
        Report::failed(prefix, self.to_string())
    }
}

/// Run the selected check.
pub async fn run(command: &Command, ctx: &RunContext) -> Result<Report, ConfigError> {
    tracing::debug!(check = command.name(), timeout = ?ctx.timeout, "running check");
    match command {
        Command::MysqlConnections(args) => mysql::run(args, ctx).await,
        Command::Keystone(args) => keystone::run(args, ctx).await,
        Command::Glance(args) => glance::run(args, ctx).await,
        Command::Nova(args) => nova::run(args, ctx).await,
    }
}

/// Authenticate against Keystone with the resolved credentials.
async fn authenticate(
    settings: &OpenStackSettings,
    timeout: Duration,
) -> Result<Session, CollectFailure> {
    KeystoneClient::builder()
        .auth_url(&settings.auth_url)
        .credentials(&settings.username, &settings.password)
        .tenant(&settings.tenant)
        .region(settings.region_name.clone())
        .timeout(timeout)
        .build()
        .map_err(|e| CollectFailure::new("Keystone", e))?
        .authenticate()
        .await
        .map_err(|e| CollectFailure::new("Keystone", e))
}
