//! MySQL connection usage.

use stackprobe_collectors::mysql::MySqlCollector;
use stackprobe_engine::rulesets::connections::{self, ConnectionThresholds};

use super::{CollectFailure, RunContext};
use crate::cli::MysqlArgs;
use crate::config::ConfigError;
use crate::report::Report;

pub const PREFIX: &str = "MySQL";

pub fn thresholds(args: &MysqlArgs) -> ConnectionThresholds {
    ConnectionThresholds {
        warn_current: args.warn_current,
        crit_current: args.crit_current,
        warn_max: args.warn_max,
        crit_max: args.crit_max,
    }
}

pub async fn run(args: &MysqlArgs, ctx: &RunContext) -> Result<Report, ConfigError> {
    let rules = connections::rules(&thresholds(args))?;
    let settings = ctx.file.mysql(args)?;

    let collector = MySqlCollector::builder()
        .host(&settings.host)
        .port(settings.port)
        .credentials(&settings.username, &settings.password)
        .timeout(ctx.timeout)
        .build();

    let stats = match collector.collect().await {
        Ok(stats) => stats,
        Err(e) => return Ok(CollectFailure::new("MySQL", e).into_report(PREFIX)),
    };
    tracing::debug!(?stats, "collected connection counters");

    let result = rules.evaluate(&connections::measurements(&stats));
    Ok(Report::new(PREFIX, result)
        .ok_summary("is alive")
        .perfdata(connections::summary(&stats)))
}
