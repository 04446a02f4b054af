//! Glance API reachability and image catalog requirements.

use stackprobe_collectors::openstack::{normalize_endpoint, GlanceClient};
use stackprobe_engine::rulesets::images::{self, ImageRequirements};
use stackprobe_engine::EvaluationResult;
use stackprobe_types::ImageRecord;

use super::{authenticate, CollectFailure, RunContext};
use crate::cli::GlanceArgs;
use crate::config::ConfigError;
use crate::report::Report;

pub const PREFIX: &str = "Glance";

pub fn requirements(args: &GlanceArgs) -> ImageRequirements {
    ImageRequirements {
        min_images: args.req_count,
        min_public: args.req_public,
        required: args.req_images.clone(),
    }
}

fn found_summary(endpoint: &str, images: &[ImageRecord]) -> String {
    let public = images.iter().filter(|i| i.is_public()).count();
    format!(
        "connection OK to {endpoint}: found {} images ({public} public)",
        images.len()
    )
}

pub async fn run(args: &GlanceArgs, ctx: &RunContext) -> Result<Report, ConfigError> {
    let req = requirements(args);
    let rules = images::rules(&req)?;
    let settings = ctx.file.openstack(&args.auth)?;

    let session = match authenticate(&settings, ctx.timeout).await {
        Ok(session) => session,
        Err(failure) => return Ok(failure.into_report(PREFIX)),
    };

    let override_url = args.glance_url.as_deref().map(normalize_endpoint);
    let client = match GlanceClient::new(&session, override_url.as_deref()) {
        Ok(client) => client,
        Err(e) => return Ok(CollectFailure::new("Keystone", e).into_report(PREFIX)),
    };
    let endpoint = client.endpoint().to_string();

    if !req.needs_listing() {
        return Ok(Report::new(PREFIX, EvaluationResult::ok())
            .ok_summary(format!("API connection OK to {endpoint}")));
    }

    let listed = match client.list_images().await {
        Ok(listed) => listed,
        Err(e) => return Ok(CollectFailure::new("Glance", e).into_report(PREFIX)),
    };
    tracing::debug!(images = listed.len(), %endpoint, "listed images");

    let result = rules.evaluate(&images::measurements(&listed));
    Ok(Report::new(PREFIX, result)
        .ok_summary(found_summary(&endpoint, &listed))
        .context(endpoint))
}
