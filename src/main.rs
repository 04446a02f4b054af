use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use stackprobe::{checks, config, logging, Cli, FileConfig, OutputFormat, RunContext};
use stackprobe_types::Severity;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                exit(Severity::Unknown)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    logging::init(cli.debug);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "check aborted");
            println!("{}", unknown_line(cli.command.prefix(), &e));
            exit(Severity::Unknown)
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let ctx = RunContext {
        timeout: config::parse_timeout(&cli.timeout)?,
        file: FileConfig::load(cli.config.as_deref())?,
    };

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let report = runtime.block_on(checks::run(&cli.command, &ctx))?;

    match cli.format {
        OutputFormat::Text => println!("{}", report.render_text()),
        OutputFormat::Json => println!("{}", report.render_json()?),
    }
    Ok(exit(report.severity()))
}

fn exit(severity: Severity) -> ExitCode {
    ExitCode::from(severity.exit_code() as u8)
}

fn unknown_line(prefix: &str, err: &anyhow::Error) -> String {
    format!("{prefix} {}: {err:#}", Severity::Unknown.label())
}
