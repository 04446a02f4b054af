//! # stackprobe
//!
//! Nagios/Sensu style health checks for MySQL and OpenStack services.
//!
//! Each check follows the same pipeline:
//!
//! ```text
//!  flags + config ──▶ rule set ──┐
//!                                ├──▶ engine ──▶ report ──▶ stdout + exit code
//!  collector ──▶ measurements ───┘
//! ```
//!
//! - **[`cli`]**: subcommands and flags
//! - **[`config`]**: connection settings layered from file, environment and flags
//! - **[`checks`]**: one runner per check kind
//! - **[`report`]**: summary line, per-problem lines and JSON output
//!
//! Rule evaluation lives in `stackprobe-engine`; network and database access
//! in `stackprobe-collectors`.

pub mod checks;
pub mod cli;
pub mod config;
pub mod duration;
pub mod logging;
pub mod report;

pub use checks::RunContext;
pub use cli::{Cli, Command, OutputFormat};
pub use config::{ConfigError, FileConfig};
pub use report::Report;
