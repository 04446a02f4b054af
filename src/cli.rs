//! Command-line surface: one subcommand per check kind.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::checks;

#[derive(Parser, Debug)]
#[command(name = "stackprobe")]
#[command(about = "Nagios/Sensu style health checks for MySQL and OpenStack services")]
#[command(version)]
pub struct Cli {
    /// Config file with connection defaults (TOML, YAML or JSON)
    #[arg(long, global = true, env = "STACKPROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Overall collection timeout (e.g., "10s", "500ms")
    #[arg(long, global = true, default_value = "10s")]
    pub timeout: String,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Enable debug logging on stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Summary line plus one line per problem
    Text,
    /// The full outcome as JSON
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check MySQL connection usage against max_connections
    MysqlConnections(MysqlArgs),
    /// Check Keystone token latency and service catalog
    Keystone(KeystoneArgs),
    /// Check Glance API and image catalog
    Glance(GlanceArgs),
    /// Check Nova API and compute service status
    Nova(NovaArgs),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::MysqlConnections(_) => "mysql-connections",
            Command::Keystone(_) => "keystone",
            Command::Glance(_) => "glance",
            Command::Nova(_) => "nova",
        }
    }

    /// Label leading the check's output line.
    pub fn prefix(&self) -> &'static str {
        match self {
            Command::MysqlConnections(_) => checks::mysql::PREFIX,
            Command::Keystone(_) => checks::keystone::PREFIX,
            Command::Glance(_) => checks::glance::PREFIX,
            Command::Nova(_) => checks::nova::PREFIX,
        }
    }
}

/// Keystone credentials shared by the OpenStack checks.
#[derive(Args, Debug, Clone, Default)]
pub struct AuthArgs {
    /// Keystone URL
    #[arg(long = "auth-url", alias = "auth_url", value_name = "URL")]
    pub auth_url: Option<String>,

    /// Username for authentication
    #[arg(long, value_name = "USER")]
    pub username: Option<String>,

    /// Password for authentication
    #[arg(long, value_name = "PASS")]
    pub password: Option<String>,

    /// Tenant name for authentication
    #[arg(long, value_name = "TENANT")]
    pub tenant: Option<String>,

    /// Region to select endpoints from
    #[arg(long = "region-name", alias = "region_name", value_name = "REGION")]
    pub region_name: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct MysqlArgs {
    /// Host to connect to (default: localhost)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to connect to (default: 3306)
    #[arg(long)]
    pub port: Option<u16>,

    /// Username for authentication
    #[arg(long)]
    pub username: Option<String>,

    /// Password for authentication
    #[arg(long)]
    pub password: Option<String>,

    /// Current connections percent of max available for warning
    #[arg(long, value_name = "NUM")]
    pub warn_current: Option<f64>,

    /// Current connections percent of max available for critical
    #[arg(long, value_name = "NUM")]
    pub crit_current: Option<f64>,

    /// Max used connections percent of max available for warning
    #[arg(long, value_name = "NUM")]
    pub warn_max: Option<f64>,

    /// Max used connections percent of max available for critical
    #[arg(long, value_name = "NUM")]
    pub crit_max: Option<f64>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct KeystoneArgs {
    #[command(flatten)]
    pub auth: AuthArgs,

    /// Don't list tenants (use when the user is not an admin)
    #[arg(long)]
    pub no_admin: bool,

    /// Seconds for auth delay to trigger warning
    #[arg(long, value_name = "SECONDS")]
    pub warn_time: Option<f64>,

    /// Seconds for auth delay to trigger critical
    #[arg(long, value_name = "SECONDS")]
    pub critical_time: Option<f64>,

    /// Service types that must be in the catalog (default: all listed)
    #[arg(value_name = "SERVICE")]
    pub services: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlanceArgs {
    #[command(flatten)]
    pub auth: AuthArgs,

    /// Glance endpoint URL (defaults to the catalog public URL)
    #[arg(long, value_name = "URL")]
    pub glance_url: Option<String>,

    /// Minimum number of images
    #[arg(long, value_name = "NUM")]
    pub req_count: Option<u64>,

    /// Minimum number of public images
    #[arg(long, value_name = "NUM")]
    pub req_public: Option<u64>,

    /// Name(s) of required images
    #[arg(long, value_name = "NAME", num_args = 1..)]
    pub req_images: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct NovaArgs {
    #[command(flatten)]
    pub auth: AuthArgs,

    /// Nova endpoint URL (defaults to the catalog public URL)
    #[arg(long, value_name = "URL")]
    pub nova_url: Option<String>,

    /// Filter service status by hostname
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Filter service status by service binary name
    #[arg(long, value_name = "BINARY")]
    pub binary: Option<String>,

    /// Minimum nova-compute services up and enabled
    #[arg(long, value_name = "NUM")]
    pub min_compute: Option<u64>,

    /// Minimum nova-cert services up and enabled
    #[arg(long, value_name = "NUM")]
    pub min_cert: Option<u64>,

    /// Minimum nova-conductor services up and enabled
    #[arg(long, value_name = "NUM")]
    pub min_conductor: Option<u64>,

    /// Minimum nova-scheduler services up and enabled
    #[arg(long, value_name = "NUM")]
    pub min_scheduler: Option<u64>,

    /// Minimum nova-consoleauth services up and enabled
    #[arg(long, value_name = "NUM")]
    pub min_consoleauth: Option<u64>,

    /// Exit critical rather than warning if minimums are not met
    #[arg(long)]
    pub critical_mins: bool,

    /// Warn if any nova services are administratively disabled
    #[arg(long)]
    pub warn_disabled: bool,
}
