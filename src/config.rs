//! Connection settings layered from an optional file, the environment and
//! command-line flags (highest precedence last).
//!
//! ```toml
//! [mysql]
//! host = "db1"
//! username = "monitor"
//! password = "secret"
//!
//! [openstack]
//! auth_url = "http://keystone:5000/v2.0"
//! username = "admin"
//! password = "secret"
//! tenant = "admin"
//! region_name = "RegionOne"
//! ```
//!
//! Every key can also be set as `STACKPROBE_<SECTION>__<KEY>`, e.g.
//! `STACKPROBE_OPENSTACK__PASSWORD`.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;

use stackprobe_engine::RuleError;

use crate::cli::{AuthArgs, MysqlArgs};

const ENV_PREFIX: &str = "STACKPROBE";

/// Problems that stop a check before anything is collected. All of them
/// map to the Unknown exit code.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),

    #[error("invalid rule: {0}")]
    Rule(#[from] RuleError),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub mysql: MysqlSection,
    pub openstack: OpenStackSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MysqlSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OpenStackSection {
    pub auth_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub tenant: Option<String>,
    pub region_name: Option<String>,
}

impl FileConfig {
    /// Load from `path` (if any) and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, None)
    }

    /// Like [`FileConfig::load`], reading environment variables from `env`
    /// instead of the process when given.
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .source(env),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Resolve MySQL connection settings. Flags win over file and environment.
    pub fn mysql(&self, args: &MysqlArgs) -> Result<MysqlSettings, ConfigError> {
        let file = &self.mysql;
        Ok(MysqlSettings {
            host: pick(&args.host, &file.host).unwrap_or_else(|| "localhost".to_string()),
            port: args.port.or(file.port).unwrap_or(3306),
            username: pick(&args.username, &file.username).ok_or(ConfigError::Missing("username"))?,
            password: pick(&args.password, &file.password).ok_or(ConfigError::Missing("password"))?,
        })
    }

    /// Resolve Keystone credentials. Flags win over file and environment.
    pub fn openstack(&self, args: &AuthArgs) -> Result<OpenStackSettings, ConfigError> {
        let file = &self.openstack;
        Ok(OpenStackSettings {
            auth_url: pick(&args.auth_url, &file.auth_url).ok_or(ConfigError::Missing("auth_url"))?,
            username: pick(&args.username, &file.username).ok_or(ConfigError::Missing("username"))?,
            password: pick(&args.password, &file.password).ok_or(ConfigError::Missing("password"))?,
            tenant: pick(&args.tenant, &file.tenant).ok_or(ConfigError::Missing("tenant"))?,
            region_name: pick(&args.region_name, &file.region_name),
        })
    }
}

fn pick(flag: &Option<String>, file: &Option<String>) -> Option<String> {
    flag.as_ref().or(file.as_ref()).cloned()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MysqlSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenStackSettings {
    pub auth_url: String,
    pub username: String,
    pub password: String,
    pub tenant: String,
    pub region_name: Option<String>,
}

/// Parse the `--timeout` flag.
pub fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    crate::duration::parse_duration(value).map_err(|e| ConfigError::InvalidTimeout(e.to_string()))
}
