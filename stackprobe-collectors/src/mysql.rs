//! MySQL connection counters.
//!
//! Reads three values over a single connection:
//!
//! - `Threads_connected` (global status)
//! - `Max_used_connections` (global status)
//! - `max_connections` (server variable)
//!
//! ## Example
//!
//! ```rust,no_run
//! use stackprobe_collectors::mysql::MySqlCollector;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let collector = MySqlCollector::builder()
//!         .host("db.local")
//!         .credentials("monitor", "secret")
//!         .build();
//!
//!     let stats = collector.collect().await?;
//!     println!("{} of {} connections in use", stats.current, stats.max_available);
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions, Connection};

use stackprobe_types::ConnectionStats;

use crate::CollectError;

const CURRENT_QUERY: &str = "SHOW GLOBAL STATUS LIKE 'Threads_connected'";
const MAX_USED_QUERY: &str = "SHOW GLOBAL STATUS LIKE 'max_used_connections'";
const MAX_AVAILABLE_QUERY: &str = "SHOW VARIABLES LIKE 'max_connections'";

/// Collector for MySQL connection usage.
#[derive(Debug, Clone)]
pub struct MySqlCollector {
    host: String,
    port: u16,
    username: String,
    password: String,
    timeout: Duration,
}

impl MySqlCollector {
    /// Create a new builder for configuring the collector.
    pub fn builder() -> MySqlCollectorBuilder {
        MySqlCollectorBuilder::default()
    }

    /// Connect once and read the connection counters.
    pub async fn collect(&self) -> Result<ConnectionStats, CollectError> {
        tokio::time::timeout(self.timeout, self.collect_inner())
            .await
            .map_err(|_| CollectError::Timeout)?
    }

    async fn collect_inner(&self) -> Result<ConnectionStats, CollectError> {
        tracing::debug!(host = %self.host, port = self.port, "connecting to mysql");
        let mut conn = self.options().connect().await?;

        let current = read_counter(&mut conn, CURRENT_QUERY).await?;
        let max_used = read_counter(&mut conn, MAX_USED_QUERY).await?;
        let max_available = read_counter(&mut conn, MAX_AVAILABLE_QUERY).await?;

        if let Err(e) = conn.close().await {
            tracing::debug!(error = %e, "error closing mysql connection");
        }

        Ok(ConnectionStats {
            current,
            max_used,
            max_available,
        })
    }

    fn options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
    }
}

async fn read_counter(conn: &mut MySqlConnection, query: &str) -> Result<u64, CollectError> {
    let row: Option<(String, String)> = sqlx::query_as(query).fetch_optional(&mut *conn).await?;
    let (name, value) =
        row.ok_or_else(|| CollectError::Query(format!("'{query}' returned no rows")))?;
    tracing::debug!(%name, %value, "read mysql counter");
    parse_counter(&name, &value)
}

fn parse_counter(name: &str, value: &str) -> Result<u64, CollectError> {
    value
        .trim()
        .parse()
        .map_err(|_| CollectError::Parse(format!("{name} is not a number: '{value}'")))
}

/// Builder for MySqlCollector.
#[derive(Debug, Default)]
pub struct MySqlCollectorBuilder {
    host: Option<String>,
    port: Option<u16>,
    username: Option<String>,
    password: Option<String>,
    timeout: Option<Duration>,
}

impl MySqlCollectorBuilder {
    /// Set the server host (default: "localhost").
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the server port (default: 3306).
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the username and password for authentication.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the overall connect and query timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the collector.
    pub fn build(self) -> MySqlCollector {
        MySqlCollector {
            host: self.host.unwrap_or_else(|| "localhost".to_string()),
            port: self.port.unwrap_or(3306),
            username: self.username.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
            timeout: self.timeout.unwrap_or(Duration::from_secs(10)),
        }
    }
}
