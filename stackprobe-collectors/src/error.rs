//! Error types for collectors.

use thiserror::Error;

/// Errors that can occur while collecting measurements.
///
/// Any of these ends the run as a collection failure: rules are not
/// evaluated.
#[derive(Debug, Error)]
pub enum CollectError {
    /// HTTP request failed or returned an unexpected status.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Failed to parse a response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Authentication was rejected.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// A database query failed or returned nothing.
    #[error("Query failed: {0}")]
    Query(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// The service catalog does not provide a required endpoint.
    #[error("Service catalog error: {0}")]
    Catalog(String),
}

#[cfg(feature = "openstack")]
impl From<reqwest::Error> for CollectError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CollectError::Timeout
        } else if err.is_connect() {
            CollectError::Connection(err.to_string())
        } else if err.is_decode() {
            CollectError::Parse(err.to_string())
        } else {
            CollectError::Http(err.to_string())
        }
    }
}

#[cfg(feature = "mysql")]
impl From<sqlx::Error> for CollectError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(e) => CollectError::Connection(e.to_string()),
            sqlx::Error::Tls(e) => CollectError::Connection(e.to_string()),
            sqlx::Error::PoolTimedOut => CollectError::Timeout,
            sqlx::Error::Database(db) if db.code().as_deref() == Some("28000") => {
                CollectError::Auth(db.message().to_string())
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                CollectError::Parse(err.to_string())
            }
            other => CollectError::Query(other.to_string()),
        }
    }
}
