//! # stackprobe-collectors
//!
//! Collectors that query a backing system once and hand raw records to the
//! evaluation engine.
//!
//! ## Supported Systems
//!
//! - **MySQL** (`mysql` feature) - connection counters from global status
//!   and server variables
//! - **OpenStack** (`openstack` feature) - Keystone v2.0 token and service
//!   catalog, Glance v2 image listing, Nova service and flavor listings
//!
//! Collectors never retry. A failed request is returned as a
//! [`CollectError`] and the caller reports it as a collection failure.
//!
//! ## Quick Start (Keystone)
//!
//! ```rust,no_run
//! use stackprobe_collectors::openstack::KeystoneClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let keystone = KeystoneClient::builder()
//!         .auth_url("http://keystone:5000/v2.0")
//!         .credentials("admin", "secret")
//!         .tenant("admin")
//!         .build()?;
//!
//!     let session = keystone.authenticate().await?;
//!     println!("token issued in {:?}", session.elapsed());
//!     Ok(())
//! }
//! ```

pub mod error;

#[cfg(feature = "mysql")]
pub mod mysql;

#[cfg(feature = "openstack")]
pub mod openstack;

pub use error::CollectError;

// Re-export types for convenience
pub use stackprobe_types::{ConnectionStats, ImageRecord, ServiceCatalog, ServiceRecord};
