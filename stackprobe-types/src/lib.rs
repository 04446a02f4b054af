//! # stackprobe-types
//!
//! Core types shared by stackprobe collectors, the evaluation engine and the
//! reporter. A collector turns a backing system into [`Measurements`], the
//! engine judges them into an [`EvaluationResult`], and the reporter renders
//! a [`CheckOutcome`] into a summary line and an exit code.
//!
//! ## Features
//!
//! - `serde`: serialization of measurements, results and raw records
//!
//! ## Example
//!
//! ```rust
//! use stackprobe_types::{MeasurementKind, Measurements, Severity};
//!
//! let measurements = Measurements::new()
//!     .count("current_connections", 80)
//!     .count("max_connections", 100)
//!     .names("services_down", vec!["nova-compute service on node-3".to_string()]);
//!
//! assert_eq!(measurements.len(), 3);
//! assert_eq!(
//!     measurements.get("services_down").map(|v| v.kind()),
//!     Some(MeasurementKind::ListOfNames)
//! );
//! assert!(Severity::Critical > Severity::Warning);
//! ```

mod measurement;
mod records;
mod result;
mod severity;

pub use measurement::*;
pub use records::*;
pub use result::*;
pub use severity::*;
