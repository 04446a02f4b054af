//! # stackprobe-engine
//!
//! Threshold evaluation and severity aggregation for health checks.
//!
//! The engine is a pure function of a rule list and a measurement set. It
//! knows nothing about how measurements were collected, only how to judge
//! them:
//!
//! - a rule without a threshold is inactive and skipped
//! - a missing measurement is a critical violation of the rule that needed it
//! - the overall severity is the worst violation (critical > warning > ok)
//! - violations keep rule declaration order
//!
//! ## Example
//!
//! ```rust
//! use stackprobe_engine::rulesets::connections::{self, ConnectionThresholds};
//! use stackprobe_types::{ConnectionStats, Severity};
//!
//! let rules = connections::rules(&ConnectionThresholds {
//!     warn_current: Some(70.0),
//!     crit_current: Some(90.0),
//!     ..Default::default()
//! })?;
//!
//! let stats = ConnectionStats { current: 80, max_used: 95, max_available: 100 };
//! let result = rules.evaluate(&connections::measurements(&stats));
//!
//! assert_eq!(result.severity, Severity::Warning);
//! assert_eq!(
//!     result.violations[0].message,
//!     "current connections exceed warning threshold of 70%"
//! );
//! # Ok::<(), stackprobe_engine::RuleError>(())
//! ```

mod evaluate;
mod rule;
mod template;

pub mod rulesets;

pub use evaluate::{evaluate, percent, Engine};
pub use rule::{
    Comparator, MeasurementRef, Rule, RuleBuilder, RuleError, RuleFamily, RuleSet, Threshold,
};
pub use template::{format_number, MessageContext, MessageTemplate};

// Re-export types for convenience
pub use stackprobe_types::{EvaluationResult, Measurements, Severity, Violation};
