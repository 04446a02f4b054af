//! Rule sets for each check kind.
//!
//! Every module pairs a pure builder (configuration record to [`RuleSet`])
//! with a pure fold from raw collector records to [`Measurements`]. Neither
//! side performs I/O.
//!
//! [`RuleSet`]: crate::RuleSet
//! [`Measurements`]: stackprobe_types::Measurements

pub mod compute;
pub mod connections;
pub mod identity;
pub mod images;
