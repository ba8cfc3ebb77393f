//! vitals-core: shared types for page performance tracking.
//!
//! Defines the snapshot record every other crate reads and writes, the
//! threshold tables used for alerting and scoring, and the `TrackerConfig`
//! that drives a tracker run.

pub mod config;
pub mod error;
pub mod types;

pub use config::{ObserverPolicies, TrackerConfig};
pub use error::{ConfigError, ConfigResult};
pub use types::*;
