//! vitals-collector: turns independent metric sources into one snapshot.
//!
//! # Architecture
//!
//! ```text
//! Collector::collect()
//!   ├── start every automatic source in the same turn
//!   ├── JoinSet fan-in, bounded by the collect timeout
//!   │   ├── Observed / Unsupported / ChannelClosed → CollectReport
//!   │   └── continuation → observer registry (one task per signal)
//!   └── timeout → abort stalled sources, return the partial snapshot
//! ```
//!
//! Collection never fails. A source that never settles only leaves its
//! field unset.

pub mod collector;

pub use collector::{CollectReport, Collector};
