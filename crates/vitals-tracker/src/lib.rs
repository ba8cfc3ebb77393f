//! vitals-tracker: one page session, end to end.
//!
//! # Architecture
//!
//! ```text
//! PerformanceTracker (owns the session's MetricsStore)
//!   ├── collect()            → Collector → MetricSnapshot
//!   ├── track_*()            → one source, awaited directly
//!   ├── track_component_render() / render_timer()
//!   ├── check_alerts()       → AlertEvaluator (merged thresholds)
//!   ├── score()              → ScoreCalculator (default baseline)
//!   └── run(&TrackerConfig)  → RunReport
//!         collect? → alerts? → score + feedback?
//! ```
//!
//! The tracker is the only place that ties a store to an environment.
//! Everything downstream of the snapshot is a pure function.

pub mod report;
pub mod tracker;

pub use report::RunReport;
pub use tracker::PerformanceTracker;
