//! vitals-eval: everything downstream of a snapshot.
//!
//! Pure functions of a `MetricSnapshot`; nothing here touches the store.
//!
//! ```text
//! MetricSnapshot ─┬─ AlertEvaluator (merged thresholds) → Vec<AlertEvent>
//!                 └─ ScoreCalculator (fixed baseline)   → score → Feedback
//! ```
//!
//! Alerting uses the caller's merged thresholds while scoring always
//! uses the default baseline, so tuning alerts never moves the score.

pub mod alerts;
pub mod feedback;
pub mod score;

pub use alerts::AlertEvaluator;
pub use feedback::{Feedback, FeedbackTier, feedback};
pub use score::{MAX_SCORE, ScoreBreakdown, ScoreCalculator};
