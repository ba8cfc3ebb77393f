pub mod replay;
pub mod thresholds;
