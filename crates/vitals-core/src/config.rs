//! Tracker configuration (`vitals.toml`).
//!
//! Every option has a default, so an empty file is a valid config:
//!
//! ```toml
//! track_metrics = true
//! show_alerts = true
//! enable_gamification = true
//! collect_timeout = "10s"
//!
//! [thresholds]
//! fcp = 1800.0
//!
//! [observers]
//! cumulative_layout_shift = "keep_observing"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::types::{StopPolicy, ThresholdConfig, ThresholdOverrides};

const DEFAULT_COLLECT_TIMEOUT: &str = "10s";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    /// Run a full collection pass before evaluating.
    pub track_metrics: bool,
    /// Evaluate and surface threshold alerts.
    pub show_alerts: bool,
    /// Compute the score and present feedback.
    pub enable_gamification: bool,
    /// Alert thresholds, merged over the defaults.
    pub thresholds: ThresholdOverrides,
    /// Upper bound on a collection pass (e.g. "10s", "500ms", "1m").
    pub collect_timeout: String,
    /// Per-source stop behaviour for paint observers.
    pub observers: ObserverPolicies,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            track_metrics: true,
            show_alerts: true,
            enable_gamification: true,
            thresholds: ThresholdOverrides::default(),
            collect_timeout: DEFAULT_COLLECT_TIMEOUT.to_string(),
            observers: ObserverPolicies::default(),
        }
    }
}

/// Stop policies for the paint-event sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ObserverPolicies {
    pub first_contentful_paint: StopPolicy,
    pub largest_contentful_paint: StopPolicy,
    pub cumulative_layout_shift: StopPolicy,
}

impl Default for ObserverPolicies {
    fn default() -> Self {
        Self {
            first_contentful_paint: StopPolicy::AfterFirstMatch,
            largest_contentful_paint: StopPolicy::KeepObserving,
            cumulative_layout_shift: StopPolicy::KeepObserving,
        }
    }
}

impl TrackerConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: TrackerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject negative or non-finite thresholds and unusable timeouts.
    pub fn validate(&self) -> ConfigResult<()> {
        for (name, value) in self.thresholds.entries() {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }
        self.collect_timeout()?;
        Ok(())
    }

    /// Alert thresholds: the overrides merged over the defaults.
    pub fn merged_thresholds(&self) -> ThresholdConfig {
        ThresholdConfig::default().merged(&self.thresholds)
    }

    /// Parsed collection bound.
    pub fn collect_timeout(&self) -> ConfigResult<Duration> {
        match parse_duration(&self.collect_timeout) {
            Some(d) if !d.is_zero() => Ok(d),
            _ => Err(ConfigError::InvalidTimeout(self.collect_timeout.clone())),
        }
    }

    /// Sub-millisecond remainders round up, so a non-zero timeout never
    /// renders as `"0ms"`.
    pub fn with_collect_timeout(mut self, timeout: Duration) -> Self {
        self.collect_timeout = format!("{}ms", timeout.as_nanos().div_ceil(1_000_000));
        self
    }

    pub fn with_thresholds(mut self, thresholds: ThresholdOverrides) -> Self {
        self.thresholds = thresholds;
        self
    }
}

/// Parse a duration string like "5s", "500ms", "1m".
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(ms) = s.strip_suffix("ms") {
        ms.parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>().ok()?.checked_mul(60).map(Duration::from_secs)
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}
