//! Domain types for page performance tracking.
//!
//! All durations are milliseconds as non-negative `f64`. An `Option`
//! duration of `None` means the signal has not been observed yet.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Signal ─────────────────────────────────────────────────────────

/// A tracked performance signal.
///
/// Variant order is the canonical evaluation order: alerts are emitted
/// in this order so the output is deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    FirstContentfulPaint,
    LargestContentfulPaint,
    TimeToInteractive,
    CumulativeLayoutShift,
    FirstInputDelay,
    InteractionToNextPaint,
    TimeToFirstByte,
    /// Per-component render cost (one entry per recorded render).
    ComponentRender,
}

impl Signal {
    /// The seven page-level signals, in canonical order.
    pub const HEADLINE: [Signal; 7] = [
        Signal::FirstContentfulPaint,
        Signal::LargestContentfulPaint,
        Signal::TimeToInteractive,
        Signal::CumulativeLayoutShift,
        Signal::FirstInputDelay,
        Signal::InteractionToNextPaint,
        Signal::TimeToFirstByte,
    ];

    /// Signals started by a full collection pass. Interaction-gated
    /// signals depend on real user input and are never part of it.
    pub const AUTOMATIC: [Signal; 5] = [
        Signal::FirstContentfulPaint,
        Signal::LargestContentfulPaint,
        Signal::CumulativeLayoutShift,
        Signal::TimeToInteractive,
        Signal::TimeToFirstByte,
    ];

    /// Short lowercase key, matching the `[thresholds]` table keys.
    pub fn key(&self) -> &'static str {
        match self {
            Signal::FirstContentfulPaint => "fcp",
            Signal::LargestContentfulPaint => "lcp",
            Signal::TimeToInteractive => "tti",
            Signal::CumulativeLayoutShift => "cls",
            Signal::FirstInputDelay => "fid",
            Signal::InteractionToNextPaint => "inp",
            Signal::TimeToFirstByte => "ttfb",
            Signal::ComponentRender => "component_render_time",
        }
    }

    /// Unit suffix used when rendering values. CLS is unitless.
    pub fn unit(&self) -> &'static str {
        match self {
            Signal::CumulativeLayoutShift => "",
            _ => " ms",
        }
    }

    pub fn is_automatic(&self) -> bool {
        Self::AUTOMATIC.contains(self)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Signal::FirstContentfulPaint => "FCP",
            Signal::LargestContentfulPaint => "LCP",
            Signal::TimeToInteractive => "TTI",
            Signal::CumulativeLayoutShift => "CLS",
            Signal::FirstInputDelay => "FID",
            Signal::InteractionToNextPaint => "INP",
            Signal::TimeToFirstByte => "TTFB",
            Signal::ComponentRender => "Component render",
        };
        f.write_str(label)
    }
}

// ── Snapshot ───────────────────────────────────────────────────────

/// A single recorded component render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRender {
    pub name: String,
    /// Render duration in milliseconds.
    pub render_time: f64,
}

/// The state of every tracked signal at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub first_contentful_paint: Option<f64>,
    /// Latest reported largest-paint candidate.
    pub largest_contentful_paint: Option<f64>,
    pub time_to_interactive: Option<f64>,
    /// Running sum of layout shifts not caused by recent input.
    pub cumulative_layout_shift: f64,
    pub first_input_delay: Option<f64>,
    pub interaction_to_next_paint: Option<f64>,
    pub time_to_first_byte: Option<f64>,
    /// Append-only render log in call order.
    pub component_render_times: Vec<ComponentRender>,
}

impl MetricSnapshot {
    /// Observed value of a headline signal.
    ///
    /// CLS always reports its running sum (starting at `0.0`).
    /// `ComponentRender` has no single value and returns `None`.
    pub fn get(&self, signal: Signal) -> Option<f64> {
        match signal {
            Signal::FirstContentfulPaint => self.first_contentful_paint,
            Signal::LargestContentfulPaint => self.largest_contentful_paint,
            Signal::TimeToInteractive => self.time_to_interactive,
            Signal::CumulativeLayoutShift => Some(self.cumulative_layout_shift),
            Signal::FirstInputDelay => self.first_input_delay,
            Signal::InteractionToNextPaint => self.interaction_to_next_paint,
            Signal::TimeToFirstByte => self.time_to_first_byte,
            Signal::ComponentRender => None,
        }
    }

    /// Headline duration signals that are still unset.
    pub fn unset_signals(&self) -> Vec<Signal> {
        Signal::HEADLINE
            .into_iter()
            .filter(|s| *s != Signal::CumulativeLayoutShift && self.get(*s).is_none())
            .collect()
    }
}

// ── Thresholds ─────────────────────────────────────────────────────

/// One upper bound per signal plus a shared component render bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub fcp: f64,
    pub lcp: f64,
    pub tti: f64,
    pub cls: f64,
    pub fid: f64,
    pub inp: f64,
    pub ttfb: f64,
    pub component_render_time: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            fcp: 2000.0,
            lcp: 2500.0,
            tti: 3000.0,
            cls: 0.1,
            fid: 100.0,
            inp: 200.0,
            ttfb: 800.0,
            component_render_time: 500.0,
        }
    }
}

impl ThresholdConfig {
    /// The bound that applies to `signal`.
    pub fn for_signal(&self, signal: Signal) -> f64 {
        match signal {
            Signal::FirstContentfulPaint => self.fcp,
            Signal::LargestContentfulPaint => self.lcp,
            Signal::TimeToInteractive => self.tti,
            Signal::CumulativeLayoutShift => self.cls,
            Signal::FirstInputDelay => self.fid,
            Signal::InteractionToNextPaint => self.inp,
            Signal::TimeToFirstByte => self.ttfb,
            Signal::ComponentRender => self.component_render_time,
        }
    }

    /// Apply `overrides` field by field on top of `self`.
    pub fn merged(&self, overrides: &ThresholdOverrides) -> Self {
        Self {
            fcp: overrides.fcp.unwrap_or(self.fcp),
            lcp: overrides.lcp.unwrap_or(self.lcp),
            tti: overrides.tti.unwrap_or(self.tti),
            cls: overrides.cls.unwrap_or(self.cls),
            fid: overrides.fid.unwrap_or(self.fid),
            inp: overrides.inp.unwrap_or(self.inp),
            ttfb: overrides.ttfb.unwrap_or(self.ttfb),
            component_render_time: overrides
                .component_render_time
                .unwrap_or(self.component_render_time),
        }
    }
}

/// Caller-supplied partial thresholds, merged over the defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThresholdOverrides {
    pub fcp: Option<f64>,
    pub lcp: Option<f64>,
    pub tti: Option<f64>,
    pub cls: Option<f64>,
    pub fid: Option<f64>,
    pub inp: Option<f64>,
    pub ttfb: Option<f64>,
    pub component_render_time: Option<f64>,
}

impl ThresholdOverrides {
    /// `(key, value)` for every override that is set.
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        [
            ("fcp", self.fcp),
            ("lcp", self.lcp),
            ("tti", self.tti),
            ("cls", self.cls),
            ("fid", self.fid),
            ("inp", self.inp),
            ("ttfb", self.ttfb),
            ("component_render_time", self.component_render_time),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, v)))
        .collect()
    }
}

// ── Alerts ─────────────────────────────────────────────────────────

/// A signal that exceeded its threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub signal: Signal,
    pub observed: f64,
    pub threshold: f64,
    /// Component name, for render alerts only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
}

impl fmt::Display for AlertEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = self.signal.unit();
        match &self.component {
            Some(name) => write!(
                f,
                "Component {name} render time of {}{unit} exceeded threshold of {}{unit}",
                self.observed, self.threshold
            ),
            None => write!(
                f,
                "{} of {}{unit} exceeded threshold of {}{unit}",
                self.signal, self.observed, self.threshold
            ),
        }
    }
}

// ── Observation policy ─────────────────────────────────────────────

/// Whether a paint-event source keeps observing after its first value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopPolicy {
    /// Disconnect once the first qualifying batch has been applied.
    AfterFirstMatch,
    /// Keep applying later batches for the rest of the session.
    KeepObserving,
}
