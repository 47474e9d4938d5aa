//! Watermark thresholds and coverage status classification.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::result::{CovTreeError, TreeResult};
use crate::summary::{Metric, Percentage};

/// Default low threshold, in percent
pub const DEFAULT_LOW: f64 = 50.0;
/// Default high threshold, in percent
pub const DEFAULT_HIGH: f64 = 80.0;

/// A `[low, high]` percentage threshold pair
///
/// Serialized as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct Watermark {
    low: f64,
    high: f64,
}

impl Watermark {
    /// Create a threshold pair
    ///
    /// # Errors
    ///
    /// Returns `Config` unless `0 <= low <= high <= 100`.
    pub fn new(low: f64, high: f64) -> TreeResult<Self> {
        if !(0.0..=100.0).contains(&low) || !(0.0..=100.0).contains(&high) || low > high {
            return Err(CovTreeError::config(format!(
                "watermark [{low}, {high}] must satisfy 0 <= low <= high <= 100"
            )));
        }
        Ok(Self { low, high })
    }

    /// Low threshold
    #[must_use]
    pub const fn low(&self) -> f64 {
        self.low
    }

    /// High threshold
    #[must_use]
    pub const fn high(&self) -> f64 {
        self.high
    }

    /// Classify a percentage against this pair
    #[must_use]
    pub fn classify(&self, pct: Percentage) -> Status {
        match pct.value() {
            Some(value) if value < self.low => Status::Low,
            Some(value) if value >= self.high => Status::High,
            _ => Status::Medium,
        }
    }
}

impl Default for Watermark {
    fn default() -> Self {
        Self {
            low: DEFAULT_LOW,
            high: DEFAULT_HIGH,
        }
    }
}

impl TryFrom<[f64; 2]> for Watermark {
    type Error = CovTreeError;

    fn try_from([low, high]: [f64; 2]) -> Result<Self, Self::Error> {
        Self::new(low, high)
    }
}

impl From<Watermark> for [f64; 2] {
    fn from(mark: Watermark) -> Self {
        [mark.low, mark.high]
    }
}

/// Coverage status of a percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Below the low watermark
    Low,
    /// Between the watermarks, or unknown
    Medium,
    /// At or above the high watermark
    High,
}

impl Status {
    /// Status name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-metric overrides, merged over the defaults
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkOverrides {
    /// Statement thresholds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statements: Option<Watermark>,
    /// Branch thresholds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branches: Option<Watermark>,
    /// Function thresholds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub functions: Option<Watermark>,
    /// Line thresholds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<Watermark>,
}

impl WatermarkOverrides {
    /// Override for a metric
    #[must_use]
    pub const fn get(&self, metric: Metric) -> Option<Watermark> {
        match metric {
            Metric::Statements => self.statements,
            Metric::Branches => self.branches,
            Metric::Functions => self.functions,
            Metric::Lines => self.lines,
        }
    }

    /// Set the override for a metric
    #[must_use]
    pub fn with(mut self, metric: Metric, mark: Watermark) -> Self {
        match metric {
            Metric::Statements => self.statements = Some(mark),
            Metric::Branches => self.branches = Some(mark),
            Metric::Functions => self.functions = Some(mark),
            Metric::Lines => self.lines = Some(mark),
        }
        self
    }
}

/// Thresholds for every metric
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Watermarks {
    /// Statement thresholds
    pub statements: Watermark,
    /// Branch thresholds
    pub branches: Watermark,
    /// Function thresholds
    pub functions: Watermark,
    /// Line thresholds
    pub lines: Watermark,
}

impl Watermarks {
    /// Defaults merged with `overrides`
    #[must_use]
    pub fn with_overrides(overrides: &WatermarkOverrides) -> Self {
        let defaults = Self::default();
        Self {
            statements: overrides.statements.unwrap_or(defaults.statements),
            branches: overrides.branches.unwrap_or(defaults.branches),
            functions: overrides.functions.unwrap_or(defaults.functions),
            lines: overrides.lines.unwrap_or(defaults.lines),
        }
    }

    /// Thresholds for a metric
    #[must_use]
    pub const fn get(&self, metric: Metric) -> Watermark {
        match metric {
            Metric::Statements => self.statements,
            Metric::Branches => self.branches,
            Metric::Functions => self.functions,
            Metric::Lines => self.lines,
        }
    }

    /// Classify a metric's percentage
    #[must_use]
    pub fn classify(&self, metric: Metric, pct: Percentage) -> Status {
        self.get(metric).classify(pct)
    }
}
