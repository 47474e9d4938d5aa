//! Coverage Summaries
//!
//! Aggregate counts per metric (statements, branches, functions, lines).
//! Summaries are values: merging two of them yields a new summary and never
//! touches the inputs, which is what upward aggregation in the tree relies on.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::result::CovTreeError;

/// A coverage metric tracked by every summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Statement coverage
    Statements,
    /// Branch coverage
    Branches,
    /// Function coverage
    Functions,
    /// Line coverage
    Lines,
}

impl Metric {
    /// All metrics, in report column order
    pub const ALL: [Self; 4] = [
        Self::Statements,
        Self::Branches,
        Self::Functions,
        Self::Lines,
    ];

    /// Lowercase metric name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Statements => "statements",
            Self::Branches => "branches",
            Self::Functions => "functions",
            Self::Lines => "lines",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = CovTreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "statements" => Ok(Self::Statements),
            "branches" => Ok(Self::Branches),
            "functions" => Ok(Self::Functions),
            "lines" => Ok(Self::Lines),
            _ => Err(CovTreeError::config(format!(
                "Unknown metric '{s}'. Valid metrics: statements, branches, functions, lines"
            ))),
        }
    }
}

/// Covered percentage of a metric
///
/// `Unknown` is used when there is nothing to cover (`total == 0`).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub enum Percentage {
    /// Percentage in `0.0..=100.0`, floored to two decimals
    Value(f64),
    /// Nothing to measure
    #[default]
    Unknown,
}

impl Percentage {
    /// Compute the percentage of `covered` out of `total`
    #[must_use]
    pub fn of(covered: u64, total: u64) -> Self {
        if total == 0 {
            return Self::Unknown;
        }
        let raw = (covered as f64 * 10_000.0) / total as f64;
        Self::Value(raw.floor() / 100.0)
    }

    /// The numeric value, if known
    #[must_use]
    pub const fn value(self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(v),
            Self::Unknown => None,
        }
    }

    /// Whether this percentage is the "not applicable" sentinel
    #[must_use]
    pub const fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v:.2}"),
            Self::Unknown => f.write_str("Unknown"),
        }
    }
}

impl Serialize for Percentage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => serializer.serialize_f64(*v),
            Self::Unknown => serializer.serialize_str("Unknown"),
        }
    }
}

impl<'de> Deserialize<'de> for Percentage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(v) => Ok(Self::Value(v)),
            Raw::Text(s) if s == "Unknown" => Ok(Self::Unknown),
            Raw::Text(s) => Err(de::Error::custom(format!("invalid percentage '{s}'"))),
        }
    }
}

/// Counts for a single metric
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Totals {
    /// Number of coverable items
    pub total: u64,
    /// Number of items hit at least once
    pub covered: u64,
    /// Number of items excluded from coverage
    pub skipped: u64,
    /// Covered percentage derived from `covered` and `total`
    pub pct: Percentage,
}

impl Totals {
    /// Create totals, deriving the percentage
    #[must_use]
    pub fn new(total: u64, covered: u64, skipped: u64) -> Self {
        debug_assert!(
            covered.saturating_add(skipped) <= total,
            "covered + skipped exceeds total"
        );
        Self {
            total,
            covered,
            skipped,
            pct: Percentage::of(covered, total),
        }
    }

    /// Add two sets of counts, recomputing the percentage
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        Self::new(
            self.total.saturating_add(other.total),
            self.covered.saturating_add(other.covered),
            self.skipped.saturating_add(other.skipped),
        )
    }
}

/// Aggregate coverage over one file or a group of files
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CoverageSummary {
    /// Statement counts
    pub statements: Totals,
    /// Branch counts
    pub branches: Totals,
    /// Function counts
    pub functions: Totals,
    /// Line counts
    pub lines: Totals,
}

impl CoverageSummary {
    /// An empty summary (all counts zero, all percentages unknown)
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Combine two summaries into a new one
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            statements: self.statements.merge(&other.statements),
            branches: self.branches.merge(&other.branches),
            functions: self.functions.merge(&other.functions),
            lines: self.lines.merge(&other.lines),
        }
    }

    /// Counts for a metric
    #[must_use]
    pub const fn metric(&self, metric: Metric) -> &Totals {
        match metric {
            Metric::Statements => &self.statements,
            Metric::Branches => &self.branches,
            Metric::Functions => &self.functions,
            Metric::Lines => &self.lines,
        }
    }

    /// True when no metric has anything to cover
    #[must_use]
    pub fn is_empty(&self) -> bool {
        Metric::ALL.iter().all(|m| self.metric(*m).total == 0)
    }
}

impl<'a> FromIterator<&'a CoverageSummary> for CoverageSummary {
    fn from_iter<I: IntoIterator<Item = &'a CoverageSummary>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |acc, summary| acc.merge(summary))
    }
}
