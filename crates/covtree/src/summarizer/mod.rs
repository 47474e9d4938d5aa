//! Summarizers
//!
//! Strategies that turn a flat [`CoverageMap`] into a [`CoverageTree`]:
//!
//! - `flat` - every file directly under the root
//! - `nested` - one summary node per directory, aggregating its whole subtree
//! - `pkg` - one summary node per containing directory, all directly under
//!   the root, each aggregating only its own files
//!
//! All strategies walk the map in key order and keep first-appearance order
//! when grouping, so identical input always yields an identical tree.

mod flat;
mod nested;
mod pkg;

pub use flat::flat;
pub use nested::nested;
pub use pkg::pkg;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::coverage::{CoverageMap, FileCoverage};
use crate::path::CoveragePath;
use crate::result::{CovTreeError, TreeResult};
use crate::tree::CoverageTree;

/// Tree-construction strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarizerKind {
    /// Single root, files directly beneath it
    Flat,
    /// Directory hierarchy
    Nested,
    /// One level of packages (containing directories)
    #[default]
    Pkg,
}

impl SummarizerKind {
    /// All strategies
    pub const ALL: [Self; 3] = [Self::Flat, Self::Nested, Self::Pkg];

    /// Strategy name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::Nested => "nested",
            Self::Pkg => "pkg",
        }
    }
}

impl fmt::Display for SummarizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SummarizerKind {
    type Err = CovTreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "flat" => Ok(Self::Flat),
            "nested" => Ok(Self::Nested),
            "pkg" | "package" => Ok(Self::Pkg),
            _ => Err(CovTreeError::config(format!(
                "Unknown summarizer '{s}'. Valid summarizers: flat, nested, pkg"
            ))),
        }
    }
}

/// Build a tree with the given strategy
pub fn summarize(kind: SummarizerKind, map: &CoverageMap) -> TreeResult<CoverageTree> {
    match kind {
        SummarizerKind::Flat => flat(map),
        SummarizerKind::Nested => nested(map),
        SummarizerKind::Pkg => pkg(map),
    }
}

/// Parse every key of the map, rejecting keys without segments and keys
/// that normalize to the same path.
fn parse_files(map: &CoverageMap) -> TreeResult<Vec<(CoveragePath, &FileCoverage)>> {
    let mut seen = HashSet::with_capacity(map.len());
    map.iter()
        .map(|(key, coverage)| {
            let path = CoveragePath::parse(key)?;
            if !seen.insert(path.clone()) {
                return Err(CovTreeError::invalid_input(format!(
                    "'{key}' duplicates another file as '{path}'"
                )));
            }
            Ok((path, coverage))
        })
        .collect()
}

/// `path` relative to `base` as a display string
fn relative_to(path: &CoveragePath, base: &CoveragePath) -> String {
    path.strip_prefix(base)
        .unwrap_or_else(|| path.clone())
        .to_string()
}
