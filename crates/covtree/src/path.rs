//! Coverage Paths
//!
//! Splits coverage map keys into segments so summarizers can group files by
//! directory. Both `/` and `\` separate segments; empty and `.` segments are
//! dropped.

use std::fmt;

use crate::result::{CovTreeError, TreeResult};

/// A file or directory path decomposed into segments
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CoveragePath {
    segments: Vec<String>,
    absolute: bool,
}

impl CoveragePath {
    /// Parse a file key
    ///
    /// # Errors
    ///
    /// Returns `InvalidCoverageInput` when the key has no segments.
    pub fn parse(key: &str) -> TreeResult<Self> {
        let segments: Vec<String> = key
            .split(['/', '\\'])
            .filter(|s| !s.is_empty() && *s != ".")
            .map(String::from)
            .collect();

        if segments.is_empty() {
            return Err(CovTreeError::invalid_input(format!(
                "path '{key}' has no segments"
            )));
        }

        Ok(Self {
            segments,
            absolute: key.starts_with(['/', '\\']),
        })
    }

    /// The filesystem root, `/`
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
            absolute: true,
        }
    }

    /// Whether the key started with a separator
    #[must_use]
    pub const fn is_absolute(&self) -> bool {
        self.absolute
    }

    /// Path segments
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True for the empty path
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Last segment (the file name for file paths)
    #[must_use]
    pub fn name(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }

    /// Containing directory
    #[must_use]
    pub fn parent(&self) -> Self {
        let mut segments = self.segments.clone();
        let _ = segments.pop();
        Self {
            segments,
            absolute: self.absolute,
        }
    }

    /// Whether `prefix` is a leading run of this path's segments
    #[must_use]
    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.absolute == prefix.absolute && self.segments.starts_with(&prefix.segments)
    }

    /// Longest shared leading run of segments
    #[must_use]
    pub fn common_prefix(&self, other: &Self) -> Self {
        if self.absolute != other.absolute {
            return Self::default();
        }
        let segments = self
            .segments
            .iter()
            .zip(&other.segments)
            .take_while(|(a, b)| a == b)
            .map(|(a, _)| a.clone())
            .collect();
        Self {
            segments,
            absolute: self.absolute,
        }
    }

    /// Common prefix of every path, or the empty path when none are given
    pub fn common_prefix_of<'a>(paths: impl IntoIterator<Item = &'a Self>) -> Self {
        let mut iter = paths.into_iter();
        let Some(first) = iter.next() else {
            return Self::default();
        };
        iter.fold(first.clone(), |acc, path| acc.common_prefix(path))
    }

    /// This path with `base` stripped off, as a relative path
    ///
    /// Returns `None` when `base` is not a prefix of this path.
    #[must_use]
    pub fn strip_prefix(&self, base: &Self) -> Option<Self> {
        if base.is_empty() && !base.absolute {
            return Some(self.clone());
        }
        if !self.starts_with(base) {
            return None;
        }
        Some(Self {
            segments: self.segments[base.len()..].to_vec(),
            absolute: false,
        })
    }

    /// Child path with one more segment
    #[must_use]
    pub fn join(&self, segment: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Self {
            segments,
            absolute: self.absolute,
        }
    }
}

impl fmt::Display for CoveragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.absolute {
            f.write_str("/")?;
        }
        f.write_str(&self.segments.join("/"))
    }
}
