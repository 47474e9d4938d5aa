//! Per-File Coverage Records
//!
//! Raw hit counters for one source file and the path-keyed map of them that
//! summarizers consume.
//!
//! ## JSON Format
//!
//! ```text
//! {
//!   "src/app.js": {
//!     "path": "src/app.js",
//!     "statements": { "0": { "line": 1, "hits": 3 } },
//!     "functions":  { "0": { "name": "main", "line": 1, "hits": 1 } },
//!     "branches":   { "0": { "line": 4, "hits": [2, 0] } }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};

use crate::result::{CovTreeError, TreeResult};
use crate::summary::{CoverageSummary, Totals};

/// Hit counter for one statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementCoverage {
    /// Line the statement starts on
    pub line: u32,
    /// Execution count
    pub hits: u64,
    /// Excluded from coverage (e.g. an ignore pragma)
    #[serde(default, skip_serializing_if = "is_false")]
    pub skip: bool,
}

/// Hit counter for one function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCoverage {
    /// Function name
    pub name: String,
    /// Line of the declaration
    pub line: u32,
    /// Invocation count
    pub hits: u64,
    /// Excluded from coverage
    #[serde(default, skip_serializing_if = "is_false")]
    pub skip: bool,
}

/// Hit counters for one branch point, one entry per arm
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchCoverage {
    /// Line of the branch point
    pub line: u32,
    /// Execution count per arm
    pub hits: Vec<u64>,
    /// Excluded from coverage
    #[serde(default, skip_serializing_if = "is_false")]
    pub skip: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

/// Coverage record for a single source file
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileCoverage {
    /// Path of the source file
    #[serde(default)]
    pub path: String,
    /// Statement counters by statement id
    #[serde(default)]
    pub statements: BTreeMap<u32, StatementCoverage>,
    /// Function counters by function id
    #[serde(default)]
    pub functions: BTreeMap<u32, FunctionCoverage>,
    /// Branch counters by branch id
    #[serde(default)]
    pub branches: BTreeMap<u32, BranchCoverage>,
}

impl FileCoverage {
    /// Create an empty record for a file
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Record a statement, returning its id
    pub fn add_statement(&mut self, line: u32, hits: u64) -> u32 {
        let id = next_id(&self.statements);
        let _ = self.statements.insert(
            id,
            StatementCoverage {
                line,
                hits,
                skip: false,
            },
        );
        id
    }

    /// Record a function, returning its id
    pub fn add_function(&mut self, name: impl Into<String>, line: u32, hits: u64) -> u32 {
        let id = next_id(&self.functions);
        let _ = self.functions.insert(
            id,
            FunctionCoverage {
                name: name.into(),
                line,
                hits,
                skip: false,
            },
        );
        id
    }

    /// Record a branch point, returning its id
    pub fn add_branch(&mut self, line: u32, hits: Vec<u64>) -> u32 {
        let id = next_id(&self.branches);
        let _ = self.branches.insert(
            id,
            BranchCoverage {
                line,
                hits,
                skip: false,
            },
        );
        id
    }

    /// Add a statement
    #[must_use]
    pub fn with_statement(mut self, line: u32, hits: u64) -> Self {
        let _ = self.add_statement(line, hits);
        self
    }

    /// Add a statement excluded from coverage
    #[must_use]
    pub fn with_skipped_statement(mut self, line: u32) -> Self {
        let id = self.add_statement(line, 0);
        if let Some(stmt) = self.statements.get_mut(&id) {
            stmt.skip = true;
        }
        self
    }

    /// Add a function
    #[must_use]
    pub fn with_function(mut self, name: impl Into<String>, line: u32, hits: u64) -> Self {
        let _ = self.add_function(name, line, hits);
        self
    }

    /// Add a branch point
    #[must_use]
    pub fn with_branch(mut self, line: u32, hits: Vec<u64>) -> Self {
        let _ = self.add_branch(line, hits);
        self
    }

    /// Line hit counts, derived from statements
    ///
    /// A line takes the highest count of the statements starting on it.
    #[must_use]
    pub fn line_coverage(&self) -> BTreeMap<u32, u64> {
        let mut lines = BTreeMap::new();
        for stmt in self.statements.values() {
            let entry = lines.entry(stmt.line).or_insert(0);
            if stmt.hits > *entry {
                *entry = stmt.hits;
            }
        }
        lines
    }

    /// Lines with at least one statement and no hits
    #[must_use]
    pub fn uncovered_lines(&self) -> Vec<u32> {
        let skipped = self.skipped_lines();
        self.line_coverage()
            .into_iter()
            .filter(|(line, hits)| *hits == 0 && !skipped.contains_key(line))
            .map(|(line, _)| line)
            .collect()
    }

    /// Lines on which every statement is skipped
    fn skipped_lines(&self) -> BTreeMap<u32, bool> {
        let mut lines: BTreeMap<u32, bool> = BTreeMap::new();
        for stmt in self.statements.values() {
            let all_skipped = lines.entry(stmt.line).or_insert(true);
            *all_skipped &= stmt.skip;
        }
        lines.retain(|_, all_skipped| *all_skipped);
        lines
    }

    /// Compute the coverage summary for this file
    #[must_use]
    pub fn to_summary(&self) -> CoverageSummary {
        let statements = counts(self.statements.values().map(|s| (s.hits > 0, s.skip)));
        let functions = counts(self.functions.values().map(|f| (f.hits > 0, f.skip)));
        let branches = counts(
            self.branches
                .values()
                .flat_map(|b| b.hits.iter().map(move |h| (*h > 0, b.skip))),
        );

        let skipped = self.skipped_lines();
        let lines = counts(
            self.line_coverage()
                .into_iter()
                .map(|(line, hits)| (hits > 0, skipped.contains_key(&line))),
        );

        CoverageSummary {
            statements,
            branches,
            functions,
            lines,
        }
    }

    /// Merge another record for the same file into this one
    ///
    /// Hit counts are added id by id. Ids present only in `other` are copied.
    pub fn merge(&mut self, other: &Self) -> TreeResult<()> {
        if self.path != other.path {
            return Err(CovTreeError::CoverageMismatch {
                expected: self.path.clone(),
                actual: other.path.clone(),
            });
        }

        for (id, stmt) in &other.statements {
            match self.statements.entry(*id) {
                btree_map::Entry::Occupied(mut e) => {
                    let hits = &mut e.get_mut().hits;
                    *hits = hits.saturating_add(stmt.hits);
                }
                btree_map::Entry::Vacant(e) => {
                    let _ = e.insert(stmt.clone());
                }
            }
        }

        for (id, func) in &other.functions {
            match self.functions.entry(*id) {
                btree_map::Entry::Occupied(mut e) => {
                    let hits = &mut e.get_mut().hits;
                    *hits = hits.saturating_add(func.hits);
                }
                btree_map::Entry::Vacant(e) => {
                    let _ = e.insert(func.clone());
                }
            }
        }

        for (id, branch) in &other.branches {
            match self.branches.entry(*id) {
                btree_map::Entry::Occupied(mut e) => {
                    let arms = &mut e.get_mut().hits;
                    if arms.len() < branch.hits.len() {
                        arms.resize(branch.hits.len(), 0);
                    }
                    for (arm, hits) in arms.iter_mut().zip(&branch.hits) {
                        *arm = arm.saturating_add(*hits);
                    }
                }
                btree_map::Entry::Vacant(e) => {
                    let _ = e.insert(branch.clone());
                }
            }
        }

        Ok(())
    }
}

fn next_id<V>(map: &BTreeMap<u32, V>) -> u32 {
    map.keys().next_back().map_or(0, |last| last + 1)
}

fn counts(items: impl Iterator<Item = (bool, bool)>) -> Totals {
    let (mut total, mut covered, mut skipped) = (0, 0, 0);
    for (hit, skip) in items {
        total += 1;
        if skip {
            skipped += 1;
        } else if hit {
            covered += 1;
        }
    }
    Totals::new(total, covered, skipped)
}

/// Coverage records keyed by file path, iterated in key order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoverageMap {
    files: BTreeMap<String, FileCoverage>,
}

impl CoverageMap {
    /// Create an empty map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a map from JSON keyed by file path
    ///
    /// Records without a `path` take their key; a record whose path
    /// disagrees with its key is rejected.
    pub fn from_json(json: &str) -> TreeResult<Self> {
        let mut map: Self = serde_json::from_str(json)?;
        for (key, coverage) in &mut map.files {
            if coverage.path.is_empty() {
                coverage.path.clone_from(key);
            } else if coverage.path != *key {
                return Err(CovTreeError::invalid_input(format!(
                    "record for '{}' is stored under key '{key}'",
                    coverage.path
                )));
            }
        }
        Ok(map)
    }

    /// Serialize the map as pretty-printed JSON
    pub fn to_json(&self) -> TreeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Add a file record, merging into any existing record for the same path
    pub fn add_file_coverage(&mut self, coverage: FileCoverage) -> TreeResult<()> {
        match self.files.entry(coverage.path.clone()) {
            btree_map::Entry::Occupied(mut e) => e.get_mut().merge(&coverage),
            btree_map::Entry::Vacant(e) => {
                let _ = e.insert(coverage);
                Ok(())
            }
        }
    }

    /// Add a file record, returning the map
    pub fn with_file(mut self, coverage: FileCoverage) -> TreeResult<Self> {
        self.add_file_coverage(coverage)?;
        Ok(self)
    }

    /// Merge every record of another map into this one
    pub fn merge(&mut self, other: &Self) -> TreeResult<()> {
        for coverage in other.files.values() {
            self.add_file_coverage(coverage.clone())?;
        }
        Ok(())
    }

    /// File paths in iteration order
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Record for a file
    #[must_use]
    pub fn file_coverage_for(&self, path: &str) -> Option<&FileCoverage> {
        self.files.get(path)
    }

    /// Iterate over `(path, record)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FileCoverage)> {
        self.files.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of files
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True when the map holds no files
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Merge of every file's summary
    #[must_use]
    pub fn summary(&self) -> CoverageSummary {
        self.files
            .values()
            .fold(CoverageSummary::empty(), |acc, file| acc.merge(&file.to_summary()))
    }
}
