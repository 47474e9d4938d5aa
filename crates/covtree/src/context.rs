//! Reporting Context
//!
//! Everything a report generator needs besides the tree itself: the output
//! directory, merged watermarks, and writers scoped to that directory.
//!
//! ```
//! use covtree::{create_context, ContextOptions, Metric, Percentage, Status};
//!
//! let context = create_context(ContextOptions::new().with_dir("coverage")).unwrap();
//! assert_eq!(
//!     context.classify(Metric::Lines, Percentage::Value(85.0)),
//!     Status::High
//! );
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::coverage::CoverageMap;
use crate::result::{CovTreeError, TreeResult};
use crate::summarizer::{summarize, SummarizerKind};
use crate::summary::{Metric, Percentage};
use crate::tree::CoverageTree;
use crate::watermarks::{Status, Watermark, WatermarkOverrides, Watermarks};
use crate::writer::ContentWriter;

/// Options for [`create_context`]
///
/// Deserializes from JSON or YAML with camelCase keys. The coverage map is
/// never part of the serialized form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContextOptions {
    /// Output directory; the current directory when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    /// Per-metric watermark overrides
    pub watermarks: WatermarkOverrides,
    /// Summarizer used by [`Context::default_tree`]
    pub default_summarizer: SummarizerKind,
    /// Coverage data trees are built from
    #[serde(skip)]
    pub coverage_map: Option<CoverageMap>,
}

impl ContextOptions {
    /// Default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from JSON
    pub fn from_json(json: &str) -> TreeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse options from YAML
    pub fn from_yaml(yaml: &str) -> TreeResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Load options from a `.json`, `.yaml` or `.yml` file
    pub fn load(path: &Path) -> TreeResult<Self> {
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml(&content),
            Some("json") => Self::from_json(&content),
            _ => Err(CovTreeError::config(format!(
                "unsupported options file '{}', expected .json, .yaml or .yml",
                path.display()
            ))),
        }
    }

    /// Set the output directory
    #[must_use]
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Replace all watermark overrides
    #[must_use]
    pub const fn with_watermarks(mut self, watermarks: WatermarkOverrides) -> Self {
        self.watermarks = watermarks;
        self
    }

    /// Override the watermark of one metric
    #[must_use]
    pub fn with_watermark(mut self, metric: Metric, mark: Watermark) -> Self {
        self.watermarks = self.watermarks.with(metric, mark);
        self
    }

    /// Set the default summarizer
    #[must_use]
    pub const fn with_default_summarizer(mut self, kind: SummarizerKind) -> Self {
        self.default_summarizer = kind;
        self
    }

    /// Attach coverage data
    #[must_use]
    pub fn with_coverage_map(mut self, map: CoverageMap) -> Self {
        self.coverage_map = Some(map);
        self
    }
}

/// Shared state for report generation
#[derive(Debug, Clone)]
pub struct Context {
    dir: PathBuf,
    watermarks: Watermarks,
    coverage_map: Option<CoverageMap>,
    default_summarizer: SummarizerKind,
}

impl Context {
    /// Build a context from options
    ///
    /// # Errors
    ///
    /// Returns `Io` when no directory is given and the current directory
    /// cannot be determined.
    pub fn new(options: ContextOptions) -> TreeResult<Self> {
        let dir = match options.dir {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        let watermarks = Watermarks::with_overrides(&options.watermarks);
        debug!(
            dir = %dir.display(),
            summarizer = %options.default_summarizer,
            has_coverage = options.coverage_map.is_some(),
            "created report context"
        );
        Ok(Self {
            dir,
            watermarks,
            coverage_map: options.coverage_map,
            default_summarizer: options.default_summarizer,
        })
    }

    /// Output directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Watermarks in effect (defaults merged with overrides)
    #[must_use]
    pub const fn watermarks(&self) -> &Watermarks {
        &self.watermarks
    }

    /// Watermarks without any overrides
    #[must_use]
    pub fn default_watermarks(&self) -> Watermarks {
        Watermarks::default()
    }

    /// Classify a metric's percentage against the watermarks in effect
    #[must_use]
    pub fn classify(&self, metric: Metric, pct: Percentage) -> Status {
        self.watermarks.classify(metric, pct)
    }

    /// Attached coverage data
    #[must_use]
    pub const fn coverage_map(&self) -> Option<&CoverageMap> {
        self.coverage_map.as_ref()
    }

    /// Summarizer used by [`Context::default_tree`]
    #[must_use]
    pub const fn default_summarizer(&self) -> SummarizerKind {
        self.default_summarizer
    }

    /// Build a tree from the attached coverage data
    ///
    /// # Errors
    ///
    /// Returns `InvalidCoverageInput` when no coverage map is attached or
    /// the map is malformed.
    pub fn tree(&self, kind: SummarizerKind) -> TreeResult<CoverageTree> {
        let map = self.coverage_map.as_ref().ok_or_else(|| {
            CovTreeError::invalid_input("no coverage map attached to the context")
        })?;
        debug!(summarizer = %kind, files = map.len(), "building tree from context");
        summarize(kind, map)
    }

    /// Build a tree with the default summarizer
    pub fn default_tree(&self) -> TreeResult<CoverageTree> {
        self.tree(self.default_summarizer)
    }

    /// Writer for a file under the output directory
    ///
    /// # Errors
    ///
    /// Returns `Config` for absolute paths or paths escaping the output
    /// directory, and `Io` when the file cannot be created.
    pub fn file_writer(&self, relative_path: impl AsRef<Path>) -> TreeResult<ContentWriter> {
        let relative_path = relative_path.as_ref();
        let escapes = relative_path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || relative_path.as_os_str().is_empty() {
            return Err(CovTreeError::config(format!(
                "report file '{}' must be a relative path inside the output directory",
                relative_path.display()
            )));
        }

        let path = self.dir.join(relative_path);
        debug!(path = %path.display(), "opening report file");
        ContentWriter::file(path)
    }

    /// Writer on the console
    #[must_use]
    pub fn console_writer(&self) -> ContentWriter {
        ContentWriter::console()
    }
}

/// Build a [`Context`] from options
pub fn create_context(options: ContextOptions) -> TreeResult<Context> {
    Context::new(options)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::coverage::FileCoverage;
    use tempfile::TempDir;

    fn sample_map() -> CoverageMap {
        CoverageMap::new()
            .with_file(FileCoverage::new("src/a/x.js").with_statement(1, 1))
            .unwrap()
            .with_file(FileCoverage::new("src/b/y.js").with_statement(1, 0))
            .unwrap()
    }

    mod options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let options = ContextOptions::default();
            assert!(options.dir.is_none());
            assert_eq!(options.default_summarizer, SummarizerKind::Pkg);
            assert_eq!(options.watermarks, WatermarkOverrides::default());
        }

        #[test]
        fn test_from_json() {
            let options = ContextOptions::from_json(
                r#"{"dir": "out", "defaultSummarizer": "nested", "watermarks": {"branches": [40, 70]}}"#,
            )
            .unwrap();

            assert_eq!(options.dir, Some(PathBuf::from("out")));
            assert_eq!(options.default_summarizer, SummarizerKind::Nested);
            assert_eq!(
                options.watermarks.branches,
                Some(Watermark::new(40.0, 70.0).unwrap())
            );
        }

        #[test]
        fn test_from_yaml() {
            let yaml = "defaultSummarizer: flat\nwatermarks:\n  lines: [60, 90]\n";
            let options = ContextOptions::from_yaml(yaml).unwrap();
            assert_eq!(options.default_summarizer, SummarizerKind::Flat);
            assert_eq!(options.watermarks.lines.unwrap().high(), 90.0);
        }

        #[test]
        fn test_invalid_watermark_rejected() {
            let err = ContextOptions::from_json(r#"{"watermarks": {"lines": [90, 10]}}"#)
                .unwrap_err();
            assert!(matches!(err, CovTreeError::Json(_)));
        }

        #[test]
        fn test_unknown_summarizer_rejected() {
            assert!(ContextOptions::from_json(r#"{"defaultSummarizer": "tree"}"#).is_err());
        }

        #[test]
        fn test_load_by_extension() {
            let dir = TempDir::new().unwrap();
            let yaml = dir.path().join("opts.yml");
            fs::write(&yaml, "dir: reports\n").unwrap();
            let loaded = ContextOptions::load(&yaml).unwrap();
            assert_eq!(loaded.dir, Some(PathBuf::from("reports")));

            let toml = dir.path().join("opts.toml");
            fs::write(&toml, "").unwrap();
            assert!(matches!(
                ContextOptions::load(&toml).unwrap_err(),
                CovTreeError::Config { .. }
            ));
        }
    }

    mod context_tests {
        use super::*;

        #[test]
        fn test_dir_defaults_to_current_dir() {
            let context = create_context(ContextOptions::new()).unwrap();
            assert_eq!(context.dir(), std::env::current_dir().unwrap());
        }

        #[test]
        fn test_classify_uses_overrides() {
            let context = create_context(
                ContextOptions::new()
                    .with_dir("out")
                    .with_watermark(Metric::Statements, Watermark::new(20.0, 30.0).unwrap()),
            )
            .unwrap();

            let pct = Percentage::Value(25.0);
            assert_eq!(context.classify(Metric::Statements, pct), Status::Medium);
            assert_eq!(context.classify(Metric::Functions, pct), Status::Low);
            assert_eq!(context.default_watermarks(), Watermarks::default());
            assert_ne!(*context.watermarks(), context.default_watermarks());
        }

        #[test]
        fn test_tree_without_map_is_invalid_input() {
            let context = create_context(ContextOptions::new().with_dir("out")).unwrap();
            assert!(context.coverage_map().is_none());
            let err = context.default_tree().unwrap_err();
            assert!(matches!(err, CovTreeError::InvalidCoverageInput { .. }));
        }

        #[test]
        fn test_tree_by_kind() {
            let context = create_context(
                ContextOptions::new()
                    .with_dir("out")
                    .with_coverage_map(sample_map())
                    .with_default_summarizer(SummarizerKind::Flat),
            )
            .unwrap();

            let flat = context.default_tree().unwrap();
            assert_eq!(flat.root().children().len(), 2);
            assert!(flat.root().children().iter().all(|c| !c.is_summary()));

            let pkg = context.tree(SummarizerKind::Pkg).unwrap();
            assert!(pkg.root().children().iter().all(|c| c.is_summary()));
        }
    }

    mod writer_tests {
        use super::*;

        #[test]
        fn test_file_writer_under_dir() {
            let dir = TempDir::new().unwrap();
            let context = create_context(ContextOptions::new().with_dir(dir.path())).unwrap();

            let mut writer = context.file_writer("lcov-report/index.txt").unwrap();
            writer.println("All files").unwrap();
            drop(writer);

            let written = fs::read_to_string(dir.path().join("lcov-report/index.txt")).unwrap();
            assert_eq!(written, "All files\n");
        }

        #[test]
        fn test_file_writer_rejects_escaping_paths() {
            let dir = TempDir::new().unwrap();
            let context = create_context(ContextOptions::new().with_dir(dir.path())).unwrap();

            for bad in ["/etc/passwd", "../outside.txt", "a/../../b.txt", ""] {
                let err = context.file_writer(bad).unwrap_err();
                assert!(matches!(err, CovTreeError::Config { .. }), "{bad:?}");
            }
        }

        #[test]
        fn test_console_writer() {
            let context = create_context(ContextOptions::new().with_dir("out")).unwrap();
            let writer = context.console_writer();
            assert!(writer.path().is_none());
        }
    }
}
