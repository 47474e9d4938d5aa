//! covtree: Coverage Summary Trees
//!
//! Turns a flat map of per-file coverage records into a tree of aggregated
//! summaries, and gives report generators one traversal protocol to walk it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    COVTREE Architecture                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Coverage   │    │ Summarizer │    │ Coverage   │            │
//! │   │ Map        │───►│ flat /     │───►│ Tree       │            │
//! │   │ (per file) │    │ nested/pkg │    │ (arena)    │            │
//! │   └────────────┘    └────────────┘    └─────┬──────┘            │
//! │                                             │ visit             │
//! │   ┌────────────┐    ┌────────────┐    ┌─────▼──────┐            │
//! │   │ Context    │───►│ Report     │◄───│ Composite  │            │
//! │   │ watermarks │    │ Visitors   │    │ Visitor    │            │
//! │   │ + writers  │    │            │    │            │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use covtree::{nested, CallbackVisitor, CoverageMap, FileCoverage, Node};
//!
//! let map = CoverageMap::new()
//!     .with_file(FileCoverage::new("src/lib/a.js").with_statement(1, 1))
//!     .unwrap()
//!     .with_file(FileCoverage::new("src/b.js").with_statement(1, 0))
//!     .unwrap();
//!
//! let tree = nested(&map).unwrap();
//! assert_eq!(tree.base_path(), "src");
//!
//! let mut visitor = CallbackVisitor::<Node<'_>, Vec<String>>::new().with_summary(|node, out| {
//!     let pct = node.coverage_summary(false).statements.pct;
//!     out.push(format!("{} {pct}", node.qualified_name()));
//!     Ok(())
//! });
//! let mut lines = Vec::new();
//! tree.visit(&mut visitor, &mut lines).unwrap();
//! assert_eq!(lines, [" 50.00", "lib 100.00"]);
//! ```

#![warn(missing_docs)]

/// Coverage counts and percentages per metric
pub mod summary;

/// Raw per-file coverage records and the path-keyed coverage map
pub mod coverage;

/// Path decomposition for grouping files by directory
pub mod path;

/// Tree, node and visitor protocol
pub mod tree;

/// Tree-construction strategies
pub mod summarizer;

/// Watermark thresholds
pub mod watermarks;

/// Reporting context
pub mod context;

/// Scoped report writers
pub mod writer;

mod result;

pub use context::{create_context, Context, ContextOptions};
pub use coverage::{BranchCoverage, CoverageMap, FileCoverage, FunctionCoverage, StatementCoverage};
pub use path::CoveragePath;
pub use result::{CovTreeError, TreeResult};
pub use summarizer::{flat, nested, pkg, summarize, SummarizerKind};
pub use summary::{CoverageSummary, Metric, Percentage, Totals};
pub use tree::{
    CallbackVisitor, CompositeVisitor, CoverageTree, Node, NodeIndex, ReportNode, ReportTree,
    Visitor,
};
pub use watermarks::{Status, Watermark, WatermarkOverrides, Watermarks};
pub use writer::ContentWriter;

/// Prelude for convenient imports
pub mod prelude {
    pub use super::context::*;
    pub use super::coverage::*;
    pub use super::result::*;
    pub use super::summarizer::*;
    pub use super::summary::*;
    pub use super::tree::*;
    pub use super::watermarks::*;
    pub use super::writer::*;
}
