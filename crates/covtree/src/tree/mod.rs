//! Coverage Trees
//!
//! Summary trees over per-file coverage, and the traversal protocol report
//! generators use to walk them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  CoverageTree (arena)                                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  [0] root ── summary ──┬── [1] lib ── summary ── [2] a.js       │
//! │                        └── [3] b.js ── detail                   │
//! │                                                                 │
//! │  visit: on_start → on_summary → (children) → on_summary_end    │
//! │         → on_end; detail nodes get on_detail                    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nodes live in a `Vec` owned by the tree and refer to their parent and
//! children by [`NodeIndex`]. [`Node`] is a cheap `Copy` handle into that
//! arena. The [`ReportNode`] and [`ReportTree`] traits describe the same
//! capability set for any other node representation; their accessors fail
//! with [`CovTreeError::Unimplemented`] unless overridden.

mod builder;
mod visitor;

pub(crate) use builder::TreeBuilder;
pub use visitor::{CallbackVisitor, CompositeVisitor, Visitor};

use std::fmt;

use crate::coverage::FileCoverage;
use crate::result::{CovTreeError, TreeResult};
use crate::summary::CoverageSummary;

/// Index of a node in a tree (arena).
pub type NodeIndex = usize;

#[derive(Debug, Clone)]
enum NodeKind {
    Summary { children: Vec<NodeIndex> },
    Detail { coverage: FileCoverage },
}

#[derive(Debug, Clone)]
struct NodeData {
    qualified_name: String,
    relative_name: String,
    parent: Option<NodeIndex>,
    kind: NodeKind,
    /// Merge of every detail below (or the file itself for details)
    summary: CoverageSummary,
    /// Merge of direct detail children only
    files_summary: CoverageSummary,
}

// ============================================================================
// Abstract protocol
// ============================================================================

/// Capability set every report node provides
///
/// All accessors have failing defaults so a partial implementation surfaces
/// as [`CovTreeError::Unimplemented`] at traversal time instead of silently
/// producing an empty report.
pub trait ReportNode: Sized {
    /// Path of this node relative to the tree's base
    fn qualified_name(&self) -> TreeResult<&str> {
        Err(CovTreeError::unimplemented("qualified_name"))
    }

    /// Name of this node relative to its parent
    fn relative_name(&self) -> TreeResult<&str> {
        Err(CovTreeError::unimplemented("relative_name"))
    }

    /// Owning summary node, `None` for the root
    fn parent(&self) -> TreeResult<Option<Self>> {
        Err(CovTreeError::unimplemented("parent"))
    }

    /// Children in traversal order (empty for detail nodes)
    fn children(&self) -> TreeResult<Vec<Self>> {
        Err(CovTreeError::unimplemented("children"))
    }

    /// Whether this is a summary (aggregate) node
    fn is_summary(&self) -> TreeResult<bool> {
        Err(CovTreeError::unimplemented("is_summary"))
    }

    /// Aggregate coverage; with `files_only`, only direct file children count
    fn coverage_summary(&self, files_only: bool) -> TreeResult<CoverageSummary> {
        let _ = files_only;
        Err(CovTreeError::unimplemented("coverage_summary"))
    }

    /// Wrapped file record, `None` for summary nodes
    fn file_coverage(&self) -> TreeResult<Option<&FileCoverage>> {
        Err(CovTreeError::unimplemented("file_coverage"))
    }

    /// Whether this node has no parent
    fn is_root(&self) -> TreeResult<bool> {
        Ok(self.parent()?.is_none())
    }

    /// Depth-first traversal of the subtree rooted here
    ///
    /// Summary nodes get `on_summary` before their children and
    /// `on_summary_end` after all of them; detail nodes get `on_detail`.
    /// The first callback error aborts the traversal and is returned as is.
    fn visit<S, V>(&self, visitor: &mut V, state: &mut S) -> TreeResult<()>
    where
        V: Visitor<Self, S> + ?Sized,
    {
        let summary = self.is_summary()?;
        if summary {
            visitor.on_summary(self, state)?;
        } else {
            visitor.on_detail(self, state)?;
        }

        for child in self.children()? {
            child.visit(visitor, state)?;
        }

        if summary {
            visitor.on_summary_end(self, state)?;
        }
        Ok(())
    }
}

/// A tree of report nodes with a single summary root
pub trait ReportTree {
    /// Node handle type
    type Node<'a>: ReportNode
    where
        Self: 'a;

    /// Root node
    fn root(&self) -> TreeResult<Self::Node<'_>> {
        Err(CovTreeError::unimplemented("root"))
    }

    /// Full traversal: `on_start`, the depth-first walk, then `on_end`
    fn visit<'a, S, V>(&'a self, visitor: &mut V, state: &mut S) -> TreeResult<()>
    where
        V: Visitor<Self::Node<'a>, S> + ?Sized,
    {
        let root = self.root()?;
        visitor.on_start(&root, state)?;
        root.visit(visitor, state)?;
        visitor.on_end(&root, state)
    }
}

// ============================================================================
// Concrete tree
// ============================================================================

/// Coverage tree built by a summarizer
///
/// Immutable once built. Summaries are computed during construction so
/// traversals only read.
#[derive(Debug, Clone)]
pub struct CoverageTree {
    nodes: Vec<NodeData>,
    root: NodeIndex,
    base_path: String,
}

impl CoverageTree {
    /// Root node
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        Node {
            tree: self,
            index: self.root,
        }
    }

    /// Node at `index`, if it exists
    #[must_use]
    pub fn node(&self, index: NodeIndex) -> Option<Node<'_>> {
        (index < self.nodes.len()).then_some(Node { tree: self, index })
    }

    /// Directory prefix that qualified names are relative to
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Number of nodes, root included
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in depth-first pre-order (visit order)
    pub fn iter(&self) -> impl Iterator<Item = Node<'_>> {
        let mut stack = vec![self.root];
        std::iter::from_fn(move || {
            let index = stack.pop()?;
            if let NodeKind::Summary { children } = &self.nodes[index].kind {
                stack.extend(children.iter().rev());
            }
            Some(Node { tree: self, index })
        })
    }

    /// Detail nodes in visit order
    pub fn details(&self) -> impl Iterator<Item = Node<'_>> {
        self.iter().filter(|n| !n.is_summary())
    }

    /// Find a node by qualified name
    #[must_use]
    pub fn find(&self, qualified_name: &str) -> Option<Node<'_>> {
        self.iter().find(|n| n.qualified_name() == qualified_name)
    }

    /// Run a full traversal with `visitor`
    pub fn visit<'a, S, V>(&'a self, visitor: &mut V, state: &mut S) -> TreeResult<()>
    where
        V: Visitor<Node<'a>, S> + ?Sized,
    {
        tracing::trace!(nodes = self.nodes.len(), base = %self.base_path, "visiting coverage tree");
        <Self as ReportTree>::visit(self, visitor, state)
    }
}

impl ReportTree for CoverageTree {
    type Node<'a> = Node<'a>;

    fn root(&self) -> TreeResult<Node<'_>> {
        Ok(CoverageTree::root(self))
    }
}

/// Handle to a node inside a [`CoverageTree`]
#[derive(Clone, Copy)]
pub struct Node<'a> {
    tree: &'a CoverageTree,
    index: NodeIndex,
}

impl<'a> Node<'a> {
    fn data(&self) -> &'a NodeData {
        &self.tree.nodes[self.index]
    }

    /// Arena index of this node
    #[must_use]
    pub fn index(&self) -> NodeIndex {
        self.index
    }

    /// Tree this node belongs to
    #[must_use]
    pub fn tree(&self) -> &'a CoverageTree {
        self.tree
    }

    /// Path of this node relative to the tree's base
    #[must_use]
    pub fn qualified_name(&self) -> &'a str {
        &self.data().qualified_name
    }

    /// Name of this node relative to its parent
    #[must_use]
    pub fn relative_name(&self) -> &'a str {
        &self.data().relative_name
    }

    /// Owning summary node, `None` for the root
    #[must_use]
    pub fn parent(&self) -> Option<Node<'a>> {
        self.data().parent.map(|index| Node {
            tree: self.tree,
            index,
        })
    }

    /// Children in traversal order
    #[must_use]
    pub fn children(&self) -> Vec<Node<'a>> {
        match &self.data().kind {
            NodeKind::Summary { children } => children
                .iter()
                .map(|&index| Node {
                    tree: self.tree,
                    index,
                })
                .collect(),
            NodeKind::Detail { .. } => Vec::new(),
        }
    }

    /// Whether this is a summary node
    #[must_use]
    pub fn is_summary(&self) -> bool {
        matches!(self.data().kind, NodeKind::Summary { .. })
    }

    /// Whether this node has no parent
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.data().parent.is_none()
    }

    /// Aggregate coverage; with `files_only`, only direct file children count
    ///
    /// For detail nodes both modes return the file's own summary.
    #[must_use]
    pub fn coverage_summary(&self, files_only: bool) -> &'a CoverageSummary {
        let data = self.data();
        if files_only {
            &data.files_summary
        } else {
            &data.summary
        }
    }

    /// Wrapped file record, `None` for summary nodes
    #[must_use]
    pub fn file_coverage(&self) -> Option<&'a FileCoverage> {
        match &self.data().kind {
            NodeKind::Detail { coverage } => Some(coverage),
            NodeKind::Summary { .. } => None,
        }
    }

    /// Number of ancestors
    #[must_use]
    pub fn depth(&self) -> usize {
        std::iter::successors(self.parent(), Node::parent).count()
    }

    /// Depth-first traversal of the subtree rooted here
    pub fn visit<S, V>(&self, visitor: &mut V, state: &mut S) -> TreeResult<()>
    where
        V: Visitor<Node<'a>, S> + ?Sized,
    {
        <Self as ReportNode>::visit(self, visitor, state)
    }
}

impl ReportNode for Node<'_> {
    fn qualified_name(&self) -> TreeResult<&str> {
        Ok(Node::qualified_name(self))
    }

    fn relative_name(&self) -> TreeResult<&str> {
        Ok(Node::relative_name(self))
    }

    fn parent(&self) -> TreeResult<Option<Self>> {
        Ok(Node::parent(self))
    }

    fn children(&self) -> TreeResult<Vec<Self>> {
        Ok(Node::children(self))
    }

    fn is_summary(&self) -> TreeResult<bool> {
        Ok(Node::is_summary(self))
    }

    fn coverage_summary(&self, files_only: bool) -> TreeResult<CoverageSummary> {
        Ok(Node::coverage_summary(self, files_only).clone())
    }

    fn file_coverage(&self) -> TreeResult<Option<&FileCoverage>> {
        Ok(Node::file_coverage(self))
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.index == other.index
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("index", &self.index)
            .field("qualified_name", &self.qualified_name())
            .field("is_summary", &self.is_summary())
            .finish()
    }
}
