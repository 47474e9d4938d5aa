//! Arena construction for [`CoverageTree`].
//!
//! Parents are always added before their children, so every child index is
//! larger than its parent's. [`TreeBuilder::build`] relies on that to fold
//! summaries bottom-up in a single reverse pass.

use super::{CoverageTree, NodeData, NodeIndex, NodeKind};
use crate::coverage::FileCoverage;
use crate::summary::CoverageSummary;

#[derive(Debug, Default)]
pub(crate) struct TreeBuilder {
    nodes: Vec<NodeData>,
}

impl TreeBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds the root summary node. Must be the first node added.
    pub(crate) fn add_root(&mut self, relative_name: impl Into<String>) -> NodeIndex {
        debug_assert!(self.nodes.is_empty(), "root must be added first");
        self.push(
            None,
            relative_name.into(),
            String::new(),
            NodeKind::Summary {
                children: Vec::new(),
            },
        )
    }

    /// Adds a summary node under `parent`.
    pub(crate) fn add_summary(
        &mut self,
        parent: NodeIndex,
        relative_name: impl Into<String>,
        qualified_name: impl Into<String>,
    ) -> NodeIndex {
        self.push(
            Some(parent),
            relative_name.into(),
            qualified_name.into(),
            NodeKind::Summary {
                children: Vec::new(),
            },
        )
    }

    /// Adds a detail node wrapping `coverage` under `parent`.
    pub(crate) fn add_detail(
        &mut self,
        parent: NodeIndex,
        relative_name: impl Into<String>,
        qualified_name: impl Into<String>,
        coverage: FileCoverage,
    ) -> NodeIndex {
        self.push(
            Some(parent),
            relative_name.into(),
            qualified_name.into(),
            NodeKind::Detail { coverage },
        )
    }

    fn push(
        &mut self,
        parent: Option<NodeIndex>,
        relative_name: String,
        qualified_name: String,
        kind: NodeKind,
    ) -> NodeIndex {
        let index = self.nodes.len();
        self.nodes.push(NodeData {
            qualified_name,
            relative_name,
            parent,
            kind,
            summary: CoverageSummary::empty(),
            files_summary: CoverageSummary::empty(),
        });

        // Only summary indices are ever handed out as parents
        if let Some(NodeKind::Summary { children }) =
            parent.map(|parent| &mut self.nodes[parent].kind)
        {
            children.push(index);
        }
        index
    }

    /// Computes every node's summaries and freezes the tree.
    pub(crate) fn build(mut self, base_path: impl Into<String>) -> CoverageTree {
        for index in (0..self.nodes.len()).rev() {
            let (summary, files_summary) = match &self.nodes[index].kind {
                NodeKind::Detail { coverage } => {
                    let summary = coverage.to_summary();
                    (summary.clone(), summary)
                }
                NodeKind::Summary { children } => {
                    let mut all = CoverageSummary::empty();
                    let mut files = CoverageSummary::empty();
                    for &child in children {
                        let child = &self.nodes[child];
                        all = all.merge(&child.summary);
                        if matches!(child.kind, NodeKind::Detail { .. }) {
                            files = files.merge(&child.summary);
                        }
                    }
                    (all, files)
                }
            };
            let node = &mut self.nodes[index];
            node.summary = summary;
            node.files_summary = files_summary;
        }

        CoverageTree {
            nodes: self.nodes,
            root: 0,
            base_path: base_path.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::summary::Totals;

    #[test]
    fn test_builder_links_parent_and_children() {
        let mut builder = TreeBuilder::new();
        let root = builder.add_root("");
        let dir = builder.add_summary(root, "lib", "lib");
        let file = builder.add_detail(dir, "a.js", "lib/a.js", FileCoverage::new("lib/a.js"));
        let tree = builder.build("");

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.node(file).unwrap().parent().unwrap().index(), dir);
        assert_eq!(tree.root().children()[0].index(), dir);
        assert!(tree.root().is_root());
    }

    #[test]
    fn test_build_aggregates_bottom_up() {
        let mut builder = TreeBuilder::new();
        let root = builder.add_root("");
        let _ = builder.add_detail(
            root,
            "top.js",
            "top.js",
            FileCoverage::new("top.js").with_statement(1, 1),
        );
        let dir = builder.add_summary(root, "lib", "lib");
        let _ = builder.add_detail(
            dir,
            "a.js",
            "lib/a.js",
            FileCoverage::new("lib/a.js").with_statement(1, 0),
        );
        let tree = builder.build("");
        let root = tree.root();

        assert_eq!(root.coverage_summary(false).statements, Totals::new(2, 1, 0));
        assert_eq!(root.coverage_summary(true).statements, Totals::new(1, 1, 0));
        assert_eq!(
            tree.node(dir).unwrap().coverage_summary(false).statements,
            Totals::new(1, 0, 0)
        );
    }
}
