//! Flat summarizer: every file directly under a single root.

use tracing::debug;

use super::parse_files;
use crate::coverage::CoverageMap;
use crate::result::TreeResult;
use crate::tree::{CoverageTree, TreeBuilder};

/// Single root with every file directly beneath it
///
/// Relative and qualified names are the full normalized file paths and the
/// base path is empty.
///
/// # Errors
///
/// Returns `InvalidCoverageInput` for keys without path segments or keys that
/// normalize to the same path.
pub fn flat(map: &CoverageMap) -> TreeResult<CoverageTree> {
    let files = parse_files(map)?;

    let mut builder = TreeBuilder::new();
    let root = builder.add_root("");
    for (path, coverage) in files {
        let name = path.to_string();
        let _ = builder.add_detail(root, name.clone(), name, coverage.clone());
    }

    let tree = builder.build("");
    debug!(
        summarizer = "flat",
        files = map.len(),
        nodes = tree.len(),
        "built coverage tree"
    );
    Ok(tree)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::coverage::FileCoverage;
    use crate::summary::Totals;

    #[test]
    fn test_flat_two_files() {
        let map = CoverageMap::new()
            .with_file(FileCoverage::new("a.js").with_statement(1, 1))
            .unwrap()
            .with_file(FileCoverage::new("b/c.js").with_statement(1, 0))
            .unwrap();

        let tree = flat(&map).unwrap();
        let root = tree.root();
        let children = root.children();

        assert!(root.is_summary());
        assert_eq!(tree.base_path(), "");
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].relative_name(), "a.js");
        assert_eq!(children[0].qualified_name(), "a.js");
        assert_eq!(children[1].relative_name(), "b/c.js");
        assert_eq!(children[1].qualified_name(), "b/c.js");
        assert!(children.iter().all(|c| !c.is_summary()));
        assert_eq!(root.coverage_summary(false).statements, Totals::new(2, 1, 0));
    }

    #[test]
    fn test_flat_normalizes_names() {
        let map = CoverageMap::new()
            .with_file(FileCoverage::new("./src\\win.js"))
            .unwrap();
        let tree = flat(&map).unwrap();
        assert_eq!(tree.root().children()[0].qualified_name(), "src/win.js");
    }

    #[test]
    fn test_flat_empty_map_is_lone_root() {
        let tree = flat(&CoverageMap::new()).unwrap();
        assert_eq!(tree.len(), 1);
        assert!(tree.root().children().is_empty());
        assert!(tree.root().coverage_summary(false).is_empty());
    }

    #[test]
    fn test_flat_files_summary_equals_full_summary() {
        let map = CoverageMap::new()
            .with_file(FileCoverage::new("x/a.js").with_function("f", 1, 1))
            .unwrap()
            .with_file(FileCoverage::new("y/b.js").with_function("g", 1, 0))
            .unwrap();
        let tree = flat(&map).unwrap();
        let root = tree.root();
        assert_eq!(root.coverage_summary(true), root.coverage_summary(false));
    }
}
