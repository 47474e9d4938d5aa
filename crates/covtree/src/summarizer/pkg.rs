//! Package summarizer: one summary node per containing directory.

use std::collections::HashMap;

use tracing::debug;

use super::{parse_files, relative_to};
use crate::coverage::CoverageMap;
use crate::path::CoveragePath;
use crate::result::TreeResult;
use crate::tree::{CoverageTree, TreeBuilder};

/// Name of the package made of files sitting directly at the base path
const BASE_PACKAGE: &str = ".";

/// One package per containing directory, all directly under the root
///
/// Packages are named relative to the common prefix of every package
/// directory and aggregate only the files directly inside them. With a
/// single package the root is that package.
///
/// # Errors
///
/// Returns `InvalidCoverageInput` for keys without path segments or keys that
/// normalize to the same path.
pub fn pkg(map: &CoverageMap) -> TreeResult<CoverageTree> {
    let files = parse_files(map)?;

    let mut packages: Vec<(CoveragePath, Vec<usize>)> = Vec::new();
    let mut by_dir: HashMap<CoveragePath, usize> = HashMap::new();
    for (index, (path, _)) in files.iter().enumerate() {
        let dir = path.parent();
        let slot = *by_dir.entry(dir.clone()).or_insert_with(|| {
            packages.push((dir, Vec::new()));
            packages.len() - 1
        });
        packages[slot].1.push(index);
    }

    let base = CoveragePath::common_prefix_of(packages.iter().map(|(dir, _)| dir));
    let base_name = base.to_string();

    let mut builder = TreeBuilder::new();
    let root = builder.add_root(base_name.clone());
    let single = packages.len() == 1;
    for (dir, members) in &packages {
        let parent = if single {
            root
        } else {
            let name = match relative_to(dir, &base) {
                name if name.is_empty() => BASE_PACKAGE.to_string(),
                name => name,
            };
            builder.add_summary(root, name.clone(), name)
        };

        for &index in members {
            let (path, coverage) = &files[index];
            let _ = builder.add_detail(
                parent,
                path.name(),
                relative_to(path, &base),
                (*coverage).clone(),
            );
        }
    }

    let tree = builder.build(base_name);
    debug!(
        summarizer = "pkg",
        files = map.len(),
        packages = packages.len(),
        nodes = tree.len(),
        base = %tree.base_path(),
        "built coverage tree"
    );
    Ok(tree)
}
