//! Nested summarizer: one summary node per directory below the common prefix.

use std::collections::HashMap;

use tracing::debug;

use super::{parse_files, relative_to};
use crate::coverage::{CoverageMap, FileCoverage};
use crate::path::CoveragePath;
use crate::result::TreeResult;
use crate::tree::{CoverageTree, NodeIndex, TreeBuilder};

/// Directory hierarchy below the common prefix of every file
///
/// The root stands for the common directory prefix (the base path). Every
/// directory between the base and a file gets a summary node aggregating its
/// whole subtree. Below the root, a directory holding no files and exactly
/// one subdirectory is merged with it into a single `parent/child` node.
///
/// # Errors
///
/// Returns `InvalidCoverageInput` for keys without path segments or keys that
/// normalize to the same path.
pub fn nested(map: &CoverageMap) -> TreeResult<CoverageTree> {
    let files = parse_files(map)?;
    let file_dirs: Vec<CoveragePath> = files.iter().map(|(path, _)| path.parent()).collect();
    let base = CoveragePath::common_prefix_of(&file_dirs);

    let mut layout = DirLayout::new();
    for (index, dir) in file_dirs.iter().enumerate() {
        let relative_dir = dir.strip_prefix(&base).unwrap_or_default();
        let dir = layout.ensure(&relative_dir);
        layout.dirs[dir].entries.push(Entry::File(index));
    }

    let base_name = base.to_string();
    let mut builder = TreeBuilder::new();
    let root = builder.add_root(base_name.clone());
    let emitter = Emitter {
        layout: &layout,
        files: &files,
        base: &base,
    };
    emitter.emit_entries(&mut builder, DirLayout::ROOT, root);

    let tree = builder.build(base_name);
    debug!(
        summarizer = "nested",
        files = map.len(),
        directories = layout.dirs.len(),
        nodes = tree.len(),
        base = %tree.base_path(),
        "built coverage tree"
    );
    Ok(tree)
}

#[derive(Debug, Clone, Copy)]
enum Entry {
    File(usize),
    Dir(usize),
}

#[derive(Debug)]
struct Dir {
    name: String,
    path: CoveragePath,
    entries: Vec<Entry>,
}

/// Directories relative to the base, children in first-appearance order
#[derive(Debug)]
struct DirLayout {
    dirs: Vec<Dir>,
    by_path: HashMap<CoveragePath, usize>,
}

impl DirLayout {
    const ROOT: usize = 0;

    fn new() -> Self {
        let root = Dir {
            name: String::new(),
            path: CoveragePath::default(),
            entries: Vec::new(),
        };
        Self {
            dirs: vec![root],
            by_path: HashMap::from([(CoveragePath::default(), Self::ROOT)]),
        }
    }

    /// Index of the directory at `path`, creating it and its ancestors
    ///
    /// An absolute `path` only reaches here when the base is relative (keys
    /// mix both kinds); it then hangs below a separate `/` directory so it
    /// never shares a node with the relative directory of the same name.
    fn ensure(&mut self, path: &CoveragePath) -> usize {
        let mut current = Self::ROOT;
        let mut walked = CoveragePath::default();
        if path.is_absolute() {
            walked = CoveragePath::root();
            current = self.child(current, "/", &walked);
        }
        for segment in path.segments() {
            walked = walked.join(segment);
            current = self.child(current, segment, &walked);
        }
        current
    }

    fn child(&mut self, parent: usize, name: &str, path: &CoveragePath) -> usize {
        if let Some(&index) = self.by_path.get(path) {
            return index;
        }
        let index = self.dirs.len();
        self.dirs.push(Dir {
            name: name.to_string(),
            path: path.clone(),
            entries: Vec::new(),
        });
        self.dirs[parent].entries.push(Entry::Dir(index));
        let _ = self.by_path.insert(path.clone(), index);
        index
    }

    /// Follow single-subdirectory chains, returning the merged name and the
    /// directory whose entries the merged node takes
    fn collapse(&self, start: usize) -> (String, usize) {
        let mut name = self.dirs[start].name.clone();
        let mut current = start;
        while let [Entry::Dir(only)] = self.dirs[current].entries.as_slice() {
            if !name.ends_with('/') {
                name.push('/');
            }
            name.push_str(&self.dirs[*only].name);
            current = *only;
        }
        (name, current)
    }
}

struct Emitter<'a> {
    layout: &'a DirLayout,
    files: &'a [(CoveragePath, &'a FileCoverage)],
    base: &'a CoveragePath,
}

impl Emitter<'_> {
    fn emit_entries(&self, builder: &mut TreeBuilder, dir: usize, parent: NodeIndex) {
        for entry in &self.layout.dirs[dir].entries {
            match *entry {
                Entry::File(index) => {
                    let (path, coverage) = &self.files[index];
                    let _ = builder.add_detail(
                        parent,
                        path.name(),
                        relative_to(path, self.base),
                        (*coverage).clone(),
                    );
                }
                Entry::Dir(child) => {
                    let (name, target) = self.layout.collapse(child);
                    let qualified = self.layout.dirs[target].path.to_string();
                    let node = builder.add_summary(parent, name, qualified);
                    self.emit_entries(builder, target, node);
                }
            }
        }
    }
}
