//! Property tests for the summarizers
//!
//! Random coverage maps are built from a small segment alphabet so that
//! directories are shared often and every strategy has something to group.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use covtree::prelude::*;
use proptest::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Relative or absolute path up to three directories deep
fn file_path() -> impl Strategy<Value = String> {
    (
        any::<bool>(),
        prop::collection::vec(prop::sample::select(vec!["src", "lib", "a", "b"]), 0..4),
        prop::sample::select(vec!["x.js", "y.js", "index.ts"]),
    )
        .prop_map(|(absolute, dirs, file)| {
            let mut path = if absolute { String::from("/") } else { String::new() };
            for dir in dirs {
                path.push_str(dir);
                path.push('/');
            }
            path.push_str(file);
            path
        })
}

/// File record with a statement per hit count and one function
fn file_coverage(path: String, hits: &[u64]) -> FileCoverage {
    let mut coverage = FileCoverage::new(path);
    for (line, &count) in (1..).zip(hits) {
        let _ = coverage.add_statement(line, count);
    }
    let _ = coverage.add_function("main", 1, hits.first().copied().unwrap_or(0));
    coverage
}

fn coverage_map() -> impl Strategy<Value = CoverageMap> {
    prop::collection::btree_map(file_path(), prop::collection::vec(0u64..3, 0..5), 0..12)
        .prop_map(|files| {
            files
                .into_iter()
                .fold(CoverageMap::new(), |map, (path, hits)| {
                    map.with_file(file_coverage(path, &hits)).unwrap()
                })
        })
}

/// Merge of every detail node in the subtree rooted at `node`
fn descendant_details(node: Node<'_>) -> CoverageSummary {
    let mut visitor = CallbackVisitor::<Node<'_>, CoverageSummary>::new().with_detail(|n, acc| {
        *acc = acc.merge(n.coverage_summary(false));
        Ok(())
    });
    let mut acc = CoverageSummary::empty();
    node.visit(&mut visitor, &mut acc).unwrap();
    acc
}

/// Qualified names of every detail in the subtree rooted at `node`
fn tree_details(node: Node<'_>) -> Vec<String> {
    let mut visitor = CallbackVisitor::<Node<'_>, Vec<String>>::new().with_detail(|n, names| {
        names.push(n.qualified_name().to_string());
        Ok(())
    });
    let mut names = Vec::new();
    node.visit(&mut visitor, &mut names).unwrap();
    names
}

fn event<'a>(name: &'static str) -> impl FnMut(&Node<'a>, &mut Vec<String>) -> TreeResult<()> {
    move |node, log| {
        log.push(format!("{name} {}", node.qualified_name()));
        Ok(())
    }
}

/// Every callback as `"<event> <qualified name>"`
fn event_log(tree: &CoverageTree) -> Vec<String> {
    let mut visitor = CallbackVisitor::<Node<'_>, Vec<String>>::new()
        .with_start(event("start"))
        .with_summary(event("summary"))
        .with_detail(event("detail"))
        .with_summary_end(event("summary_end"))
        .with_end(event("end"));

    let mut log = Vec::new();
    tree.visit(&mut visitor, &mut log).unwrap();
    log
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_details_partition_input(map in coverage_map()) {
        init_tracing();
        let expected: Vec<String> = map.files().map(String::from).collect();

        for kind in SummarizerKind::ALL {
            let tree = summarize(kind, &map).unwrap();
            let mut paths: Vec<String> = tree
                .details()
                .map(|n| n.file_coverage().unwrap().path.clone())
                .collect();
            paths.sort();
            prop_assert_eq!(&paths, &expected, "{}", kind);
        }
    }

    #[test]
    fn prop_root_summary_round_trips(map in coverage_map()) {
        let expected = map.summary();
        for kind in SummarizerKind::ALL {
            let tree = summarize(kind, &map).unwrap();
            prop_assert_eq!(tree.root().coverage_summary(false), &expected, "{}", kind);
        }
    }

    #[test]
    fn prop_exactly_one_summary_root(map in coverage_map()) {
        for kind in SummarizerKind::ALL {
            let tree = summarize(kind, &map).unwrap();
            let roots: Vec<_> = tree.iter().filter(Node::is_root).collect();
            prop_assert_eq!(roots.len(), 1);
            prop_assert!(roots[0].is_summary());
            prop_assert_eq!(tree.iter().count(), tree.len());
        }
    }

    #[test]
    fn prop_nested_summaries_cover_subtree(map in coverage_map()) {
        let tree = nested(&map).unwrap();
        for node in tree.iter().filter(Node::is_summary) {
            prop_assert_eq!(
                node.coverage_summary(false),
                &descendant_details(node),
                "{}",
                node.qualified_name()
            );
        }
    }

    #[test]
    fn prop_nested_details_sit_under_their_directory(map in coverage_map()) {
        let tree = nested(&map).unwrap();
        for node in tree.iter().filter(|n| n.is_summary() && !n.is_root()) {
            let prefix = format!("{}/", node.qualified_name().trim_end_matches('/'));
            for detail in tree_details(node) {
                prop_assert!(
                    detail.starts_with(&prefix),
                    "{} is not under {}",
                    detail,
                    node.qualified_name()
                );
            }
        }
    }

    #[test]
    fn prop_nested_collapses_single_child_dirs(map in coverage_map()) {
        let tree = nested(&map).unwrap();
        for node in tree.iter().filter(|n| n.is_summary() && !n.is_root()) {
            let children = node.children();
            let only_dir = children.len() == 1 && children[0].is_summary();
            prop_assert!(!only_dir, "{} was not collapsed", node.qualified_name());
        }
    }

    #[test]
    fn prop_pkg_packages_cover_direct_files_only(map in coverage_map()) {
        let tree = pkg(&map).unwrap();
        for node in tree.iter().filter(|n| n.is_summary() && !n.is_root()) {
            prop_assert_eq!(node.parent(), Some(tree.root()));
            prop_assert!(node.children().iter().all(|c| !c.is_summary()));
            prop_assert_eq!(node.coverage_summary(false), node.coverage_summary(true));
        }
    }

    #[test]
    fn prop_flat_is_one_level(map in coverage_map()) {
        let tree = flat(&map).unwrap();
        prop_assert_eq!(tree.len(), map.len() + 1);
        for child in tree.root().children() {
            prop_assert!(!child.is_summary());
            prop_assert_eq!(child.relative_name(), child.qualified_name());
        }
    }

    #[test]
    fn prop_builds_are_deterministic(map in coverage_map()) {
        for kind in SummarizerKind::ALL {
            let first = summarize(kind, &map).unwrap();
            let second = summarize(kind, &map).unwrap();
            prop_assert_eq!(event_log(&first), event_log(&second));
            prop_assert_eq!(event_log(&first), event_log(&first));
        }
    }

    #[test]
    fn prop_summary_end_after_descendants(map in coverage_map()) {
        let tree = nested(&map).unwrap();
        let log = event_log(&tree);
        for node in tree.iter().filter(Node::is_summary) {
            let name = node.qualified_name();
            let start = log.iter().position(|e| *e == format!("summary {name}")).unwrap();
            let end = log.iter().position(|e| *e == format!("summary_end {name}")).unwrap();
            prop_assert!(start < end);
            for detail in node.children().iter().filter(|c| !c.is_summary()) {
                let at = log
                    .iter()
                    .position(|e| *e == format!("detail {}", detail.qualified_name()))
                    .unwrap();
                prop_assert!(start < at && at < end);
            }
        }
    }
}

#[test]
fn test_flat_example_from_two_files() {
    init_tracing();
    let map = CoverageMap::new()
        .with_file(FileCoverage::new("a.js").with_statement(1, 1))
        .unwrap()
        .with_file(FileCoverage::new("b/c.js").with_statement(1, 0))
        .unwrap();

    let tree = flat(&map).unwrap();
    let names: Vec<_> = tree.root().children().iter().map(|c| c.relative_name()).collect();
    assert_eq!(names, ["a.js", "b/c.js"]);
}

#[test]
fn test_context_end_to_end() {
    init_tracing();
    let dir = tempfile::TempDir::new().unwrap();
    let map = CoverageMap::from_json(
        r#"{
            "src/app.js": {"statements": {"0": {"line": 1, "hits": 1}, "1": {"line": 2, "hits": 0}}},
            "src/util/fmt.js": {"statements": {"0": {"line": 1, "hits": 4}}}
        }"#,
    )
    .unwrap();
    let context = create_context(
        ContextOptions::new()
            .with_dir(dir.path())
            .with_coverage_map(map),
    )
    .unwrap();

    let tree = context.default_tree().unwrap();
    let mut writer = context.file_writer("summary.txt").unwrap();
    let mut visitor = CallbackVisitor::<Node<'_>, ContentWriter>::new().with_summary(|node, out| {
        if node.is_root() {
            return Ok(());
        }
        let totals = node.coverage_summary(false).statements;
        let status = context.classify(Metric::Statements, totals.pct);
        out.println(&format!("{} {} {status}", node.relative_name(), totals.pct))
    });
    tree.visit(&mut visitor, &mut writer).unwrap();
    writer.close().unwrap();

    let written = std::fs::read_to_string(dir.path().join("summary.txt")).unwrap();
    assert_eq!(written, ". 50.00 medium\nutil 100.00 high\n");
}
