//! Summarizer and Traversal Benchmarks
//!
//! Run with: `cargo bench --bench summarize_ops`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use covtree::{summarize, CallbackVisitor, CoverageMap, FileCoverage, Node, SummarizerKind};

/// Map of `files` records spread over a few levels of directories
fn synthetic_map(files: usize) -> CoverageMap {
    let mut map = CoverageMap::new();
    for i in 0..files {
        let path = format!("src/mod{}/sub{}/file{}.js", i % 7, i % 3, i);
        let mut coverage = FileCoverage::new(path);
        for line in 1..=20u32 {
            let _ = coverage.add_statement(line, u64::from(line) % 3);
        }
        let _ = coverage.add_branch(5, vec![1, 0]);
        let _ = coverage.add_function("f", 1, (i % 2) as u64);
        if let Err(err) = map.add_file_coverage(coverage) {
            panic!("synthetic map: {err}");
        }
    }
    map
}

fn bench_summarize(c: &mut Criterion) {
    let mut group = c.benchmark_group("summarize");

    for files in [10, 100, 1000] {
        let map = synthetic_map(files);
        for kind in SummarizerKind::ALL {
            group.bench_with_input(
                BenchmarkId::new(kind.as_str(), files),
                &map,
                |bench, map| {
                    bench.iter(|| black_box(summarize(kind, black_box(map))));
                },
            );
        }
    }

    group.finish();
}

fn bench_visit(c: &mut Criterion) {
    let mut group = c.benchmark_group("visit");

    for files in [100, 1000] {
        let map = synthetic_map(files);
        let Ok(tree) = summarize(SummarizerKind::Nested, &map) else {
            continue;
        };
        group.bench_with_input(BenchmarkId::from_parameter(files), &tree, |bench, tree| {
            bench.iter(|| {
                let mut visitor = CallbackVisitor::<Node<'_>, u64>::new().with_detail(|node, acc| {
                    *acc += node.coverage_summary(false).statements.covered;
                    Ok(())
                });
                let mut covered = 0;
                let _ = tree.visit(&mut visitor, &mut covered);
                black_box(covered)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_summarize, bench_visit);
criterion_main!(benches);
