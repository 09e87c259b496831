//! Benchmarks for the parametric minimum cut solver
//!
//! Measures:
//! - Full parametric sweeps over selection-style instances
//! - Single-lambda solves (degenerate range)
//! - Scaling in the number of parametric gadgets

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use parametric_mincut::{ParametricGraph, ParametricSolver, SolveOptions};
use rand::prelude::*;

/// A selection instance: every interior node trades a growing source arc
/// against a constant sink arc, with a sprinkling of interior arcs.
fn selection_instance(interior: usize, interior_arcs: usize, seed: u64) -> ParametricGraph {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let n = interior + 2;
    let sink = n - 1;
    let mut graph = ParametricGraph::new(n, 0, sink).unwrap();

    for v in 1..=interior {
        let weight: f64 = rng.gen_range(0.5..5.0);
        graph.add_arc(0, v, 0.0, rng.gen_range(0.5..2.0)).unwrap();
        graph.add_arc(v, sink, weight, 0.0).unwrap();
    }

    let mut added = 0;
    while added < interior_arcs {
        let u = rng.gen_range(1..=interior);
        let v = rng.gen_range(1..=interior);
        if u == v {
            continue;
        }
        graph.add_arc(u, v, rng.gen_range(0.1..1.0), 0.0).unwrap();
        added += 1;
    }

    graph
}

fn bench_parametric_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("parametric_sweep");
    for &interior in &[10usize, 50, 200] {
        let graph = selection_instance(interior, interior * 2, 42);
        group.bench_with_input(BenchmarkId::from_parameter(interior), &graph, |b, graph| {
            b.iter(|| {
                let solution = ParametricSolver::new(graph.clone())
                    .lambda_range(0.0, 10.0)
                    .solve()
                    .unwrap();
                black_box(solution.num_breakpoints())
            });
        });
    }
    group.finish();
}

fn bench_single_cut(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_cut");
    for &interior in &[50usize, 500] {
        let graph = selection_instance(interior, interior * 3, 7);
        group.bench_with_input(BenchmarkId::from_parameter(interior), &graph, |b, graph| {
            b.iter(|| {
                let options = SolveOptions::with_range(1.0, 1.0);
                let solution = ParametricSolver::new(graph.clone())
                    .with_options(options)
                    .solve()
                    .unwrap();
                black_box(solution.cut(0).len())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parametric_sweep, bench_single_cut);
criterion_main!(benches);
