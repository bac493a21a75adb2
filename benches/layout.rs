use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use mission_graph::config::Config;
use mission_graph::ir::{GraphSnapshot, NodeKey};
use mission_graph::layout::compute_layout;
use mission_graph::view::GraphView;
use std::hint::black_box;

/// Alternating objective/outcome chain with `fan_in` extra objectives feeding every
/// outcome and `loose` unconnected objectives.
fn chain_snapshot(steps: usize, fan_in: usize, loose: usize) -> GraphSnapshot {
    let mut snapshot = GraphSnapshot::new();
    for i in 0..steps {
        let obj = NodeKey::objective(format!("O{i}"));
        let out = NodeKey::outcome(format!("X{i}"));
        snapshot.ensure_objective(&obj.id);
        snapshot.ensure_outcome(&out.id);
        snapshot.push_link(&obj, &out);
        if i + 1 < steps {
            snapshot.push_link(&out, &NodeKey::objective(format!("O{}", i + 1)));
        }
        for j in 0..fan_in {
            let extra = NodeKey::objective(format!("F{i}_{j}"));
            snapshot.ensure_objective(&extra.id);
            snapshot.push_link(&extra, &out);
        }
    }
    for i in 0..loose {
        snapshot.ensure_objective(&format!("L{i}"));
    }
    snapshot
}

fn cases() -> Vec<(&'static str, GraphSnapshot)> {
    vec![
        ("chain_tiny", chain_snapshot(4, 0, 0)),
        ("chain_medium", chain_snapshot(50, 1, 5)),
        ("fan_in_medium", chain_snapshot(20, 6, 0)),
        ("chain_large", chain_snapshot(400, 2, 40)),
    ]
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    for (name, snapshot) in cases() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &snapshot, |b, data| {
            b.iter(|| {
                let laid_out = compute_layout(black_box(data));
                black_box(laid_out.objectives.len());
            });
        });
    }
    group.finish();
}

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("rebuild");
    for (name, snapshot) in cases() {
        let mut view = GraphView::with_default_host(Config::default());
        group.bench_with_input(BenchmarkId::from_parameter(name), &snapshot, |b, data| {
            b.iter(|| {
                view.rebuild(black_box(data.clone()), true, true);
                black_box(view.scene().connections.len());
            });
        });
    }
    group.finish();
}

fn bench_focus_toggle(c: &mut Criterion) {
    let mut group = c.benchmark_group("focus_toggle");
    for (name, snapshot) in cases() {
        let mut view = GraphView::with_default_host(Config::default());
        view.rebuild(snapshot, true, true);
        let center = NodeKey::outcome("X0");
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| {
                // Enter then exit, so every iteration starts from the full graph.
                view.toggle_focus(black_box(&center));
                view.toggle_focus(&center);
                black_box(view.grid_phase());
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_layout, bench_rebuild, bench_focus_toggle
);
criterion_main!(benches);
