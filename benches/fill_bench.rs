use criterion::{Criterion, criterion_group, criterion_main};
use plotline::core::{CartesianCoordinateSystem, LogicalPoint, PlotExtent};
use plotline::curve::{FillAnchor, build_fill};
use std::hint::black_box;

fn bench_point_mapping_10k(c: &mut Criterion) {
    let extent = PlotExtent::new(0.0, 10_000.0, -1.5, 1.5).expect("valid extent");
    let cs = CartesianCoordinateSystem::linear(extent, 1920.0, 1080.0)
        .expect("valid coordinate system");
    let points: Vec<LogicalPoint> = (0..10_000)
        .map(|i| {
            let x = i as f64;
            LogicalPoint::new(x, (x * 0.01).sin())
        })
        .collect();

    c.bench_function("point_mapping_10k", |b| {
        b.iter(|| {
            let mapped = cs.map_points(black_box(&points));
            black_box(mapped.scene.len())
        })
    });
}

fn bench_fill_build_10k(c: &mut Criterion) {
    let extent = PlotExtent::new(0.0, 10_000.0, -1.5, 1.5).expect("valid extent");
    let cs = CartesianCoordinateSystem::linear(extent, 1920.0, 1080.0)
        .expect("valid coordinate system");
    let points: Vec<LogicalPoint> = (0..10_000)
        .map(|i| {
            let x = i as f64;
            LogicalPoint::new(x, (x * 0.01).sin())
        })
        .collect();
    // Every 500th pair is a gap, so splitting has work to do.
    let connected: Vec<bool> = (0..points.len()).map(|i| i % 500 != 499).collect();

    c.bench_function("fill_build_10k_bridged", |b| {
        b.iter(|| {
            let polygons = build_fill(
                black_box(&points),
                &connected,
                &[],
                &cs,
                FillAnchor::ZeroBaseline,
                false,
            );
            black_box(polygons.len())
        })
    });

    c.bench_function("fill_build_10k_split", |b| {
        b.iter(|| {
            let polygons = build_fill(
                black_box(&points),
                &connected,
                &[],
                &cs,
                FillAnchor::ZeroBaseline,
                true,
            );
            black_box(polygons.len())
        })
    });
}

criterion_group!(benches, bench_point_mapping_10k, bench_fill_build_10k);
criterion_main!(benches);
