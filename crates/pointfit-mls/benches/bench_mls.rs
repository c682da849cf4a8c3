use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use pointfit_3d::PointSet;
use pointfit_mls::{smooth_mls_1d, smooth_mls_2d, MlsParams};

fn noisy_surface(side: usize) -> PointSet {
    let mut points = Vec::with_capacity(side * side);
    for i in 0..side {
        for j in 0..side {
            let (x, y) = (i as f64 / side as f64, j as f64 / side as f64);
            let z = (x * 6.0).sin() * 0.1 + (rand::random::<f64>() - 0.5) * 0.01;
            points.push([x, y, z]);
        }
    }
    PointSet::from_points(points)
}

fn noisy_curve(num_points: usize) -> PointSet {
    let points = (0..num_points)
        .map(|i| {
            let t = i as f64 / num_points as f64 * std::f64::consts::TAU;
            let jitter = (rand::random::<f64>() - 0.5) * 0.02;
            [t.cos() + jitter, t.sin() + jitter, 0.0]
        })
        .collect();
    PointSet::from_points(points)
}

fn bench_mls(c: &mut Criterion) {
    let mut group = c.benchmark_group("mls");

    for side in [32, 64, 128].iter() {
        let num_points = side * side;
        group.throughput(criterion::Throughput::Elements(num_points as u64));
        let parameter_string = format!("{}", num_points);

        let surface = noisy_surface(*side);
        surface.locator();
        group.bench_with_input(
            BenchmarkId::new("smooth_mls_2d", &parameter_string),
            &surface,
            |b, surface| {
                b.iter(|| black_box(smooth_mls_2d(surface, &MlsParams::default()).unwrap()))
            },
        );

        let curve = noisy_curve(num_points);
        curve.locator();
        let params = MlsParams {
            smoothing_factor: 0.2,
            radius: Some(0.05),
        };
        group.bench_with_input(
            BenchmarkId::new("smooth_mls_1d", &parameter_string),
            &curve,
            |b, curve| b.iter(|| black_box(smooth_mls_1d(curve, &params).unwrap())),
        );
    }
}

criterion_group!(benches, bench_mls);
criterion_main!(benches);
