#![allow(clippy::expect_used, clippy::unwrap_used, missing_docs)]
//! Benchmark for filled and line contouring.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use geocat_gallery::dataset::Grid;
use geocat_gallery::plots::{Contour, Levels};
use geocat_gallery::scale::{arange, linspace};

fn field(nx: usize, ny: usize) -> Grid {
    let x = linspace(0.0, 360.0, nx);
    let y = linspace(-90.0, 90.0, ny);
    let mut values = Vec::with_capacity(nx * ny);
    for &lat in &y {
        for &lon in &x {
            values.push(15.0 + 12.0 * f64::to_radians(lat).cos() + 3.0 * f64::to_radians(3.0 * lon).sin());
        }
    }
    Grid::new(x, y, values).expect("grid should be valid")
}

fn filled_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("contourf");

    for (nx, ny) in [(73, 37), (145, 73), (289, 145)] {
        let grid = field(nx, ny);
        group.bench_with_input(BenchmarkId::from_parameter(format!("{nx}x{ny}")), &grid, |b, grid| {
            b.iter(|| {
                Contour::new(black_box(grid))
                    .levels(Levels::Explicit(arange(0.0, 32.0, 0.5)))
                    .filled()
                    .expect("contouring should succeed")
            });
        });
    }

    group.finish();
}

fn lines_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("contour_lines");

    for (nx, ny) in [(73, 37), (145, 73), (289, 145)] {
        let grid = field(nx, ny);
        group.bench_with_input(BenchmarkId::from_parameter(format!("{nx}x{ny}")), &grid, |b, grid| {
            b.iter(|| {
                Contour::new(black_box(grid))
                    .levels(Levels::Count(12))
                    .lines()
                    .expect("contouring should succeed")
            });
        });
    }

    group.finish();
}

criterion_group!(benches, filled_benchmark, lines_benchmark);
criterion_main!(benches);
