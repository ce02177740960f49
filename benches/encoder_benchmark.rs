#![allow(clippy::expect_used, clippy::unwrap_used, missing_docs)]
//! Benchmark for output encoders (PNG, SVG) on a rendered figure.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use geocat_gallery::config::GalleryConfig;
use geocat_gallery::gallery;
use geocat_gallery::output::PngEncoder;

fn box_2_scene(dpi: f32) -> geocat_gallery::render::Scene {
    let mut figure = gallery::find("box_2")
        .expect("recipe exists")
        .build(&GalleryConfig::default())
        .expect("figure should build");
    figure.set_dpi(dpi);
    figure.to_scene().expect("layout should succeed")
}

fn rasterize_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("rasterize");

    for dpi in [72.0_f32, 100.0, 200.0] {
        let scene = box_2_scene(dpi);
        group.bench_with_input(BenchmarkId::from_parameter(format!("{dpi}dpi")), &dpi, |b, _| {
            b.iter(|| black_box(&scene).to_framebuffer().expect("raster should succeed"));
        });
    }

    group.finish();
}

fn png_encoder_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("png_encoder");

    for dpi in [72.0_f32, 100.0, 200.0] {
        let fb = box_2_scene(dpi).to_framebuffer().expect("raster should succeed");
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", fb.width(), fb.height())),
            &dpi,
            |b, _| {
                b.iter(|| PngEncoder::to_bytes(black_box(&fb)).expect("encoding should succeed"));
            },
        );
    }

    group.finish();
}

fn svg_encoder_benchmark(c: &mut Criterion) {
    let scene = box_2_scene(100.0);
    c.bench_function("svg_encoder/box_2", |b| {
        b.iter(|| black_box(&scene).to_svg().render());
    });
}

criterion_group!(benches, rasterize_benchmark, png_encoder_benchmark, svg_encoder_benchmark);
criterion_main!(benches);
