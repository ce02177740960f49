#![allow(clippy::expect_used, clippy::unwrap_used)]
//! NCL stream_1: Streamlines over a Map
//!
//! Black streamlines of the lowest-level wind at density 4 on a global
//! Plate Carrée map, over light gray land when a land file is given.
//!
//! Needs `uvt.nc` in the data directory (`GEOCAT_GALLERY_DATA_DIR`, default
//! `./data`).
//!
//! Run with: `cargo run --example ncl_stream_1 [-- out.png]`

use std::path::PathBuf;

use geocat_gallery::config::GalleryConfig;
use geocat_gallery::dataset::Dataset;
use geocat_gallery::gallery::stream_1;
use geocat_gallery::geo::FeatureSet;
use geocat_gallery::plots::Streamplot;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let out = std::env::args().nth(1).unwrap_or_else(|| "ncl_stream_1.png".to_string());
    let config = GalleryConfig::default().with_env();

    println!("NCL stream_1: Streamline Plot");
    println!("=============================\n");

    let path = config.data_file(stream_1::DATA_FILE);
    println!("Step 1: Reading {}...", path.display());
    let ds = Dataset::open(&path).expect("Failed to open dataset");
    let u = ds.variable("U").expect("no variable U");
    let v = ds.variable("V").expect("no variable V");

    println!("\nStep 2: Integrating streamlines...");
    let level = |a: &geocat_gallery::dataset::DataArray| {
        a.isel("time", 0).and_then(|a| a.isel("lev", 0)).and_then(|a| a.to_grid()).expect("2-d wind")
    };
    let (ug, vg) = (level(&u), level(&v));
    let lines = Streamplot::new(&ug, &vg)
        .and_then(|s| s.density(stream_1::DENSITY).build())
        .expect("Failed to integrate");
    let points: usize = lines.trajectories.iter().map(|t| t.points.len()).sum();
    println!("  {} trajectories, {points} points", lines.trajectories.len());

    let land_path = std::env::var_os("GEOCAT_GALLERY_LAND").map(PathBuf::from);
    let land = FeatureSet::load_optional(land_path.as_deref());

    println!("\nStep 3: Rendering...");
    let figure = stream_1::figure(&u, &v, &land).expect("Failed to build figure");
    figure.save(&out).expect("Failed to write figure");
    println!("  Saved: {out}");
}
