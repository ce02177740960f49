#![allow(clippy::expect_used, clippy::unwrap_used)]
//! NCL proj_2: Filled Contours on a Mercator Map
//!
//! Surface temperature padded with a cyclic longitude column, twelve inferno
//! bands with black iso-lines and a 20° graticule.
//!
//! Needs `atmos.nc` in the data directory (`GEOCAT_GALLERY_DATA_DIR`,
//! default `./data`).
//!
//! Run with: `cargo run --example ncl_proj_2 [-- out.png]`

use std::path::PathBuf;

use geocat_gallery::config::GalleryConfig;
use geocat_gallery::dataset::Dataset;
use geocat_gallery::gallery::proj_2;
use geocat_gallery::geo::FeatureSet;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let out = std::env::args().nth(1).unwrap_or_else(|| "ncl_proj_2.png".to_string());
    let config = GalleryConfig::default().with_env();

    println!("NCL proj_2: Mercator Projection");
    println!("===============================\n");

    let path = config.data_file(proj_2::DATA_FILE);
    println!("Step 1: Reading {}...", path.display());
    let ds = Dataset::open(&path).expect("Failed to open dataset");
    let ts = ds.variable("TS").expect("no variable TS");
    if let Some((lo, hi)) = ts.extent() {
        println!("  TS ranges {lo:.1} to {hi:.1} {}", ts.units().unwrap_or(""));
    }

    let land_path = std::env::var_os("GEOCAT_GALLERY_LAND").map(PathBuf::from);
    let land = FeatureSet::load_optional(land_path.as_deref());

    println!("\nStep 2: Rendering...");
    let figure = proj_2::figure(&ts, &land).expect("Failed to build figure");
    figure.save(&out).expect("Failed to write figure");
    println!("  Saved: {out}");
}
