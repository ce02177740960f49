#![allow(clippy::expect_used, clippy::unwrap_used)]
//! NCL ce_3_1: Filled Contours on a Cylindrical Map
//!
//! Potential temperature cut to the Indian Ocean, 0.5° bands in the
//! BlAqGrYeOrRe table, colorbar labelled every 2°.
//!
//! Needs `h_avg_Y0191_D000.00.nc` in the data directory
//! (`GEOCAT_GALLERY_DATA_DIR`, default `./data`). Set `GEOCAT_GALLERY_LAND`
//! to a GeoJSON file to draw land and coastlines.
//!
//! Run with: `cargo run --example ncl_ce_3_1 [-- out.png]`

use std::path::PathBuf;

use geocat_gallery::config::GalleryConfig;
use geocat_gallery::dataset::Dataset;
use geocat_gallery::gallery::ce_3_1;
use geocat_gallery::geo::FeatureSet;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let out = std::env::args().nth(1).unwrap_or_else(|| "ncl_ce_3_1.png".to_string());
    let config = GalleryConfig::default().with_env();

    println!("NCL ce_3_1: Filled Contours on a Cylindrical Map");
    println!("================================================\n");

    let path = config.data_file(ce_3_1::DATA_FILE);
    println!("Step 1: Reading {}...", path.display());
    let ds = Dataset::open(&path).expect("Failed to open dataset");
    let t = ds.variable("T").expect("no variable T");
    println!("  T{:?} {:?}", t.dims(), t.shape());

    let land_path = std::env::var_os("GEOCAT_GALLERY_LAND").map(PathBuf::from);
    let land = FeatureSet::load_optional(land_path.as_deref());

    println!("\nStep 2: Rendering...");
    let figure = ce_3_1::figure(&t, &land).expect("Failed to build figure");
    figure.save(&out).expect("Failed to write figure");
    println!("  Saved: {out}");
}
