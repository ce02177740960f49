#![allow(clippy::expect_used, clippy::unwrap_used)]
//! NCL xy_6: Explicit Axis Labeling
//!
//! Niño 3 SST at the start of each El Niño warm year, with every other year
//! label left blank.
//!
//! Needs `Jsst.nc` in the data directory (`GEOCAT_GALLERY_DATA_DIR`, default
//! `./data`).
//!
//! Run with: `cargo run --example ncl_xy_6 [-- out.svg]`

use geocat_gallery::config::GalleryConfig;
use geocat_gallery::dataset::Dataset;
use geocat_gallery::gallery::xy_6;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let out = std::env::args().nth(1).unwrap_or_else(|| "ncl_xy_6.png".to_string());
    let config = GalleryConfig::default().with_env();

    println!("NCL xy_6: Explicit Axis Labeling");
    println!("================================\n");

    let path = config.data_file(xy_6::DATA_FILE);
    println!("Step 1: Reading {}...", path.display());
    let ds = Dataset::open(&path).expect("Failed to open dataset");
    let sst = ds.variable("SST").expect("no variable SST").scale(xy_6::SST_SCALE);
    let date = ds.variable("date").expect("no variable date");

    println!("\nStep 2: Warm years...");
    let values = xy_6::warm_year_values(&sst, &date).expect("warm years present");
    for (year, value) in xy_6::WARM_YEARS.iter().zip(&values) {
        println!("  {year:.0}: {value:>6.2}");
    }

    println!("\nStep 3: Rendering...");
    let figure = xy_6::figure(&sst, &date).expect("Failed to build figure");
    figure.save(&out).expect("Failed to write figure");
    println!("  Saved: {out}");
}
