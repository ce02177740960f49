#![allow(clippy::expect_used, clippy::unwrap_used)]
//! NCL box_2: Tailored Box Plot
//!
//! Draws three groups of seeded lognormal data as narrow boxes with dashed
//! whiskers, one color per box, inward ticks and no top/right spines.
//!
//! Run with: `cargo run --example ncl_box_2 [-- out.png]`

use geocat_gallery::config::GalleryConfig;
use geocat_gallery::gallery::box_2;
use geocat_gallery::plots::BoxStats;
use geocat_gallery::synthetic::{columns, lognormal_matrix};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let out = std::env::args().nth(1).unwrap_or_else(|| "ncl_box_2.png".to_string());
    let config = GalleryConfig::default().with_env();

    println!("NCL box_2: Tailored Box Plot");
    println!("============================\n");

    println!("Step 1: Drawing {}x3 lognormal samples (seed {})...", box_2::ROWS, config.seed);
    let data = lognormal_matrix(config.seed, 1.0, 0.7, box_2::ROWS, 3, -4.0).expect("valid parameters");
    let groups = columns(&data);

    println!("\nStep 2: Box statistics...");
    for (label, group) in box_2::LABELS.iter().zip(&groups) {
        if let Some(stats) = BoxStats::from_data(group) {
            println!(
                "  {label:<8} Q1 {:>6.2}  median {:>6.2}  Q3 {:>6.2}  whiskers [{:.2}, {:.2}]",
                stats.q1, stats.median, stats.q3, stats.whisker_lo, stats.whisker_hi
            );
        }
    }

    println!("\nStep 3: Rendering...");
    let figure = box_2::figure(&groups).expect("Failed to build figure");
    figure.save(&out).expect("Failed to write figure");
    println!("  Saved: {out}");
}
