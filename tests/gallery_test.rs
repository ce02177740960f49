//! End-to-end gallery tests.
//!
//! Small stand-ins for the four sample files are written to a temporary
//! data directory; every recipe is then rendered to PNG and SVG.
//!
//! Run: cargo test --test gallery_test

#![allow(clippy::unwrap_used)]

use std::path::Path;

use proptest::prelude::*;

use geocat_gallery::color::Rgba;
use geocat_gallery::config::GalleryConfig;
use geocat_gallery::gallery;
use geocat_gallery::netcdf::{AttrValue, NcType, NcWriter};
use geocat_gallery::output::OutputFormat;
use geocat_gallery::Error;

fn degrees(start: i32, stop: i32, step: usize) -> Vec<f64> {
    (start..=stop).step_by(step).map(f64::from).collect()
}

fn write_ocean(dir: &Path) {
    let lat = degrees(-78, 78, 6);
    let lon = degrees(0, 354, 6);
    let mut t = Vec::new();
    for &la in &lat {
        for &lo in &lon {
            t.push(if la > 20.0 && lo < 60.0 { 1.0e20 } else { 29.0 - 0.35 * la.abs() + 0.01 * lo });
        }
    }
    NcWriter::new()
        .unlimited_dimension("time", 1)
        .dimension("z_t", 1)
        .dimension("lat_t", lat.len())
        .dimension("lon_t", lon.len())
        .variable("time", &["time"], NcType::Double, vec![0.0])
        .unwrap()
        .variable("z_t", &["z_t"], NcType::Float, vec![500.0])
        .unwrap()
        .variable("lat_t", &["lat_t"], NcType::Float, lat)
        .unwrap()
        .variable("lon_t", &["lon_t"], NcType::Float, lon)
        .unwrap()
        .variable("T", &["time", "z_t", "lat_t", "lon_t"], NcType::Float, t)
        .unwrap()
        .attr("_FillValue", AttrValue::float(1.0e20))
        .unwrap()
        .attr("long_name", AttrValue::text("Potential Temperature"))
        .unwrap()
        .write_to_file(dir.join(gallery::ce_3_1::DATA_FILE))
        .unwrap();
}

fn write_atmos(dir: &Path) {
    let lat = degrees(-87, 87, 6);
    let lon = degrees(0, 355, 5);
    let mut ts = Vec::new();
    for &la in &lat {
        for &lo in &lon {
            ts.push(300.0 - 0.7 * la.abs() + 3.0 * (2.0 * f64::to_radians(lo)).sin());
        }
    }
    NcWriter::new()
        .dimension("time", 1)
        .dimension("lat", lat.len())
        .dimension("lon", lon.len())
        .variable("lat", &["lat"], NcType::Double, lat)
        .unwrap()
        .variable("lon", &["lon"], NcType::Double, lon)
        .unwrap()
        .variable("TS", &["time", "lat", "lon"], NcType::Float, ts)
        .unwrap()
        .attr("units", AttrValue::text("K"))
        .unwrap()
        .write_to_file(dir.join(gallery::proj_2::DATA_FILE))
        .unwrap();
}

fn write_winds(dir: &Path) {
    let lat = degrees(-88, 88, 8);
    let lon = degrees(-180, 175, 5);
    let (mut u, mut v) = (Vec::new(), Vec::new());
    for &la in &lat {
        for &lo in &lon {
            u.push(12.0 * (2.0 * f64::to_radians(la)).cos());
            v.push(4.0 * f64::to_radians(2.0 * lo).sin() * f64::to_radians(la).cos());
        }
    }
    let dims = ["time", "lev", "lat", "lon"];
    NcWriter::new()
        .dimension("time", 1)
        .dimension("lev", 1)
        .dimension("lat", lat.len())
        .dimension("lon", lon.len())
        .variable("lat", &["lat"], NcType::Float, lat)
        .unwrap()
        .variable("lon", &["lon"], NcType::Float, lon)
        .unwrap()
        .variable("U", &dims, NcType::Float, u)
        .unwrap()
        .attr("long_name", AttrValue::text("Zonal Wind Component"))
        .unwrap()
        .attr("units", AttrValue::text("m/s"))
        .unwrap()
        .variable("V", &dims, NcType::Float, v)
        .unwrap()
        .attr("units", AttrValue::text("m/s"))
        .unwrap()
        .write_to_file(dir.join(gallery::stream_1::DATA_FILE))
        .unwrap();
}

fn write_sst(dir: &Path) {
    let n = 45 * 12;
    let date: Vec<f64> = (0..n).map(|i| f64::from(195_001 + (i / 12) * 100 + i % 12)).collect();
    let sst: Vec<f64> = (0..n).map(|i| (10.0 * f64::from(i).sin()).round()).collect();
    NcWriter::new()
        .dimension("time", n as usize)
        .variable("date", &["time"], NcType::Int, date)
        .unwrap()
        .variable("SST", &["time"], NcType::Short, sst)
        .unwrap()
        .write_to_file(dir.join(gallery::xy_6::DATA_FILE))
        .unwrap();
}

fn fixture_config(format: OutputFormat) -> (tempfile::TempDir, GalleryConfig) {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    std::fs::create_dir_all(&data).unwrap();
    write_ocean(&data);
    write_atmos(&data);
    write_winds(&data);
    write_sst(&data);

    let land = dir.path().join("land.geojson");
    std::fs::write(
        &land,
        r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{},"geometry":{"type":"Polygon",
             "coordinates":[[[40,-30],[90,-30],[90,20],[40,20],[40,-30]]]}},
            {"type":"Feature","properties":{},"geometry":{"type":"LineString",
             "coordinates":[[-170,60],[-120,50],[-60,45]]}}]}"#,
    )
    .unwrap();

    let config = GalleryConfig {
        data_dir: data,
        out_dir: dir.path().join("figures"),
        format,
        dpi: 50.0,
        land: Some(land),
        seed: 200,
    };
    (dir, config)
}

#[test]
fn test_every_recipe_renders_png() {
    let (_dir, config) = fixture_config(OutputFormat::Png);
    for recipe in gallery::recipes() {
        let path = recipe.render(&config).unwrap_or_else(|e| panic!("{}: {e}", recipe.name));
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n", "{}", recipe.name);
        assert!(bytes.len() > 1000, "{} is suspiciously small", recipe.name);
    }
}

#[test]
fn test_every_recipe_renders_svg() {
    let (_dir, config) = fixture_config(OutputFormat::Svg);
    for recipe in gallery::recipes() {
        let path = recipe.render(&config).unwrap();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("svg"));
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"), "{}", recipe.name);
        assert!(svg.trim_end().ends_with("</svg>"), "{}", recipe.name);
    }
}

#[test]
fn test_every_raster_has_ink() {
    let (_dir, config) = fixture_config(OutputFormat::Png);
    for recipe in gallery::recipes() {
        let fb = recipe.build(&config).unwrap().to_framebuffer().unwrap();
        let ink = fb.ink_stats(Rgba::WHITE);
        assert!(ink.coverage > 0.002, "{} is nearly blank", recipe.name);
        assert!(ink.coverage < 0.95, "{} is flooded", recipe.name);
    }
}

#[test]
fn test_titles_reach_the_svg() {
    let (_dir, config) = fixture_config(OutputFormat::Svg);
    let expected = [
        ("box_2", "Tailored Box Plot"),
        ("ce_3_1", "Potential Temperature"),
        ("proj_2", "Example of Mercator Projection"),
        ("stream_1", "Zonal Wind Component"),
        ("xy_6", "Explicit axis labeling"),
    ];
    for (name, title) in expected {
        let svg = gallery::find(name).unwrap().build(&config).unwrap().to_svg().unwrap();
        assert!(svg.contains(title), "{name} lacks '{title}'");
    }
}

#[test]
fn test_config_dpi_scales_output() {
    let (_dir, mut config) = fixture_config(OutputFormat::Png);
    let small = gallery::find("xy_6").unwrap().build(&config).unwrap();
    config.dpi = 100.0;
    let large = gallery::find("xy_6").unwrap().build(&config).unwrap();
    assert_eq!(small.pixel_size(), (350, 325));
    assert_eq!(large.pixel_size(), (700, 650));
}

#[test]
fn test_missing_inputs() {
    let (dir, mut config) = fixture_config(OutputFormat::Png);
    config.data_dir = dir.path().join("nowhere");
    assert!(matches!(gallery::find("proj_2").unwrap().build(&config), Err(Error::Io(_))));

    // a missing land file is skipped, not fatal
    let (_dir2, mut config) = fixture_config(OutputFormat::Png);
    config.land = Some(dir.path().join("no_land.geojson"));
    assert!(gallery::find("ce_3_1").unwrap().build(&config).is_ok());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn prop_box_2_renders_for_any_seed(seed in any::<u64>()) {
        let config = GalleryConfig { seed, ..GalleryConfig::default() };
        let figure = gallery::find("box_2").unwrap().build(&config).unwrap();
        prop_assert_eq!(figure.axes().layers().len(), 18);
        prop_assert!(figure.to_scene().is_ok());
    }
}
