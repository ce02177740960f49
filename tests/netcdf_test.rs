//! NetCDF and dataset integration tests.
//!
//! Files are written with `NcWriter`, read back through `Dataset`, and
//! pushed through the same selections the gallery recipes use.
//!
//! Run: cargo test --test netcdf_test

#![allow(clippy::unwrap_used)]

use approx::assert_relative_eq;
use proptest::prelude::*;

use geocat_gallery::dataset::Dataset;
use geocat_gallery::netcdf::{AttrValue, NcFile, NcType, NcWriter};
use geocat_gallery::Error;

fn write(writer: &NcWriter) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fixture.nc");
    writer.write_to_file(&path).unwrap();
    (dir, path)
}

#[test]
fn test_coordinates_and_attributes() {
    let writer = NcWriter::new()
        .global_attr("title", AttrValue::text("fixture"))
        .dimension("lat", 2)
        .dimension("lon", 3)
        .variable("lat", &["lat"], NcType::Float, vec![-45.0, 45.0])
        .unwrap()
        .variable("lon", &["lon"], NcType::Float, vec![0.0, 120.0, 240.0])
        .unwrap()
        .variable("TS", &["lat", "lon"], NcType::Double, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
        .unwrap()
        .attr("long_name", AttrValue::text("Surface temperature"))
        .unwrap()
        .attr("units", AttrValue::text("K"))
        .unwrap();
    let (_dir, path) = write(&writer);

    let ds = Dataset::open(&path).unwrap();
    assert_eq!(ds.global_attr("title").and_then(AttrValue::as_str), Some("fixture"));
    assert_eq!(ds.variable_names(), vec!["lat", "lon", "TS"]);

    let ts = ds.variable("TS").unwrap();
    assert_eq!(ts.dims(), ["lat", "lon"]);
    assert_eq!(ts.coord("lon").unwrap(), [0.0, 120.0, 240.0]);
    assert_eq!(ts.long_name(), Some("Surface temperature"));
    assert_eq!(ts.units(), Some("K"));
    assert_eq!(ts.get(&[1, 2]), Some(6.0));
}

#[test]
fn test_record_variables_interleave() {
    let writer = NcWriter::new()
        .unlimited_dimension("time", 3)
        .dimension("x", 2)
        .variable("time", &["time"], NcType::Double, vec![0.0, 1.0, 2.0])
        .unwrap()
        .variable("a", &["time", "x"], NcType::Float, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
        .unwrap()
        .variable("b", &["time"], NcType::Short, vec![7.0, 8.0, 9.0])
        .unwrap();
    let (_dir, path) = write(&writer);

    let file = NcFile::open(&path).unwrap();
    assert_eq!(file.header().numrecs, 3);
    let a = file.variable("a").unwrap();
    let b = file.variable("b").unwrap();
    assert_eq!(file.read_values(a).unwrap(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    assert_eq!(file.read_values(b).unwrap(), vec![7.0, 8.0, 9.0]);

    let ds = Dataset::from_file(file);
    let second = ds.variable("a").unwrap().isel("time", 1).unwrap();
    assert_eq!(second.values(), [3.0, 4.0]);
}

#[test]
fn test_fill_and_packing() {
    let writer = NcWriter::new()
        .dimension("t", 4)
        .variable("SST", &["t"], NcType::Short, vec![-120.0, 35.0, -999.0, 0.0])
        .unwrap()
        .attr("_FillValue", AttrValue::Numeric {
            nc_type: NcType::Short,
            values: vec![-999.0],
        })
        .unwrap()
        .attr("scale_factor", AttrValue::float(0.1))
        .unwrap()
        .attr("add_offset", AttrValue::float(1.0))
        .unwrap();
    let (_dir, path) = write(&writer);

    let sst = Dataset::open(&path).unwrap().variable("SST").unwrap();
    let v = sst.values();
    assert_relative_eq!(v[0], -11.0, epsilon = 1e-6);
    assert_relative_eq!(v[1], 4.5, epsilon = 1e-6);
    assert!(v[2].is_nan());
    assert_relative_eq!(v[3], 1.0, epsilon = 1e-6);
    // coordinates default to indices
    assert_eq!(sst.coord("t").unwrap(), [0.0, 1.0, 2.0, 3.0]);
}

#[test]
fn test_missing_variable_and_bad_files() {
    let writer = NcWriter::new().dimension("x", 1);
    let (dir, path) = write(&writer);
    let ds = Dataset::open(&path).unwrap();
    assert!(matches!(ds.variable("nope"), Err(Error::MissingVariable(_))));

    let garbage = dir.path().join("garbage.nc");
    std::fs::write(&garbage, b"GIF89a not a netcdf file").unwrap();
    assert!(matches!(Dataset::open(&garbage), Err(Error::NetCdfFormat(_))));

    assert!(matches!(Dataset::open(dir.path().join("absent.nc")), Err(Error::Io(_))));
}

#[test]
fn test_ocean_cut_out() {
    // time x z_t x lat_t x lon_t, as in the potential temperature file
    let lat: Vec<f64> = (-80..=80).step_by(20).map(f64::from).collect();
    let lon: Vec<f64> = (0..360).step_by(30).map(f64::from).collect();
    let n = lat.len() * lon.len();
    let values: Vec<f64> = (0..2 * n).map(|i| i as f64).collect();
    let writer = NcWriter::new()
        .dimension("time", 1)
        .dimension("z_t", 2)
        .dimension("lat_t", lat.len())
        .dimension("lon_t", lon.len())
        .variable("lat_t", &["lat_t"], NcType::Double, lat)
        .unwrap()
        .variable("lon_t", &["lon_t"], NcType::Double, lon)
        .unwrap()
        .variable("T", &["time", "z_t", "lat_t", "lon_t"], NcType::Float, values)
        .unwrap();
    let (_dir, path) = write(&writer);

    let t = Dataset::open(&path)
        .unwrap()
        .variable("T")
        .unwrap()
        .isel("time", 0)
        .unwrap()
        .isel("z_t", 0)
        .unwrap()
        .sel_range("lat_t", 30.0, -60.0)
        .unwrap()
        .sel_range("lon_t", 30.0, 120.0)
        .unwrap();
    assert_eq!(t.coord("lat_t").unwrap(), [-60.0, -40.0, -20.0, 0.0, 20.0]);
    assert_eq!(t.coord("lon_t").unwrap(), [30.0, 60.0, 90.0, 120.0]);
    let grid = t.to_grid().unwrap();
    assert_eq!((grid.nx(), grid.ny()), (4, 5));
    // row lat=-60 is row 1 of the full grid, column lon=30 is column 1
    assert_eq!(grid.at(0, 0), 12.0 + 1.0);
}

proptest! {
    #[test]
    fn prop_double_values_survive_disk(values in prop::collection::vec(-1.0e6f64..1.0e6, 1..64)) {
        let writer = NcWriter::new()
            .dimension("n", values.len())
            .variable("v", &["n"], NcType::Double, values.clone())
            .unwrap();
        let file = NcFile::from_bytes(writer.to_bytes().unwrap()).unwrap();
        let var = file.variable("v").unwrap();
        prop_assert_eq!(file.read_values(var).unwrap(), values);
    }

    #[test]
    fn prop_cyclic_padding_repeats_first_column(nlat in 1usize..6, nlon in 2usize..12) {
        let step = 360.0 / nlon as f64;
        let writer = NcWriter::new()
            .dimension("lat", nlat)
            .dimension("lon", nlon)
            .variable("lon", &["lon"], NcType::Double, (0..nlon).map(|i| i as f64 * step).collect())
            .unwrap()
            .variable("TS", &["lat", "lon"], NcType::Double, (0..nlat * nlon).map(|i| i as f64).collect())
            .unwrap();
        let ds = Dataset::from_file(NcFile::from_bytes(writer.to_bytes().unwrap()).unwrap());
        let wrapped = ds.variable("TS").unwrap().add_cyclic_longitudes("lon").unwrap();
        prop_assert_eq!(wrapped.shape(), vec![nlat, nlon + 1]);
        let lon = wrapped.coord("lon").unwrap();
        prop_assert!((lon[nlon] - 360.0).abs() < 1e-9);
        for j in 0..nlat {
            prop_assert_eq!(wrapped.get(&[j, nlon]), wrapped.get(&[j, 0]));
        }
    }
}
