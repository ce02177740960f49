//! NCL `stream_1`: black-and-white streamlines over a map.

use crate::axes::Axes;
use crate::color::Rgba;
use crate::config::GalleryConfig;
use crate::dataset::{DataArray, Dataset};
use crate::error::Result;
use crate::figure::Figure;
use crate::geo::{FeatureSet, Projection};
use crate::plots::Streamplot;
use crate::scale::linspace;
use crate::style::{
    add_lat_lon_ticklabels, add_major_minor_ticks, set_axes_limits_and_ticks, set_titles_and_labels, AxisSetup,
    Titles,
};

/// Sample file holding the `U` and `V` variables.
pub const DATA_FILE: &str = "uvt.nc";

/// Streamline density.
pub const DENSITY: f64 = 4.0;

/// Load `U` and `V` and build the figure.
///
/// # Errors
///
/// Returns an error if the file or variables are missing or malformed.
pub fn build(config: &GalleryConfig) -> Result<Figure> {
    let ds = Dataset::open(config.data_file(DATA_FILE))?;
    let u = ds.variable("U")?;
    let v = ds.variable("V")?;
    let land = FeatureSet::load_optional(config.land.as_deref());
    figure(&u, &v, &land)
}

/// Build the figure from `(time, lev, lat, lon)` wind components.
///
/// Titles come from the `long_name` and `units` attributes of `u`.
///
/// # Errors
///
/// Returns an error if a dimension or attribute is missing, or the two
/// components do not share a grid.
pub fn figure(u: &DataArray, v: &DataArray, land: &FeatureSet) -> Result<Figure> {
    let u = u.isel("time", 0)?.isel("lev", 0)?;
    let v = v.isel("time", 0)?.isel("lev", 0)?;
    let long_name = text_attr(&u, "long_name")?;
    let units = text_attr(&u, "units")?;

    let (u_grid, v_grid) = (u.to_grid()?, v.to_grid()?);
    let lines = Streamplot::new(&u_grid, &v_grid)?
        .density(DENSITY)
        .width(1.0)
        .color(Rgba::BLACK)
        .build()?;

    let mut ax = Axes::map(Projection::plate_carree());
    ax.set_global();
    ax.add_land(land, Rgba::LIGHT_GRAY, Some((Rgba::BLACK, 1.0)));
    ax.streamplot(lines);

    add_major_minor_ticks(&mut ax, 3, 3, 16.0);
    add_lat_lon_ticklabels(&mut ax);
    set_axes_limits_and_ticks(
        &mut ax,
        &AxisSetup {
            xticks: Some(linspace(-180.0, 180.0, 13)),
            yticks: Some(linspace(-90.0, 90.0, 7)),
            ..AxisSetup::default()
        },
    );
    set_titles_and_labels(
        &mut ax,
        &Titles::new()
            .main("Example of a streamline plot", 22.0)
            .left(long_name, 18.0)
            .right(units, 18.0)
            .labels("", ""),
    );

    Ok(Figure::new(16.0, 8.0).with_axes(ax))
}

fn text_attr(array: &DataArray, name: &str) -> Result<String> {
    let value = array.attr(name)?;
    Ok(value.as_str().map_or_else(|| format!("{value:?}"), ToString::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axes::{Layer, TitleLoc};
    use crate::error::Error;
    use crate::netcdf::AttrValue;

    fn wind(name: &str, f: impl Fn(f64, f64) -> f64) -> DataArray {
        let lat: Vec<f64> = (-90..=90).step_by(10).map(f64::from).collect();
        let lon: Vec<f64> = (-180..180).step_by(10).map(f64::from).collect();
        let mut values = Vec::new();
        for &la in &lat {
            for &lo in &lon {
                values.push(f(lo, la));
            }
        }
        DataArray::new(name, &["time", "lev", "lat", "lon"], vec![vec![0.0], vec![1000.0], lat, lon], values)
            .unwrap()
            .with_attr("long_name", AttrValue::text("Zonal Wind"))
            .with_attr("units", AttrValue::text("m/s"))
    }

    fn components() -> (DataArray, DataArray) {
        (
            wind("U", |_, la| 10.0 * (2.0 * la.to_radians()).cos()),
            wind("V", |lo, _| 3.0 * lo.to_radians().sin()),
        )
    }

    #[test]
    fn test_streamlines_and_titles() {
        let (u, v) = components();
        let fig = figure(&u, &v, &FeatureSet::default()).unwrap();
        let ax = fig.axes();
        let Layer::Streamlines(lines) = &ax.layers()[0] else {
            panic!("expected streamlines");
        };
        assert!(!lines.trajectories.is_empty());
        assert_eq!(lines.color, Rgba::BLACK);
        assert_eq!(ax.title(TitleLoc::Left).unwrap().text, "Zonal Wind");
        assert_eq!(ax.title(TitleLoc::Right).unwrap().text, "m/s");
        assert_eq!(ax.title(TitleLoc::Center).unwrap().size, 24.0);
    }

    #[test]
    fn test_global_ticks() {
        let (u, v) = components();
        let fig = figure(&u, &v, &FeatureSet::default()).unwrap();
        let view = fig.axes().view();
        assert_eq!(view.x_lim, (-180.0, 180.0));
        assert_eq!(view.x_major.len(), 13);
        assert_eq!(view.y_major.first().map(|t| t.1.as_str()), Some("90°S"));
        assert_eq!(view.x_minor.len(), 24);
    }

    #[test]
    fn test_land_below_streamlines() {
        let (u, v) = components();
        let land = FeatureSet::from_geojson_str(
            r#"{"type":"Polygon","coordinates":[[[0,0],[30,0],[30,30],[0,0]]]}"#,
        )
        .unwrap();
        let fig = figure(&u, &v, &land).unwrap();
        let layers = fig.axes().layers();
        assert!(matches!(layers[0], Layer::Land { .. }));
        assert!(matches!(layers[1], Layer::Streamlines(_)));
    }

    #[test]
    fn test_missing_units_errors() {
        let (u, v) = components();
        let bare = DataArray::new(
            "U",
            &["time", "lev", "lat", "lon"],
            vec![vec![0.0], vec![1000.0], vec![0.0, 1.0], vec![0.0, 1.0]],
            vec![1.0; 4],
        )
        .unwrap();
        assert!(matches!(figure(&bare, &v, &FeatureSet::default()), Err(Error::MissingAttribute { .. })));
        assert!(figure(&u, &v, &FeatureSet::default()).is_ok());
    }
}
