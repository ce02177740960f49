//! NCL `proj_2`: filled contours over a Mercator map.
//!
//! Surface temperature with a cyclic longitude column, twelve inferno bands
//! outlined by thin black iso-lines, under a 20° graticule.

use crate::axes::Axes;
use crate::color::Rgba;
use crate::colormap::Colormap;
use crate::config::GalleryConfig;
use crate::dataset::{DataArray, Dataset};
use crate::error::Result;
use crate::figure::Figure;
use crate::geo::{FeatureSet, Projection};
use crate::plots::{Contour, Levels};
use crate::scale::arange;
use crate::style::{set_titles_and_labels, Titles};

/// Sample file holding the `TS` variable.
pub const DATA_FILE: &str = "atmos.nc";

/// Southern limit of the projection.
pub const MIN_LATITUDE: f64 = -87.8638;

/// Load `TS` and build the figure.
///
/// # Errors
///
/// Returns an error if the file or variable is missing or malformed.
pub fn build(config: &GalleryConfig) -> Result<Figure> {
    let ds = Dataset::open(config.data_file(DATA_FILE))?;
    let ts = ds.variable("TS")?;
    let land = FeatureSet::load_optional(config.land.as_deref());
    figure(&ts, &land)
}

/// Build the figure from a `(time, lat, lon)` surface temperature field.
///
/// # Errors
///
/// Returns an error if a dimension is missing or longitudes are uneven.
pub fn figure(ts: &DataArray, land: &FeatureSet) -> Result<Figure> {
    let wrapped = ts.isel("time", 0)?.add_cyclic_longitudes("lon")?;
    let grid = wrapped.to_grid()?;

    let contour = Contour::new(&grid)
        .levels(Levels::Count(12))
        .colormap(Colormap::inferno())
        .line_style(Rgba::BLACK, 0.5);

    let mut ax = Axes::map(Projection::mercator(0.0, MIN_LATITUDE));
    ax.set_extent((0.0, 359.0), (-84.5, 89.0));
    ax.contourf(contour.filled()?);
    ax.contour(contour.lines()?);
    ax.coastlines(land, 0.5);
    ax.gridlines(
        arange(-180.0, 181.0, 20.0),
        arange(-84.5, 91.0, 20.0),
        Rgba::BLACK.with_opacity(0.5),
        1.0,
    );

    set_titles_and_labels(
        &mut ax,
        &Titles::new()
            .main("Example of Mercator Projection", 18.0)
            .left("Surface Temperature", 18.0)
            .right("K", 18.0),
    );

    Ok(Figure::new(10.0, 10.0).with_axes(ax))
}
