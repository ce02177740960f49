//! NCL `ce_3_1`: color-filled contours over a zoomed cylindrical map.
//!
//! Ocean potential temperature at the first time and depth, cut to 60°S-30°N
//! and 30°E-120°E, in 0.5° bands with a colorbar labelled every 2°.

use crate::axes::Axes;
use crate::color::Rgba;
use crate::colorbar::Colorbar;
use crate::colormap::Colormap;
use crate::config::GalleryConfig;
use crate::dataset::{DataArray, Dataset};
use crate::error::Result;
use crate::figure::Figure;
use crate::geo::{FeatureSet, Projection};
use crate::plots::{Contour, Levels};
use crate::scale::{arange, linspace};
use crate::style::{
    add_lat_lon_ticklabels, add_major_minor_ticks, set_axes_limits_and_ticks, set_titles_and_labels, AxisSetup,
    Titles,
};

/// Sample file holding the `T` variable.
pub const DATA_FILE: &str = "h_avg_Y0191_D000.00.nc";

const LAT_RANGE: (f64, f64) = (-60.0, 30.0);
const LON_RANGE: (f64, f64) = (30.0, 120.0);

/// Load `T` and build the figure.
///
/// # Errors
///
/// Returns an error if the file or variable is missing or malformed.
pub fn build(config: &GalleryConfig) -> Result<Figure> {
    let ds = Dataset::open(config.data_file(DATA_FILE))?;
    let t = ds.variable("T")?;
    let land = FeatureSet::load_optional(config.land.as_deref());
    figure(&t, &land)
}

/// Build the figure from a `(time, z_t, lat_t, lon_t)` temperature field.
///
/// # Errors
///
/// Returns an error if a dimension is missing or the cut-out is empty.
pub fn figure(t: &DataArray, land: &FeatureSet) -> Result<Figure> {
    let t = t
        .isel("time", 0)?
        .isel("z_t", 0)?
        .sel_range("lat_t", LAT_RANGE.0, LAT_RANGE.1)?
        .sel_range("lon_t", LON_RANGE.0, LON_RANGE.1)?;
    let grid = t.to_grid()?;

    let filled = Contour::new(&grid)
        .levels(Levels::Explicit(arange(0.0, 32.0, 0.5)))
        .vmin(0.0)
        .vmax(32.0)
        .colormap(Colormap::bl_aq_gr_ye_or_re())
        .filled()?;

    let ticks = arange(0.0, 32.0, 2.0);
    let labels = ticks.iter().map(|t| format!("{}", t.round() as i64)).collect();
    let colorbar = Colorbar::from_contours(&filled)?
        .shrink(0.8)
        .draw_edges(true)
        .ticks(ticks)
        .tick_labels(labels);

    let mut ax = Axes::map(Projection::plate_carree());
    ax.contourf(filled);
    ax.add_land(land, Rgba::LIGHT_GRAY, None);
    ax.coastlines(land, 0.5);

    set_axes_limits_and_ticks(
        &mut ax,
        &AxisSetup {
            xlim: Some(LON_RANGE),
            ylim: Some(LAT_RANGE),
            xticks: Some(linspace(-180.0, 180.0, 13)),
            yticks: Some(linspace(-90.0, 90.0, 7)),
            ..AxisSetup::default()
        },
    );
    add_lat_lon_ticklabels(&mut ax);
    add_major_minor_ticks(&mut ax, 3, 3, 12.0);
    set_titles_and_labels(
        &mut ax,
        &Titles::new()
            .main("30-degree major and 10-degree minor ticks", 16.0)
            .left("Potential Temperature", 14.0)
            .right("Celsius", 14.0)
            .labels("", ""),
    );

    Ok(Figure::new(7.0, 7.0).with_axes(ax).with_colorbar(colorbar))
}
