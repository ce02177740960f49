//! NCL `box_2`: a tailored box plot.
//!
//! Three groups of 40 lognormal draws shifted down by 4, drawn as narrow
//! boxes without outliers, dashed whiskers and one color per box.

use crate::axes::{Axes, Sides, TickDirection};
use crate::color::Rgba;
use crate::config::GalleryConfig;
use crate::error::Result;
use crate::figure::Figure;
use crate::plots::{set_box_color, BoxPlot};
use crate::render::LineStyle;
use crate::style::{
    add_major_minor_ticks, set_axes_limits_and_ticks, set_tick_direction_spine_visibility,
    set_titles_and_labels, AxisSetup, Titles,
};
use crate::synthetic::{columns, lognormal_matrix};
use crate::ticks::TickFormatter;

/// Draws per group.
pub const ROWS: usize = 40;
/// Group labels.
pub const LABELS: [&str; 3] = ["Control", "-2Xna", "2Xna"];

const BOX_WIDTH: f64 = 0.1;

/// Draw the synthetic data and build the figure.
///
/// # Errors
///
/// Returns an error if the box statistics cannot be computed.
pub fn build(config: &GalleryConfig) -> Result<Figure> {
    let data = lognormal_matrix(config.seed, 1.0, 0.7, ROWS, LABELS.len(), -4.0)?;
    figure(&columns(&data))
}

/// Build the figure from one data vector per box.
///
/// # Errors
///
/// Returns an error if there are no groups or a group has no finite value.
pub fn figure(groups: &[Vec<f64>]) -> Result<Figure> {
    let mut boxes = BoxPlot::new()
        .data(groups.to_vec())
        .labels(&LABELS)
        .widths(&[BOX_WIDTH; 3])
        .show_fliers(false)
        .build()?;
    boxes.set_whisker_style(LineStyle::Dashed);
    set_box_color(&mut boxes, &[Rgba::BLUE, Rgba::RED, Rgba::parse("#66FF00")?]);

    let mut ax = Axes::new();
    ax.boxplot(&boxes);

    set_axes_limits_and_ticks(
        &mut ax,
        &AxisSetup {
            ylim: Some((-6.0, 8.5)),
            yticks: Some(vec![-3.0, 0.0, 3.0, 6.0]),
            ..AxisSetup::default()
        },
    );
    ax.set_y_formatter(TickFormatter::Fixed(1));
    add_major_minor_ticks(&mut ax, 1, 3, 16.0);
    set_tick_direction_spine_visibility(
        &mut ax,
        TickDirection::In,
        Sides {
            top: false,
            right: false,
            ..Sides::ALL
        },
    );
    set_titles_and_labels(&mut ax, &Titles::new().main("Tailored Box Plot", 22.0));
    ax.tick_style_mut().pad = 9.0;

    Ok(Figure::new(6.0, 6.0).with_axes(ax))
}
