//! Plot artists in data coordinates.
//!
//! Each plot type is computed here and drawn by [`crate::axes::Axes`], which
//! owns the mapping from data space to pixels.

mod boxplot;
mod contour;
mod line;
mod streamline;

pub use boxplot::{set_box_color, BoxPlot, BoxStats, BoxplotArtists};
pub use contour::{Contour, ContourBand, ContourLines, FilledContours, IsoLine, Levels};
pub use line::{douglas_peucker, LineArtist};
pub use streamline::{Arrow, Streamlines, Streamplot, Trajectory};
