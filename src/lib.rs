//! # geocat-gallery
//!
//! NCL reference visualizations reproduced in pure Rust.
//!
//! The crate reads NetCDF classic files into labelled arrays, turns them into
//! plot artists (box plots, filled and line contours, streamlines, XY lines),
//! lays them out on axes with NCL-style ticks and titles, and writes PNG or
//! SVG figures. Five gallery recipes ([`gallery`]) tie it together.
//!
//! ## Quick Start
//!
//! ```rust
//! use geocat_gallery::prelude::*;
//!
//! let mut ax = Axes::new();
//! ax.plot(LineArtist::new(vec![1951.0, 1957.0, 1965.0], vec![-0.4, 0.2, -1.1])?.color(Rgba::GREY));
//! add_major_minor_ticks(&mut ax, 1, 4, 16.0);
//! set_titles_and_labels(&mut ax, &Titles::new().main("Explicit axis labeling", 18.0));
//!
//! let figure = Figure::new(7.0, 6.5).with_axes(ax);
//! let svg = figure.to_svg()?;
//! assert!(svg.contains("Explicit axis labeling"));
//! # Ok::<(), geocat_gallery::Error>(())
//! ```
//!
//! ## Algorithms
//!
//! - Marching triangles for iso-lines; Sutherland-Hodgman band clipping for
//!   filled contours.
//! - Mask-based streamline seeding with adaptive Heun/Euler integration.
//! - Wu, X. (1991). "An Efficient Antialiasing Technique." SIGGRAPH '91.
//! - Douglas, D. H., & Peucker, T. K. (1973). Line simplification algorithm.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Allow common patterns in graphics/visualization code
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// Color types and named colors.
pub mod color;

/// Colormaps and the NCL color tables used by the gallery.
pub mod colormap;

/// Core framebuffer for pixel rendering.
pub mod framebuffer;

/// Geometric primitives (points, rectangles, clipping).
pub mod geometry;

/// Scale functions for data-to-visual mappings.
pub mod scale;

/// Tick placement and tick label formatting.
pub mod ticks;

// ============================================================================
// Data Modules
// ============================================================================

/// NetCDF classic reader and writer.
pub mod netcdf;

/// Labelled arrays and datasets.
pub mod dataset;

/// `YYYYMM` calendar helpers.
pub mod dates;

/// Seeded synthetic data.
pub mod synthetic;

/// Map projections and GeoJSON land features.
pub mod geo;

// ============================================================================
// Visualization Modules
// ============================================================================

/// Plot artists (box plots, contours, streamlines, lines).
pub mod plots;

/// Axes: limits, ticks, spines, titles and layers.
pub mod axes;

/// NCL-look convenience helpers for axes.
pub mod style;

/// Vertical colorbars.
pub mod colorbar;

/// Figures: layout and file output.
pub mod figure;

// ============================================================================
// Rendering Modules
// ============================================================================

/// Display list and rasterization.
pub mod render;

/// Output encoders (PNG, SVG).
pub mod output;

// ============================================================================
// Gallery
// ============================================================================

/// Gallery configuration.
pub mod config;

/// The gallery recipes.
pub mod gallery;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for geocat-gallery operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and functions for convenient imports.
///
/// ```rust
/// use geocat_gallery::prelude::*;
/// ```
pub mod prelude {
    pub use crate::axes::{Axes, Sides, TickDirection, TitleLoc};
    pub use crate::color::Rgba;
    pub use crate::colorbar::Colorbar;
    pub use crate::colormap::Colormap;
    pub use crate::config::GalleryConfig;
    pub use crate::dataset::{DataArray, Dataset, Grid};
    pub use crate::error::{Error, Result};
    pub use crate::figure::Figure;
    pub use crate::geo::{FeatureSet, Projection};
    pub use crate::plots::{set_box_color, BoxPlot, Contour, Levels, LineArtist, Streamplot};
    pub use crate::render::LineStyle;
    pub use crate::scale::{arange, linspace};
    pub use crate::style::{
        add_lat_lon_ticklabels, add_major_minor_ticks, set_axes_limits_and_ticks,
        set_tick_direction_spine_visibility, set_titles_and_labels, AxisSetup, Titles,
    };
    pub use crate::ticks::TickFormatter;
    pub use batuta_common::display::WithDimensions;
}
