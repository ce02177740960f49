//! Rendering backends and rasterization.
//!
//! # Algorithms
//!
//! - **Wu's Anti-aliased Line**: hairline strokes with sub-pixel accuracy
//! - **Scanline Polygon Fill**: even-odd fill sampled at pixel centers
//! - **Midpoint Circle**: round joins for wide strokes
//!
//! # References
//!
//! - Wu, X. (1991). "An Efficient Antialiasing Technique." SIGGRAPH '91.

pub mod font;
mod primitives;
mod scene;

pub use primitives::{draw_circle, draw_line_aa, draw_polyline, draw_thick_line, fill_polygon};
pub use scene::{split_dashes, LineStyle, Mark, Scene, Stroke, TextMark, VAlign};
