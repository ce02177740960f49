//! XY line artists and polyline simplification.
//!
//! # Algorithms
//!
//! - **Douglas-Peucker**: sub-pixel simplification of long polylines before
//!   they are handed to a backend
//!
//! # References
//!
//! - Douglas, D. H., & Peucker, T. K. (1973). "Algorithms for the reduction of
//!   the number of points required to represent a digitized line or its caricature."
//!   Cartographica, 10(2), 112-122.

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::render::LineStyle;

// ============================================================================
// Douglas-Peucker Line Simplification
// ============================================================================

/// Simplify a polyline using the Douglas-Peucker algorithm.
///
/// Points closer than `epsilon` pixels to the simplified line are dropped.
/// The first and last points are always kept.
pub fn douglas_peucker(points: &[Point], epsilon: f32) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let (max_distance, max_index) = find_max_distance(points);

    if max_distance > epsilon {
        let left = douglas_peucker(&points[..=max_index], epsilon);
        let right = douglas_peucker(&points[max_index..], epsilon);

        // Combine results, avoiding duplicate of the split point
        let mut result = left;
        result.extend_from_slice(&right[1..]);
        result
    } else {
        vec![points[0], points[points.len() - 1]]
    }
}

/// Find the point with maximum perpendicular distance from the chord.
fn find_max_distance(points: &[Point]) -> (f32, usize) {
    let first = points[0];
    let last = points[points.len() - 1];

    let mut max_distance = 0.0;
    let mut max_index = 0;

    for (i, point) in points.iter().enumerate().skip(1).take(points.len() - 2) {
        let distance = perpendicular_distance(*point, first, last);
        if distance > max_distance {
            max_distance = distance;
            max_index = i;
        }
    }

    (max_distance, max_index)
}

/// Distance from a point to the line through `line_start` and `line_end`.
fn perpendicular_distance(point: Point, line_start: Point, line_end: Point) -> f32 {
    let dx = line_end.x - line_start.x;
    let dy = line_end.y - line_start.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len < f32::EPSILON {
        return point.distance(line_start);
    }
    ((dy * point.x - dx * point.y + line_end.x * line_start.y - line_end.y * line_start.x) / len).abs()
}

// ============================================================================
// Line Artist
// ============================================================================

/// A styled polyline in data coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct LineArtist {
    /// X values.
    pub x: Vec<f64>,
    /// Y values.
    pub y: Vec<f64>,
    /// Stroke color.
    pub color: Rgba,
    /// Width in points.
    pub width: f32,
    /// Dash style.
    pub style: LineStyle,
}

impl LineArtist {
    /// Create a solid black line, 1.5 points wide.
    ///
    /// # Errors
    ///
    /// Returns an error if `x` and `y` differ in length.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        if x.len() != y.len() {
            return Err(Error::DataLengthMismatch {
                x_len: x.len(),
                y_len: y.len(),
            });
        }
        Ok(Self {
            x,
            y,
            color: Rgba::BLACK,
            width: 1.5,
            style: LineStyle::Solid,
        })
    }

    /// Set the stroke color.
    #[must_use]
    pub fn color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    /// Set the width in points.
    #[must_use]
    pub fn width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    /// Set the dash style.
    #[must_use]
    pub fn style(mut self, style: LineStyle) -> Self {
        self.style = style;
        self
    }

    /// Number of vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// True when the line has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Bounding box of the finite vertices as `((xmin, xmax), (ymin, ymax))`.
    #[must_use]
    pub fn extent(&self) -> Option<((f64, f64), (f64, f64))> {
        self.x
            .iter()
            .zip(&self.y)
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .fold(None, |acc, (&x, &y)| match acc {
                None => Some(((x, x), (y, y))),
                Some(((x0, x1), (y0, y1))) => Some(((x0.min(x), x1.max(x)), (y0.min(y), y1.max(y)))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_douglas_peucker_simple() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.1),
            Point::new(2.0, -0.1),
            Point::new(3.0, 5.0),
            Point::new(4.0, 6.0),
            Point::new(5.0, 7.0),
        ];
        let simplified = douglas_peucker(&points, 1.0);
        assert!(simplified.len() < points.len());
        assert_eq!(simplified[0], points[0]);
        assert_eq!(simplified[simplified.len() - 1], points[5]);
    }

    #[test]
    fn test_douglas_peucker_straight_line() {
        let points: Vec<Point> = (0..100).map(|i| Point::new(i as f32, i as f32 * 2.0)).collect();
        assert_eq!(douglas_peucker(&points, 0.1).len(), 2);
    }

    #[test]
    fn test_douglas_peucker_too_few_points() {
        let points = vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)];
        assert_eq!(douglas_peucker(&points, 0.1), points);
    }

    #[test]
    fn test_line_artist_builder() {
        let line = LineArtist::new(vec![0.0, 1.0], vec![2.0, 3.0])
            .unwrap()
            .color(Rgba::GREY)
            .width(1.0)
            .style(LineStyle::Dashed);
        assert_eq!(line.len(), 2);
        assert_eq!(line.color, Rgba::GREY);
        assert_eq!(line.style, LineStyle::Dashed);
    }

    #[test]
    fn test_line_artist_mismatch() {
        assert!(LineArtist::new(vec![0.0], vec![]).is_err());
    }

    #[test]
    fn test_extent_skips_nan() {
        let line = LineArtist::new(vec![0.0, 1.0, 2.0], vec![1.0, f64::NAN, -1.0]).unwrap();
        assert_eq!(line.extent(), Some(((0.0, 2.0), (-1.0, 1.0))));
    }
}
