//! Geometric primitives and clipping in pixel space.
//!
//! Data marks are clipped against the axes rectangle before they reach the
//! rasterizer or the SVG encoder, so both backends see identical geometry.

/// A 2D point with floating-point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Point {
    /// Origin point (0, 0).
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate the distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear interpolation between two points.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    /// True when both coordinates are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A rectangle defined by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X coordinate of the top-left corner.
    pub x: f32,
    /// Y coordinate of the top-left corner.
    pub y: f32,
    /// Width of the rectangle.
    pub width: f32,
    /// Height of the rectangle.
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Check if a point is inside the rectangle (edges included).
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Get the center point of the rectangle.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Shrink (or grow, for negative values) by the given edge amounts.
    #[must_use]
    pub fn inset(&self, left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self::new(
            self.x + left,
            self.y + top,
            (self.width - left - right).max(0.0),
            (self.height - top - bottom).max(0.0),
        )
    }

    /// Largest rectangle of the given aspect (width / height) centered inside this one.
    #[must_use]
    pub fn fit_aspect(&self, aspect: f32) -> Self {
        if aspect <= 0.0 || !aspect.is_finite() || self.height <= 0.0 {
            return *self;
        }
        let own = self.width / self.height;
        if own > aspect {
            let w = self.height * aspect;
            Self::new(self.x + (self.width - w) / 2.0, self.y, w, self.height)
        } else {
            let h = self.width / aspect;
            Self::new(self.x, self.y + (self.height - h) / 2.0, self.width, h)
        }
    }
}

/// Clip a segment to a rectangle (Liang-Barsky).
///
/// Returns `None` when the segment lies entirely outside.
#[must_use]
pub fn clip_segment(a: Point, b: Point, rect: &Rect) -> Option<(Point, Point)> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let mut t0 = 0.0_f32;
    let mut t1 = 1.0_f32;

    for (p, q) in [
        (-dx, a.x - rect.x),
        (dx, rect.right() - a.x),
        (-dy, a.y - rect.y),
        (dy, rect.bottom() - a.y),
    ] {
        if p.abs() < f32::EPSILON {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return None;
                }
                t1 = t1.min(r);
            }
        }
    }

    Some((a.lerp(b, t0), a.lerp(b, t1)))
}

/// Clip a polyline to a rectangle, returning the visible pieces.
#[must_use]
pub fn clip_polyline(points: &[Point], rect: &Rect) -> Vec<Vec<Point>> {
    let mut pieces: Vec<Vec<Point>> = Vec::new();
    let mut current: Vec<Point> = Vec::new();

    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if !a.is_finite() || !b.is_finite() {
            if current.len() > 1 {
                pieces.push(std::mem::take(&mut current));
            }
            current.clear();
            continue;
        }
        match clip_segment(a, b, rect) {
            Some((ca, cb)) => {
                let continues = current.last().is_some_and(|last| last.distance(ca) < 1e-3);
                if !continues {
                    if current.len() > 1 {
                        pieces.push(std::mem::take(&mut current));
                    }
                    current.clear();
                    current.push(ca);
                }
                current.push(cb);
                if cb.distance(b) > 1e-3 {
                    pieces.push(std::mem::take(&mut current));
                }
            }
            None => {
                if current.len() > 1 {
                    pieces.push(std::mem::take(&mut current));
                }
                current.clear();
            }
        }
    }
    if current.len() > 1 {
        pieces.push(current);
    }
    pieces
}

/// Clip a closed polygon ring to a rectangle (Sutherland-Hodgman).
///
/// The result may be empty.
#[must_use]
pub fn clip_polygon(ring: &[Point], rect: &Rect) -> Vec<Point> {
    let edges: [(fn(Point, &Rect) -> bool, Edge); 4] = [
        (|p, r| p.x >= r.x, Edge::Left),
        (|p, r| p.x <= r.right(), Edge::Right),
        (|p, r| p.y >= r.y, Edge::Top),
        (|p, r| p.y <= r.bottom(), Edge::Bottom),
    ];

    let mut output: Vec<Point> = ring.to_vec();
    for (inside, edge) in edges {
        if output.is_empty() {
            break;
        }
        let input = std::mem::take(&mut output);
        let mut prev = input[input.len() - 1];
        for &cur in &input {
            let cur_in = inside(cur, rect);
            let prev_in = inside(prev, rect);
            if cur_in {
                if !prev_in {
                    output.push(intersect(prev, cur, edge, rect));
                }
                output.push(cur);
            } else if prev_in {
                output.push(intersect(prev, cur, edge, rect));
            }
            prev = cur;
        }
    }
    output
}

#[derive(Clone, Copy)]
enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

fn intersect(a: Point, b: Point, edge: Edge, rect: &Rect) -> Point {
    match edge {
        Edge::Left | Edge::Right => {
            let x = if matches!(edge, Edge::Left) { rect.x } else { rect.right() };
            let t = if (b.x - a.x).abs() < f32::EPSILON { 0.0 } else { (x - a.x) / (b.x - a.x) };
            Point::new(x, a.y + (b.y - a.y) * t)
        }
        Edge::Top | Edge::Bottom => {
            let y = if matches!(edge, Edge::Top) { rect.y } else { rect.bottom() };
            let t = if (b.y - a.y).abs() < f32::EPSILON { 0.0 } else { (y - a.y) / (b.y - a.y) };
            Point::new(a.x + (b.x - a.x) * t, y)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(3.0, 4.0);
        assert!((p1.distance(p2) - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(10.0, 10.0, 100.0, 50.0);
        assert!(rect.contains(Point::new(50.0, 30.0)));
        assert!(!rect.contains(Point::new(5.0, 30.0)));
        assert!((rect.right() - 110.0).abs() < 1e-6);
        assert!((rect.bottom() - 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_fit_aspect_wide_box() {
        let rect = Rect::new(0.0, 0.0, 400.0, 100.0);
        let fitted = rect.fit_aspect(2.0);
        assert!((fitted.width - 200.0).abs() < 1e-3);
        assert!((fitted.height - 100.0).abs() < 1e-3);
        assert!((fitted.x - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_fit_aspect_tall_box() {
        let rect = Rect::new(0.0, 0.0, 100.0, 400.0);
        let fitted = rect.fit_aspect(2.0);
        assert!((fitted.height - 50.0).abs() < 1e-3);
        assert!((fitted.y - 175.0).abs() < 1e-3);
    }

    #[test]
    fn test_clip_segment_crossing() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let (a, b) = clip_segment(Point::new(-5.0, 5.0), Point::new(15.0, 5.0), &rect).unwrap();
        assert!((a.x - 0.0).abs() < 1e-5);
        assert!((b.x - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_clip_segment_outside() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(clip_segment(Point::new(-5.0, -5.0), Point::new(-1.0, 20.0), &rect).is_none());
    }

    #[test]
    fn test_clip_polyline_splits_on_exit() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let line = [
            Point::new(1.0, 1.0),
            Point::new(5.0, 1.0),
            Point::new(20.0, 1.0),
            Point::new(20.0, 5.0),
            Point::new(5.0, 5.0),
            Point::new(2.0, 5.0),
        ];
        let pieces = clip_polyline(&line, &rect);
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].len(), 3);
        assert!((pieces[1][0].x - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_clip_polyline_breaks_on_nan() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let line = [
            Point::new(1.0, 1.0),
            Point::new(2.0, 1.0),
            Point::new(f32::NAN, 1.0),
            Point::new(3.0, 1.0),
            Point::new(4.0, 1.0),
        ];
        assert_eq!(clip_polyline(&line, &rect).len(), 2);
    }

    #[test]
    fn test_clip_polygon_half_outside() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let square = [
            Point::new(5.0, 2.0),
            Point::new(15.0, 2.0),
            Point::new(15.0, 8.0),
            Point::new(5.0, 8.0),
        ];
        let clipped = clip_polygon(&square, &rect);
        assert_eq!(clipped.len(), 4);
        assert!(clipped.iter().all(|p| p.x <= 10.0 + 1e-4));
    }

    #[test]
    fn test_clip_polygon_fully_outside() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let tri = [Point::new(20.0, 20.0), Point::new(30.0, 20.0), Point::new(25.0, 30.0)];
        assert!(clip_polygon(&tri, &rect).is_empty());
    }
}
