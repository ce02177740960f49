//! Primitive rendering functions.
//!
//! Implements rasterization algorithms for lines, thick strokes, circles and
//! polygons with holes.

use crate::color::Rgba;
use crate::framebuffer::Framebuffer;
use crate::geometry::Point;

// ============================================================================
// Line Drawing
// ============================================================================

/// Draw an anti-aliased line using Wu's algorithm.
///
/// Draws two pixels at each step along the major axis, adjusting their
/// intensities by the fractional distance from the ideal line position.
///
/// # References
///
/// Wu, X. (1991). "An Efficient Antialiasing Technique." SIGGRAPH '91.
pub fn draw_line_aa(fb: &mut Framebuffer, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgba) {
    let steep = (y1 - y0).abs() > (x1 - x0).abs();

    let (x0, y0, x1, y1) = if steep { (y0, x0, y1, x1) } else { (x0, y0, x1, y1) };
    let (x0, y0, x1, y1) = if x0 > x1 { (x1, y1, x0, y0) } else { (x0, y0, x1, y1) };

    let dx = x1 - x0;
    let dy = y1 - y0;
    let gradient = if dx.abs() < f32::EPSILON { 1.0 } else { dy / dx };

    // First endpoint
    let xend = x0.round();
    let yend = y0 + gradient * (xend - x0);
    let xgap = rfpart(x0 + 0.5);
    let xpxl1 = xend as i32;
    let ypxl1 = yend.floor() as i32;

    if steep {
        plot(fb, ypxl1, xpxl1, color, rfpart(yend) * xgap);
        plot(fb, ypxl1 + 1, xpxl1, color, fpart(yend) * xgap);
    } else {
        plot(fb, xpxl1, ypxl1, color, rfpart(yend) * xgap);
        plot(fb, xpxl1, ypxl1 + 1, color, fpart(yend) * xgap);
    }

    let mut intery = yend + gradient;

    // Second endpoint
    let xend = x1.round();
    let yend = y1 + gradient * (xend - x1);
    let xgap = fpart(x1 + 0.5);
    let xpxl2 = xend as i32;
    let ypxl2 = yend.floor() as i32;

    if steep {
        plot(fb, ypxl2, xpxl2, color, rfpart(yend) * xgap);
        plot(fb, ypxl2 + 1, xpxl2, color, fpart(yend) * xgap);
    } else {
        plot(fb, xpxl2, ypxl2, color, rfpart(yend) * xgap);
        plot(fb, xpxl2, ypxl2 + 1, color, fpart(yend) * xgap);
    }

    if steep {
        for x in (xpxl1 + 1)..xpxl2 {
            let ipart = intery.floor() as i32;
            plot(fb, ipart, x, color, rfpart(intery));
            plot(fb, ipart + 1, x, color, fpart(intery));
            intery += gradient;
        }
    } else {
        for x in (xpxl1 + 1)..xpxl2 {
            let ipart = intery.floor() as i32;
            plot(fb, x, ipart, color, rfpart(intery));
            plot(fb, x, ipart + 1, color, fpart(intery));
            intery += gradient;
        }
    }
}

/// Plot a pixel with intensity (for anti-aliased drawing).
#[inline]
fn plot(fb: &mut Framebuffer, x: i32, y: i32, color: Rgba, intensity: f32) {
    if x >= 0 && y >= 0 && x < fb.width() as i32 && y < fb.height() as i32 {
        let alpha = (f32::from(color.a) * intensity.clamp(0.0, 1.0)) as u8;
        fb.blend_pixel(x as u32, y as u32, color.with_alpha(alpha));
    }
}

#[inline]
fn fpart(x: f32) -> f32 {
    x - x.floor()
}

#[inline]
fn rfpart(x: f32) -> f32 {
    1.0 - fpart(x)
}

/// Draw a line segment of arbitrary width.
///
/// Hairlines (width up to 1.5 px) use Wu's algorithm, with sub-pixel widths
/// rendered as reduced opacity. Wider strokes are filled as quads.
pub fn draw_thick_line(fb: &mut Framebuffer, a: Point, b: Point, width: f32, color: Rgba) {
    if width <= 1.5 {
        let color = if width < 1.0 { color.with_opacity(width.max(0.2)) } else { color };
        draw_line_aa(fb, a.x, a.y, b.x, b.y, color);
        return;
    }

    let len = a.distance(b);
    if len < f32::EPSILON {
        draw_circle(fb, a.x.round() as i32, a.y.round() as i32, (width / 2.0).round() as i32, color);
        return;
    }
    let nx = -(b.y - a.y) / len * width / 2.0;
    let ny = (b.x - a.x) / len * width / 2.0;
    let quad = vec![
        Point::new(a.x + nx, a.y + ny),
        Point::new(b.x + nx, b.y + ny),
        Point::new(b.x - nx, b.y - ny),
        Point::new(a.x - nx, a.y - ny),
    ];
    fill_polygon(fb, &[quad], color);
}

/// Draw a connected polyline, adding round joins for wide strokes.
pub fn draw_polyline(fb: &mut Framebuffer, points: &[Point], width: f32, color: Rgba) {
    for pair in points.windows(2) {
        draw_thick_line(fb, pair[0], pair[1], width, color);
    }
    if width > 2.5 && points.len() > 2 {
        let r = (width / 2.0).round() as i32;
        for p in &points[1..points.len() - 1] {
            draw_circle(fb, p.x.round() as i32, p.y.round() as i32, r, color);
        }
    }
}

// ============================================================================
// Polygon Fill
// ============================================================================

/// Fill a polygon given as one or more closed rings (even-odd rule).
///
/// Holes are expressed as additional rings. Pixels are sampled at their
/// centers, so polygons that share an edge never overlap or leave a gap.
pub fn fill_polygon(fb: &mut Framebuffer, rings: &[Vec<Point>], color: Rgba) {
    let mut edges: Vec<(Point, Point)> = Vec::new();
    let mut y_min = f32::INFINITY;
    let mut y_max = f32::NEG_INFINITY;

    for ring in rings {
        if ring.len() < 3 {
            continue;
        }
        for i in 0..ring.len() {
            let a = ring[i];
            let b = ring[(i + 1) % ring.len()];
            if !a.is_finite() || !b.is_finite() {
                continue;
            }
            if (a.y - b.y).abs() > f32::EPSILON {
                edges.push((a, b));
            }
            y_min = y_min.min(a.y);
            y_max = y_max.max(a.y);
        }
    }
    if edges.is_empty() {
        return;
    }

    let row_start = ((y_min - 0.5).ceil() as i32).max(0);
    let row_end = ((y_max - 0.5).ceil() as i32).min(fb.height() as i32);
    let mut xs: Vec<f32> = Vec::with_capacity(8);

    for y in row_start..row_end {
        let yc = y as f32 + 0.5;
        xs.clear();
        for &(a, b) in &edges {
            let (lo, hi) = if a.y < b.y { (a, b) } else { (b, a) };
            if yc >= lo.y && yc < hi.y {
                let t = (yc - lo.y) / (hi.y - lo.y);
                xs.push(lo.x + (hi.x - lo.x) * t);
            }
        }
        xs.sort_by(f32::total_cmp);
        for pair in xs.chunks_exact(2) {
            let x0 = (pair[0] - 0.5).ceil() as i32;
            let x1 = (pair[1] - 0.5).ceil() as i32;
            fb.fill_span(x0, x1, y, color);
        }
    }
}

// ============================================================================
// Circle Drawing
// ============================================================================

/// Draw a filled circle using the midpoint algorithm.
pub fn draw_circle(fb: &mut Framebuffer, cx: i32, cy: i32, radius: i32, color: Rgba) {
    if radius <= 0 {
        if cx >= 0 && cy >= 0 {
            fb.blend_pixel(cx as u32, cy as u32, color);
        }
        return;
    }

    let mut x = radius;
    let mut y = 0;
    let mut err = 1 - radius;
    let mut rows: Vec<(i32, i32)> = Vec::new();

    while x >= y {
        rows.push((cy + y, x));
        rows.push((cy - y, x));
        rows.push((cy + x, y));
        rows.push((cy - x, y));

        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }

    // Collapse to the widest span per row so translucent fills blend once.
    rows.sort_unstable();
    rows.dedup_by(|next, kept| {
        if next.0 == kept.0 {
            kept.1 = kept.1.max(next.1);
            true
        } else {
            false
        }
    });
    for (row, half) in rows {
        fb.fill_span(cx - half, cx + half + 1, row, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white(w: u32, h: u32) -> Framebuffer {
        let mut fb = Framebuffer::new(w, h).expect("framebuffer creation should succeed");
        fb.clear(Rgba::WHITE);
        fb
    }

    #[test]
    fn test_draw_line_aa_marks_path() {
        let mut fb = white(100, 100);
        draw_line_aa(&mut fb, 10.0, 50.0, 90.0, 50.0, Rgba::BLACK);
        let px = fb.get_pixel(50, 50).unwrap();
        assert!(px.r < 128);
        assert_eq!(fb.get_pixel(50, 20), Some(Rgba::WHITE));
    }

    #[test]
    fn test_thick_line_covers_width() {
        let mut fb = white(100, 100);
        draw_thick_line(&mut fb, Point::new(10.0, 50.0), Point::new(90.0, 50.0), 6.0, Rgba::RED);
        assert_eq!(fb.get_pixel(50, 48), Some(Rgba::RED));
        assert_eq!(fb.get_pixel(50, 52), Some(Rgba::RED));
        assert_eq!(fb.get_pixel(50, 60), Some(Rgba::WHITE));
    }

    #[test]
    fn test_fill_polygon_square() {
        let mut fb = white(50, 50);
        let square = vec![
            Point::new(10.0, 10.0),
            Point::new(20.0, 10.0),
            Point::new(20.0, 20.0),
            Point::new(10.0, 20.0),
        ];
        fill_polygon(&mut fb, &[square], Rgba::BLUE);
        assert_eq!(fb.get_pixel(10, 10), Some(Rgba::BLUE));
        assert_eq!(fb.get_pixel(19, 19), Some(Rgba::BLUE));
        assert_eq!(fb.get_pixel(20, 20), Some(Rgba::WHITE));
        assert_eq!(fb.count_non_background(Rgba::WHITE), 100);
    }

    #[test]
    fn test_fill_polygon_with_hole() {
        let mut fb = white(50, 50);
        let outer = vec![
            Point::new(0.0, 0.0),
            Point::new(40.0, 0.0),
            Point::new(40.0, 40.0),
            Point::new(0.0, 40.0),
        ];
        let hole = vec![
            Point::new(10.0, 10.0),
            Point::new(30.0, 10.0),
            Point::new(30.0, 30.0),
            Point::new(10.0, 30.0),
        ];
        fill_polygon(&mut fb, &[outer, hole], Rgba::BLACK);
        assert_eq!(fb.get_pixel(5, 5), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(20, 20), Some(Rgba::WHITE));
    }

    #[test]
    fn test_adjacent_triangles_tile_without_gaps() {
        let mut fb = white(20, 20);
        let a = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(0.0, 10.0)];
        let b = vec![Point::new(10.0, 0.0), Point::new(10.0, 10.0), Point::new(0.0, 10.0)];
        fill_polygon(&mut fb, &[a], Rgba::BLACK);
        fill_polygon(&mut fb, &[b], Rgba::BLACK);
        assert_eq!(fb.count_non_background(Rgba::WHITE), 100);
    }

    #[test]
    fn test_draw_circle() {
        let mut fb = white(100, 100);
        draw_circle(&mut fb, 50, 50, 20, Rgba::BLUE);
        assert_eq!(fb.get_pixel(50, 50), Some(Rgba::BLUE));
        assert_eq!(fb.get_pixel(5, 5), Some(Rgba::WHITE));
    }

    #[test]
    fn test_polyline_out_of_bounds_does_not_panic() {
        let mut fb = white(20, 20);
        let pts = [Point::new(-50.0, -50.0), Point::new(70.0, 70.0), Point::new(-10.0, 30.0)];
        draw_polyline(&mut fb, &pts, 4.0, Rgba::BLACK);
        assert!(fb.count_non_background(Rgba::WHITE) > 0);
    }
}
