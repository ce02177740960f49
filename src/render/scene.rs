//! Display list of pixel-space marks.
//!
//! Figures are laid out once into a [`Scene`]; the scene is then either
//! rasterized into a [`Framebuffer`] or emitted as SVG. Both backends see
//! the same geometry.

use crate::color::Rgba;
use crate::error::Result;
use crate::framebuffer::Framebuffer;
use crate::geometry::Point;
use crate::output::{fmt_num, SvgElement, SvgEncoder, TextAnchor};
use crate::render::font;
use crate::render::primitives::{draw_polyline, fill_polygon};

/// Line dash style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineStyle {
    /// Continuous line.
    #[default]
    Solid,
    /// `--`
    Dashed,
    /// `:`
    Dotted,
    /// `-.`
    DashDot,
}

impl LineStyle {
    /// Dash pattern in pixels for a stroke of `width` pixels.
    #[must_use]
    pub fn dash_pattern(self, width: f32) -> Option<Vec<f32>> {
        let w = width.max(1.0);
        match self {
            Self::Solid => None,
            Self::Dashed => Some(vec![3.7 * w, 1.6 * w]),
            Self::Dotted => Some(vec![w, 1.65 * w]),
            Self::DashDot => Some(vec![6.4 * w, 1.6 * w, w, 1.6 * w]),
        }
    }

    /// Parse a matplotlib-style line style string.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "-" | "solid" => Some(Self::Solid),
            "--" | "dashed" => Some(Self::Dashed),
            ":" | "dotted" => Some(Self::Dotted),
            "-." | "dashdot" => Some(Self::DashDot),
            _ => None,
        }
    }
}

/// Stroke parameters in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    /// Stroke color.
    pub color: Rgba,
    /// Width in pixels.
    pub width: f32,
    /// Dash style.
    pub style: LineStyle,
}

impl Stroke {
    /// Solid stroke.
    #[must_use]
    pub const fn solid(color: Rgba, width: f32) -> Self {
        Self {
            color,
            width,
            style: LineStyle::Solid,
        }
    }

    /// Same stroke with a different dash style.
    #[must_use]
    pub const fn with_style(mut self, style: LineStyle) -> Self {
        self.style = style;
        self
    }
}

/// Vertical placement of text relative to its anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VAlign {
    /// Anchor is the top of the cap box.
    Top,
    /// Anchor is the middle of the cap box.
    Center,
    /// Anchor is the baseline.
    #[default]
    Baseline,
}

/// A text mark.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMark {
    /// Anchor point.
    pub pos: Point,
    /// Content.
    pub text: String,
    /// Font size in pixels.
    pub size: f32,
    /// Fill color.
    pub color: Rgba,
    /// Horizontal placement along the text direction.
    pub anchor: TextAnchor,
    /// Placement across the text direction.
    pub valign: VAlign,
    /// Rotate 90 degrees counter-clockwise.
    pub rotated: bool,
}

impl TextMark {
    /// Horizontal text with the given anchoring.
    #[must_use]
    pub fn new(pos: Point, text: impl Into<String>, size: f32, anchor: TextAnchor, valign: VAlign) -> Self {
        Self {
            pos,
            text: text.into(),
            size,
            color: Rgba::BLACK,
            anchor,
            valign,
            rotated: false,
        }
    }

    /// Rotate the text to read bottom-to-top.
    #[must_use]
    pub fn rotated(mut self) -> Self {
        self.rotated = true;
        self
    }

    /// Offset along the text direction for the anchor.
    fn along_offset(&self) -> f32 {
        let w = font::text_width(&self.text, self.size);
        match self.anchor {
            TextAnchor::Start => 0.0,
            TextAnchor::Middle => w / 2.0,
            TextAnchor::End => w,
        }
    }

    /// Distance from the anchor to the baseline, across the text direction.
    fn baseline_offset(&self) -> f32 {
        let cap = font::cap_height(self.size);
        match self.valign {
            VAlign::Top => cap,
            VAlign::Center => cap / 2.0,
            VAlign::Baseline => 0.0,
        }
    }
}

/// A single drawable in pixel space.
#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    /// Open polyline.
    Polyline {
        /// Vertices.
        points: Vec<Point>,
        /// Stroke.
        stroke: Stroke,
    },
    /// Filled polygon; extra rings are holes (even-odd).
    Polygon {
        /// Closed rings.
        rings: Vec<Vec<Point>>,
        /// Fill color.
        fill: Rgba,
        /// Optional outline.
        stroke: Option<Stroke>,
    },
    /// Text.
    Text(TextMark),
}

/// An ordered display list with a background color.
#[derive(Debug, Clone)]
pub struct Scene {
    width: u32,
    height: u32,
    background: Rgba,
    marks: Vec<Mark>,
}

impl Scene {
    /// Create an empty scene.
    #[must_use]
    pub fn new(width: u32, height: u32, background: Rgba) -> Self {
        Self {
            width,
            height,
            background,
            marks: Vec::new(),
        }
    }

    /// Scene width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Scene height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Marks in paint order.
    #[must_use]
    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    /// Append a mark.
    pub fn push(&mut self, mark: Mark) {
        self.marks.push(mark);
    }

    /// Append a polyline; fewer than two points is a no-op.
    pub fn polyline(&mut self, points: Vec<Point>, stroke: Stroke) {
        if points.len() >= 2 {
            self.marks.push(Mark::Polyline { points, stroke });
        }
    }

    /// Append a filled polygon.
    pub fn polygon(&mut self, rings: Vec<Vec<Point>>, fill: Rgba, stroke: Option<Stroke>) {
        if rings.iter().any(|r| r.len() >= 3) {
            self.marks.push(Mark::Polygon { rings, fill, stroke });
        }
    }

    /// Append an axis-aligned rectangle.
    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, fill: Rgba, stroke: Option<Stroke>) {
        let ring = vec![
            Point::new(x, y),
            Point::new(x + w, y),
            Point::new(x + w, y + h),
            Point::new(x, y + h),
        ];
        self.polygon(vec![ring], fill, stroke);
    }

    /// Append text.
    pub fn text(&mut self, mark: TextMark) {
        if !mark.text.is_empty() {
            self.marks.push(Mark::Text(mark));
        }
    }

    /// Rasterize the scene.
    ///
    /// # Errors
    ///
    /// Returns an error if the scene has zero width or height.
    pub fn to_framebuffer(&self) -> Result<Framebuffer> {
        let mut fb = Framebuffer::new(self.width, self.height)?;
        self.render(&mut fb);
        Ok(fb)
    }

    /// Rasterize into an existing framebuffer.
    pub fn render(&self, fb: &mut Framebuffer) {
        fb.clear(self.background);
        for mark in &self.marks {
            match mark {
                Mark::Polyline { points, stroke } => rasterize_stroke(fb, points, stroke, false),
                Mark::Polygon { rings, fill, stroke } => {
                    if fill.a > 0 {
                        fill_polygon(fb, rings, *fill);
                    }
                    if let Some(stroke) = stroke {
                        for ring in rings {
                            rasterize_stroke(fb, ring, stroke, true);
                        }
                    }
                }
                Mark::Text(text) => rasterize_text(fb, text),
            }
        }
    }

    /// Convert the scene to an SVG document.
    ///
    /// Consecutive unstroked polygons of the same fill are merged into one
    /// path element.
    #[must_use]
    pub fn to_svg(&self) -> SvgEncoder {
        let mut svg = SvgEncoder::new(self.width, self.height).background(Some(self.background));
        let mut pending: Option<(Rgba, String)> = None;

        for mark in &self.marks {
            if let Mark::Polygon {
                rings,
                fill,
                stroke: None,
            } = mark
            {
                match &mut pending {
                    Some((color, d)) if color == fill => path_data(d, rings),
                    _ => {
                        flush_path(&mut svg, pending.take());
                        let mut d = String::new();
                        path_data(&mut d, rings);
                        pending = Some((*fill, d));
                    }
                }
                continue;
            }
            flush_path(&mut svg, pending.take());

            match mark {
                Mark::Polyline { points, stroke } => svg.add_element(SvgElement::Polyline {
                    points: points.iter().map(|p| (p.x, p.y)).collect(),
                    stroke: stroke.color,
                    stroke_width: stroke.width,
                    dash: stroke.style.dash_pattern(stroke.width),
                }),
                Mark::Polygon { rings, fill, stroke } => {
                    let mut d = String::new();
                    path_data(&mut d, rings);
                    svg.add_element(SvgElement::Path {
                        d,
                        fill: (fill.a > 0).then_some(*fill),
                        stroke: stroke.map(|s| s.color),
                        stroke_width: stroke.map_or(0.0, |s| s.width),
                    });
                }
                Mark::Text(text) => svg.add_element(svg_text(text)),
            }
        }
        flush_path(&mut svg, pending);
        svg
    }
}

fn rasterize_stroke(fb: &mut Framebuffer, points: &[Point], stroke: &Stroke, closed: bool) {
    let mut path: Vec<Point> = points.to_vec();
    if closed {
        if let Some(first) = points.first() {
            path.push(*first);
        }
    }
    match stroke.style.dash_pattern(stroke.width) {
        None => draw_polyline(fb, &path, stroke.width, stroke.color),
        Some(pattern) => {
            for dash in split_dashes(&path, &pattern) {
                draw_polyline(fb, &dash, stroke.width, stroke.color);
            }
        }
    }
}

/// Split a polyline into its "on" dashes.
#[must_use]
pub fn split_dashes(points: &[Point], pattern: &[f32]) -> Vec<Vec<Point>> {
    let mut dashes = Vec::new();
    if pattern.is_empty() || pattern.iter().any(|d| *d <= 0.0) {
        return vec![points.to_vec()];
    }

    let mut index = 0;
    let mut remaining = pattern[0];
    let mut current: Vec<Point> = points.first().copied().into_iter().collect();

    for pair in points.windows(2) {
        let (mut a, b) = (pair[0], pair[1]);
        let mut seg_len = a.distance(b);
        while seg_len > 0.0 {
            let on = index % 2 == 0;
            if remaining >= seg_len {
                remaining -= seg_len;
                if on {
                    current.push(b);
                }
                seg_len = 0.0;
            } else {
                let split = a.lerp(b, remaining / seg_len);
                if on {
                    current.push(split);
                    dashes.push(std::mem::take(&mut current));
                } else {
                    current = vec![split];
                }
                seg_len -= remaining;
                a = split;
                index = (index + 1) % pattern.len();
                remaining = pattern[index];
            }
        }
    }
    if index % 2 == 0 && current.len() > 1 {
        dashes.push(current);
    }
    dashes
}

fn rasterize_text(fb: &mut Framebuffer, text: &TextMark) {
    let along = text.along_offset();
    let to_top = font::cap_height(text.size) - text.baseline_offset();
    if text.rotated {
        font::draw_text(
            fb,
            text.pos.x - to_top,
            text.pos.y + along,
            &text.text,
            text.size,
            text.color,
            true,
        );
    } else {
        font::draw_text(
            fb,
            text.pos.x - along,
            text.pos.y - to_top,
            &text.text,
            text.size,
            text.color,
            false,
        );
    }
}

fn svg_text(text: &TextMark) -> SvgElement {
    let shift = text.baseline_offset();
    let (x, y, rotation) = if text.rotated {
        (text.pos.x + shift, text.pos.y, 90.0)
    } else {
        (text.pos.x, text.pos.y + shift, 0.0)
    };
    SvgElement::Text {
        x,
        y,
        text: text.text.clone(),
        font_size: text.size,
        fill: text.color,
        anchor: text.anchor,
        rotation,
    }
}

fn path_data(d: &mut String, rings: &[Vec<Point>]) {
    for ring in rings.iter().filter(|r| r.len() >= 3) {
        for (i, p) in ring.iter().enumerate() {
            if !d.is_empty() {
                d.push(' ');
            }
            d.push(if i == 0 { 'M' } else { 'L' });
            d.push_str(&fmt_num(p.x));
            d.push(',');
            d.push_str(&fmt_num(p.y));
        }
        d.push_str(" Z");
    }
}

fn flush_path(svg: &mut SvgEncoder, pending: Option<(Rgba, String)>) {
    if let Some((fill, d)) = pending {
        svg.add_element(SvgElement::Path {
            d,
            fill: Some(fill),
            stroke: None,
            stroke_width: 0.0,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f32, y: f32, s: f32) -> Vec<Point> {
        vec![
            Point::new(x, y),
            Point::new(x + s, y),
            Point::new(x + s, y + s),
            Point::new(x, y + s),
        ]
    }

    #[test]
    fn test_dash_pattern_scales_with_width() {
        assert_eq!(LineStyle::Solid.dash_pattern(2.0), None);
        let dashed = LineStyle::Dashed.dash_pattern(2.0).unwrap();
        assert!((dashed[0] - 7.4).abs() < 1e-5);
        assert_eq!(LineStyle::from_name("--"), Some(LineStyle::Dashed));
        assert_eq!(LineStyle::from_name("wavy"), None);
    }

    #[test]
    fn test_split_dashes() {
        let line = [Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        let dashes = split_dashes(&line, &[2.0, 3.0]);
        assert_eq!(dashes.len(), 2);
        assert!((dashes[0][1].x - 2.0).abs() < 1e-5);
        assert!((dashes[1][0].x - 5.0).abs() < 1e-5);
        assert!((dashes[1][1].x - 7.0).abs() < 1e-5);
    }

    #[test]
    fn test_split_dashes_across_vertices() {
        let line = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 3.0)];
        let dashes = split_dashes(&line, &[2.0, 10.0]);
        assert_eq!(dashes.len(), 1);
        assert_eq!(dashes[0].len(), 3);
    }

    #[test]
    fn test_scene_rasterizes_background_and_fill() {
        let mut scene = Scene::new(40, 40, Rgba::WHITE);
        scene.polygon(vec![square(10.0, 10.0, 10.0)], Rgba::RED, None);
        let fb = scene.to_framebuffer().unwrap();
        assert_eq!(fb.get_pixel(0, 0), Some(Rgba::WHITE));
        assert_eq!(fb.get_pixel(15, 15), Some(Rgba::RED));
    }

    #[test]
    fn test_scene_ignores_degenerate_marks() {
        let mut scene = Scene::new(10, 10, Rgba::WHITE);
        scene.polyline(vec![Point::new(1.0, 1.0)], Stroke::solid(Rgba::BLACK, 1.0));
        scene.polygon(vec![vec![Point::new(0.0, 0.0)]], Rgba::BLACK, None);
        scene.text(TextMark::new(Point::ORIGIN, "", 10.0, TextAnchor::Start, VAlign::Top));
        assert!(scene.marks().is_empty());
    }

    #[test]
    fn test_svg_merges_same_fill_polygons() {
        let mut scene = Scene::new(40, 40, Rgba::WHITE);
        scene.polygon(vec![square(0.0, 0.0, 5.0)], Rgba::RED, None);
        scene.polygon(vec![square(10.0, 0.0, 5.0)], Rgba::RED, None);
        scene.polygon(vec![square(20.0, 0.0, 5.0)], Rgba::BLUE, None);
        let svg = scene.to_svg().render();
        assert_eq!(svg.matches("<path").count(), 2);
    }

    #[test]
    fn test_svg_keeps_paint_order() {
        let mut scene = Scene::new(40, 40, Rgba::WHITE);
        scene.polygon(vec![square(0.0, 0.0, 5.0)], Rgba::RED, None);
        scene.polyline(
            vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)],
            Stroke::solid(Rgba::BLACK, 1.0).with_style(LineStyle::Dashed),
        );
        scene.polygon(vec![square(10.0, 0.0, 5.0)], Rgba::RED, None);
        let svg = scene.to_svg().render();
        assert_eq!(svg.matches("<path").count(), 2);
        let line_at = svg.find("<polyline").unwrap();
        let second_path = svg.rfind("<path").unwrap();
        assert!(line_at < second_path);
        assert!(svg.contains("stroke-dasharray"));
    }

    #[test]
    fn test_text_anchor_positions() {
        let mut scene = Scene::new(100, 40, Rgba::WHITE);
        let mut mark = TextMark::new(Point::new(50.0, 20.0), "II", 10.0, TextAnchor::Middle, VAlign::Center);
        mark.color = Rgba::BLACK;
        scene.text(mark);
        let fb = scene.to_framebuffer().unwrap();
        // "II" is 12 px wide centered at x = 50 and 7 px tall centered at y = 20.
        assert_eq!(fb.get_pixel(46, 20), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(46, 30), Some(Rgba::WHITE));
    }

    #[test]
    fn test_rotated_svg_text() {
        let mut scene = Scene::new(100, 100, Rgba::WHITE);
        scene.text(TextMark::new(Point::new(20.0, 50.0), "label", 10.0, TextAnchor::Middle, VAlign::Baseline).rotated());
        let svg = scene.to_svg().render();
        assert!(svg.contains("rotate(-90 20 50)"));
    }
}
