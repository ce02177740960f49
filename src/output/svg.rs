//! SVG output encoder.
//!
//! Vector output for figures: polylines with dash patterns, even-odd filled
//! paths, and rotated text.

use crate::color::Rgba;
use crate::error::Result;
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// SVG encoder for vector output.
#[derive(Debug, Clone)]
pub struct SvgEncoder {
    /// SVG width
    width: u32,
    /// SVG height
    height: u32,
    /// Background color (None for transparent)
    background: Option<Rgba>,
    /// SVG elements
    elements: Vec<SvgElement>,
}

/// An SVG element.
///
/// Field names are self-documenting and match SVG attribute names.
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub enum SvgElement {
    /// Rectangle
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Rgba,
        stroke: Option<Rgba>,
        stroke_width: f32,
    },
    /// Polyline (connected line segments)
    Polyline {
        points: Vec<(f32, f32)>,
        stroke: Rgba,
        stroke_width: f32,
        dash: Option<Vec<f32>>,
    },
    /// Path (SVG path data), filled with the even-odd rule
    Path {
        d: String,
        fill: Option<Rgba>,
        stroke: Option<Rgba>,
        stroke_width: f32,
    },
    /// Text; `rotation` is in degrees, counter-clockwise positive
    Text {
        x: f32,
        y: f32,
        text: String,
        font_size: f32,
        fill: Rgba,
        anchor: TextAnchor,
        rotation: f32,
    },
}

/// Text anchor position for SVG text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum TextAnchor {
    /// Align text start at position (left-aligned for LTR)
    #[default]
    Start,
    /// Center text at position
    Middle,
    /// Align text end at position (right-aligned for LTR)
    End,
}

impl Default for SvgEncoder {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

impl SvgEncoder {
    /// Create a new SVG encoder with given dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: Some(Rgba::WHITE),
            elements: Vec::new(),
        }
    }

    /// Set background color (None for transparent).
    #[must_use]
    pub fn background(mut self, color: Option<Rgba>) -> Self {
        self.background = color;
        self
    }

    /// Add a rectangle.
    #[must_use]
    pub fn rect(mut self, x: f32, y: f32, width: f32, height: f32, fill: Rgba) -> Self {
        self.elements.push(SvgElement::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke: None,
            stroke_width: 1.0,
        });
        self
    }

    /// Add a polyline.
    #[must_use]
    pub fn polyline(mut self, points: &[(f32, f32)], stroke: Rgba, stroke_width: f32) -> Self {
        self.elements.push(SvgElement::Polyline {
            points: points.to_vec(),
            stroke,
            stroke_width,
            dash: None,
        });
        self
    }

    /// Add an SVG path.
    #[must_use]
    pub fn path(
        mut self,
        d: &str,
        fill: Option<Rgba>,
        stroke: Option<Rgba>,
        stroke_width: f32,
    ) -> Self {
        self.elements.push(SvgElement::Path {
            d: d.to_string(),
            fill,
            stroke,
            stroke_width,
        });
        self
    }

    /// Add text with anchor.
    #[must_use]
    pub fn text_anchored(
        mut self,
        x: f32,
        y: f32,
        text: &str,
        font_size: f32,
        fill: Rgba,
        anchor: TextAnchor,
    ) -> Self {
        self.elements.push(SvgElement::Text {
            x,
            y,
            text: text.to_string(),
            font_size,
            fill,
            anchor,
            rotation: 0.0,
        });
        self
    }

    /// Add a raw element.
    pub fn add_element(&mut self, element: SvgElement) {
        self.elements.push(element);
    }

    /// Number of elements added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True when no elements have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Render to SVG string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut svg = String::with_capacity(4096 + self.elements.len() * 96);

        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            self.width, self.height, self.width, self.height
        );

        if let Some(bg) = self.background {
            let _ = writeln!(
                svg,
                r#"  <rect width="100%" height="100%" fill="{}"/>"#,
                rgba_to_css(&bg)
            );
        }

        for element in &self.elements {
            let _ = writeln!(svg, "  {}", element_to_svg(element));
        }

        svg.push_str("</svg>\n");
        svg
    }

    /// Write to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if file writing fails.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(self.render().as_bytes())?;
        Ok(())
    }
}

/// Format a coordinate with at most two decimals and no trailing zeros.
#[must_use]
pub fn fmt_num(value: f32) -> String {
    let s = format!("{value:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Convert RGBA to CSS color string.
fn rgba_to_css(color: &Rgba) -> String {
    if color.a == 255 {
        format!("rgb({},{},{})", color.r, color.g, color.b)
    } else {
        format!(
            "rgba({},{},{},{:.3})",
            color.r,
            color.g,
            color.b,
            f32::from(color.a) / 255.0
        )
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn stroke_attr(stroke: Option<Rgba>, stroke_width: f32) -> String {
    stroke
        .map(|s| {
            format!(
                r#" stroke="{}" stroke-width="{}""#,
                rgba_to_css(&s),
                fmt_num(stroke_width)
            )
        })
        .unwrap_or_default()
}

/// Convert an SVG element to its string representation.
fn element_to_svg(element: &SvgElement) -> String {
    match element {
        SvgElement::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke,
            stroke_width,
        } => format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"{}/>"#,
            fmt_num(*x),
            fmt_num(*y),
            fmt_num(*width),
            fmt_num(*height),
            rgba_to_css(fill),
            stroke_attr(*stroke, *stroke_width)
        ),
        SvgElement::Polyline {
            points,
            stroke,
            stroke_width,
            dash,
        } => {
            let points_str = points
                .iter()
                .map(|(x, y)| format!("{},{}", fmt_num(*x), fmt_num(*y)))
                .collect::<Vec<_>>()
                .join(" ");
            let dash_attr = dash
                .as_ref()
                .map(|d| {
                    let list = d.iter().map(|v| fmt_num(*v)).collect::<Vec<_>>().join(",");
                    format!(r#" stroke-dasharray="{list}""#)
                })
                .unwrap_or_default();
            format!(
                r#"<polyline points="{points_str}" fill="none"{}{dash_attr} stroke-linejoin="round"/>"#,
                stroke_attr(Some(*stroke), *stroke_width)
            )
        }
        SvgElement::Path {
            d,
            fill,
            stroke,
            stroke_width,
        } => {
            let fill_attr = fill
                .map(|f| rgba_to_css(&f))
                .unwrap_or_else(|| "none".to_string());
            format!(
                r#"<path d="{d}" fill="{fill_attr}" fill-rule="evenodd"{}/>"#,
                stroke_attr(*stroke, *stroke_width)
            )
        }
        SvgElement::Text {
            x,
            y,
            text,
            font_size,
            fill,
            anchor,
            rotation,
        } => {
            let anchor_str = match anchor {
                TextAnchor::Start => "start",
                TextAnchor::Middle => "middle",
                TextAnchor::End => "end",
            };
            let (x, y) = (fmt_num(*x), fmt_num(*y));
            let transform = if rotation.abs() > f32::EPSILON {
                format!(r#" transform="rotate({} {x} {y})""#, fmt_num(-rotation))
            } else {
                String::new()
            };
            format!(
                r#"<text x="{x}" y="{y}" font-size="{}" fill="{}" text-anchor="{anchor_str}" font-family="sans-serif"{transform}>{}</text>"#,
                fmt_num(*font_size),
                rgba_to_css(fill),
                escape_text(text)
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_svg_encoder_new() {
        let svg = SvgEncoder::new(800, 600).render();

        assert!(svg.contains("width=\"800\""));
        assert!(svg.contains("height=\"600\""));
        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
    }

    #[test]
    fn test_svg_rect() {
        let svg = SvgEncoder::new(100, 100)
            .rect(10.0, 20.0, 30.0, 40.5, Rgba::RED)
            .render();

        assert!(svg.contains("x=\"10\""));
        assert!(svg.contains("height=\"40.5\""));
        assert!(svg.contains("rgb(255,0,0)"));
    }

    #[test]
    fn test_svg_polyline() {
        let points = vec![(0.0, 0.0), (50.0, 100.0), (100.0, 0.0)];
        let svg = SvgEncoder::new(100, 100)
            .polyline(&points, Rgba::GREEN, 1.5)
            .render();

        assert!(svg.contains("<polyline"));
        assert!(svg.contains("points=\"0,0 50,100 100,0\""));
        assert!(svg.contains("fill=\"none\""));
        assert!(!svg.contains("stroke-dasharray"));
    }

    #[test]
    fn test_svg_dashed_polyline() {
        let mut encoder = SvgEncoder::new(100, 100);
        encoder.add_element(SvgElement::Polyline {
            points: vec![(0.0, 0.0), (10.0, 0.0)],
            stroke: Rgba::BLACK,
            stroke_width: 1.0,
            dash: Some(vec![3.7, 1.6]),
        });
        assert!(encoder.render().contains("stroke-dasharray=\"3.7,1.6\""));
    }

    #[test]
    fn test_svg_path_uses_evenodd() {
        let svg = SvgEncoder::new(100, 100)
            .path("M 10 10 L 90 90 Z", Some(Rgba::BLACK), None, 0.0)
            .render();

        assert!(svg.contains("d=\"M 10 10 L 90 90 Z\""));
        assert!(svg.contains("fill-rule=\"evenodd\""));
    }

    #[test]
    fn test_svg_text_escaping() {
        let svg = SvgEncoder::new(100, 100)
            .text_anchored(10.0, 50.0, "<b>&</b>", 12.0, Rgba::BLACK, TextAnchor::Middle)
            .render();

        assert!(!svg.contains("<b>"));
        assert!(svg.contains("&lt;b&gt;&amp;"));
        assert!(svg.contains("text-anchor=\"middle\""));
    }

    #[test]
    fn test_svg_rotated_text() {
        let mut encoder = SvgEncoder::new(100, 100);
        encoder.add_element(SvgElement::Text {
            x: 20.0,
            y: 50.0,
            text: "y".into(),
            font_size: 10.0,
            fill: Rgba::BLACK,
            anchor: TextAnchor::Middle,
            rotation: 90.0,
        });
        assert!(encoder.render().contains("transform=\"rotate(-90 20 50)\""));
    }

    #[test]
    fn test_svg_transparent_background() {
        let svg = SvgEncoder::new(100, 100).background(None).render();
        assert_eq!(svg.matches("<rect").count(), 0);
    }

    #[test]
    fn test_svg_rgba_alpha() {
        let css = rgba_to_css(&Rgba::new(255, 0, 0, 128));
        assert!(css.contains("rgba"));
        assert!(css.contains("0.502"));
    }

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(10.0), "10");
        assert_eq!(fmt_num(12.345), "12.35");
        assert_eq!(fmt_num(-0.001), "0");
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.svg");
        SvgEncoder::new(10, 10).write_to_file(&path).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with("<svg"));
    }
}
