//! Vertical colorbar for filled contours.

use crate::axes::pt_to_px;
use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::geometry::{Point, Rect};
use crate::output::TextAnchor;
use crate::plots::FilledContours;
use crate::render::{font, Scene, Stroke, TextMark, VAlign};
use crate::scale::{LinearScale, Scale};
use crate::ticks::TickFormatter;

/// Share of the figure's plotting width taken by the colorbar.
const FRACTION: f32 = 0.15;
/// Gap between axes and colorbar, as a share of the plotting width.
const PAD: f32 = 0.05;
/// Colorbar height over width.
const ASPECT: f32 = 20.0;
/// Outline width in points.
const OUTLINE_WIDTH: f32 = 0.8;
/// Tick length in points.
const TICK_LENGTH: f32 = 3.5;
/// Gap between tick and label in points.
const TICK_PAD: f32 = 3.5;

/// A vertical colorbar of discrete bands.
#[derive(Debug, Clone, PartialEq)]
pub struct Colorbar {
    boundaries: Vec<f64>,
    colors: Vec<Rgba>,
    ticks: Option<Vec<f64>>,
    tick_labels: Option<Vec<String>>,
    shrink: f32,
    draw_edges: bool,
    label_size: f32,
}

impl Colorbar {
    /// A colorbar with one band per contour band.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no bands.
    pub fn from_contours(filled: &FilledContours) -> Result<Self> {
        if filled.bands.is_empty() {
            return Err(Error::EmptyData);
        }
        Ok(Self {
            boundaries: filled.levels.clone(),
            colors: filled.bands.iter().map(|b| b.color).collect(),
            ticks: None,
            tick_labels: None,
            shrink: 1.0,
            draw_edges: false,
            label_size: 10.0,
        })
    }

    /// Scale the height relative to the axes.
    #[must_use]
    pub fn shrink(mut self, shrink: f32) -> Self {
        self.shrink = shrink;
        self
    }

    /// Draw lines between bands.
    #[must_use]
    pub fn draw_edges(mut self, draw_edges: bool) -> Self {
        self.draw_edges = draw_edges;
        self
    }

    /// Set tick positions.
    #[must_use]
    pub fn ticks(mut self, ticks: Vec<f64>) -> Self {
        self.ticks = Some(ticks);
        self
    }

    /// Set tick labels, matched to the ticks by index.
    #[must_use]
    pub fn tick_labels(mut self, labels: Vec<String>) -> Self {
        self.tick_labels = Some(labels);
        self
    }

    /// Set the tick label size in points.
    #[must_use]
    pub fn label_size(mut self, size: f32) -> Self {
        self.label_size = size;
        self
    }

    /// Share of the plotting width reserved to the right of the axes.
    #[must_use]
    pub fn reserved_fraction(&self) -> f32 {
        FRACTION + PAD
    }

    fn range(&self) -> (f64, f64) {
        let first = self.boundaries.first().copied().unwrap_or(0.0);
        let last = self.boundaries.last().copied().unwrap_or(1.0);
        (first, last)
    }

    /// Visible ticks with labels.
    fn tick_marks(&self) -> Vec<(f64, String)> {
        let ticks = self.ticks.clone().unwrap_or_else(|| self.boundaries.clone());
        let labels = match &self.tick_labels {
            Some(labels) => TickFormatter::Labels(labels.clone()).format_all(&ticks),
            None => TickFormatter::Auto.format_all(&ticks),
        };
        let (lo, hi) = self.range();
        let tol = (hi - lo).abs() * 1e-9;
        ticks
            .into_iter()
            .zip(labels)
            .filter(|(v, _)| *v >= lo - tol && *v <= hi + tol)
            .collect()
    }

    /// Bar rectangle beside an axes frame, `pad_px` to its right.
    #[must_use]
    pub fn frame(&self, axes: Rect, pad_px: f32) -> Rect {
        let height = axes.height * self.shrink;
        let width = height / ASPECT;
        Rect::new(axes.right() + pad_px, axes.y + (axes.height - height) / 2.0, width, height)
    }

    /// Gap between the axes and the bar for a plotting width.
    #[must_use]
    pub fn pad_px(&self, plot_width: f32) -> f32 {
        PAD * plot_width
    }

    /// Width of the ticks and labels right of the bar.
    #[must_use]
    pub fn decoration_width(&self, dpi: f32) -> f32 {
        let size = pt_to_px(self.label_size, dpi);
        let widest = self
            .tick_marks()
            .iter()
            .map(|(_, l)| font::text_width(l, size))
            .fold(0.0_f32, f32::max);
        pt_to_px(TICK_LENGTH + TICK_PAD, dpi) + widest
    }

    /// Draw the bar into `frame`.
    ///
    /// # Errors
    ///
    /// Returns an error if the boundaries span no range.
    pub fn draw(&self, scene: &mut Scene, frame: Rect, dpi: f32) -> Result<()> {
        let scale = LinearScale::new(self.range(), (frame.bottom(), frame.y))?;
        for (w, color) in self.boundaries.windows(2).zip(&self.colors) {
            let (y0, y1) = (scale.scale(w[0]), scale.scale(w[1]));
            scene.rect(frame.x, y1.min(y0), frame.width, (y0 - y1).abs(), *color, None);
        }

        if self.draw_edges {
            let divider = Stroke::solid(Rgba::BLACK, pt_to_px(OUTLINE_WIDTH / 2.0, dpi));
            let inner = self.boundaries.len().saturating_sub(1);
            for &b in self.boundaries.iter().take(inner).skip(1) {
                let y = scale.scale(b);
                scene.polyline(vec![Point::new(frame.x, y), Point::new(frame.right(), y)], divider);
            }
        }

        let outline = Stroke::solid(Rgba::BLACK, pt_to_px(OUTLINE_WIDTH, dpi));
        scene.rect(frame.x, frame.y, frame.width, frame.height, Rgba::TRANSPARENT, Some(outline));

        let tick_len = pt_to_px(TICK_LENGTH, dpi);
        let tick_stroke = Stroke::solid(Rgba::BLACK, pt_to_px(OUTLINE_WIDTH, dpi));
        let size = pt_to_px(self.label_size, dpi);
        for (v, label) in self.tick_marks() {
            let y = scale.scale(v);
            scene.polyline(
                vec![Point::new(frame.right(), y), Point::new(frame.right() + tick_len, y)],
                tick_stroke,
            );
            scene.text(TextMark::new(
                Point::new(frame.right() + tick_len + pt_to_px(TICK_PAD, dpi), y),
                label,
                size,
                TextAnchor::Start,
                VAlign::Center,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Grid;
    use crate::plots::{Contour, Levels};
    use crate::render::Mark;
    use crate::scale::arange;

    fn filled() -> FilledContours {
        let x = vec![0.0, 1.0, 2.0];
        let y = vec![0.0, 1.0];
        let grid = Grid::new(x, y, vec![0.0, 10.0, 31.0, 0.0, 10.0, 31.0]).unwrap();
        Contour::new(&grid)
            .levels(Levels::Explicit(arange(0.0, 32.0, 0.5)))
            .vmin(0.0)
            .vmax(32.0)
            .filled()
            .unwrap()
    }

    #[test]
    fn test_one_box_per_band() {
        let bar = Colorbar::from_contours(&filled()).unwrap();
        let mut scene = Scene::new(100, 400, Rgba::WHITE);
        bar.draw(&mut scene, Rect::new(10.0, 10.0, 15.0, 300.0), 100.0).unwrap();
        let boxes = scene
            .marks()
            .iter()
            .filter(|m| matches!(m, Mark::Polygon { stroke: None, .. }))
            .count();
        assert_eq!(boxes, 63);
    }

    #[test]
    fn test_ticks_limited_to_range() {
        let bar = Colorbar::from_contours(&filled())
            .unwrap()
            .ticks(arange(0.0, 34.0, 2.0));
        let ticks = bar.tick_marks();
        assert_eq!(ticks.first().map(|t| t.1.as_str()), Some("0"));
        assert_eq!(ticks.last().map(|t| t.1.as_str()), Some("30"));
    }

    #[test]
    fn test_edges_add_dividers() {
        let plain = Colorbar::from_contours(&filled()).unwrap();
        let edged = plain.clone().draw_edges(true);
        let count = |bar: &Colorbar| {
            let mut scene = Scene::new(100, 400, Rgba::WHITE);
            bar.draw(&mut scene, Rect::new(10.0, 10.0, 15.0, 300.0), 100.0).unwrap();
            scene.marks().len()
        };
        assert_eq!(count(&edged), count(&plain) + 62);
    }

    #[test]
    fn test_frame_shrinks_and_centers() {
        let bar = Colorbar::from_contours(&filled()).unwrap().shrink(0.8);
        let f = bar.frame(Rect::new(0.0, 0.0, 400.0, 500.0), 20.0);
        assert!((f.height - 400.0).abs() < 1e-3);
        assert!((f.width - 20.0).abs() < 1e-3);
        assert!((f.y - 50.0).abs() < 1e-3);
        assert!((f.x - 420.0).abs() < 1e-3);
    }
}
