//! Box plot statistics and artists.
//!
//! Box plots display the distribution of data through quartiles. Building a
//! [`BoxPlot`] produces [`BoxplotArtists`]: one box and one median per group,
//! and two whiskers and two caps per group (lower then upper). Styling
//! functions act on those artists before they are added to an axes.

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::plots::LineArtist;
use crate::render::LineStyle;

/// Statistics computed for a box plot.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    /// Lowest datum within 1.5 IQR below Q1 (lower whisker end)
    pub whisker_lo: f64,
    /// First quartile (25th percentile)
    pub q1: f64,
    /// Median (50th percentile)
    pub median: f64,
    /// Third quartile (75th percentile)
    pub q3: f64,
    /// Highest datum within 1.5 IQR above Q3 (upper whisker end)
    pub whisker_hi: f64,
    /// Interquartile range (Q3 - Q1)
    pub iqr: f64,
    /// Values beyond the whiskers
    pub outliers: Vec<f64>,
}

impl BoxStats {
    /// Compute box plot statistics from data, ignoring non-finite values.
    ///
    /// Uses the 1.5 * IQR rule for whiskers and outliers. Returns `None`
    /// when no finite value remains.
    pub fn from_data(data: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = data.iter().copied().filter(|x| x.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let q1 = percentile(&sorted, 25.0);
        let median = percentile(&sorted, 50.0);
        let q3 = percentile(&sorted, 75.0);
        let iqr = q3 - q1;

        let lower_fence = q1 - 1.5 * iqr;
        let upper_fence = q3 + 1.5 * iqr;

        // Whiskers never reach inside the box, even for tiny samples.
        let whisker_lo = sorted
            .iter()
            .copied()
            .find(|&x| x >= lower_fence)
            .unwrap_or(sorted[0])
            .min(q1);
        let whisker_hi = sorted
            .iter()
            .rev()
            .copied()
            .find(|&x| x <= upper_fence)
            .unwrap_or(sorted[n - 1])
            .max(q3);

        let outliers: Vec<f64> = sorted
            .iter()
            .copied()
            .filter(|&x| x < whisker_lo || x > whisker_hi)
            .collect();

        Some(Self {
            whisker_lo,
            q1,
            median,
            q3,
            whisker_hi,
            iqr,
            outliers,
        })
    }
}

/// Calculate percentile using linear interpolation.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let k = (p / 100.0) * (sorted.len() - 1) as f64;
    let f = k.floor() as usize;
    let c = k.ceil() as usize;

    if f == c || c >= sorted.len() {
        sorted[f.min(sorted.len() - 1)]
    } else {
        let d = k - f as f64;
        sorted[f] * (1.0 - d) + sorted[c] * d
    }
}

/// Box plot builder.
#[derive(Debug, Clone)]
pub struct BoxPlot {
    /// Data groups (each group is a separate box)
    groups: Vec<Vec<f64>>,
    /// Group labels
    labels: Vec<String>,
    /// Box widths in data units, one per group (last value repeats)
    widths: Vec<f64>,
    /// Edge color of boxes, whiskers and caps
    edge_color: Rgba,
    /// Median line color
    median_color: Rgba,
    /// Line width in points
    line_width: f32,
    /// Show outliers
    show_fliers: bool,
}

impl Default for BoxPlot {
    fn default() -> Self {
        Self::new()
    }
}

impl BoxPlot {
    /// Create a new box plot builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            groups: Vec::new(),
            labels: Vec::new(),
            widths: vec![0.5],
            edge_color: Rgba::BLACK,
            median_color: Rgba::rgb(255, 127, 14),
            line_width: 1.0,
            show_fliers: true,
        }
    }

    /// Add a data group.
    #[must_use]
    pub fn add_group(mut self, data: &[f64], label: &str) -> Self {
        self.groups.push(data.to_vec());
        self.labels.push(label.to_string());
        self
    }

    /// Set multiple data groups at once.
    #[must_use]
    pub fn data(mut self, groups: Vec<Vec<f64>>) -> Self {
        self.groups = groups;
        self
    }

    /// Set group labels.
    #[must_use]
    pub fn labels(mut self, labels: &[&str]) -> Self {
        self.labels = labels.iter().map(ToString::to_string).collect();
        self
    }

    /// Set box widths in data units.
    #[must_use]
    pub fn widths(mut self, widths: &[f64]) -> Self {
        if !widths.is_empty() {
            self.widths = widths.to_vec();
        }
        self
    }

    /// Set the edge color of boxes, whiskers and caps.
    #[must_use]
    pub fn edge_color(mut self, color: Rgba) -> Self {
        self.edge_color = color;
        self
    }

    /// Set median line color.
    #[must_use]
    pub fn median_color(mut self, color: Rgba) -> Self {
        self.median_color = color;
        self
    }

    /// Show or hide outliers.
    #[must_use]
    pub fn show_fliers(mut self, show: bool) -> Self {
        self.show_fliers = show;
        self
    }

    fn width_at(&self, i: usize) -> f64 {
        self.widths
            .get(i)
            .or_else(|| self.widths.last())
            .copied()
            .unwrap_or(0.5)
    }

    /// Compute statistics and lay the artists out at x = 1..=n.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no groups, or a group has no finite
    /// values.
    pub fn build(self) -> Result<BoxplotArtists> {
        if self.groups.is_empty() {
            return Err(Error::EmptyData);
        }

        let mut artists = BoxplotArtists {
            positions: Vec::with_capacity(self.groups.len()),
            labels: self.labels.clone(),
            stats: Vec::with_capacity(self.groups.len()),
            boxes: Vec::new(),
            medians: Vec::new(),
            whiskers: Vec::new(),
            caps: Vec::new(),
            fliers: Vec::new(),
        };

        for (i, group) in self.groups.iter().enumerate() {
            let stats = BoxStats::from_data(group).ok_or(Error::EmptyData)?;
            let pos = (i + 1) as f64;
            let half = self.width_at(i) / 2.0;
            let cap = half / 2.0;

            let line = |x: Vec<f64>, y: Vec<f64>, color: Rgba| LineArtist {
                x,
                y,
                color,
                width: self.line_width,
                style: LineStyle::Solid,
            };

            artists.boxes.push(line(
                vec![pos - half, pos + half, pos + half, pos - half, pos - half],
                vec![stats.q1, stats.q1, stats.q3, stats.q3, stats.q1],
                self.edge_color,
            ));
            artists.medians.push(line(
                vec![pos - half, pos + half],
                vec![stats.median, stats.median],
                self.median_color,
            ));
            artists.whiskers.push(line(vec![pos, pos], vec![stats.q1, stats.whisker_lo], self.edge_color));
            artists.whiskers.push(line(vec![pos, pos], vec![stats.q3, stats.whisker_hi], self.edge_color));
            artists.caps.push(line(
                vec![pos - cap, pos + cap],
                vec![stats.whisker_lo, stats.whisker_lo],
                self.edge_color,
            ));
            artists.caps.push(line(
                vec![pos - cap, pos + cap],
                vec![stats.whisker_hi, stats.whisker_hi],
                self.edge_color,
            ));
            if self.show_fliers {
                artists.fliers.extend(stats.outliers.iter().map(|&y| (pos, y)));
            }

            artists.positions.push(pos);
            artists.stats.push(stats);
        }

        Ok(artists)
    }
}

/// The artists making up a built box plot.
///
/// `whiskers` and `caps` hold two entries per box: `[2i]` below the box and
/// `[2i + 1]` above it.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxplotArtists {
    /// X position of each box.
    pub positions: Vec<f64>,
    /// Tick label of each box.
    pub labels: Vec<String>,
    /// Statistics of each box.
    pub stats: Vec<BoxStats>,
    /// Box outlines.
    pub boxes: Vec<LineArtist>,
    /// Median lines.
    pub medians: Vec<LineArtist>,
    /// Whiskers, two per box.
    pub whiskers: Vec<LineArtist>,
    /// Caps, two per box.
    pub caps: Vec<LineArtist>,
    /// Outlier points `(x, y)`.
    pub fliers: Vec<(f64, f64)>,
}

impl BoxplotArtists {
    /// Apply a dash style to every whisker.
    pub fn set_whisker_style(&mut self, style: LineStyle) {
        for whisker in &mut self.whiskers {
            whisker.style = style;
        }
    }

    /// All line artists in paint order.
    pub fn lines(&self) -> impl Iterator<Item = &LineArtist> {
        self.boxes
            .iter()
            .chain(&self.whiskers)
            .chain(&self.caps)
            .chain(&self.medians)
    }
}

/// Color box `i` and median `i` with `colors[i]`, and whiskers and caps
/// `2i` and `2i + 1` with the same color.
///
/// Pairs are matched up to the shorter of the two sequences.
pub fn set_box_color(artists: &mut BoxplotArtists, colors: &[Rgba]) {
    for (artist, color) in artists.boxes.iter_mut().zip(colors) {
        artist.color = *color;
    }
    for (artist, color) in artists.medians.iter_mut().zip(colors) {
        artist.color = *color;
    }
    for (pair, color) in artists.whiskers.chunks_mut(2).zip(colors) {
        for artist in pair {
            artist.color = *color;
        }
    }
    for (pair, color) in artists.caps.chunks_mut(2).zip(colors) {
        for artist in pair {
            artist.color = *color;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn three_groups() -> BoxplotArtists {
        BoxPlot::new()
            .data(vec![
                vec![1.0, 2.0, 3.0, 4.0, 5.0],
                vec![2.0, 4.0, 6.0, 8.0],
                vec![-1.0, 0.0, 1.0],
            ])
            .labels(&["a", "b", "c"])
            .widths(&[0.1])
            .build()
            .unwrap()
    }

    #[test]
    fn test_box_stats_quartiles() {
        let stats = BoxStats::from_data(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_relative_eq!(stats.q1, 2.0);
        assert_relative_eq!(stats.median, 3.0);
        assert_relative_eq!(stats.q3, 4.0);
        assert_relative_eq!(stats.iqr, 2.0);
        assert!(stats.outliers.is_empty());
    }

    #[test]
    fn test_box_stats_interpolates() {
        let stats = BoxStats::from_data(&[2.0, 4.0, 6.0, 8.0]).unwrap();
        assert_relative_eq!(stats.q1, 3.5);
        assert_relative_eq!(stats.median, 5.0);
        assert_relative_eq!(stats.q3, 6.5);
    }

    #[test]
    fn test_box_stats_outliers() {
        let stats = BoxStats::from_data(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).unwrap();
        assert_eq!(stats.outliers, vec![100.0]);
        assert_relative_eq!(stats.whisker_hi, 5.0);
    }

    #[test]
    fn test_box_stats_ignores_nan() {
        let stats = BoxStats::from_data(&[f64::NAN, 1.0, 3.0]).unwrap();
        assert_relative_eq!(stats.median, 2.0);
        assert!(BoxStats::from_data(&[f64::NAN]).is_none());
        assert!(BoxStats::from_data(&[]).is_none());
    }

    #[test]
    fn test_build_layout() {
        let artists = three_groups();
        assert_eq!(artists.positions, vec![1.0, 2.0, 3.0]);
        assert_eq!(artists.boxes.len(), 3);
        assert_eq!(artists.medians.len(), 3);
        assert_eq!(artists.whiskers.len(), 6);
        assert_eq!(artists.caps.len(), 6);
        // Box 2 spans its width around x = 2.
        assert_relative_eq!(artists.boxes[1].x[0], 1.95);
        assert_relative_eq!(artists.boxes[1].x[1], 2.05);
        // Whisker 2i goes down from Q1, 2i + 1 goes up from Q3.
        assert_relative_eq!(artists.whiskers[2].y[0], 3.5);
        assert_relative_eq!(artists.whiskers[3].y[0], 6.5);
    }

    #[test]
    fn test_build_empty_errors() {
        assert!(BoxPlot::new().build().is_err());
        assert!(BoxPlot::new().data(vec![vec![f64::NAN]]).build().is_err());
    }

    #[test]
    fn test_fliers_toggle() {
        let data = vec![vec![1.0, 2.0, 3.0, 4.0, 5.0, 100.0]];
        let shown = BoxPlot::new().data(data.clone()).build().unwrap();
        assert_eq!(shown.fliers, vec![(1.0, 100.0)]);
        let hidden = BoxPlot::new().data(data).show_fliers(false).build().unwrap();
        assert!(hidden.fliers.is_empty());
    }

    #[test]
    fn test_set_box_color_maps_groups() {
        let mut artists = three_groups();
        let colors = [Rgba::BLUE, Rgba::RED, Rgba::GREEN];
        set_box_color(&mut artists, &colors);
        for (i, color) in colors.iter().enumerate() {
            assert_eq!(artists.boxes[i].color, *color);
            assert_eq!(artists.medians[i].color, *color);
            assert_eq!(artists.whiskers[2 * i].color, *color);
            assert_eq!(artists.whiskers[2 * i + 1].color, *color);
            assert_eq!(artists.caps[2 * i].color, *color);
            assert_eq!(artists.caps[2 * i + 1].color, *color);
        }
    }

    #[test]
    fn test_set_box_color_shorter_list() {
        let mut artists = three_groups();
        set_box_color(&mut artists, &[Rgba::RED]);
        assert_eq!(artists.boxes[0].color, Rgba::RED);
        assert_eq!(artists.boxes[1].color, Rgba::BLACK);
        assert_eq!(artists.caps[1].color, Rgba::RED);
        assert_eq!(artists.caps[2].color, Rgba::BLACK);
    }

    #[test]
    fn test_set_box_color_extra_colors_ignored() {
        let mut artists = three_groups();
        let colors = [Rgba::RED, Rgba::RED, Rgba::RED, Rgba::BLUE, Rgba::BLUE];
        set_box_color(&mut artists, &colors);
        assert!(artists.lines().all(|l| l.color == Rgba::RED));
    }

    #[test]
    fn test_whisker_style() {
        let mut artists = three_groups();
        artists.set_whisker_style(LineStyle::Dashed);
        assert!(artists.whiskers.iter().all(|w| w.style == LineStyle::Dashed));
        assert!(artists.caps.iter().all(|c| c.style == LineStyle::Solid));
    }
}
