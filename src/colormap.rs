//! Colormaps for filled contours and colorbars.
//!
//! A [`Colormap`] is a listed table of colors. Lookup follows the usual
//! listed-colormap rule: a normalized value `t` in `[0, 1]` selects entry
//! `floor(t * N)`, values below zero map to the first entry and values above
//! one to the last.

use crate::color::Rgba;
use crate::error::{Error, Result};

/// A listed colormap.
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    name: String,
    colors: Vec<Rgba>,
}

impl Colormap {
    /// Create a colormap from an explicit color table.
    pub fn listed(name: &str, colors: Vec<Rgba>) -> Result<Self> {
        if colors.is_empty() {
            return Err(Error::ScaleDomain("Colormap requires at least one color".to_string()));
        }
        Ok(Self { name: name.to_string(), colors })
    }

    /// Build an `n`-entry table by interpolating between anchor colors.
    ///
    /// Anchor positions must be ascending and span `[0, 1]`.
    pub fn from_anchors(name: &str, anchors: &[(f32, Rgba)], n: usize) -> Result<Self> {
        if anchors.len() < 2 || n == 0 {
            return Err(Error::ScaleDomain(format!("Colormap '{name}' needs two anchors")));
        }
        let colors = (0..n)
            .map(|i| {
                let t = if n == 1 { 0.0 } else { i as f32 / (n - 1) as f32 };
                let upper = anchors
                    .iter()
                    .position(|&(pos, _)| pos >= t)
                    .unwrap_or(anchors.len() - 1)
                    .max(1);
                let (p0, c0) = anchors[upper - 1];
                let (p1, c1) = anchors[upper];
                let span = p1 - p0;
                let local = if span <= f32::EPSILON { 0.0 } else { (t - p0) / span };
                c0.lerp(c1, local)
            })
            .collect();
        Self::listed(name, colors)
    }

    /// Look up a colormap by name.
    pub fn by_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "inferno" => Ok(Self::inferno()),
            "blaqgryeorre" => Ok(Self::bl_aq_gr_ye_or_re()),
            "viridis" => Ok(Self::viridis()),
            "greys" | "grays" => Ok(Self::greys()),
            "black" => Ok(Self::solid("black", Rgba::BLACK)),
            other => Err(Error::ScaleDomain(format!("Unknown colormap: {other}"))),
        }
    }

    /// Single-color map (used for black contour lines).
    #[must_use]
    pub fn solid(name: &str, color: Rgba) -> Self {
        Self { name: name.to_string(), colors: vec![color] }
    }

    /// Perceptually uniform black-purple-orange-yellow map.
    #[must_use]
    pub fn inferno() -> Self {
        Self::from_anchors(
            "inferno",
            &[
                (0.0, Rgba::rgb(0, 0, 4)),
                (0.1, Rgba::rgb(22, 11, 57)),
                (0.2, Rgba::rgb(66, 10, 104)),
                (0.3, Rgba::rgb(106, 23, 110)),
                (0.4, Rgba::rgb(147, 38, 103)),
                (0.5, Rgba::rgb(188, 55, 84)),
                (0.6, Rgba::rgb(221, 81, 58)),
                (0.7, Rgba::rgb(243, 120, 25)),
                (0.8, Rgba::rgb(252, 165, 10)),
                (0.9, Rgba::rgb(246, 215, 70)),
                (1.0, Rgba::rgb(252, 255, 164)),
            ],
            256,
        )
        .unwrap_or_else(|_| Self::solid("inferno", Rgba::BLACK))
    }

    /// NCL `BlAqGrYeOrRe`: blue, aqua, green, yellow, orange, red.
    #[must_use]
    pub fn bl_aq_gr_ye_or_re() -> Self {
        Self::from_anchors(
            "BlAqGrYeOrRe",
            &[
                (0.0, Rgba::rgb(0, 0, 255)),
                (0.17, Rgba::rgb(0, 150, 255)),
                (0.33, Rgba::rgb(0, 255, 255)),
                (0.5, Rgba::rgb(0, 230, 0)),
                (0.67, Rgba::rgb(255, 255, 0)),
                (0.83, Rgba::rgb(255, 140, 0)),
                (1.0, Rgba::rgb(255, 0, 0)),
            ],
            101,
        )
        .unwrap_or_else(|_| Self::solid("BlAqGrYeOrRe", Rgba::BLUE))
    }

    /// Viridis (perceptually uniform, colorblind-safe).
    #[must_use]
    pub fn viridis() -> Self {
        Self::from_anchors(
            "viridis",
            &[
                (0.0, Rgba::rgb(68, 1, 84)),
                (0.25, Rgba::rgb(59, 82, 139)),
                (0.5, Rgba::rgb(33, 145, 140)),
                (0.75, Rgba::rgb(94, 201, 98)),
                (1.0, Rgba::rgb(253, 231, 37)),
            ],
            256,
        )
        .unwrap_or_else(|_| Self::solid("viridis", Rgba::BLACK))
    }

    /// White to black.
    #[must_use]
    pub fn greys() -> Self {
        Self::from_anchors("Greys", &[(0.0, Rgba::WHITE), (1.0, Rgba::BLACK)], 256)
            .unwrap_or_else(|_| Self::solid("Greys", Rgba::BLACK))
    }

    /// Colormap name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of table entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false; a colormap has at least one entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color for a normalized value.
    #[must_use]
    pub fn sample(&self, t: f64) -> Rgba {
        let n = self.colors.len();
        if t.is_nan() || t < 0.0 {
            return self.colors[0];
        }
        let idx = ((t * n as f64).floor() as usize).min(n - 1);
        self.colors[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_endpoints() {
        let cmap = Colormap::inferno();
        assert_eq!(cmap.len(), 256);
        assert_eq!(cmap.sample(0.0), Rgba::rgb(0, 0, 4));
        assert_eq!(cmap.sample(1.0), Rgba::rgb(252, 255, 164));
        assert_eq!(cmap.sample(-3.0), cmap.sample(0.0));
        assert_eq!(cmap.sample(7.0), cmap.sample(1.0));
    }

    #[test]
    fn test_listed_lookup_bins() {
        let cmap = Colormap::listed("rb", vec![Rgba::RED, Rgba::BLUE]).unwrap();
        assert_eq!(cmap.sample(0.49), Rgba::RED);
        assert_eq!(cmap.sample(0.5), Rgba::BLUE);
    }

    #[test]
    fn test_bl_aq_gr_ye_or_re_runs_blue_to_red() {
        let cmap = Colormap::bl_aq_gr_ye_or_re();
        assert_eq!(cmap.len(), 101);
        assert_eq!(cmap.sample(0.0), Rgba::BLUE);
        assert_eq!(cmap.sample(1.0), Rgba::RED);
    }

    #[test]
    fn test_by_name() {
        assert_eq!(Colormap::by_name("Inferno").unwrap().name(), "inferno");
        assert_eq!(Colormap::by_name("black").unwrap().sample(0.3), Rgba::BLACK);
        assert!(Colormap::by_name("jet").is_err());
    }

    #[test]
    fn test_empty_listed_rejected() {
        assert!(Colormap::listed("none", Vec::new()).is_err());
    }
}
