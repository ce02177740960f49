//! Scale functions for data-to-visual mappings.
//!
//! Scales transform data values to visual properties: pixel position for
//! axes, normalized `[0, 1]` values for colormaps.

use crate::error::{Error, Result};

/// Trait for scale functions that map domain values to range values.
pub trait Scale<D, R> {
    /// Transform a domain value to a range value.
    fn scale(&self, value: D) -> R;

    /// Get the domain extent.
    fn domain(&self) -> (D, D);

    /// Get the range extent.
    fn range(&self) -> (R, R);
}

/// Linear scale from data values to pixel coordinates.
#[derive(Debug, Clone, Copy)]
pub struct LinearScale {
    domain_min: f64,
    domain_max: f64,
    range_min: f32,
    range_max: f32,
}

impl LinearScale {
    /// Create a new linear scale.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain bounds are equal or not finite.
    pub fn new(domain: (f64, f64), range: (f32, f32)) -> Result<Self> {
        if !domain.0.is_finite() || !domain.1.is_finite() {
            return Err(Error::ScaleDomain("Domain bounds must be finite".to_string()));
        }
        if (domain.0 - domain.1).abs() < f64::EPSILON {
            return Err(Error::ScaleDomain("Domain min and max cannot be equal".to_string()));
        }

        Ok(Self {
            domain_min: domain.0,
            domain_max: domain.1,
            range_min: range.0,
            range_max: range.1,
        })
    }

    /// Invert the scale (range to domain).
    #[must_use]
    pub fn invert(&self, value: f32) -> f64 {
        let t = f64::from(value - self.range_min) / f64::from(self.range_max - self.range_min);
        self.domain_min + t * (self.domain_max - self.domain_min)
    }

    /// True when `value` lies within the domain (either orientation).
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        let (lo, hi) = if self.domain_min <= self.domain_max {
            (self.domain_min, self.domain_max)
        } else {
            (self.domain_max, self.domain_min)
        };
        let eps = (hi - lo) * 1e-9;
        value >= lo - eps && value <= hi + eps
    }
}

impl Scale<f64, f32> for LinearScale {
    fn scale(&self, value: f64) -> f32 {
        let t = (value - self.domain_min) / (self.domain_max - self.domain_min);
        self.range_min + (t as f32) * (self.range_max - self.range_min)
    }

    fn domain(&self) -> (f64, f64) {
        (self.domain_min, self.domain_max)
    }

    fn range(&self) -> (f32, f32) {
        (self.range_min, self.range_max)
    }
}

/// Linear normalization of data values into `[0, 1]` for colormap lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Norm {
    /// Value mapped to 0.
    pub vmin: f64,
    /// Value mapped to 1.
    pub vmax: f64,
}

impl Norm {
    /// Create a normalization.
    #[must_use]
    pub const fn new(vmin: f64, vmax: f64) -> Self {
        Self { vmin, vmax }
    }

    /// Normalize a value; degenerate ranges map everything to 0.
    #[must_use]
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.vmax - self.vmin;
        if span.abs() < f64::EPSILON {
            0.0
        } else {
            (value - self.vmin) / span
        }
    }
}

/// Values `start, start + step, ...` strictly below `stop`.
///
/// A non-positive step yields an empty vector.
#[must_use]
pub fn arange(start: f64, stop: f64, step: f64) -> Vec<f64> {
    if step <= 0.0 || !step.is_finite() || stop <= start {
        return Vec::new();
    }
    let n = ((stop - start) / step).ceil() as usize;
    (0..n).map(|i| start + i as f64 * step).collect()
}

/// `n` evenly spaced values from `start` to `stop` inclusive.
#[must_use]
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n).map(|i| start + i as f64 * step).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_scale_maps_and_inverts() {
        let scale = LinearScale::new((0.0, 10.0), (100.0, 200.0)).unwrap();
        assert_relative_eq!(scale.scale(5.0), 150.0);
        assert_relative_eq!(scale.invert(150.0), 5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_linear_scale_flipped_range() {
        let scale = LinearScale::new((-6.0, 8.5), (500.0, 0.0)).unwrap();
        assert_relative_eq!(scale.scale(-6.0), 500.0);
        assert_relative_eq!(scale.scale(8.5), 0.0);
    }

    #[test]
    fn test_linear_scale_rejects_degenerate() {
        assert!(LinearScale::new((1.0, 1.0), (0.0, 1.0)).is_err());
        assert!(LinearScale::new((f64::NAN, 1.0), (0.0, 1.0)).is_err());
    }

    #[test]
    fn test_contains_either_orientation() {
        let scale = LinearScale::new((10.0, 0.0), (0.0, 1.0)).unwrap();
        assert!(scale.contains(5.0));
        assert!(scale.contains(0.0));
        assert!(!scale.contains(11.0));
    }

    #[test]
    fn test_norm() {
        let norm = Norm::new(0.0, 32.0);
        assert_relative_eq!(norm.normalize(16.0), 0.5);
        assert_relative_eq!(Norm::new(3.0, 3.0).normalize(10.0), 0.0);
    }

    #[test]
    fn test_arange_excludes_stop() {
        let levels = arange(0.0, 32.0, 0.5);
        assert_eq!(levels.len(), 64);
        assert_relative_eq!(levels[63], 31.5);
        assert!(arange(0.0, 1.0, 0.0).is_empty());
    }

    #[test]
    fn test_arange_fractional_step() {
        let ticks = arange(-1.2, 0.6, 0.4);
        assert_eq!(ticks.len(), 5);
        assert_relative_eq!(ticks[4], 0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_linspace_inclusive() {
        let ticks = linspace(-180.0, 180.0, 13);
        assert_eq!(ticks.len(), 13);
        assert_relative_eq!(ticks[1], -150.0);
        assert_relative_eq!(ticks[12], 180.0);
    }
}
