//! Calendar helpers for monthly time axes stored as `YYYYMM` integers.

use crate::error::{Error, Result};

/// Convert a `YYYYMM` integer to a fractional year: `year + (month - 1) / 12`.
///
/// The month is not validated; `195113` maps past the end of 1951.
///
/// ```
/// use geocat_gallery::dates::yyyymm_to_yyyyfrac;
///
/// assert_eq!(yyyymm_to_yyyyfrac(195101), 1951.0);
/// assert!((yyyymm_to_yyyyfrac(195112) - (1951.0 + 11.0 / 12.0)).abs() < 1e-12);
/// ```
#[must_use]
pub fn yyyymm_to_yyyyfrac(yyyymm: i32) -> f64 {
    let year = yyyymm.div_euclid(100);
    let month = yyyymm.rem_euclid(100);
    f64::from(year) + f64::from(month - 1) / 12.0
}

/// Convert a series of `YYYYMM` values stored as floating point.
///
/// NaN entries stay NaN.
#[must_use]
pub fn yyyymm_series_to_yyyyfrac(dates: &[f64]) -> Vec<f64> {
    dates
        .iter()
        .map(|&d| {
            if d.is_finite() {
                yyyymm_to_yyyyfrac(d.round() as i32)
            } else {
                f64::NAN
            }
        })
        .collect()
}

/// A validated year and month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct YearMonth {
    /// Calendar year.
    pub year: i32,
    /// Month, 1 to 12.
    pub month: u8,
}

impl YearMonth {
    /// Split a `YYYYMM` integer, rejecting months outside 1..=12.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDate`] for a negative value or a bad month.
    pub fn from_yyyymm(yyyymm: i32) -> Result<Self> {
        if yyyymm < 0 {
            return Err(Error::InvalidDate(format!("{yyyymm} is negative")));
        }
        let month = yyyymm % 100;
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidDate(format!("{yyyymm} has month {month}")));
        }
        Ok(Self {
            year: yyyymm / 100,
            month: month as u8,
        })
    }

    /// Fractional year of the first day of the month.
    #[must_use]
    pub fn fraction(self) -> f64 {
        f64::from(self.year) + f64::from(self.month - 1) / 12.0
    }
}

/// Position of the first element equal to `needle` once both are rounded to
/// `decimals` places.
#[must_use]
pub fn find_rounded(haystack: &[f64], needle: f64, decimals: i32) -> Option<usize> {
    let factor = 10f64.powi(decimals);
    let target = (needle * factor).round();
    haystack.iter().position(|v| (v * factor).round() == target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_january_is_whole_year() {
        assert_relative_eq!(yyyymm_to_yyyyfrac(195101), 1951.0);
        assert_relative_eq!(yyyymm_to_yyyyfrac(199101), 1991.0);
    }

    #[test]
    fn test_december() {
        assert_relative_eq!(yyyymm_to_yyyyfrac(196312), 1963.0 + 11.0 / 12.0);
    }

    #[test]
    fn test_series_keeps_nan() {
        let out = yyyymm_series_to_yyyyfrac(&[195107.0, f64::NAN]);
        assert_relative_eq!(out[0], 1951.5);
        assert!(out[1].is_nan());
    }

    #[test]
    fn test_year_month_validation() {
        let ym = YearMonth::from_yyyymm(195107).unwrap();
        assert_eq!(ym, YearMonth { year: 1951, month: 7 });
        assert_relative_eq!(ym.fraction(), 1951.5);
        assert!(YearMonth::from_yyyymm(195100).is_err());
        assert!(YearMonth::from_yyyymm(195113).is_err());
        assert!(YearMonth::from_yyyymm(-195101).is_err());
    }

    #[test]
    fn test_find_rounded() {
        let fracs = yyyymm_series_to_yyyyfrac(&[195012.0, 195101.0, 195102.0]);
        assert_eq!(find_rounded(&fracs, 1951.0, 3), Some(1));
        assert_eq!(find_rounded(&fracs, 1952.0, 3), None);
    }

    proptest! {
        #[test]
        fn prop_fraction_within_year(year in 1800i32..2200, month in 1i32..=12) {
            let frac = yyyymm_to_yyyyfrac(year * 100 + month);
            prop_assert!(frac >= f64::from(year));
            prop_assert!(frac < f64::from(year + 1));
        }

        #[test]
        fn prop_validated_matches_plain(year in 0i32..3000, month in 1i32..=12) {
            let ym = YearMonth::from_yyyymm(year * 100 + month).unwrap();
            prop_assert_eq!(ym.fraction(), yyyymm_to_yyyyfrac(year * 100 + month));
        }
    }
}
