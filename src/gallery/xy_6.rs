//! NCL `xy_6`: explicit axis labeling on an XY plot.
//!
//! Niño 3 SST anomalies sampled at the January of each El Niño warm year,
//! with a sparse set of year labels along x.

use crate::axes::Axes;
use crate::color::Rgba;
use crate::config::GalleryConfig;
use crate::dataset::{DataArray, Dataset};
use crate::dates::{find_rounded, yyyymm_series_to_yyyyfrac};
use crate::error::{Error, Result};
use crate::figure::Figure;
use crate::plots::LineArtist;
use crate::scale::arange;
use crate::style::{add_major_minor_ticks, set_axes_limits_and_ticks, set_titles_and_labels, AxisSetup, Titles};

/// Sample file holding `SST` and `date`.
pub const DATA_FILE: &str = "Jsst.nc";

/// El Niño warm years.
pub const WARM_YEARS: [f64; 11] = [
    1951.0, 1953.0, 1957.0, 1963.0, 1965.0, 1969.0, 1972.0, 1976.0, 1982.0, 1987.0, 1991.0,
];

/// Packing factor of the stored SST values.
pub const SST_SCALE: f64 = 0.1;

const X_TICKS: [f64; 11] = [
    1951.0, 1954.0, 1957.0, 1961.0, 1965.0, 1968.5, 1972.0, 1977.0, 1982.0, 1986.5, 1991.0,
];
const X_LABELS: [&str; 11] = ["1951", "", "1957", "", "1965", "", "1972", "", "1982", "", "1991"];

/// Load `SST` and `date` and build the figure.
///
/// # Errors
///
/// Returns an error if the file or variables are missing, or a warm year
/// has no January record.
pub fn build(config: &GalleryConfig) -> Result<Figure> {
    let ds = Dataset::open(config.data_file(DATA_FILE))?;
    let sst = ds.variable("SST")?.scale(SST_SCALE);
    let date = ds.variable("date")?;
    figure(&sst, &date)
}

/// SST at the start of each warm year.
///
/// # Errors
///
/// Returns [`Error::CoordinateNotFound`] when a year has no matching date,
/// or [`Error::DataLengthMismatch`] when `sst` and `date` differ in length.
pub fn warm_year_values(sst: &DataArray, date: &DataArray) -> Result<Vec<f64>> {
    if sst.values().len() != date.values().len() {
        return Err(Error::DataLengthMismatch {
            x_len: date.values().len(),
            y_len: sst.values().len(),
        });
    }
    let frac = yyyymm_series_to_yyyyfrac(date.values());
    WARM_YEARS
        .iter()
        .map(|&year| {
            find_rounded(&frac, year, 3)
                .map(|i| sst.values()[i])
                .ok_or_else(|| Error::CoordinateNotFound {
                    dim: "date".to_string(),
                    value: year,
                })
        })
        .collect()
}

/// Build the figure from already scaled SST and `YYYYMM` dates.
///
/// # Errors
///
/// Returns an error if a warm year cannot be found.
pub fn figure(sst: &DataArray, date: &DataArray) -> Result<Figure> {
    let y = warm_year_values(sst, date)?;
    let line = LineArtist::new(WARM_YEARS.to_vec(), y)?.color(Rgba::GREY).width(1.0);

    let mut ax = Axes::new();
    ax.plot(line);

    add_major_minor_ticks(&mut ax, 1, 4, 16.0);
    set_axes_limits_and_ticks(
        &mut ax,
        &AxisSetup {
            xlim: Some((1951.0, 1991.0)),
            ylim: Some((-1.5, 0.6)),
            xticks: Some(X_TICKS.to_vec()),
            yticks: Some(arange(-1.2, 0.6, 0.4)),
            xticklabels: Some(X_LABELS.iter().map(ToString::to_string).collect()),
            yticklabels: None,
        },
    );
    set_titles_and_labels(&mut ax, &Titles::new().main("Explicit axis labeling", 18.0).labels("", ""));

    Ok(Figure::new(7.0, 6.5).with_axes(ax))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axes::Layer;

    fn monthly(start_year: i32, years: i32) -> (DataArray, DataArray) {
        let n = (years * 12) as usize;
        let dates: Vec<f64> = (0..n)
            .map(|i| f64::from((start_year + i as i32 / 12) * 100 + i as i32 % 12 + 1))
            .collect();
        let sst: Vec<f64> = (0..n).map(|i| (i as f64 * 0.1).sin()).collect();
        let time: Vec<f64> = (0..n).map(|i| i as f64).collect();
        (
            DataArray::new("SST", &["time"], vec![time.clone()], sst).unwrap(),
            DataArray::new("date", &["time"], vec![time], dates).unwrap(),
        )
    }

    #[test]
    fn test_warm_years_pick_january() {
        let (sst, date) = monthly(1950, 45);
        let y = warm_year_values(&sst, &date).unwrap();
        assert_eq!(y.len(), 11);
        // 1951-01 is record 12
        assert_eq!(y[0], sst.values()[12]);
        // 1991-01 is record 492
        assert_eq!(y[10], sst.values()[492]);
    }

    #[test]
    fn test_missing_year_errors() {
        let (sst, date) = monthly(1960, 10);
        match warm_year_values(&sst, &date) {
            Err(Error::CoordinateNotFound { value, .. }) => assert_eq!(value, 1951.0),
            other => panic!("expected missing year, got {other:?}"),
        }
    }

    #[test]
    fn test_axes_setup() {
        let (sst, date) = monthly(1950, 45);
        let fig = figure(&sst, &date).unwrap();
        let ax = fig.axes();
        assert!(matches!(&ax.layers()[0], Layer::Line(l) if l.color == Rgba::GREY));
        let view = ax.view();
        let labels: Vec<&str> = view.x_major.iter().map(|t| t.1.as_str()).collect();
        assert_eq!(labels, X_LABELS.to_vec());
        assert!(view.x_minor.is_empty());
        assert_eq!(view.y_major.len(), 5);
        // 4 minor intervals per 0.4 major step
        assert!(view.y_minor.len() >= 15);
        assert_eq!(fig.pixel_size(), (700, 650));
    }

    #[test]
    fn test_length_mismatch() {
        let (sst, _) = monthly(1950, 45);
        let (_, short) = monthly(1950, 2);
        assert!(matches!(
            warm_year_values(&sst, &short),
            Err(Error::DataLengthMismatch { .. })
        ));
    }
}
