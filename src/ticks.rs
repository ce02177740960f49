//! Tick location and tick label formatting.
//!
//! Locators pick tick positions: a "nice number" locator for automatic major
//! ticks and contour levels, and a minor locator that subdivides each major
//! interval. Formatters turn positions into labels.

/// Steps tried by [`nice_ticks`], as multiples of a power of ten.
const NICE_STEPS: [f64; 9] = [1.0, 2.0, 2.5, 5.0, 10.0, 20.0, 25.0, 50.0, 100.0];

/// Tick label formatting strategy.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TickFormatter {
    /// Fewest decimals that keep every label distinct and exact.
    #[default]
    Auto,
    /// Fixed number of decimals (`%.1f` is `Fixed(1)`).
    Fixed(usize),
    /// Explicit labels, matched to tick positions by index.
    Labels(Vec<String>),
    /// Degrees east/west.
    Longitude,
    /// Degrees north/south.
    Latitude,
}

impl TickFormatter {
    /// Format every tick value.
    #[must_use]
    pub fn format_all(&self, values: &[f64]) -> Vec<String> {
        match self {
            Self::Auto => {
                let decimals = auto_decimals(values);
                values.iter().map(|&v| format_fixed(v, decimals)).collect()
            }
            Self::Fixed(decimals) => values.iter().map(|&v| format_fixed(v, *decimals)).collect(),
            Self::Labels(labels) => (0..values.len())
                .map(|i| labels.get(i).cloned().unwrap_or_default())
                .collect(),
            Self::Longitude => values.iter().map(|&v| format_longitude(v)).collect(),
            Self::Latitude => values.iter().map(|&v| format_latitude(v)).collect(),
        }
    }
}

/// Format with a fixed number of decimals, never printing `-0`.
#[must_use]
pub fn format_fixed(value: f64, decimals: usize) -> String {
    let s = format!("{value:.decimals$}");
    if s.starts_with('-') && s[1..].chars().all(|c| c == '0' || c == '.') {
        s[1..].to_string()
    } else {
        s
    }
}

/// Fewest decimals (up to 10) at which every value prints exactly.
fn auto_decimals(values: &[f64]) -> usize {
    let scale = values.iter().fold(0.0_f64, |m, v| m.max(v.abs())).max(1.0);
    (0..=10)
        .find(|&d| {
            let factor = 10f64.powi(d as i32);
            values
                .iter()
                .all(|v| ((v * factor).round() / factor - v).abs() <= 1e-9 * scale)
        })
        .unwrap_or(10)
}

fn trim_number(value: f64) -> String {
    let s = format!("{value:.6}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Longitude label: `30°E`, `150°W`, `0°`, `180°`.
#[must_use]
pub fn format_longitude(value: f64) -> String {
    let mut lon = value % 360.0;
    if lon > 180.0 {
        lon -= 360.0;
    } else if lon <= -180.0 {
        lon += 360.0;
    }
    if lon.abs() < 1e-9 || (lon.abs() - 180.0).abs() < 1e-9 {
        return format!("{}°", trim_number(lon.abs()));
    }
    let hemi = if lon > 0.0 { 'E' } else { 'W' };
    format!("{}°{hemi}", trim_number(lon.abs()))
}

/// Latitude label: `30°N`, `60°S`, `0°`.
#[must_use]
pub fn format_latitude(value: f64) -> String {
    if value.abs() < 1e-9 {
        return "0°".to_string();
    }
    let hemi = if value > 0.0 { 'N' } else { 'S' };
    format!("{}°{hemi}", trim_number(value.abs()))
}

/// "Nice number" tick positions covering `[vmin, vmax]` with at most
/// `nbins` intervals.
///
/// Also used to resolve a requested contour level count into levels.
#[must_use]
pub fn nice_ticks(vmin: f64, vmax: f64, nbins: usize) -> Vec<f64> {
    let (vmin, vmax) = if vmin <= vmax { (vmin, vmax) } else { (vmax, vmin) };
    if !vmin.is_finite() || !vmax.is_finite() || nbins == 0 {
        return Vec::new();
    }
    if (vmax - vmin).abs() < f64::EPSILON * vmin.abs().max(1.0) {
        return vec![vmin];
    }

    let raw_step = (vmax - vmin) / nbins as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());

    for multiple in NICE_STEPS {
        let step = multiple * magnitude;
        let first = (vmin / step + 1e-10).floor() * step;
        let count = ((vmax - first) / step - 1e-10).ceil() as usize;
        if count <= nbins {
            return (0..=count).map(|i| clean(first + i as f64 * step, step)).collect();
        }
    }
    vec![vmin, vmax]
}

/// Round away floating noise relative to the step size.
fn clean(value: f64, step: f64) -> f64 {
    let digits = (-step.log10().floor() + 3.0).max(0.0) as i32;
    let factor = 10f64.powi(digits);
    let v = (value * factor).round() / factor;
    if v == 0.0 {
        0.0
    } else {
        v
    }
}

/// Minor tick positions with `n` subdivisions per major interval.
///
/// The interval is taken from the first two majors and minor ticks extend
/// across the whole view `[vmin, vmax]`; positions that coincide with a major
/// tick are dropped. `n <= 1` yields no minor ticks.
#[must_use]
pub fn minor_ticks(majors: &[f64], n: usize, vmin: f64, vmax: f64) -> Vec<f64> {
    if n <= 1 || majors.len() < 2 {
        return Vec::new();
    }
    let (lo, hi) = if vmin <= vmax { (vmin, vmax) } else { (vmax, vmin) };
    let major_step = (majors[1] - majors[0]).abs();
    if major_step <= 0.0 || !major_step.is_finite() {
        return Vec::new();
    }
    let minor_step = major_step / n as f64;
    let tol = minor_step * 1e-6;

    let start = ((lo - majors[0]) / minor_step).floor() as i64;
    let end = ((hi - majors[0]) / minor_step).ceil() as i64;
    (start..=end)
        .map(|k| majors[0] + k as f64 * minor_step)
        .filter(|v| *v >= lo - tol && *v <= hi + tol)
        .filter(|v| majors.iter().all(|m| (m - v).abs() > tol))
        .map(|v| clean(v, minor_step))
        .collect()
}
