//! Map projections into a planar coordinate system measured in degrees.
//!
//! Projected `x` is longitude relative to the central longitude; projected
//! `y` is latitude for Plate Carrée and the Mercator ordinate
//! `ln(tan(pi/4 + phi/2))` converted to degrees for Mercator, so both share
//! a scale at the equator.

use std::f64::consts::FRAC_PI_4;

/// Supported cylindrical projections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Equirectangular.
    PlateCarree {
        /// Longitude at the center of the map.
        central_longitude: f64,
    },
    /// Conformal cylindrical; latitudes are clamped to the given bounds.
    Mercator {
        /// Longitude at the center of the map.
        central_longitude: f64,
        /// Southern latitude limit.
        min_latitude: f64,
        /// Northern latitude limit.
        max_latitude: f64,
    },
}

impl Default for Projection {
    fn default() -> Self {
        Self::plate_carree()
    }
}

impl Projection {
    /// Plate Carrée centered on Greenwich.
    #[must_use]
    pub const fn plate_carree() -> Self {
        Self::PlateCarree { central_longitude: 0.0 }
    }

    /// Mercator with the given southern limit and an 84°N northern limit.
    #[must_use]
    pub const fn mercator(central_longitude: f64, min_latitude: f64) -> Self {
        Self::Mercator {
            central_longitude,
            min_latitude,
            max_latitude: 84.0,
        }
    }

    /// Longitude at the center of the map.
    #[must_use]
    pub const fn central_longitude(&self) -> f64 {
        match *self {
            Self::PlateCarree { central_longitude } | Self::Mercator { central_longitude, .. } => {
                central_longitude
            }
        }
    }

    /// Latitude range the projection can show.
    #[must_use]
    pub const fn latitude_bounds(&self) -> (f64, f64) {
        match *self {
            Self::PlateCarree { .. } => (-90.0, 90.0),
            Self::Mercator {
                min_latitude,
                max_latitude,
                ..
            } => (min_latitude, max_latitude),
        }
    }

    /// Projected x of a longitude (no wrapping).
    #[must_use]
    pub fn x(&self, lon: f64) -> f64 {
        lon - self.central_longitude()
    }

    /// Projected y of a latitude.
    #[must_use]
    pub fn y(&self, lat: f64) -> f64 {
        match *self {
            Self::PlateCarree { .. } => lat,
            Self::Mercator {
                min_latitude,
                max_latitude,
                ..
            } => {
                let phi = lat.clamp(min_latitude, max_latitude).to_radians();
                (FRAC_PI_4 + phi / 2.0).tan().ln().to_degrees()
            }
        }
    }

    /// Project a geographic point.
    #[must_use]
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        (self.x(lon), self.y(lat))
    }

    /// Projected bounds of a `[lon0, lon1] x [lat0, lat1]` extent.
    #[must_use]
    pub fn project_extent(&self, lon: (f64, f64), lat: (f64, f64)) -> ((f64, f64), (f64, f64)) {
        let (x0, x1) = (self.x(lon.0.min(lon.1)), self.x(lon.0.max(lon.1)));
        let (y0, y1) = (self.y(lat.0.min(lat.1)), self.y(lat.0.max(lat.1)));
        ((x0, x1), (y0, y1))
    }

    /// Projected bounds of the whole globe.
    #[must_use]
    pub fn global_extent(&self) -> ((f64, f64), (f64, f64)) {
        let (lat0, lat1) = self.latitude_bounds();
        ((-180.0, 180.0), (self.y(lat0), self.y(lat1)))
    }
}

/// Multiples of 360 that shift projected x data covering `data` onto `view`.
///
/// Longitude data is drawn once per shift so that, for example, `0..360`
/// data fills a `-180..180` view.
#[must_use]
pub fn wrap_shifts(data: (f64, f64), view: (f64, f64)) -> Vec<f64> {
    let (d0, d1) = (data.0.min(data.1), data.0.max(data.1));
    let (v0, v1) = (view.0.min(view.1), view.0.max(view.1));
    if ![d0, d1, v0, v1].iter().all(|v| v.is_finite()) {
        return Vec::new();
    }
    let first = ((v0 - d1) / 360.0).ceil() as i64;
    let last = ((v1 - d0) / 360.0).floor() as i64;
    (first..=last).map(|k| k as f64 * 360.0).collect()
}
