//! Land polygons and coastlines from GeoJSON.
//!
//! Geometry is read from a user-supplied file (for example a Natural Earth
//! export). `Polygon`, `MultiPolygon`, `LineString` and `MultiLineString`
//! geometries are collected from bare geometries, `Feature`s,
//! `FeatureCollection`s and `GeometryCollection`s; other types are ignored.

use std::fs;
use std::path::Path;

use log::{debug, warn};
use serde_json::Value;

use crate::error::{Error, Result};

/// A ring or line of `(lon, lat)` vertices.
pub type Ring = Vec<(f64, f64)>;

/// Geographic features in longitude/latitude.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureSet {
    /// Polygons; the first ring is the exterior, later rings are holes.
    pub polygons: Vec<Vec<Ring>>,
    /// Open lines.
    pub lines: Vec<Ring>,
}

impl FeatureSet {
    /// Parse a GeoJSON document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GeoJson`] if the text is not JSON or a geometry has
    /// malformed coordinates.
    pub fn from_geojson_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text).map_err(|e| Error::GeoJson(e.to_string()))?;
        let mut set = Self::default();
        set.collect(&value)?;
        Ok(set)
    }

    /// Read a GeoJSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let set = Self::from_geojson_str(&text)?;
        debug!(
            "loaded {} polygons and {} lines from {}",
            set.polygons.len(),
            set.lines.len(),
            path.display()
        );
        Ok(set)
    }

    /// Read a GeoJSON file if one is configured; problems are logged and
    /// yield an empty set.
    #[must_use]
    pub fn load_optional(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            warn!("no land GeoJSON configured; land and coastlines are skipped");
            return Self::default();
        };
        match Self::load(path) {
            Ok(set) => set,
            Err(e) => {
                warn!("skipping land features from {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// True when there is nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty() && self.lines.is_empty()
    }

    /// Outlines for coastline drawing: every polygon ring plus every line.
    #[must_use]
    pub fn outlines(&self) -> Vec<Ring> {
        self.polygons
            .iter()
            .flatten()
            .chain(&self.lines)
            .cloned()
            .collect()
    }

    /// Longitude range covered by all vertices.
    #[must_use]
    pub fn longitude_range(&self) -> Option<(f64, f64)> {
        self.polygons
            .iter()
            .flatten()
            .chain(&self.lines)
            .flatten()
            .fold(None, |acc, &(lon, _)| match acc {
                None => Some((lon, lon)),
                Some((lo, hi)) => Some((f64::min(lo, lon), f64::max(hi, lon))),
            })
    }

    fn collect(&mut self, value: &Value) -> Result<()> {
        let kind = value.get("type").and_then(Value::as_str).unwrap_or_default();
        match kind {
            "FeatureCollection" => {
                for feature in array(value, "features")? {
                    self.collect(feature)?;
                }
            }
            "Feature" => {
                if let Some(geometry) = value.get("geometry").filter(|g| !g.is_null()) {
                    self.collect(geometry)?;
                }
            }
            "GeometryCollection" => {
                for geometry in array(value, "geometries")? {
                    self.collect(geometry)?;
                }
            }
            "Polygon" => self.polygons.push(rings(coordinates(value)?)?),
            "MultiPolygon" => {
                for polygon in as_array(coordinates(value)?)? {
                    self.polygons.push(rings(polygon)?);
                }
            }
            "LineString" => self.lines.push(positions(coordinates(value)?)?),
            "MultiLineString" => self.lines.extend(rings(coordinates(value)?)?),
            other => debug!("ignoring GeoJSON object of type '{other}'"),
        }
        Ok(())
    }
}

fn coordinates(value: &Value) -> Result<&Value> {
    value
        .get("coordinates")
        .ok_or_else(|| Error::GeoJson("geometry without coordinates".to_string()))
}

fn array<'a>(value: &'a Value, key: &str) -> Result<&'a Vec<Value>> {
    value
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| Error::GeoJson(format!("missing '{key}' array")))
}

fn as_array(value: &Value) -> Result<&Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| Error::GeoJson(format!("expected an array, found {value}")))
}

fn rings(value: &Value) -> Result<Vec<Ring>> {
    as_array(value)?.iter().map(positions).collect()
}

fn positions(value: &Value) -> Result<Ring> {
    as_array(value)?
        .iter()
        .map(|pos| {
            let pos = as_array(pos)?;
            match (pos.first().and_then(Value::as_f64), pos.get(1).and_then(Value::as_f64)) {
                (Some(lon), Some(lat)) => Ok((lon, lat)),
                _ => Err(Error::GeoJson("position needs two numbers".to_string())),
            }
        })
        .collect()
}
