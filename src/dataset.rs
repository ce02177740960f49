//! Labelled N-dimensional arrays backed by NetCDF files.
//!
//! A [`DataArray`] carries dimension names, one coordinate vector per
//! dimension, row-major values and attributes. Selection and transformation
//! return new arrays; nothing is modified in place.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{Error, Result};
use crate::netcdf::{AttrValue, NcFile, Variable};

/// A labelled array of `f64` values; NaN marks missing data.
#[derive(Debug, Clone, PartialEq)]
pub struct DataArray {
    name: String,
    dims: Vec<String>,
    coords: Vec<Vec<f64>>,
    values: Vec<f64>,
    attrs: BTreeMap<String, AttrValue>,
}

impl DataArray {
    /// Create an array; `values` is row-major over `coords`.
    ///
    /// # Errors
    ///
    /// Returns an error if the number of dims and coordinate vectors differ,
    /// or the value count is not the product of the coordinate lengths.
    pub fn new(name: &str, dims: &[&str], coords: Vec<Vec<f64>>, values: Vec<f64>) -> Result<Self> {
        if dims.len() != coords.len() {
            return Err(Error::DataLengthMismatch {
                x_len: dims.len(),
                y_len: coords.len(),
            });
        }
        let expected: usize = coords.iter().map(Vec::len).product();
        if expected != values.len() {
            return Err(Error::DataLengthMismatch {
                x_len: values.len(),
                y_len: expected,
            });
        }
        Ok(Self {
            name: name.to_string(),
            dims: dims.iter().map(ToString::to_string).collect(),
            coords,
            values,
            attrs: BTreeMap::new(),
        })
    }

    /// Attach an attribute.
    #[must_use]
    pub fn with_attr(mut self, name: &str, value: AttrValue) -> Self {
        self.attrs.insert(name.to_string(), value);
        self
    }

    /// Variable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dimension names.
    #[must_use]
    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    /// Length of each dimension.
    #[must_use]
    pub fn shape(&self) -> Vec<usize> {
        self.coords.iter().map(Vec::len).collect()
    }

    /// Row-major values.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Position of a dimension.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimension does not exist.
    pub fn dim_index(&self, dim: &str) -> Result<usize> {
        self.dims
            .iter()
            .position(|d| d == dim)
            .ok_or_else(|| Error::MissingDimension {
                var: self.name.clone(),
                dim: dim.to_string(),
            })
    }

    /// Coordinate labels of a dimension.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimension does not exist.
    pub fn coord(&self, dim: &str) -> Result<&[f64]> {
        let axis = self.dim_index(dim)?;
        Ok(&self.coords[axis])
    }

    /// Attribute by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the attribute is absent.
    pub fn attr(&self, name: &str) -> Result<&AttrValue> {
        self.attrs.get(name).ok_or_else(|| Error::MissingAttribute {
            var: self.name.clone(),
            attr: name.to_string(),
        })
    }

    /// The `long_name` attribute, when present as text.
    #[must_use]
    pub fn long_name(&self) -> Option<&str> {
        self.attrs.get("long_name").and_then(AttrValue::as_str)
    }

    /// The `units` attribute, when present as text.
    #[must_use]
    pub fn units(&self) -> Option<&str> {
        self.attrs.get("units").and_then(AttrValue::as_str)
    }

    /// Minimum and maximum of the non-NaN values.
    #[must_use]
    pub fn extent(&self) -> Option<(f64, f64)> {
        finite_extent(&self.values)
    }

    /// Strides of each axis in the row-major layout.
    fn strides(&self) -> Vec<usize> {
        let shape = self.shape();
        let mut strides = vec![1; shape.len()];
        for axis in (0..shape.len().saturating_sub(1)).rev() {
            strides[axis] = strides[axis + 1] * shape[axis + 1];
        }
        strides
    }

    /// Keep the positions `keep` along `axis`.
    fn take_along(&self, axis: usize, keep: &[usize]) -> Vec<f64> {
        let shape = self.shape();
        let outer: usize = shape[..axis].iter().product();
        let inner: usize = shape[axis + 1..].iter().product();
        let len = shape[axis];
        let mut out = Vec::with_capacity(outer * keep.len() * inner);
        for o in 0..outer {
            for &k in keep {
                let start = (o * len + k) * inner;
                out.extend_from_slice(&self.values[start..start + inner]);
            }
        }
        out
    }

    /// Select one position along `dim`, dropping the dimension.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimension is missing or the index is out of
    /// range.
    pub fn isel(&self, dim: &str, index: usize) -> Result<Self> {
        let axis = self.dim_index(dim)?;
        let len = self.coords[axis].len();
        if index >= len {
            return Err(Error::IndexOutOfRange {
                dim: dim.to_string(),
                index,
                len,
            });
        }
        let values = self.take_along(axis, &[index]);
        let mut dims = self.dims.clone();
        let mut coords = self.coords.clone();
        dims.remove(axis);
        coords.remove(axis);
        Ok(Self {
            name: self.name.clone(),
            dims,
            coords,
            values,
            attrs: self.attrs.clone(),
        })
    }

    /// Keep coordinate labels within `[lo, hi]` (inclusive), in their
    /// original order. The bounds may be given in either order.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimension is missing or no label falls inside
    /// the range.
    pub fn sel_range(&self, dim: &str, lo: f64, hi: f64) -> Result<Self> {
        let axis = self.dim_index(dim)?;
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        let keep: Vec<usize> = self.coords[axis]
            .iter()
            .enumerate()
            .filter(|(_, c)| **c >= lo && **c <= hi)
            .map(|(i, _)| i)
            .collect();
        if keep.is_empty() {
            return Err(Error::CoordinateNotFound {
                dim: dim.to_string(),
                value: lo,
            });
        }
        let values = self.take_along(axis, &keep);
        let mut coords = self.coords.clone();
        coords[axis] = keep.iter().map(|&i| self.coords[axis][i]).collect();
        Ok(Self {
            name: self.name.clone(),
            dims: self.dims.clone(),
            coords,
            values,
            attrs: self.attrs.clone(),
        })
    }

    /// Multiply every value by `factor`.
    #[must_use]
    pub fn scale(&self, factor: f64) -> Self {
        let mut out = self.clone();
        for v in &mut out.values {
            *v *= factor;
        }
        out
    }

    /// Append one column along `dim` at `last + step` that repeats the first
    /// column, closing the seam of a global longitude grid.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimension is missing, has fewer than two
    /// labels, or is not evenly spaced.
    pub fn add_cyclic_longitudes(&self, dim: &str) -> Result<Self> {
        let axis = self.dim_index(dim)?;
        let lon = &self.coords[axis];
        if lon.len() < 2 {
            return Err(Error::UnevenCoordinate(format!(
                "{dim} needs at least two values"
            )));
        }
        let step = lon[1] - lon[0];
        let tol = step.abs() * 1e-5;
        if lon.windows(2).any(|w| ((w[1] - w[0]) - step).abs() > tol) {
            return Err(Error::UnevenCoordinate(dim.to_string()));
        }

        let mut keep: Vec<usize> = (0..lon.len()).collect();
        keep.push(0);
        let values = self.take_along(axis, &keep);
        let mut coords = self.coords.clone();
        coords[axis].push(lon[lon.len() - 1] + step);
        debug!("cyclic padding on {}: {} -> {} columns", dim, lon.len(), lon.len() + 1);
        Ok(Self {
            name: self.name.clone(),
            dims: self.dims.clone(),
            coords,
            values,
            attrs: self.attrs.clone(),
        })
    }

    /// Value at a multi-index.
    #[must_use]
    pub fn get(&self, index: &[usize]) -> Option<f64> {
        if index.len() != self.dims.len() {
            return None;
        }
        let shape = self.shape();
        if index.iter().zip(&shape).any(|(i, n)| i >= n) {
            return None;
        }
        let flat: usize = index.iter().zip(self.strides()).map(|(i, s)| i * s).sum();
        self.values.get(flat).copied()
    }

    /// View a 2-d array as a grid: the last dimension is x, the first is y.
    ///
    /// # Errors
    ///
    /// Returns an error unless the array has exactly two dimensions.
    pub fn to_grid(&self) -> Result<Grid> {
        if self.dims.len() != 2 {
            return Err(Error::Rendering(format!(
                "'{}' has {} dimensions, a 2-d field is required",
                self.name,
                self.dims.len()
            )));
        }
        Grid::new(self.coords[1].clone(), self.coords[0].clone(), self.values.clone())
    }
}

/// A 2-d field on a rectilinear grid, rows along `y`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    /// Column coordinates.
    pub x: Vec<f64>,
    /// Row coordinates.
    pub y: Vec<f64>,
    /// Row-major values, `y.len() * x.len()`.
    pub values: Vec<f64>,
}

impl Grid {
    /// Create a grid.
    ///
    /// # Errors
    ///
    /// Returns an error if the value count does not match the coordinates or
    /// either axis is empty.
    pub fn new(x: Vec<f64>, y: Vec<f64>, values: Vec<f64>) -> Result<Self> {
        if x.is_empty() || y.is_empty() {
            return Err(Error::EmptyData);
        }
        if x.len() * y.len() != values.len() {
            return Err(Error::DataLengthMismatch {
                x_len: values.len(),
                y_len: x.len() * y.len(),
            });
        }
        Ok(Self { x, y, values })
    }

    /// Number of columns.
    #[must_use]
    pub fn nx(&self) -> usize {
        self.x.len()
    }

    /// Number of rows.
    #[must_use]
    pub fn ny(&self) -> usize {
        self.y.len()
    }

    /// Value at row `j`, column `i`.
    #[must_use]
    pub fn at(&self, j: usize, i: usize) -> f64 {
        self.values[j * self.x.len() + i]
    }

    /// Minimum and maximum of the non-NaN values.
    #[must_use]
    pub fn extent(&self) -> Option<(f64, f64)> {
        finite_extent(&self.values)
    }
}

fn finite_extent(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// An opened NetCDF file handing out decoded [`DataArray`]s.
#[derive(Debug, Clone)]
pub struct Dataset {
    path: Option<PathBuf>,
    file: NcFile,
}

impl Dataset {
    /// Open a NetCDF classic file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        Ok(Self {
            path: Some(path.to_path_buf()),
            file: NcFile::open(path)?,
        })
    }

    /// Wrap an already parsed file.
    #[must_use]
    pub fn from_file(file: NcFile) -> Self {
        Self { path: None, file }
    }

    /// Source path, when opened from disk.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Names of all variables.
    #[must_use]
    pub fn variable_names(&self) -> Vec<&str> {
        self.file.header().vars.iter().map(|v| v.name.as_str()).collect()
    }

    /// Global attribute by name.
    #[must_use]
    pub fn global_attr(&self, name: &str) -> Option<&AttrValue> {
        self.file.global_attr(name)
    }

    /// Load a variable with CF decoding applied.
    ///
    /// `_FillValue` and `missing_value` entries become NaN, then
    /// `scale_factor` and `add_offset` unpack the values. Coordinates come
    /// from the same-named 1-d variable, or `0..n` when there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is missing, holds no values, or its
    /// data is truncated.
    pub fn variable(&self, name: &str) -> Result<DataArray> {
        let var = self
            .file
            .variable(name)
            .ok_or_else(|| Error::MissingVariable(name.to_string()))?;
        let values = self.decoded_values(var)?;
        if values.is_empty() {
            return Err(Error::EmptyData);
        }
        let dims = self.file.dim_names(var);
        let shape = self.file.shape(var);

        let mut coords = Vec::with_capacity(dims.len());
        for (dim, &len) in dims.iter().zip(&shape) {
            coords.push(self.coordinate(name, dim, len)?);
        }

        let dim_refs: Vec<&str> = dims.iter().map(String::as_str).collect();
        let mut array = DataArray::new(name, &dim_refs, coords, values)?;
        for attr in &var.attrs {
            array.attrs.insert(attr.name.clone(), attr.value.clone());
        }
        debug!("loaded {} with shape {:?}", name, array.shape());
        Ok(array)
    }

    fn coordinate(&self, var_name: &str, dim: &str, len: usize) -> Result<Vec<f64>> {
        match self.file.variable(dim) {
            Some(coord) if coord.name != var_name && coord.dim_ids.len() == 1 => {
                let values = self.decoded_values(coord)?;
                if values.len() == len {
                    Ok(values)
                } else {
                    Ok((0..len).map(|i| i as f64).collect())
                }
            }
            Some(coord) if coord.name == var_name => self.decoded_values(coord),
            _ => Ok((0..len).map(|i| i as f64).collect()),
        }
    }

    fn decoded_values(&self, var: &Variable) -> Result<Vec<f64>> {
        let mut values = self.file.read_values(var)?;
        let fills: Vec<f64> = ["_FillValue", "missing_value"]
            .iter()
            .filter_map(|name| var.attr(name).and_then(AttrValue::as_slice))
            .flatten()
            .copied()
            .collect();
        let scale = var.attr("scale_factor").and_then(AttrValue::as_f64);
        let offset = var.attr("add_offset").and_then(AttrValue::as_f64);

        for v in &mut values {
            if fills.iter().any(|&f| *v == f || (f.is_nan() && v.is_nan())) {
                *v = f64::NAN;
                continue;
            }
            if let Some(s) = scale {
                *v *= s;
            }
            if let Some(o) = offset {
                *v += o;
            }
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// 2 (lat) x 3 (lon) field with values row * 10 + col.
    fn field() -> DataArray {
        DataArray::new(
            "T",
            &["lat", "lon"],
            vec![vec![-10.0, 10.0], vec![0.0, 120.0, 240.0]],
            vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0],
        )
        .unwrap()
        .with_attr("units", AttrValue::text("K"))
    }

    #[test]
    fn test_new_rejects_bad_length() {
        let err = DataArray::new("x", &["a"], vec![vec![0.0, 1.0]], vec![1.0]).unwrap_err();
        assert!(matches!(err, Error::DataLengthMismatch { .. }));
    }

    #[test]
    fn test_isel_drops_dimension() {
        let row = field().isel("lat", 1).unwrap();
        assert_eq!(row.dims(), ["lon"]);
        assert_eq!(row.values(), &[10.0, 11.0, 12.0]);
        let col = field().isel("lon", 2).unwrap();
        assert_eq!(col.values(), &[2.0, 12.0]);
        assert_eq!(col.units(), Some("K"));
    }

    #[test]
    fn test_isel_out_of_range() {
        assert!(matches!(
            field().isel("lat", 2),
            Err(Error::IndexOutOfRange { len: 2, .. })
        ));
        assert!(matches!(field().isel("time", 0), Err(Error::MissingDimension { .. })));
    }

    #[test]
    fn test_sel_range_inclusive_and_order_free() {
        let sub = field().sel_range("lon", 240.0, 120.0).unwrap();
        assert_eq!(sub.coord("lon").unwrap(), &[120.0, 240.0]);
        assert_eq!(sub.values(), &[1.0, 2.0, 11.0, 12.0]);
        assert!(field().sel_range("lon", 300.0, 350.0).is_err());
    }

    #[test]
    fn test_sel_range_descending_coordinate() {
        let arr = DataArray::new("v", &["lat"], vec![vec![30.0, 0.0, -30.0]], vec![1.0, 2.0, 3.0]).unwrap();
        let sub = arr.sel_range("lat", -10.0, 40.0).unwrap();
        assert_eq!(sub.coord("lat").unwrap(), &[30.0, 0.0]);
    }

    #[test]
    fn test_scale() {
        let scaled = field().scale(0.1);
        assert_relative_eq!(scaled.values()[5], 1.2);
    }

    #[test]
    fn test_add_cyclic_longitudes() {
        let padded = field().add_cyclic_longitudes("lon").unwrap();
        assert_eq!(padded.shape(), vec![2, 4]);
        assert_eq!(padded.coord("lon").unwrap(), &[0.0, 120.0, 240.0, 360.0]);
        assert_eq!(padded.get(&[0, 3]), padded.get(&[0, 0]));
        assert_eq!(padded.get(&[1, 3]), Some(10.0));
    }

    #[test]
    fn test_cyclic_rejects_uneven() {
        let arr = DataArray::new("v", &["lon"], vec![vec![0.0, 1.0, 3.0]], vec![0.0; 3]).unwrap();
        assert!(matches!(arr.add_cyclic_longitudes("lon"), Err(Error::UnevenCoordinate(_))));
    }

    #[test]
    fn test_extent_ignores_nan() {
        let arr = DataArray::new("v", &["x"], vec![vec![0.0, 1.0, 2.0]], vec![f64::NAN, -1.0, 4.0]).unwrap();
        assert_eq!(arr.extent(), Some((-1.0, 4.0)));
    }

    #[test]
    fn test_to_grid() {
        let grid = field().to_grid().unwrap();
        assert_eq!(grid.nx(), 3);
        assert_eq!(grid.ny(), 2);
        assert_relative_eq!(grid.at(1, 2), 12.0);
        assert!(field().isel("lat", 0).unwrap().to_grid().is_err());
    }

    #[test]
    fn test_missing_attribute() {
        assert!(matches!(field().attr("long_name"), Err(Error::MissingAttribute { .. })));
        assert_eq!(field().long_name(), None);
    }

    #[test]
    fn test_fill_and_missing_value_both_mask() {
        use crate::netcdf::{NcType, NcWriter};

        let bytes = NcWriter::new()
            .dimension("n", 3)
            .variable("T", &["n"], NcType::Float, vec![1.0, -999.0, 1.0e20])
            .unwrap()
            .attr("_FillValue", AttrValue::float(1.0e20))
            .unwrap()
            .attr("missing_value", AttrValue::float(-999.0))
            .unwrap()
            .to_bytes()
            .unwrap();
        let ds = Dataset::from_file(NcFile::from_bytes(bytes).unwrap());
        let values = ds.variable("T").unwrap().values().to_vec();
        assert_eq!(values[0], 1.0);
        assert!(values[1].is_nan());
        assert!(values[2].is_nan());
    }
}
