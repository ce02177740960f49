//! NetCDF classic (CDF-1) writer.
//!
//! Writes fixed-size variables and at most one unlimited (record) dimension.
//! Used to export derived fields and to build test fixtures.

use std::path::Path;

use log::debug;

use super::types::{AttrValue, Attribute, NcType};
use crate::error::{Error, Result};

const NC_DIMENSION: u32 = 0x0A;
const NC_VARIABLE: u32 = 0x0B;
const NC_ATTRIBUTE: u32 = 0x0C;

#[derive(Debug, Clone)]
struct DimDef {
    name: String,
    len: usize,
    unlimited: bool,
}

#[derive(Debug, Clone)]
struct VarDef {
    name: String,
    dim_ids: Vec<usize>,
    attrs: Vec<Attribute>,
    nc_type: NcType,
    data: Vec<f64>,
}

/// Builder for a CDF-1 file.
#[derive(Debug, Clone, Default)]
pub struct NcWriter {
    dims: Vec<DimDef>,
    global_attrs: Vec<Attribute>,
    vars: Vec<VarDef>,
}

impl NcWriter {
    /// Create an empty file definition.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a fixed-size dimension.
    #[must_use]
    pub fn dimension(mut self, name: &str, len: usize) -> Self {
        self.dims.push(DimDef {
            name: name.to_string(),
            len,
            unlimited: false,
        });
        self
    }

    /// Define the unlimited dimension holding `records` records.
    #[must_use]
    pub fn unlimited_dimension(mut self, name: &str, records: usize) -> Self {
        self.dims.push(DimDef {
            name: name.to_string(),
            len: records,
            unlimited: true,
        });
        self
    }

    /// Add a global attribute.
    #[must_use]
    pub fn global_attr(mut self, name: &str, value: AttrValue) -> Self {
        self.global_attrs.push(Attribute {
            name: name.to_string(),
            value,
        });
        self
    }

    /// Add a variable over the named dimensions; `data` is row-major.
    ///
    /// # Errors
    ///
    /// Returns an error if a dimension is unknown, the unlimited dimension is
    /// not first, or `data` does not match the shape.
    pub fn variable(mut self, name: &str, dims: &[&str], nc_type: NcType, data: Vec<f64>) -> Result<Self> {
        let mut dim_ids = Vec::with_capacity(dims.len());
        for (pos, dim) in dims.iter().enumerate() {
            let id = self
                .dims
                .iter()
                .position(|d| d.name == *dim)
                .ok_or_else(|| Error::MissingDimension {
                    var: name.to_string(),
                    dim: (*dim).to_string(),
                })?;
            if self.dims[id].unlimited && pos != 0 {
                return Err(Error::NetCdfFormat(format!(
                    "unlimited dimension '{dim}' must be first in '{name}'"
                )));
            }
            dim_ids.push(id);
        }
        let expected: usize = dim_ids.iter().map(|&id| self.dims[id].len).product();
        if expected != data.len() {
            return Err(Error::DataLengthMismatch {
                x_len: data.len(),
                y_len: expected,
            });
        }
        self.vars.push(VarDef {
            name: name.to_string(),
            dim_ids,
            attrs: Vec::new(),
            nc_type,
            data,
        });
        Ok(self)
    }

    /// Attach an attribute to the most recently added variable.
    ///
    /// # Errors
    ///
    /// Returns an error if no variable has been added yet.
    pub fn attr(mut self, name: &str, value: AttrValue) -> Result<Self> {
        let var = self
            .vars
            .last_mut()
            .ok_or_else(|| Error::MissingVariable(format!("attribute '{name}' has no variable")))?;
        var.attrs.push(Attribute {
            name: name.to_string(),
            value,
        });
        Ok(self)
    }

    /// Serialize the file.
    ///
    /// # Errors
    ///
    /// Returns an error if more than one unlimited dimension is defined or an
    /// offset exceeds the 32-bit range of the classic format.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        if self.dims.iter().filter(|d| d.unlimited).count() > 1 {
            return Err(Error::NetCdfFormat("only one unlimited dimension is allowed".to_string()));
        }

        let numrecs = self.dims.iter().find(|d| d.unlimited).map_or(0, |d| d.len);
        let is_record = |v: &VarDef| v.dim_ids.first().is_some_and(|&id| self.dims[id].unlimited);
        let record_len = |v: &VarDef| -> usize {
            v.dim_ids
                .iter()
                .skip(usize::from(is_record(v)))
                .map(|&id| self.dims[id].len)
                .product()
        };
        let vsizes: Vec<usize> = self
            .vars
            .iter()
            .map(|v| padded(record_len(v) * v.nc_type.size()))
            .collect();

        // The header length does not depend on the offsets, so lay it out once
        // with zeros to learn where data starts.
        let zero_begins = vec![0u64; self.vars.len()];
        let header_len = self.header(numrecs, &vsizes, &zero_begins).len() as u64;

        let mut begins = vec![0u64; self.vars.len()];
        let mut offset = header_len;
        for (i, var) in self.vars.iter().enumerate() {
            if !is_record(var) {
                begins[i] = offset;
                offset += vsizes[i] as u64;
            }
        }
        let record_vars: Vec<usize> = (0..self.vars.len()).filter(|&i| is_record(&self.vars[i])).collect();
        let lone_record = record_vars.len() == 1;
        for &i in &record_vars {
            begins[i] = offset;
            offset += if lone_record {
                (record_len(&self.vars[i]) * self.vars[i].nc_type.size()) as u64
            } else {
                vsizes[i] as u64
            };
        }
        if begins.iter().any(|b| *b > u64::from(u32::MAX)) {
            return Err(Error::NetCdfFormat("file exceeds the classic 32-bit offset limit".to_string()));
        }

        let mut out = self.header(numrecs, &vsizes, &begins);
        for var in self.vars.iter().filter(|v| !is_record(v)) {
            for &value in &var.data {
                var.nc_type.encode(value, &mut out);
            }
            pad_to_four(&mut out);
        }
        for rec in 0..numrecs {
            for &i in &record_vars {
                let var = &self.vars[i];
                let n = record_len(var);
                for &value in &var.data[rec * n..(rec + 1) * n] {
                    var.nc_type.encode(value, &mut out);
                }
                if !lone_record {
                    pad_to_four(&mut out);
                }
            }
        }
        debug!("encoded {} variables into {} bytes", self.vars.len(), out.len());
        Ok(out)
    }

    /// Write the file to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    fn header(&self, numrecs: usize, vsizes: &[usize], begins: &[u64]) -> Vec<u8> {
        let mut out = Vec::with_capacity(256);
        out.extend_from_slice(b"CDF\x01");
        put_u32(&mut out, numrecs);

        if self.dims.is_empty() {
            out.extend_from_slice(&[0; 8]);
        } else {
            put_u32(&mut out, NC_DIMENSION as usize);
            put_u32(&mut out, self.dims.len());
            for dim in &self.dims {
                put_name(&mut out, &dim.name);
                put_u32(&mut out, if dim.unlimited { 0 } else { dim.len });
            }
        }

        put_attrs(&mut out, &self.global_attrs);

        if self.vars.is_empty() {
            out.extend_from_slice(&[0; 8]);
        } else {
            put_u32(&mut out, NC_VARIABLE as usize);
            put_u32(&mut out, self.vars.len());
            for (i, var) in self.vars.iter().enumerate() {
                put_name(&mut out, &var.name);
                put_u32(&mut out, var.dim_ids.len());
                for &id in &var.dim_ids {
                    put_u32(&mut out, id);
                }
                put_attrs(&mut out, &var.attrs);
                put_u32(&mut out, var.nc_type.code() as usize);
                put_u32(&mut out, vsizes[i]);
                put_u32(&mut out, begins[i] as usize);
            }
        }
        out
    }
}

fn padded(len: usize) -> usize {
    (len + 3) & !3
}

fn pad_to_four(out: &mut Vec<u8>) {
    while out.len() % 4 != 0 {
        out.push(0);
    }
}

fn put_u32(out: &mut Vec<u8>, value: usize) {
    out.extend_from_slice(&(value as u32).to_be_bytes());
}

fn put_name(out: &mut Vec<u8>, name: &str) {
    put_u32(out, name.len());
    out.extend_from_slice(name.as_bytes());
    pad_to_four(out);
}

fn put_attrs(out: &mut Vec<u8>, attrs: &[Attribute]) {
    if attrs.is_empty() {
        out.extend_from_slice(&[0; 8]);
        return;
    }
    put_u32(out, NC_ATTRIBUTE as usize);
    put_u32(out, attrs.len());
    for attr in attrs {
        put_name(out, &attr.name);
        match &attr.value {
            AttrValue::Text(text) => {
                put_u32(out, NcType::Char.code() as usize);
                put_u32(out, text.len());
                out.extend_from_slice(text.as_bytes());
            }
            AttrValue::Numeric { nc_type, values } => {
                put_u32(out, nc_type.code() as usize);
                put_u32(out, values.len());
                for &v in values {
                    nc_type.encode(v, out);
                }
            }
        }
        pad_to_four(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netcdf::NcFile;

    #[test]
    fn test_header_only_file() {
        let bytes = NcWriter::new().to_bytes().unwrap();
        assert_eq!(&bytes[..4], b"CDF\x01");
        let file = NcFile::from_bytes(bytes).unwrap();
        assert!(file.header().vars.is_empty());
    }

    #[test]
    fn test_rejects_shape_mismatch() {
        let err = NcWriter::new()
            .dimension("x", 3)
            .variable("v", &["x"], NcType::Int, vec![1.0, 2.0])
            .unwrap_err();
        assert!(matches!(err, Error::DataLengthMismatch { .. }));
    }

    #[test]
    fn test_rejects_unknown_dimension() {
        let err = NcWriter::new()
            .variable("v", &["nope"], NcType::Int, vec![])
            .unwrap_err();
        assert!(matches!(err, Error::MissingDimension { .. }));
    }

    #[test]
    fn test_unlimited_must_lead() {
        let err = NcWriter::new()
            .dimension("x", 1)
            .unlimited_dimension("time", 2)
            .variable("v", &["x", "time"], NcType::Float, vec![0.0, 0.0])
            .unwrap_err();
        assert!(err.to_string().contains("must be first"));
    }

    #[test]
    fn test_attr_without_variable() {
        assert!(NcWriter::new().attr("units", AttrValue::text("K")).is_err());
    }

    #[test]
    fn test_short_variable_is_padded() {
        let bytes = NcWriter::new()
            .dimension("x", 3)
            .variable("a", &["x"], NcType::Short, vec![1.0, 2.0, 3.0])
            .unwrap()
            .dimension("y", 1)
            .variable("b", &["y"], NcType::Int, vec![9.0])
            .unwrap()
            .to_bytes()
            .unwrap();
        let file = NcFile::from_bytes(bytes).unwrap();
        let a = file.variable("a").unwrap();
        let b = file.variable("b").unwrap();
        assert_eq!(a.vsize, 8);
        assert_eq!(b.begin, a.begin + 8);
        assert_eq!(file.read_values(b).unwrap(), vec![9.0]);
    }
}
