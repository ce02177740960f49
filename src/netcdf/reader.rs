//! NetCDF classic reader.

use std::path::Path;

use log::debug;

use super::types::{AttrValue, Attribute, Dimension, Header, NcType, Variable, Version};
use crate::error::{Error, Result};

const NC_DIMENSION: u32 = 0x0A;
const NC_VARIABLE: u32 = 0x0B;
const NC_ATTRIBUTE: u32 = 0x0C;
const STREAMING: u64 = 0xFFFF_FFFF;
const HDF5_SIGNATURE: &[u8] = b"\x89HDF\r\n\x1a\n";
/// Smallest encoding of any header list element.
const MIN_ELEMENT_BYTES: usize = 4;

/// An opened NetCDF classic file held in memory.
#[derive(Debug, Clone)]
pub struct NcFile {
    header: Header,
    bytes: Vec<u8>,
}

impl NcFile {
    /// Read and parse a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a classic
    /// NetCDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        debug!("read {} bytes from {}", bytes.len(), path.display());
        Self::from_bytes(bytes)
    }

    /// Parse an in-memory file.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a classic NetCDF file.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        if bytes.starts_with(HDF5_SIGNATURE) {
            return Err(Error::NetCdfFormat(
                "NetCDF-4/HDF5 files are not supported; convert to classic format".to_string(),
            ));
        }
        let mut cursor = Cursor::new(&bytes);
        let mut header = cursor.header()?;

        if header.numrecs as u64 == STREAMING {
            header.numrecs = streaming_numrecs(&header, bytes.len())?;
        }
        debug!(
            "parsed {:?} header: {} dims, {} vars, {} records",
            header.version,
            header.dims.len(),
            header.vars.len(),
            header.numrecs
        );
        Ok(Self { header, bytes })
    }

    /// Parsed header.
    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Look up a variable by name.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.header.vars.iter().find(|v| v.name == name)
    }

    /// Global attribute by name.
    #[must_use]
    pub fn global_attr(&self, name: &str) -> Option<&AttrValue> {
        self.header
            .global_attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| &a.value)
    }

    /// Dimension names of a variable, in order.
    #[must_use]
    pub fn dim_names(&self, var: &Variable) -> Vec<String> {
        var.dim_ids
            .iter()
            .filter_map(|&id| self.header.dims.get(id))
            .map(|d| d.name.clone())
            .collect()
    }

    /// Shape of a variable, with the record dimension at its record count.
    #[must_use]
    pub fn shape(&self, var: &Variable) -> Vec<usize> {
        var.dim_ids
            .iter()
            .filter_map(|&id| self.header.dims.get(id))
            .map(|d| if d.unlimited { self.header.numrecs } else { d.len })
            .collect()
    }

    /// Read every value of a variable, widened to `f64`, in row-major order.
    ///
    /// No attribute-driven decoding is applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the data section is truncated.
    pub fn read_values(&self, var: &Variable) -> Result<Vec<f64>> {
        let size = var.nc_type.size();
        let per_record = self.header.record_len(var)?;
        let chunk_bytes = per_record
            .checked_mul(size)
            .ok_or_else(|| truncated(var, "size overflows"))?;

        let (records, stride) = if self.header.is_record_var(var) {
            (self.header.numrecs, self.header.record_size()?)
        } else {
            (1, 0)
        };
        if chunk_bytes == 0 || records == 0 {
            return Ok(Vec::new());
        }
        // Every record needs its own bytes, so a plausible count fits the file.
        if records > self.bytes.len() / chunk_bytes {
            return Err(truncated(var, &format!("{records} records of {chunk_bytes} bytes")));
        }

        let mut values = Vec::with_capacity(records * per_record);
        for r in 0..records {
            let start = (r as u64)
                .checked_mul(stride)
                .and_then(|o| o.checked_add(var.begin))
                .and_then(|o| usize::try_from(o).ok())
                .ok_or_else(|| truncated(var, &format!("record {r} offset overflows")))?;
            let data = start
                .checked_add(chunk_bytes)
                .and_then(|end| self.bytes.get(start..end))
                .ok_or_else(|| {
                    truncated(
                        var,
                        &format!("need {chunk_bytes} bytes at {start}, file has {}", self.bytes.len()),
                    )
                })?;
            values.extend(data.chunks_exact(size).map(|b| var.nc_type.decode(b)));
        }
        Ok(values)
    }

    /// Read a character variable as text, trimming trailing NULs.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is not of char type or is truncated.
    pub fn read_text(&self, var: &Variable) -> Result<String> {
        if var.nc_type != NcType::Char {
            return Err(Error::NetCdfFormat(format!("'{}' is not a char variable", var.name)));
        }
        let codes = self.read_values(var)?;
        let bytes: Vec<u8> = codes.into_iter().map(|c| c as u8).collect();
        Ok(String::from_utf8_lossy(&bytes).trim_end_matches('\0').to_string())
    }
}

fn truncated(var: &Variable, detail: &str) -> Error {
    Error::NetCdfFormat(format!("data for '{}' truncated: {detail}", var.name))
}

/// Record count of a streamed file, inferred from its length.
fn streaming_numrecs(header: &Header, file_len: usize) -> Result<usize> {
    let recsize = header.record_size()?;
    let first = header
        .vars
        .iter()
        .filter(|v| header.is_record_var(v))
        .map(|v| v.begin)
        .min();
    Ok(match first {
        Some(begin) if recsize > 0 && (file_len as u64) > begin => {
            ((file_len as u64 - begin) / recsize) as usize
        }
        _ => 0,
    })
}

/// Big-endian header cursor.
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    version: Version,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            version: Version::Classic,
        }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).filter(|e| *e <= self.bytes.len()).ok_or_else(|| {
            Error::NetCdfFormat(format!("truncated header at byte {}", self.pos))
        })?;
        let bytes = self.bytes;
        let slice = &bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u64(&mut self) -> Result<u64> {
        let b = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(b);
        Ok(u64::from_be_bytes(buf))
    }

    /// A NON_NEG count: 4 bytes, or 8 in CDF-5.
    fn count(&mut self) -> Result<usize> {
        let n = if self.version.count_width() == 8 {
            self.u64()?
        } else {
            u64::from(self.u32()?)
        };
        usize::try_from(n).map_err(|_| Error::NetCdfFormat(format!("count {n} too large")))
    }

    fn offset(&mut self) -> Result<u64> {
        if self.version.offset_width() == 8 {
            self.u64()
        } else {
            Ok(u64::from(self.u32()?))
        }
    }

    fn skip_padding(&mut self, len: usize) -> Result<()> {
        let pad = (4 - len % 4) % 4;
        self.take(pad).map(|_| ())
    }

    fn name(&mut self) -> Result<String> {
        let len = self.count()?;
        let raw = self.take(len)?;
        self.skip_padding(len)?;
        String::from_utf8(raw.to_vec())
            .map_err(|_| Error::NetCdfFormat("name is not valid UTF-8".to_string()))
    }

    /// An element count that the remaining header can hold, at
    /// `min_size` bytes per element.
    fn bounded_count(&mut self, min_size: usize, what: &str) -> Result<usize> {
        let n = self.count()?;
        let remaining = self.bytes.len() - self.pos;
        if n > remaining / min_size {
            return Err(Error::NetCdfFormat(format!(
                "{n} {what} declared but only {remaining} header bytes remain"
            )));
        }
        Ok(n)
    }

    /// List tag and element count; ABSENT yields zero elements.
    fn list(&mut self, expected: u32, what: &str) -> Result<usize> {
        let tag = self.u32()?;
        let n = self.bounded_count(MIN_ELEMENT_BYTES, what)?;
        match tag {
            0 if n == 0 => Ok(0),
            t if t == expected => Ok(n),
            t => Err(Error::NetCdfFormat(format!(
                "expected list tag {expected:#x}, found {t:#x}"
            ))),
        }
    }

    fn header(&mut self) -> Result<Header> {
        let magic = self.take(4)?;
        if &magic[..3] != b"CDF" {
            return Err(Error::NetCdfFormat("missing CDF magic".to_string()));
        }
        self.version = Version::from_byte(magic[3])?;

        let numrecs = if self.version == Version::Data64 {
            self.u64()?
        } else {
            u64::from(self.u32()?)
        };
        let numrecs = usize::try_from(numrecs)
            .map_err(|_| Error::NetCdfFormat(format!("record count {numrecs} too large")))?;

        let ndims = self.list(NC_DIMENSION, "dimensions")?;
        let mut dims = Vec::with_capacity(ndims);
        for _ in 0..ndims {
            let name = self.name()?;
            let len = self.count()?;
            dims.push(Dimension {
                name,
                len,
                unlimited: len == 0,
            });
        }

        let global_attrs = self.attributes()?;

        let nvars = self.list(NC_VARIABLE, "variables")?;
        let mut vars = Vec::with_capacity(nvars);
        for _ in 0..nvars {
            let name = self.name()?;
            let rank = self.bounded_count(MIN_ELEMENT_BYTES, "dimension ids")?;
            let mut dim_ids = Vec::with_capacity(rank);
            for _ in 0..rank {
                let id = self.count()?;
                if id >= dims.len() {
                    return Err(Error::NetCdfFormat(format!(
                        "variable '{name}' references missing dimension {id}"
                    )));
                }
                dim_ids.push(id);
            }
            let attrs = self.attributes()?;
            let nc_type = NcType::from_code(self.u32()?, self.version)?;
            let vsize = self.count()? as u64;
            let begin = self.offset()?;
            vars.push(Variable {
                name,
                dim_ids,
                attrs,
                nc_type,
                vsize,
                begin,
            });
        }

        Ok(Header {
            version: self.version,
            numrecs,
            dims,
            global_attrs,
            vars,
        })
    }

    fn attributes(&mut self) -> Result<Vec<Attribute>> {
        let n = self.list(NC_ATTRIBUTE, "attributes")?;
        let mut attrs = Vec::with_capacity(n);
        for _ in 0..n {
            let name = self.name()?;
            let nc_type = NcType::from_code(self.u32()?, self.version)?;
            let count = self.count()?;
            let len = count
                .checked_mul(nc_type.size())
                .ok_or_else(|| Error::NetCdfFormat(format!("attribute '{name}' too large")))?;
            let raw = self.take(len)?;
            self.skip_padding(len)?;
            let value = if nc_type == NcType::Char {
                AttrValue::Text(
                    String::from_utf8_lossy(raw)
                        .trim_end_matches('\0')
                        .to_string(),
                )
            } else {
                AttrValue::Numeric {
                    nc_type,
                    values: raw.chunks_exact(nc_type.size()).map(|b| nc_type.decode(b)).collect(),
                }
            };
            attrs.push(Attribute { name, value });
        }
        Ok(attrs)
    }
}
