//! Header model for NetCDF classic files.

use crate::error::{Error, Result};

/// File format variant, from the version byte after the `CDF` magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    /// CDF-1: 32-bit offsets.
    Classic,
    /// CDF-2: 64-bit offsets.
    Offset64,
    /// CDF-5: 64-bit offsets, sizes and extra integer types.
    Data64,
}

impl Version {
    /// Parse the version byte.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown version.
    pub fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            1 => Ok(Self::Classic),
            2 => Ok(Self::Offset64),
            5 => Ok(Self::Data64),
            other => Err(Error::NetCdfFormat(format!("unsupported CDF version {other}"))),
        }
    }

    /// The version byte.
    #[must_use]
    pub const fn byte(self) -> u8 {
        match self {
            Self::Classic => 1,
            Self::Offset64 => 2,
            Self::Data64 => 5,
        }
    }

    /// Width of element counts and sizes in the header.
    #[must_use]
    pub const fn count_width(self) -> usize {
        match self {
            Self::Data64 => 8,
            _ => 4,
        }
    }

    /// Width of a variable's data offset in the header.
    #[must_use]
    pub const fn offset_width(self) -> usize {
        match self {
            Self::Classic => 4,
            _ => 8,
        }
    }
}

/// External data type of a variable or attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum NcType {
    Byte,
    Char,
    Short,
    Int,
    Float,
    Double,
    UByte,
    UShort,
    UInt,
    Int64,
    UInt64,
}

impl NcType {
    /// Decode a type code.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown code, or a CDF-5 type in an older file.
    pub fn from_code(code: u32, version: Version) -> Result<Self> {
        let ty = match code {
            1 => Self::Byte,
            2 => Self::Char,
            3 => Self::Short,
            4 => Self::Int,
            5 => Self::Float,
            6 => Self::Double,
            7 => Self::UByte,
            8 => Self::UShort,
            9 => Self::UInt,
            10 => Self::Int64,
            11 => Self::UInt64,
            other => return Err(Error::NetCdfFormat(format!("unknown type code {other}"))),
        };
        if code > 6 && version != Version::Data64 {
            return Err(Error::NetCdfFormat(format!(
                "type code {code} requires the CDF-5 format"
            )));
        }
        Ok(ty)
    }

    /// Type code as stored in the header.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Byte => 1,
            Self::Char => 2,
            Self::Short => 3,
            Self::Int => 4,
            Self::Float => 5,
            Self::Double => 6,
            Self::UByte => 7,
            Self::UShort => 8,
            Self::UInt => 9,
            Self::Int64 => 10,
            Self::UInt64 => 11,
        }
    }

    /// Size of one element in bytes.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Byte | Self::Char | Self::UByte => 1,
            Self::Short | Self::UShort => 2,
            Self::Int | Self::UInt | Self::Float => 4,
            Self::Double | Self::Int64 | Self::UInt64 => 8,
        }
    }

    /// Decode one big-endian element. `bytes` holds exactly `size()` bytes.
    pub(crate) fn decode(self, bytes: &[u8]) -> f64 {
        let mut buf = [0u8; 8];
        buf[..bytes.len()].copy_from_slice(bytes);
        match self {
            Self::Byte => f64::from(bytes[0] as i8),
            Self::Char | Self::UByte => f64::from(bytes[0]),
            Self::Short => f64::from(i16::from_be_bytes([buf[0], buf[1]])),
            Self::UShort => f64::from(u16::from_be_bytes([buf[0], buf[1]])),
            Self::Int => f64::from(i32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]])),
            Self::UInt => f64::from(u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]])),
            Self::Float => f64::from(f32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]])),
            Self::Double => f64::from_be_bytes(buf),
            Self::Int64 => i64::from_be_bytes(buf) as f64,
            Self::UInt64 => u64::from_be_bytes(buf) as f64,
        }
    }

    /// Append one big-endian element, saturating out-of-range values.
    pub(crate) fn encode(self, value: f64, out: &mut Vec<u8>) {
        match self {
            Self::Byte => out.push((value as i8) as u8),
            Self::Char | Self::UByte => out.push(value as u8),
            Self::Short => out.extend_from_slice(&(value as i16).to_be_bytes()),
            Self::UShort => out.extend_from_slice(&(value as u16).to_be_bytes()),
            Self::Int => out.extend_from_slice(&(value as i32).to_be_bytes()),
            Self::UInt => out.extend_from_slice(&(value as u32).to_be_bytes()),
            Self::Float => out.extend_from_slice(&(value as f32).to_be_bytes()),
            Self::Double => out.extend_from_slice(&value.to_be_bytes()),
            Self::Int64 => out.extend_from_slice(&(value as i64).to_be_bytes()),
            Self::UInt64 => out.extend_from_slice(&(value as u64).to_be_bytes()),
        }
    }
}

/// Attribute payload.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Character attribute.
    Text(String),
    /// Numeric attribute with its external type.
    Numeric {
        /// Stored type.
        nc_type: NcType,
        /// Values widened to `f64`.
        values: Vec<f64>,
    },
}

impl AttrValue {
    /// Text attribute.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Single double attribute.
    #[must_use]
    pub fn double(value: f64) -> Self {
        Self::Numeric {
            nc_type: NcType::Double,
            values: vec![value],
        }
    }

    /// Single float attribute.
    #[must_use]
    pub fn float(value: f32) -> Self {
        Self::Numeric {
            nc_type: NcType::Float,
            values: vec![f64::from(value)],
        }
    }

    /// The text, for character attributes.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Numeric { .. } => None,
        }
    }

    /// First value, for numeric attributes.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Numeric { values, .. } => values.first().copied(),
            Self::Text(_) => None,
        }
    }

    /// All values, for numeric attributes.
    #[must_use]
    pub fn as_slice(&self) -> Option<&[f64]> {
        match self {
            Self::Numeric { values, .. } => Some(values),
            Self::Text(_) => None,
        }
    }
}

impl std::fmt::Display for AttrValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Numeric { values, .. } => {
                let parts: Vec<String> = values.iter().map(ToString::to_string).collect();
                f.write_str(&parts.join(", "))
            }
        }
    }
}

/// Named attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Attribute name.
    pub name: String,
    /// Payload.
    pub value: AttrValue,
}

/// A dimension; `unlimited` marks the record dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    /// Dimension name.
    pub name: String,
    /// Length (the record count for the unlimited dimension).
    pub len: usize,
    /// True for the record dimension.
    pub unlimited: bool,
}

/// Variable header entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Variable name.
    pub name: String,
    /// Indices into the file's dimension list.
    pub dim_ids: Vec<usize>,
    /// Variable attributes.
    pub attrs: Vec<Attribute>,
    /// External type.
    pub nc_type: NcType,
    /// Padded size in bytes (per record, for record variables).
    pub vsize: u64,
    /// File offset of the data (of the first record, for record variables).
    pub begin: u64,
}

impl Variable {
    /// Look up an attribute by name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.iter().find(|a| a.name == name).map(|a| &a.value)
    }
}

/// Parsed file header.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    /// Format variant.
    pub version: Version,
    /// Number of records along the unlimited dimension.
    pub numrecs: usize,
    /// Dimensions in definition order.
    pub dims: Vec<Dimension>,
    /// Global attributes.
    pub global_attrs: Vec<Attribute>,
    /// Variables in definition order.
    pub vars: Vec<Variable>,
}

impl Header {
    /// True when the variable's first dimension is the record dimension.
    #[must_use]
    pub fn is_record_var(&self, var: &Variable) -> bool {
        var.dim_ids
            .first()
            .and_then(|&id| self.dims.get(id))
            .is_some_and(|d| d.unlimited)
    }

    /// Bytes between consecutive records.
    ///
    /// A lone record variable is stored without inter-record padding.
    ///
    /// # Errors
    ///
    /// Returns an error if the size overflows.
    pub fn record_size(&self) -> Result<u64> {
        let record_vars: Vec<&Variable> = self.vars.iter().filter(|v| self.is_record_var(v)).collect();
        match record_vars.as_slice() {
            [] => Ok(0),
            [only] => {
                let len = self.record_len(only)?;
                len.checked_mul(only.nc_type.size())
                    .map(|n| n as u64)
                    .ok_or_else(|| too_large(&only.name))
            }
            many => many
                .iter()
                .try_fold(0u64, |acc, v| acc.checked_add(v.vsize))
                .ok_or_else(|| Error::NetCdfFormat("record size overflows".to_string())),
        }
    }

    /// Element count of one record of `var` (the full count for fixed variables).
    ///
    /// # Errors
    ///
    /// Returns an error if the count overflows.
    pub fn record_len(&self, var: &Variable) -> Result<usize> {
        let skip = usize::from(self.is_record_var(var));
        var.dim_ids
            .iter()
            .skip(skip)
            .map(|&id| self.dims.get(id).map_or(0, |d| d.len))
            .try_fold(1usize, usize::checked_mul)
            .ok_or_else(|| too_large(&var.name))
    }
}

fn too_large(name: &str) -> Error {
    Error::NetCdfFormat(format!("variable '{name}' is too large"))
}
