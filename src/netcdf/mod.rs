//! NetCDF classic file format.
//!
//! Reads the classic family (CDF-1, CDF-2 64-bit offset, CDF-5 64-bit data)
//! and writes CDF-1. All multi-byte values are big-endian; names and
//! attribute values are padded to four bytes. Record variables share the
//! unlimited dimension and are interleaved record by record.
//!
//! NetCDF-4 files are HDF5 containers and are rejected.
//!
//! # Example
//!
//! ```
//! use geocat_gallery::netcdf::{NcFile, NcType, NcWriter};
//!
//! let bytes = NcWriter::new()
//!     .dimension("lon", 4)
//!     .variable("lon", &["lon"], NcType::Float, vec![0.0, 90.0, 180.0, 270.0])
//!     .unwrap()
//!     .to_bytes()
//!     .unwrap();
//!
//! let file = NcFile::from_bytes(bytes).unwrap();
//! let lon = file.variable("lon").unwrap();
//! assert_eq!(file.read_values(lon).unwrap(), vec![0.0, 90.0, 180.0, 270.0]);
//! ```

mod reader;
mod types;
mod writer;

pub use reader::NcFile;
pub use types::{AttrValue, Attribute, Dimension, Header, NcType, Variable, Version};
pub use writer::NcWriter;
