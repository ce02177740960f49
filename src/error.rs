//! Error types for gallery operations.

use std::io;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading data or rendering figures.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error (file operations, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// PNG encoding error.
    #[error("PNG encoding error: {0}")]
    PngEncoding(#[from] png::EncodingError),

    /// Invalid dimensions for framebuffer or figure.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// Data length mismatch between paired arrays.
    #[error("Data length mismatch: x has {x_len} elements, y has {y_len} elements")]
    DataLengthMismatch {
        /// Length of x data.
        x_len: usize,
        /// Length of y data.
        y_len: usize,
    },

    /// Empty data provided where non-empty is required.
    #[error("Empty data provided")]
    EmptyData,

    /// Scale domain error (e.g., equal bounds).
    #[error("Scale domain error: {0}")]
    ScaleDomain(String),

    /// Color parsing error.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Rendering error.
    #[error("Rendering error: {0}")]
    Rendering(String),

    /// Malformed or unsupported NetCDF file.
    #[error("NetCDF format error: {0}")]
    NetCdfFormat(String),

    /// Variable not present in a dataset.
    #[error("Variable not found: {0}")]
    MissingVariable(String),

    /// Dimension not present on a variable.
    #[error("Dimension '{dim}' not found on '{var}'")]
    MissingDimension {
        /// Variable name.
        var: String,
        /// Requested dimension.
        dim: String,
    },

    /// Attribute not present on a variable.
    #[error("Attribute '{attr}' not found on '{var}'")]
    MissingAttribute {
        /// Variable name.
        var: String,
        /// Requested attribute.
        attr: String,
    },

    /// Index outside a dimension's extent.
    #[error("Index {index} out of range for dimension '{dim}' of length {len}")]
    IndexOutOfRange {
        /// Dimension name.
        dim: String,
        /// Requested index.
        index: usize,
        /// Dimension length.
        len: usize,
    },

    /// A coordinate label could not be located.
    #[error("Coordinate value {value} not found in '{dim}'")]
    CoordinateNotFound {
        /// Dimension name.
        dim: String,
        /// Requested value.
        value: f64,
    },

    /// A coordinate that must be evenly spaced is not.
    #[error("Coordinate '{0}' must be equally spaced")]
    UnevenCoordinate(String),

    /// Malformed date value.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Unknown gallery recipe name.
    #[error("Unknown recipe: {0}")]
    UnknownRecipe(String),

    /// Configuration could not be parsed.
    #[error("Config parse error at line {line}: {message}")]
    ConfigParse {
        /// Line number of the failure (0 when unknown).
        line: usize,
        /// Parser message.
        message: String,
    },

    /// GeoJSON feature file could not be parsed.
    #[error("GeoJSON error: {0}")]
    GeoJson(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidDimensions {
            width: 0,
            height: 100,
        };
        assert!(err.to_string().contains("Invalid dimensions"));
    }

    #[test]
    fn test_data_length_mismatch() {
        let err = Error::DataLengthMismatch {
            x_len: 10,
            y_len: 20,
        };
        assert!(err.to_string().contains("10"));
        assert!(err.to_string().contains("20"));
    }

    #[test]
    fn test_coordinate_not_found_mentions_value() {
        let err = Error::CoordinateNotFound {
            dim: "date".to_string(),
            value: 1951.0,
        };
        assert!(err.to_string().contains("1951"));
        assert!(err.to_string().contains("date"));
    }

    #[test]
    fn test_io_from() {
        let err: Error = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, Error::Io(_)));
    }
}
