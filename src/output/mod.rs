//! Output encoders (PNG, SVG).

mod png_encoder;
mod svg;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use png_encoder::PngEncoder;
pub use svg::{fmt_num, SvgElement, SvgEncoder, TextAnchor};

/// File format of a saved figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Raster PNG.
    #[default]
    Png,
    /// Vector SVG.
    Svg,
}

impl OutputFormat {
    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }

    /// Format implied by a path's extension (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error for a missing or unsupported extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::Rendering(format!("no file extension on {}", path.display())))?;
        ext.parse()
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            other => Err(Error::Rendering(format!("unsupported output format '{other}'"))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(OutputFormat::from_path(Path::new("a/b.PNG")).unwrap(), OutputFormat::Png);
        assert_eq!(OutputFormat::from_path(Path::new("fig.svg")).unwrap(), OutputFormat::Svg);
        assert!(OutputFormat::from_path(Path::new("fig.pdf")).is_err());
        assert!(OutputFormat::from_path(Path::new("fig")).is_err());
    }

    #[test]
    fn test_format_display_round_trips() {
        assert_eq!(OutputFormat::Svg.to_string().parse::<OutputFormat>().unwrap(), OutputFormat::Svg);
    }
}
