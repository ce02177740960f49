//! Gallery configuration.
//!
//! Supports YAML configuration with precedence: CLI > ENV > file > defaults.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::output::OutputFormat;

/// Environment variable overriding the data directory.
pub const ENV_DATA_DIR: &str = "GEOCAT_GALLERY_DATA_DIR";
/// Environment variable overriding the output directory.
pub const ENV_OUT_DIR: &str = "GEOCAT_GALLERY_OUT_DIR";

/// Settings shared by every recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GalleryConfig {
    /// Directory holding the sample NetCDF files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory figures are written to.
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Output file format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Output resolution in dots per inch.
    #[serde(default = "default_dpi")]
    pub dpi: f32,

    /// Optional GeoJSON file with land polygons and coastlines.
    #[serde(default)]
    pub land: Option<PathBuf>,

    /// Seed for the synthetic box plot data.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_out_dir() -> PathBuf {
    PathBuf::from("figures")
}
fn default_dpi() -> f32 {
    100.0
}
fn default_seed() -> u64 {
    200
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            out_dir: default_out_dir(),
            format: OutputFormat::default(),
            dpi: default_dpi(),
            land: None,
            seed: default_seed(),
        }
    }
}

impl GalleryConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        debug!("loading config from {}", path.display());
        Self::parse(&content)
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error with line number if parsing fails.
    pub fn parse(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map_or(0, |l| l.line());
            Error::ConfigParse {
                line,
                message: e.to_string(),
            }
        })
    }

    /// Loads configuration with fallback to defaults.
    ///
    /// A missing file is expected; an unreadable or malformed one is logged
    /// before the defaults take over.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no config at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("ignoring config {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Platform config file location, e.g. `~/.config/geocat-gallery/config.yaml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("geocat-gallery").join("config.yaml"))
    }

    /// Applies `GEOCAT_GALLERY_*` environment overrides.
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_overrides(std::env::var_os(ENV_DATA_DIR), std::env::var_os(ENV_OUT_DIR))
    }

    fn with_overrides(mut self, data_dir: Option<std::ffi::OsString>, out_dir: Option<std::ffi::OsString>) -> Self {
        if let Some(dir) = data_dir.filter(|d| !d.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = out_dir.filter(|d| !d.is_empty()) {
            self.out_dir = PathBuf::from(dir);
        }
        self
    }

    /// Path of a sample file inside the data directory.
    #[must_use]
    pub fn data_file(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    /// Output path for a recipe.
    #[must_use]
    pub fn output_path(&self, recipe: &str) -> PathBuf {
        self.out_dir.join(format!("{recipe}.{}", self.format.extension()))
    }
}
