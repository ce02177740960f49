//! The gallery: five NCL reference figures.
//!
//! Every recipe is a short linear function: load a field (or draw synthetic
//! data), transform it, build one [`Figure`]. Each recipe module exposes a
//! `figure` function over already loaded data and a `build` function that
//! loads its inputs according to a [`GalleryConfig`].
//!
//! ```no_run
//! use geocat_gallery::config::GalleryConfig;
//! use geocat_gallery::gallery;
//!
//! let config = GalleryConfig::default();
//! let path = gallery::find("xy_6")?.render(&config)?;
//! println!("wrote {}", path.display());
//! # Ok::<(), geocat_gallery::Error>(())
//! ```

pub mod box_2;
pub mod ce_3_1;
pub mod proj_2;
pub mod stream_1;
pub mod xy_6;

use std::path::PathBuf;

use log::info;

use crate::config::GalleryConfig;
use crate::error::{Error, Result};
use crate::figure::Figure;

/// A named figure recipe.
#[derive(Debug, Clone, Copy)]
pub struct Recipe {
    /// Short name, matching the NCL script.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Sample data file read from the data directory, if any.
    pub data_file: Option<&'static str>,
    build: fn(&GalleryConfig) -> Result<Figure>,
}

impl Recipe {
    /// Build the figure.
    ///
    /// # Errors
    ///
    /// Returns an error if input data is missing or malformed.
    pub fn build(&self, config: &GalleryConfig) -> Result<Figure> {
        let mut figure = (self.build)(config)?;
        figure.set_dpi(config.dpi);
        Ok(figure)
    }

    /// Build the figure and write it to the output directory.
    ///
    /// # Errors
    ///
    /// Returns an error if building or writing fails.
    pub fn render(&self, config: &GalleryConfig) -> Result<PathBuf> {
        let figure = self.build(config)?;
        std::fs::create_dir_all(&config.out_dir)?;
        let path = config.output_path(self.name);
        figure.save(&path)?;
        info!("{}: done", self.name);
        Ok(path)
    }
}

const RECIPES: &[Recipe] = &[
    Recipe {
        name: "box_2",
        description: "Tailored box plot with per-box colors",
        data_file: None,
        build: box_2::build,
    },
    Recipe {
        name: "ce_3_1",
        description: "Filled contours of potential temperature on a zoomed cylindrical map",
        data_file: Some(ce_3_1::DATA_FILE),
        build: ce_3_1::build,
    },
    Recipe {
        name: "proj_2",
        description: "Filled and line contours of surface temperature on a Mercator map",
        data_file: Some(proj_2::DATA_FILE),
        build: proj_2::build,
    },
    Recipe {
        name: "stream_1",
        description: "Black-and-white streamlines over a global map",
        data_file: Some(stream_1::DATA_FILE),
        build: stream_1::build,
    },
    Recipe {
        name: "xy_6",
        description: "XY plot of El Nino warm years with explicit tick labels",
        data_file: Some(xy_6::DATA_FILE),
        build: xy_6::build,
    },
];

/// All recipes, sorted by name.
#[must_use]
pub fn recipes() -> &'static [Recipe] {
    RECIPES
}

/// Look a recipe up by name.
///
/// # Errors
///
/// Returns [`Error::UnknownRecipe`] for an unknown name.
pub fn find(name: &str) -> Result<&'static Recipe> {
    RECIPES
        .iter()
        .find(|r| r.name == name)
        .ok_or_else(|| Error::UnknownRecipe(name.to_string()))
}
