//! geocat-gallery - render the NCL reference figures.
//!
//! Run: `geocat-gallery render --all --data-dir ./data --out-dir ./figures`

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, LevelFilter};

use geocat_gallery::config::GalleryConfig;
use geocat_gallery::gallery::{self, Recipe};
use geocat_gallery::output::OutputFormat;

/// geocat-gallery: NCL gallery figures in pure Rust
#[derive(Parser, Debug)]
#[command(name = "geocat-gallery")]
#[command(version)]
#[command(about = "Reproduce NCL gallery figures as PNG or SVG", long_about = None)]
struct Cli {
    /// Config file path (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available recipes
    List,

    /// Render one or more recipes
    Render {
        /// Recipe names
        #[arg(required_unless_present = "all")]
        names: Vec<String>,

        /// Render every recipe
        #[arg(long, conflicts_with = "names")]
        all: bool,

        /// Directory holding the sample NetCDF files
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Directory figures are written to
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Output format (png or svg)
        #[arg(long)]
        format: Option<OutputFormat>,

        /// Output resolution in dots per inch
        #[arg(long)]
        dpi: Option<f32>,

        /// GeoJSON file with land polygons and coastlines
        #[arg(long)]
        land: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<GalleryConfig> {
    let config = match path {
        Some(path) => {
            GalleryConfig::load(path).with_context(|| format!("failed to load config {}", path.display()))?
        }
        None => GalleryConfig::default_path().map_or_else(GalleryConfig::default, GalleryConfig::load_or_default),
    };
    Ok(config.with_env())
}

fn list() {
    for recipe in gallery::recipes() {
        let input = recipe.data_file.unwrap_or("synthetic");
        println!("{:<10} {:<24} {}", recipe.name, input, recipe.description);
    }
}

fn render(recipes: &[&Recipe], config: &GalleryConfig) -> Result<()> {
    let mut failed = Vec::new();
    for recipe in recipes {
        match recipe.render(config) {
            Ok(path) => println!("{} -> {}", recipe.name, path.display()),
            Err(e) => {
                eprintln!("{}: {e}", recipe.name);
                failed.push(recipe.name);
            }
        }
    }
    if !failed.is_empty() {
        bail!("{} of {} recipes failed: {}", failed.len(), recipes.len(), failed.join(", "));
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::List => list(),
        Command::Render {
            names,
            all,
            data_dir,
            out_dir,
            format,
            dpi,
            land,
        } => {
            let mut config = load_config(cli.config.as_ref())?;
            if let Some(dir) = data_dir {
                config.data_dir = dir;
            }
            if let Some(dir) = out_dir {
                config.out_dir = dir;
            }
            if let Some(format) = format {
                config.format = format;
            }
            if let Some(dpi) = dpi {
                config.dpi = dpi;
            }
            if land.is_some() {
                config.land = land;
            }
            info!("data from {}, figures to {}", config.data_dir.display(), config.out_dir.display());

            let recipes: Vec<&Recipe> = if all {
                gallery::recipes().iter().collect()
            } else {
                names
                    .iter()
                    .map(|n| gallery::find(n))
                    .collect::<Result<_, _>>()
                    .context("see `geocat-gallery list` for recipe names")?
            };
            render(&recipes, &config)?;
        }
    }
    Ok(())
}
