//! Figures: page size, layout and file output.
//!
//! A [`Figure`] holds one [`Axes`] and an optional [`Colorbar`]. Layout is
//! "tight": the axes frame shrinks until tick labels, axis labels and titles
//! fit inside the page, then map axes are fitted to their projection's
//! aspect ratio and the colorbar is placed to the right of the frame.

use std::path::Path;

use log::{debug, info, warn};

use crate::axes::{pt_to_px, Axes};
use crate::color::Rgba;
use crate::colorbar::Colorbar;
use crate::error::{Error, Result};
use crate::framebuffer::Framebuffer;
use crate::geometry::Rect;
use crate::output::{OutputFormat, PngEncoder};
use crate::render::Scene;

/// Default resolution in dots per inch.
pub const DEFAULT_DPI: f32 = 100.0;

/// Page border kept free by the tight layout, in points.
const BORDER_PT: f32 = 10.8;

/// Layout passes; margins depend on the frame height through the titles.
const LAYOUT_PASSES: usize = 3;

/// Resolved pixel rectangles of a figure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    /// Axes data area.
    pub axes: Rect,
    /// Colorbar bar, if any.
    pub colorbar: Option<Rect>,
}

/// A single-axes figure.
#[derive(Debug, Clone)]
pub struct Figure {
    width_in: f32,
    height_in: f32,
    dpi: f32,
    facecolor: Rgba,
    axes: Axes,
    colorbar: Option<Colorbar>,
}

impl Figure {
    /// A figure of `width` x `height` inches at 100 dpi with empty axes.
    #[must_use]
    pub fn new(width_in: f32, height_in: f32) -> Self {
        Self {
            width_in,
            height_in,
            dpi: DEFAULT_DPI,
            facecolor: Rgba::WHITE,
            axes: Axes::new(),
            colorbar: None,
        }
    }

    /// Set the resolution.
    #[must_use]
    pub fn dpi(mut self, dpi: f32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Use these axes.
    #[must_use]
    pub fn with_axes(mut self, axes: Axes) -> Self {
        self.axes = axes;
        self
    }

    /// Add a colorbar right of the axes.
    #[must_use]
    pub fn with_colorbar(mut self, colorbar: Colorbar) -> Self {
        self.colorbar = Some(colorbar);
        self
    }

    /// Change the resolution in place.
    pub fn set_dpi(&mut self, dpi: f32) {
        self.dpi = dpi;
    }

    /// Current resolution.
    #[must_use]
    pub const fn resolution(&self) -> f32 {
        self.dpi
    }

    /// Size in inches.
    #[must_use]
    pub const fn size_inches(&self) -> (f32, f32) {
        (self.width_in, self.height_in)
    }

    /// Size in pixels.
    #[must_use]
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width_in * self.dpi).round() as u32,
            (self.height_in * self.dpi).round() as u32,
        )
    }

    /// The axes.
    #[must_use]
    pub const fn axes(&self) -> &Axes {
        &self.axes
    }

    /// The axes, mutably.
    pub fn axes_mut(&mut self) -> &mut Axes {
        &mut self.axes
    }

    /// The colorbar, if any.
    #[must_use]
    pub const fn colorbar(&self) -> Option<&Colorbar> {
        self.colorbar.as_ref()
    }

    /// Compute the tight layout.
    ///
    /// # Errors
    ///
    /// Returns an error if the page is too small for the decorations.
    pub fn layout(&self) -> Result<Layout> {
        let (w, h) = self.pixel_size();
        if w == 0 || h == 0 {
            return Err(Error::InvalidDimensions { width: w, height: h });
        }
        let border = pt_to_px(BORDER_PT, self.dpi);
        let page = Rect::new(0.0, 0.0, w as f32, h as f32).inset(border, border, border, border);

        let reserve = self.colorbar.as_ref().map_or(0.0, |c| {
            (c.reserved_fraction() * page.width).max(c.decoration_width(self.dpi) + c.pad_px(page.width))
        });

        let mut frame = page.inset(0.0, 0.0, reserve, 0.0);
        for _ in 0..LAYOUT_PASSES {
            let m = self.axes.margins(frame, self.dpi);
            frame = page.inset(m.left, m.top, m.right + reserve, m.bottom);
        }
        if let Some(aspect) = self.axes.aspect() {
            frame = frame.fit_aspect(aspect);
        }
        if frame.width < 1.0 || frame.height < 1.0 {
            return Err(Error::InvalidDimensions { width: w, height: h });
        }

        let colorbar = self.colorbar.as_ref().map(|c| c.frame(frame, c.pad_px(page.width)));
        debug!("layout {w}x{h}: axes {frame:?}, colorbar {colorbar:?}");
        Ok(Layout { axes: frame, colorbar })
    }

    /// Lay the figure out into a display list.
    ///
    /// # Errors
    ///
    /// Returns an error if layout fails or limits are degenerate.
    pub fn to_scene(&self) -> Result<Scene> {
        let layout = self.layout()?;
        let (w, h) = self.pixel_size();
        let mut scene = Scene::new(w, h, self.facecolor);
        self.axes.draw(&mut scene, layout.axes, self.dpi)?;
        if let (Some(colorbar), Some(frame)) = (&self.colorbar, layout.colorbar) {
            colorbar.draw(&mut scene, frame, self.dpi)?;
        }
        Ok(scene)
    }

    /// Rasterize the figure.
    ///
    /// # Errors
    ///
    /// Returns an error if the scene cannot be built.
    pub fn to_framebuffer(&self) -> Result<Framebuffer> {
        self.to_scene()?.to_framebuffer()
    }

    /// Render the figure as an SVG document.
    ///
    /// # Errors
    ///
    /// Returns an error if the scene cannot be built.
    pub fn to_svg(&self) -> Result<String> {
        Ok(self.to_scene()?.to_svg().render())
    }

    /// Write the figure, choosing PNG or SVG from the file extension.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown extensions, rendering failures or I/O
    /// errors.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<OutputFormat> {
        let path = path.as_ref();
        let format = OutputFormat::from_path(path)?;
        let scene = self.to_scene()?;
        match format {
            OutputFormat::Png => {
                let fb = scene.to_framebuffer()?;
                let ink = fb.ink_stats(self.facecolor);
                debug!(
                    "raster ink coverage {:.3}, mean luminance {:.1}",
                    ink.coverage, ink.mean_luminance
                );
                if ink.coverage == 0.0 {
                    warn!("{} has nothing drawn on it", path.display());
                }
                PngEncoder::write_to_file_with_dpi(&fb, path, self.dpi)?;
            }
            OutputFormat::Svg => scene.to_svg().write_to_file(path)?,
        }
        info!(
            "wrote {}x{} {format} ({} marks) to {}",
            scene.width(),
            scene.height(),
            scene.marks().len(),
            path.display()
        );
        Ok(format)
    }
}

impl batuta_common::display::WithDimensions for Figure {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.width_in = width as f32 / self.dpi;
        self.height_in = height as f32 / self.dpi;
    }
}
