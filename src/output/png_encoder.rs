//! PNG output encoder.
//!
//! Pure Rust PNG encoding using the `png` crate. Figures are written as
//! 8-bit RGBA, optionally with the figure DPI recorded in the `pHYs` chunk.

use crate::error::Result;
use crate::framebuffer::Framebuffer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const METERS_PER_INCH: f32 = 0.0254;

/// PNG encoder for framebuffer output.
pub struct PngEncoder;

impl PngEncoder {
    /// Write a framebuffer to a PNG file.
    ///
    /// # Errors
    ///
    /// Returns an error if file creation or PNG encoding fails.
    pub fn write_to_file<P: AsRef<Path>>(fb: &Framebuffer, path: P) -> Result<()> {
        let file = File::create(path)?;
        Self::encode(fb, BufWriter::new(file), None)
    }

    /// Write a framebuffer to a PNG file, recording the resolution.
    ///
    /// # Errors
    ///
    /// Returns an error if file creation or PNG encoding fails.
    pub fn write_to_file_with_dpi<P: AsRef<Path>>(fb: &Framebuffer, path: P, dpi: f32) -> Result<()> {
        let file = File::create(path)?;
        Self::encode(fb, BufWriter::new(file), Some(dpi))
    }

    /// Encode a framebuffer to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if PNG encoding fails.
    pub fn to_bytes(fb: &Framebuffer) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        Self::encode(fb, &mut buffer, None)?;
        Ok(buffer)
    }

    fn encode<W: Write>(fb: &Framebuffer, writer: W, dpi: Option<f32>) -> Result<()> {
        let mut encoder = png::Encoder::new(writer, fb.width(), fb.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        if let Some(dpi) = dpi.filter(|d| *d > 0.0) {
            let ppm = (dpi / METERS_PER_INCH).round() as u32;
            encoder.set_pixel_dims(Some(png::PixelDimensions {
                xppu: ppm,
                yppu: ppm,
                unit: png::Unit::Meter,
            }));
        }

        let mut writer = encoder.write_header()?;
        // Use compact pixels to handle stride padding
        writer.write_image_data(&fb.to_compact_pixels())?;
        Ok(())
    }
}
