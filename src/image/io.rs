//! Conversions to and from the `image` crate and PNG file helpers.

use crate::image::{color, PixelImage};
use crate::util::{ScreenMatchError, ScreenMatchResult};
use image::{ImageFormat, RgbaImage};
use std::path::Path;

/// Writes an image somewhere a human can inspect it later.
///
/// Used to persist the screen that made cross-validated finders disagree.
pub trait ImageExporter: Send + Sync {
    fn export(&self, image: &PixelImage, path: &Path) -> ScreenMatchResult<()>;
}

/// Exports images as PNG files.
#[derive(Clone, Copy, Debug, Default)]
pub struct PngExporter;

impl ImageExporter for PngExporter {
    fn export(&self, image: &PixelImage, path: &Path) -> ScreenMatchResult<()> {
        save_png(image, path)
    }
}

/// Converts an RGBA image buffer into a `PixelImage`.
pub fn pixel_image_from_rgba(img: &RgbaImage) -> ScreenMatchResult<PixelImage> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    let pixels = img
        .pixels()
        .map(|px| {
            let [r, g, b, a] = px.0;
            color::argb(a, r, g, b)
        })
        .collect();
    PixelImage::new(pixels, width, height)
}

/// Converts a `PixelImage` into an RGBA image buffer.
pub fn rgba_from_pixel_image(image: &PixelImage) -> ScreenMatchResult<RgbaImage> {
    let width = u32::try_from(image.width())
        .map_err(|_| ScreenMatchError::InvalidArgument("image width exceeds u32"))?;
    let height = u32::try_from(image.height())
        .map_err(|_| ScreenMatchError::InvalidArgument("image height exceeds u32"))?;
    let mut raw = Vec::with_capacity(image.pixels().len() * 4);
    for &px in image.pixels() {
        raw.extend_from_slice(&[
            color::red(px),
            color::green(px),
            color::blue(px),
            color::alpha(px),
        ]);
    }
    RgbaImage::from_raw(width, height, raw).ok_or(ScreenMatchError::BufferSizeMismatch {
        expected: image.width() * image.height() * 4,
        got: image.pixels().len() * 4,
    })
}

/// Loads an image from disk, keeping its alpha channel.
pub fn load_pixel_image<P: AsRef<Path>>(path: P) -> ScreenMatchResult<PixelImage> {
    let img = image::open(path).map_err(|err| ScreenMatchError::ImageIo {
        reason: err.to_string(),
    })?;
    pixel_image_from_rgba(&img.to_rgba8())
}

/// Saves an image as PNG regardless of the path's extension.
pub fn save_png<P: AsRef<Path>>(image: &PixelImage, path: P) -> ScreenMatchResult<()> {
    let rgba = rgba_from_pixel_image(image)?;
    rgba.save_with_format(path, ImageFormat::Png)
        .map_err(|err| ScreenMatchError::ImageIo {
            reason: err.to_string(),
        })
}
