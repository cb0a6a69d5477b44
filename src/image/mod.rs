//! Immutable ARGB images and the coordinates used to address them.
//!
//! `PixelImage` owns a row-major buffer of packed ARGB values behind an
//! `Arc`, so clones are cheap and images can be shared across threads. No
//! API mutates the buffer; sub-images copy into a fresh buffer.

use crate::util::{ScreenMatchError, ScreenMatchResult};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

pub mod color;
pub mod io;

/// Zero-based pixel coordinate with the origin at the top-left corner.
///
/// Positions order row-major: first by `y`, then by `x`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then_with(|| self.x.cmp(&other.x))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Rectangular region anchored at its top-left position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Section {
    pub start: Position,
    pub width: usize,
    pub height: usize,
}

impl Section {
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            start: Position::new(x, y),
            width,
            height,
        }
    }

    /// Returns true when `other` shares at least one pixel with this section.
    pub fn overlaps(&self, other: &Section) -> bool {
        let (ax, ay) = (self.start.x, self.start.y);
        let (bx, by) = (other.start.x, other.start.y);
        ax < bx + other.width
            && bx < ax + self.width
            && ay < by + other.height
            && by < ay + self.height
    }
}

/// Immutable image of packed ARGB pixels with value equality.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PixelImage {
    width: usize,
    height: usize,
    pixels: Arc<[u32]>,
}

impl PixelImage {
    /// Creates an image from a row-major ARGB buffer of `width * height` values.
    pub fn new(pixels: Vec<u32>, width: usize, height: usize) -> ScreenMatchResult<Self> {
        let expected = width
            .checked_mul(height)
            .ok_or(ScreenMatchError::InvalidArgument("image dimensions overflow"))?;
        if pixels.len() != expected {
            return Err(ScreenMatchError::BufferSizeMismatch {
                expected,
                got: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels: pixels.into(),
        })
    }

    /// Creates an image with every pixel set to `color`.
    pub fn filled(width: usize, height: usize, color: u32) -> ScreenMatchResult<Self> {
        let len = width
            .checked_mul(height)
            .ok_or(ScreenMatchError::InvalidArgument("image dimensions overflow"))?;
        Self::new(vec![color; len], width, height)
    }

    /// Creates an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> ScreenMatchResult<Self>
    where
        F: FnMut(usize, usize) -> u32,
    {
        let len = width
            .checked_mul(height)
            .ok_or(ScreenMatchError::InvalidArgument("image dimensions overflow"))?;
        let mut pixels = Vec::with_capacity(len);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self::new(pixels, width, height)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns true when the image has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns the backing buffer in row-major order.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Returns an owned copy of the backing buffer.
    pub fn to_argb_vec(&self) -> Vec<u32> {
        self.pixels.to_vec()
    }

    /// Returns the ARGB value at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> ScreenMatchResult<u32> {
        self.ensure_coordinates(x, y)?;
        Ok(self.pixels[y * self.width + x])
    }

    pub fn get_at(&self, position: Position) -> ScreenMatchResult<u32> {
        self.get(position.x, position.y)
    }

    pub fn alpha(&self, x: usize, y: usize) -> ScreenMatchResult<u8> {
        self.get(x, y).map(color::alpha)
    }

    pub fn red(&self, x: usize, y: usize) -> ScreenMatchResult<u8> {
        self.get(x, y).map(color::red)
    }

    pub fn green(&self, x: usize, y: usize) -> ScreenMatchResult<u8> {
        self.get(x, y).map(color::green)
    }

    pub fn blue(&self, x: usize, y: usize) -> ScreenMatchResult<u8> {
        self.get(x, y).map(color::blue)
    }

    /// Returns true when the pixel at `(x, y)` has alpha 0.
    pub fn is_transparent(&self, x: usize, y: usize) -> ScreenMatchResult<bool> {
        self.get(x, y).map(color::is_transparent)
    }

    /// Returns row `y` as a slice of length `width`.
    pub fn row(&self, y: usize) -> ScreenMatchResult<&[u32]> {
        if y >= self.height {
            return Err(ScreenMatchError::IndexOutOfBounds {
                index: y,
                len: self.height,
                context: "row",
            });
        }
        Ok(self.row_unchecked(y))
    }

    /// Returns column `x` top to bottom.
    pub fn column(&self, x: usize) -> ScreenMatchResult<Vec<u32>> {
        if x >= self.width {
            return Err(ScreenMatchError::IndexOutOfBounds {
                index: x,
                len: self.width,
                context: "column",
            });
        }
        Ok((0..self.height)
            .map(|y| self.pixels[y * self.width + x])
            .collect())
    }

    /// Copies `section` into a new image with an independent buffer.
    pub fn sub_image(&self, section: Section) -> ScreenMatchResult<PixelImage> {
        let Section {
            start,
            width,
            height,
        } = section;
        self.ensure_region(start.x, start.y, width, height)?;
        let mut pixels = Vec::with_capacity(width * height);
        for y in start.y..start.y + height {
            let row = self.row_unchecked(y);
            pixels.extend_from_slice(&row[start.x..start.x + width]);
        }
        PixelImage::new(pixels, width, height)
    }

    /// Returns `(width / 2, height / 2)`.
    pub fn center(&self) -> Position {
        Position::new(self.width / 2, self.height / 2)
    }

    /// Fails with `RegionOutOfBounds` unless a `width x height` rectangle at
    /// `(x, y)` lies entirely inside the image.
    pub fn ensure_region(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> ScreenMatchResult<()> {
        let fits_x = x.checked_add(width).is_some_and(|end| end <= self.width);
        let fits_y = y.checked_add(height).is_some_and(|end| end <= self.height);
        if fits_x && fits_y {
            Ok(())
        } else {
            Err(ScreenMatchError::RegionOutOfBounds {
                x,
                y,
                width,
                height,
                img_width: self.width,
                img_height: self.height,
            })
        }
    }

    pub(crate) fn row_unchecked(&self, y: usize) -> &[u32] {
        let start = y * self.width;
        &self.pixels[start..start + self.width]
    }

    fn ensure_coordinates(&self, x: usize, y: usize) -> ScreenMatchResult<()> {
        if x >= self.width || y >= self.height {
            return Err(ScreenMatchError::PixelOutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

impl fmt::Debug for PixelImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}
