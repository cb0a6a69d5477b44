//! Pattern bundled with its anchor row and skip rules.

use crate::image::{color, PixelImage};
use crate::pattern::row::{analyze_row, best_row, RowAnalysis};
use crate::util::{ScreenMatchError, ScreenMatchResult};
use std::collections::HashMap;

/// A pattern prepared for horizontal bad-character scanning.
///
/// The scan compares the screen pixel under the anchor column (the rightmost
/// opaque pixel of the anchor row) and, on a mismatch, skips ahead by the
/// distance to the nearest column that could still match that pixel.
#[derive(Clone, Debug)]
pub struct BadCharacterPattern {
    image: PixelImage,
    line: RowAnalysis,
    anchor: Option<usize>,
    wildcard_reach: usize,
}

impl BadCharacterPattern {
    /// Prepares `image` using the automatically selected anchor row.
    pub fn new(image: PixelImage) -> ScreenMatchResult<Self> {
        ensure_not_empty(&image)?;
        let line = best_row(&image)?;
        Ok(Self::from_line(image, line))
    }

    /// Prepares `image` using row `check_line` as the anchor row.
    pub fn with_row(image: PixelImage, check_line: usize) -> ScreenMatchResult<Self> {
        ensure_not_empty(&image)?;
        let line = analyze_row(&image, check_line)?;
        Ok(Self::from_line(image, line))
    }

    fn from_line(image: PixelImage, line: RowAnalysis) -> Self {
        let width = line.width();
        let anchor = (line.trailing_transparent() < width)
            .then(|| width - line.trailing_transparent() - 1);
        let wildcard_reach = match anchor {
            Some(anchor) => {
                let row = image.row_unchecked(line.row_index());
                row[..anchor]
                    .iter()
                    .rposition(|&px| color::is_transparent(px))
                    .map_or(anchor + 1, |x| anchor - x)
            }
            None => 1,
        };
        Self {
            image,
            line,
            anchor,
            wildcard_reach,
        }
    }

    pub fn image(&self) -> &PixelImage {
        &self.image
    }

    pub fn width(&self) -> usize {
        self.image.width()
    }

    pub fn height(&self) -> usize {
        self.image.height()
    }

    pub fn line(&self) -> &RowAnalysis {
        &self.line
    }

    /// Index of the anchor row.
    pub fn line_index(&self) -> usize {
        self.line.row_index()
    }

    /// Length of the transparent tail of the anchor row.
    pub fn transparent_offset(&self) -> usize {
        self.line.trailing_transparent()
    }

    pub fn contains_transparent(&self) -> bool {
        self.line.has_trailing_transparency()
    }

    pub fn color_shift(&self) -> &HashMap<u32, usize> {
        self.line.color_shift()
    }

    /// Column compared first at every alignment; `None` when the anchor row
    /// is fully transparent.
    pub fn anchor_column(&self) -> Option<usize> {
        self.anchor
    }

    /// Color of the anchor pixel.
    pub fn anchor_color(&self) -> Option<u32> {
        self.anchor
            .map(|x| self.image.row_unchecked(self.line.row_index())[x])
    }

    /// Distance to advance after the screen pixel under the anchor column
    /// turned out to be `screen_color` and differed from the anchor color.
    pub fn mismatch_shift(&self, screen_color: u32) -> usize {
        let Some(anchor) = self.anchor else {
            return 1;
        };
        let tail = self.line.trailing_transparent();
        let table = match self.line.color_shift().get(&screen_color) {
            Some(&distance) if distance > tail => distance - tail,
            // Rightmost occurrence sits in the transparent tail; earlier ones are unknown.
            Some(_) => 1,
            None => anchor + 1,
        };
        table.min(self.wildcard_reach)
    }
}

fn ensure_not_empty(image: &PixelImage) -> ScreenMatchResult<()> {
    if image.is_empty() {
        return Err(ScreenMatchError::InvalidArgument("pattern must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::color::{rgb, TRANSPARENT};

    const R: u32 = rgb(0xFF, 0, 0);
    const G: u32 = rgb(0, 0xFF, 0);
    const B: u32 = rgb(0, 0, 0xFF);
    const K: u32 = rgb(0, 0, 0);

    #[test]
    fn opaque_row_shifts_by_table_or_full_width() {
        let pattern =
            BadCharacterPattern::new(PixelImage::new(vec![R, G, B, R], 4, 1).unwrap()).unwrap();
        assert_eq!(pattern.anchor_column(), Some(3));
        assert_eq!(pattern.anchor_color(), Some(R));
        assert_eq!(pattern.mismatch_shift(G), 2);
        assert_eq!(pattern.mismatch_shift(B), 1);
        assert_eq!(pattern.mismatch_shift(K), 4);
    }

    #[test]
    fn transparent_tail_moves_the_anchor_left() {
        let image = PixelImage::new(vec![G, R, B, TRANSPARENT, TRANSPARENT], 5, 1).unwrap();
        let pattern = BadCharacterPattern::new(image).unwrap();
        assert_eq!(pattern.transparent_offset(), 2);
        assert!(pattern.contains_transparent());
        assert_eq!(pattern.anchor_column(), Some(2));
        assert_eq!(pattern.mismatch_shift(R), 1);
        assert_eq!(pattern.mismatch_shift(G), 2);
        assert_eq!(pattern.mismatch_shift(K), 3);
    }

    #[test]
    fn interior_wildcard_caps_the_shift() {
        let image = PixelImage::new(vec![G, TRANSPARENT, B, R], 4, 1).unwrap();
        let pattern = BadCharacterPattern::new(image).unwrap();
        assert_eq!(pattern.mismatch_shift(K), 2);
        assert_eq!(pattern.mismatch_shift(G), 2);
        assert_eq!(pattern.mismatch_shift(B), 1);
    }

    #[test]
    fn fully_transparent_anchor_row_scans_every_column() {
        let image = PixelImage::new(vec![TRANSPARENT, TRANSPARENT, R, G], 2, 2).unwrap();
        let pattern = BadCharacterPattern::with_row(image, 0).unwrap();
        assert_eq!(pattern.anchor_column(), None);
        assert_eq!(pattern.mismatch_shift(K), 1);
    }

    #[test]
    fn rejects_bad_rows_and_empty_patterns() {
        let image = PixelImage::new(vec![R, G], 2, 1).unwrap();
        assert_eq!(
            BadCharacterPattern::with_row(image, 1).err(),
            Some(ScreenMatchError::InvalidArgument("row index outside the pattern"))
        );
        let empty = PixelImage::new(Vec::new(), 0, 3).unwrap();
        assert!(BadCharacterPattern::new(empty).unwrap_err().is_invalid_argument());
    }
}
