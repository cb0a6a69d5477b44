//! Skip-table engine driven by the pattern's anchor row.

use crate::finder::{check_at, matches_at, placement_range, select_non_overlapping, PatternFinder};
use crate::image::{PixelImage, Position};
use crate::pattern::BadCharacterPattern;
use crate::trace::{trace_event, trace_span};
use crate::util::ScreenMatchResult;

/// Horizontal bad-character scan over every screen row.
///
/// At each alignment only the screen pixel under the anchor column is read.
/// A hit triggers a full comparison and advances by one column; a miss
/// advances by [`BadCharacterPattern::mismatch_shift`].
#[derive(Clone, Copy, Debug, Default)]
pub struct BadCharacterFinder {
    check_line: Option<usize>,
}

impl BadCharacterFinder {
    /// Uses the automatically selected anchor row for every pattern.
    pub fn new() -> Self {
        Self { check_line: None }
    }

    /// Forces row `check_line` as the anchor row.
    pub fn with_check_line(check_line: usize) -> Self {
        Self {
            check_line: Some(check_line),
        }
    }

    fn prepare(&self, pattern: &PixelImage) -> ScreenMatchResult<BadCharacterPattern> {
        match self.check_line {
            Some(line) => BadCharacterPattern::with_row(pattern.clone(), line),
            None => BadCharacterPattern::new(pattern.clone()),
        }
    }

    /// Feeds row-major candidate placements to `visit` until it returns false.
    fn scan<V>(screen: &PixelImage, pattern: &BadCharacterPattern, mut visit: V)
    where
        V: FnMut(Position) -> bool,
    {
        let image = pattern.image();
        let Some((max_x, max_y)) = placement_range(screen, image) else {
            return;
        };
        let line = pattern.line_index();
        let anchor = pattern.anchor_column().zip(pattern.anchor_color());

        for y in 0..=max_y {
            let screen_row = screen.row_unchecked(y + line);
            let mut x = 0;
            while x <= max_x {
                let shift = match anchor {
                    Some((column, color)) => {
                        let seen = screen_row[x + column];
                        if seen == color {
                            None
                        } else {
                            Some(pattern.mismatch_shift(seen))
                        }
                    }
                    None => None,
                };
                match shift {
                    Some(shift) => x += shift,
                    None => {
                        if matches_at(screen, image, x, y) && !visit(Position::new(x, y)) {
                            return;
                        }
                        x += 1;
                    }
                }
            }
        }
    }
}

impl PatternFinder for BadCharacterFinder {
    fn name(&self) -> &str {
        "bad-character"
    }

    fn find(
        &self,
        screen: &PixelImage,
        pattern: &PixelImage,
    ) -> ScreenMatchResult<Option<Position>> {
        let prepared = self.prepare(pattern)?;
        let mut first = None;
        Self::scan(screen, &prepared, |pos| {
            first = Some(pos);
            false
        });
        Ok(first)
    }

    fn find_all(
        &self,
        screen: &PixelImage,
        pattern: &PixelImage,
    ) -> ScreenMatchResult<Vec<Position>> {
        let prepared = self.prepare(pattern)?;
        let _span = trace_span!(
            "bad_character_find_all",
            line = prepared.line_index(),
            transparent_offset = prepared.transparent_offset()
        )
        .entered();
        let mut candidates = Vec::new();
        Self::scan(screen, &prepared, |pos| {
            candidates.push(pos);
            true
        });
        let found = select_non_overlapping(
            candidates,
            screen.width(),
            pattern.width(),
            pattern.height(),
        );
        trace_event!("bad_character_matches", count = found.len());
        Ok(found)
    }

    fn at(
        &self,
        screen: &PixelImage,
        pattern: &PixelImage,
        position: Position,
    ) -> ScreenMatchResult<bool> {
        check_at(screen, pattern, position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::color::{rgb, BLACK, TRANSPARENT, WHITE};

    #[test]
    fn skips_do_not_jump_over_matches() {
        let r = rgb(0xFF, 0, 0);
        let g = rgb(0, 0xFF, 0);
        // Pattern R G R: a G under the anchor shifts by one, landing on the match.
        let screen = PixelImage::new(vec![BLACK, r, g, r, g, r, BLACK], 7, 1).unwrap();
        let pattern = PixelImage::new(vec![r, g, r], 3, 1).unwrap();
        let finder = BadCharacterFinder::new();
        assert_eq!(
            finder.find(&screen, &pattern).unwrap(),
            Some(Position::new(1, 0))
        );
        assert_eq!(
            finder.find_all(&screen, &pattern).unwrap(),
            vec![Position::new(1, 0)]
        );
    }

    #[test]
    fn forced_check_line_finds_the_same_matches() {
        let screen = PixelImage::from_fn(8, 4, |x, y| if (x + y) % 3 == 0 { WHITE } else { BLACK })
            .unwrap();
        let pattern = PixelImage::new(vec![WHITE, TRANSPARENT, BLACK, BLACK], 2, 2).unwrap();
        let auto = BadCharacterFinder::new().find_all(&screen, &pattern).unwrap();
        let forced = BadCharacterFinder::with_check_line(0)
            .find_all(&screen, &pattern)
            .unwrap();
        assert_eq!(auto, forced);
        assert!(!auto.is_empty());
    }
}
