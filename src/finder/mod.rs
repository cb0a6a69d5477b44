//! Pattern search engines.
//!
//! Every engine implements [`PatternFinder`] with the same observable
//! contract, so engines can be swapped or cross-validated freely:
//!
//! - `find` returns the topmost, then leftmost, match;
//! - `find_all` walks placements row-major and keeps a match only if it does
//!   not overlap a match kept earlier;
//! - fully transparent pattern pixels match any screen pixel;
//! - a pattern larger than the screen simply has no matches.

use crate::image::{color, PixelImage, Position};
use crate::util::{ScreenMatchError, ScreenMatchResult};
use std::collections::HashMap;

pub mod bad_character;
pub mod naive;
pub mod rayon;

pub use bad_character::BadCharacterFinder;
pub use naive::NaiveFinder;
pub use self::rayon::ParallelFinder;

/// Match lists keyed by pattern. Every requested pattern has an entry.
pub type PatternMatches = HashMap<PixelImage, Vec<Position>>;

/// Locates patterns inside a screen image.
pub trait PatternFinder: Send + Sync {
    /// Identity used in benchmark reports and diagnostics.
    fn name(&self) -> &str;

    /// Returns the first match in row-major order.
    fn find(&self, screen: &PixelImage, pattern: &PixelImage)
        -> ScreenMatchResult<Option<Position>>;

    /// Returns all non-overlapping matches in row-major order.
    fn find_all(&self, screen: &PixelImage, pattern: &PixelImage)
        -> ScreenMatchResult<Vec<Position>>;

    /// Runs `find_all` for every pattern.
    fn find_all_batch(
        &self,
        screen: &PixelImage,
        patterns: &[PixelImage],
    ) -> ScreenMatchResult<PatternMatches> {
        let mut out = PatternMatches::with_capacity(patterns.len());
        for pattern in patterns {
            if !out.contains_key(pattern) {
                let positions = self.find_all(screen, pattern)?;
                out.insert(pattern.clone(), positions);
            }
        }
        Ok(out)
    }

    /// Checks whether `pattern` matches with its top-left corner at `position`.
    fn at(
        &self,
        screen: &PixelImage,
        pattern: &PixelImage,
        position: Position,
    ) -> ScreenMatchResult<bool>;

    fn at_xy(
        &self,
        screen: &PixelImage,
        pattern: &PixelImage,
        x: usize,
        y: usize,
    ) -> ScreenMatchResult<bool> {
        self.at(screen, pattern, Position::new(x, y))
    }
}

impl<F: PatternFinder + ?Sized> PatternFinder for Box<F> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn find(
        &self,
        screen: &PixelImage,
        pattern: &PixelImage,
    ) -> ScreenMatchResult<Option<Position>> {
        (**self).find(screen, pattern)
    }

    fn find_all(
        &self,
        screen: &PixelImage,
        pattern: &PixelImage,
    ) -> ScreenMatchResult<Vec<Position>> {
        (**self).find_all(screen, pattern)
    }

    fn find_all_batch(
        &self,
        screen: &PixelImage,
        patterns: &[PixelImage],
    ) -> ScreenMatchResult<PatternMatches> {
        (**self).find_all_batch(screen, patterns)
    }

    fn at(
        &self,
        screen: &PixelImage,
        pattern: &PixelImage,
        position: Position,
    ) -> ScreenMatchResult<bool> {
        (**self).at(screen, pattern, position)
    }

    fn at_xy(
        &self,
        screen: &PixelImage,
        pattern: &PixelImage,
        x: usize,
        y: usize,
    ) -> ScreenMatchResult<bool> {
        (**self).at_xy(screen, pattern, x, y)
    }
}

pub(crate) fn ensure_pattern(pattern: &PixelImage) -> ScreenMatchResult<()> {
    if pattern.is_empty() {
        return Err(ScreenMatchError::InvalidArgument("pattern must not be empty"));
    }
    Ok(())
}

/// Largest valid top-left placement, or `None` when the pattern does not fit.
pub(crate) fn placement_range(screen: &PixelImage, pattern: &PixelImage) -> Option<(usize, usize)> {
    let max_x = screen.width().checked_sub(pattern.width())?;
    let max_y = screen.height().checked_sub(pattern.height())?;
    Some((max_x, max_y))
}

/// Compares the pattern against the screen at `(x, y)`; the placement must fit.
pub(crate) fn matches_at(screen: &PixelImage, pattern: &PixelImage, x: usize, y: usize) -> bool {
    let width = pattern.width();
    (0..pattern.height()).all(|ty| {
        let screen_row = &screen.row_unchecked(y + ty)[x..x + width];
        pattern
            .row_unchecked(ty)
            .iter()
            .zip(screen_row)
            .all(|(&p, &s)| p == s || color::is_transparent(p))
    })
}

/// Bounds-checked single placement test shared by the engines.
pub(crate) fn check_at(
    screen: &PixelImage,
    pattern: &PixelImage,
    position: Position,
) -> ScreenMatchResult<bool> {
    ensure_pattern(pattern)?;
    screen.ensure_region(position.x, position.y, pattern.width(), pattern.height())?;
    Ok(matches_at(screen, pattern, position.x, position.y))
}

/// Keeps row-major candidates whose rectangles do not overlap an earlier kept one.
///
/// Candidates must arrive in row-major order and fit inside a screen of
/// `screen_width` columns. Each column remembers the first row not covered
/// by a kept rectangle, so a candidate costs `O(width)`.
pub(crate) fn select_non_overlapping(
    candidates: impl IntoIterator<Item = Position>,
    screen_width: usize,
    width: usize,
    height: usize,
) -> Vec<Position> {
    let mut blocked_until = vec![0usize; screen_width];
    let mut kept = Vec::new();
    for candidate in candidates {
        let Some(columns) = blocked_until.get_mut(candidate.x..candidate.x + width) else {
            continue;
        };
        if columns.iter().all(|&free_from| free_from <= candidate.y) {
            columns.fill(candidate.y + height);
            kept.push(candidate);
        }
    }
    kept
}
