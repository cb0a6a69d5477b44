//! Scalar reference engine: tests every placement.

use crate::finder::{
    check_at, ensure_pattern, matches_at, placement_range, select_non_overlapping, PatternFinder,
};
use crate::image::{PixelImage, Position};
use crate::trace::{trace_event, trace_span};
use crate::util::ScreenMatchResult;

/// Exhaustive row-major scan. Slow, simple, and the baseline the faster
/// engines are validated against.
#[derive(Clone, Copy, Debug, Default)]
pub struct NaiveFinder;

impl NaiveFinder {
    pub fn new() -> Self {
        Self
    }

    fn candidates<'a>(
        screen: &'a PixelImage,
        pattern: &'a PixelImage,
    ) -> impl Iterator<Item = Position> + 'a {
        placement_range(screen, pattern)
            .into_iter()
            .flat_map(|(max_x, max_y)| {
                (0..=max_y).flat_map(move |y| (0..=max_x).map(move |x| Position::new(x, y)))
            })
            .filter(move |pos| matches_at(screen, pattern, pos.x, pos.y))
    }
}

impl PatternFinder for NaiveFinder {
    fn name(&self) -> &str {
        "naive"
    }

    fn find(
        &self,
        screen: &PixelImage,
        pattern: &PixelImage,
    ) -> ScreenMatchResult<Option<Position>> {
        ensure_pattern(pattern)?;
        Ok(Self::candidates(screen, pattern).next())
    }

    fn find_all(
        &self,
        screen: &PixelImage,
        pattern: &PixelImage,
    ) -> ScreenMatchResult<Vec<Position>> {
        ensure_pattern(pattern)?;
        let _span = trace_span!(
            "naive_find_all",
            width = pattern.width(),
            height = pattern.height()
        )
        .entered();
        let found = select_non_overlapping(
            Self::candidates(screen, pattern),
            screen.width(),
            pattern.width(),
            pattern.height(),
        );
        trace_event!("naive_matches", count = found.len());
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
