//! Rayon-parallel exhaustive engine.
//!
//! Screen rows are scanned in parallel, each thread testing every placement
//! of its rows; per-row results are merged back in row order so the output
//! is identical to the sequential engines.

use crate::finder::{
    check_at, ensure_pattern, matches_at, placement_range, select_non_overlapping,
    PatternFinder, PatternMatches,
};
use crate::image::{PixelImage, Position};
use crate::trace::{trace_event, trace_span};
use crate::util::ScreenMatchResult;
use rayon::prelude::*;

/// Row-parallel scan on the global rayon pool.
#[derive(Clone, Copy, Debug, Default)]
pub struct ParallelFinder;

impl ParallelFinder {
    pub fn new() -> Self {
        Self
    }
}

impl PatternFinder for ParallelFinder {
    fn name(&self) -> &str {
        "parallel"
    }

    fn find(
        &self,
        screen: &PixelImage,
        pattern: &PixelImage,
    ) -> ScreenMatchResult<Option<Position>> {
        ensure_pattern(pattern)?;
        let Some((max_x, max_y)) = placement_range(screen, pattern) else {
            return Ok(None);
        };
        Ok((0..=max_y).into_par_iter().find_map_first(|y| {
            (0..=max_x)
                .find(|&x| matches_at(screen, pattern, x, y))
                .map(|x| Position::new(x, y))
        }))
    }

    fn find_all(
        &self,
        screen: &PixelImage,
        pattern: &PixelImage,
    ) -> ScreenMatchResult<Vec<Position>> {
        ensure_pattern(pattern)?;
        let Some((max_x, max_y)) = placement_range(screen, pattern) else {
            return Ok(Vec::new());
        };
        let _span = trace_span!("parallel_find_all", rows = max_y + 1).entered();

        let row_results: Vec<Vec<Position>> = (0..=max_y)
            .into_par_iter()
            .map(|y| {
                (0..=max_x)
                    .filter(|&x| matches_at(screen, pattern, x, y))
                    .map(|x| Position::new(x, y))
                    .collect()
            })
            .collect();

        let found = select_non_overlapping(
            row_results.into_iter().flatten(),
            screen.width(),
            pattern.width(),
            pattern.height(),
        );
        trace_event!("parallel_matches", count = found.len());
        Ok(found)
    }

    fn find_all_batch(
        &self,
        screen: &PixelImage,
        patterns: &[PixelImage],
    ) -> ScreenMatchResult<PatternMatches> {
        patterns
            .par_iter()
            .map(|pattern| {
                self.find_all(screen, pattern)
                    .map(|positions| (pattern.clone(), positions))
            })
            .collect()
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
