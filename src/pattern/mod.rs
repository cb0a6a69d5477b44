//! Pattern preprocessing for skip-table search.
//!
//! This is a Boyer-Moore-Horspool style bad-character heuristic adapted to
//! raster search: one row of the pattern (the anchor row) drives a horizontal
//! scan, and a color-to-shift table lets most misaligned placements be
//! rejected after a single pixel comparison. Fully transparent pattern
//! pixels are wildcards.

mod bad_character;
mod row;

pub use bad_character::BadCharacterPattern;
pub use row::{analyze_row, best_row, RowAnalysis};
