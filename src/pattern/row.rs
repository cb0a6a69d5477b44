//! Per-row analysis used to pick the anchor row of a pattern.

use crate::image::{color, PixelImage};
use crate::util::{ScreenMatchError, ScreenMatchResult};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Bad-character statistics for one pattern row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowAnalysis {
    row_index: usize,
    width: usize,
    trailing_transparent: usize,
    distinct_opaque_colors: usize,
    color_shift: HashMap<u32, usize>,
}

impl RowAnalysis {
    /// Index of the analyzed row inside the pattern.
    pub fn row_index(&self) -> usize {
        self.row_index
    }

    /// Width of the analyzed row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of fully transparent pixels counted contiguously from the right edge.
    pub fn trailing_transparent(&self) -> usize {
        self.trailing_transparent
    }

    pub fn has_trailing_transparency(&self) -> bool {
        self.trailing_transparent != 0
    }

    pub fn distinct_opaque_colors(&self) -> usize {
        self.distinct_opaque_colors
    }

    /// Maps each color of the row to its distance from the right edge minus one.
    ///
    /// Holds the rightmost occurrence of every color except the color of the
    /// final column, which never has an entry.
    pub fn color_shift(&self) -> &HashMap<u32, usize> {
        &self.color_shift
    }

    /// Anchor-row ordering: opaque-ended rows first, then the longer
    /// transparent tail first. Two opaque-ended rows are equal.
    pub fn rank(&self, other: &RowAnalysis) -> Ordering {
        match (self.trailing_transparent, other.trailing_transparent) {
            (0, 0) => Ordering::Equal,
            (0, _) => Ordering::Less,
            (_, 0) => Ordering::Greater,
            (mine, theirs) => theirs.cmp(&mine),
        }
    }
}

/// Analyzes row `row_index` of `pattern`.
pub fn analyze_row(pattern: &PixelImage, row_index: usize) -> ScreenMatchResult<RowAnalysis> {
    if row_index >= pattern.height() {
        return Err(ScreenMatchError::InvalidArgument(
            "row index outside the pattern",
        ));
    }
    let row = pattern.row(row_index)?;
    let width = row.len();

    let trailing_transparent = row
        .iter()
        .rev()
        .take_while(|&&px| color::is_transparent(px))
        .count();

    let distinct_opaque_colors = row
        .iter()
        .copied()
        .filter(|&px| !color::is_transparent(px))
        .collect::<HashSet<_>>()
        .len();

    let mut color_shift = HashMap::new();
    for (x, &px) in row.iter().enumerate() {
        color_shift.insert(px, width - x - 1);
    }
    if let Some(last) = row.last() {
        color_shift.remove(last);
    }

    Ok(RowAnalysis {
        row_index,
        width,
        trailing_transparent,
        distinct_opaque_colors,
        color_shift,
    })
}

/// Analyzes every row and returns the best anchor row.
///
/// The first row wins among equally ranked rows.
pub fn best_row(pattern: &PixelImage) -> ScreenMatchResult<RowAnalysis> {
    if pattern.height() == 0 {
        return Err(ScreenMatchError::InvalidArgument("pattern has no rows"));
    }
    let mut best = analyze_row(pattern, 0)?;
    for y in 1..pattern.height() {
        let candidate = analyze_row(pattern, y)?;
        if candidate.rank(&best) == Ordering::Less {
            best = candidate;
        }
    }
    Ok(best)
}
