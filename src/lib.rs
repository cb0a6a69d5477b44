//! screenmatch locates small reference images inside screen captures.
//!
//! Patterns are exact ARGB images in which fully transparent pixels act as
//! wildcards. Several search engines implement the same [`PatternFinder`]
//! contract; [`FinderCrossValidator`] runs them side by side, requires them to
//! agree, and times them. The [`observe`] module polls a live
//! [`ScreenSource`] until a pattern appears or disappears within a timeout.

pub mod bench;
pub mod finder;
pub mod image;
pub mod observe;
pub mod pattern;
mod trace;
pub mod util;

pub use bench::{CrossValidatorConfig, FinderCrossValidator, Stopwatch};
pub use finder::{BadCharacterFinder, NaiveFinder, ParallelFinder, PatternFinder, PatternMatches};
pub use crate::image::io::{ImageExporter, PngExporter};
pub use crate::image::{PixelImage, Position, Section};
pub use observe::{
    CancelFlag, Clock, ManualClock, Observer, ObserverConfig, ScreenObserver, ScreenSource,
    SystemClock, WaitHandle,
};
pub use pattern::{analyze_row, best_row, BadCharacterPattern, RowAnalysis};
pub use util::{ScreenMatchError, ScreenMatchResult};
