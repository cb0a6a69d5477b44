//! Cross-validating benchmark harness for pattern finders.
//!
//! `FinderCrossValidator` runs every wrapped engine on the same inputs,
//! refuses to return anything the engines disagree on, and accumulates the
//! time each engine spends. It is itself a [`PatternFinder`], so it can be
//! dropped into an observer or any other caller in place of a single engine.

use crate::finder::{PatternFinder, PatternMatches};
use crate::image::io::{ImageExporter, PngExporter};
use crate::image::{PixelImage, Position};
#[cfg(feature = "tracing")]
use crate::trace::trace_error;
use crate::trace::{trace_event, trace_span};
use crate::util::{ScreenMatchError, ScreenMatchResult};
use parking_lot::Mutex;
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

mod stopwatch;

pub use stopwatch::Stopwatch;

/// Configuration for [`FinderCrossValidator`].
#[derive(Clone, Debug)]
pub struct CrossValidatorConfig {
    /// Directory receiving the screen image of a failed comparison.
    pub export_dir: PathBuf,
}

impl Default for CrossValidatorConfig {
    fn default() -> Self {
        Self {
            export_dir: PathBuf::from("."),
        }
    }
}

/// A wrapped finder and the time it has spent so far.
pub struct BenchmarkUnit {
    finder: Box<dyn PatternFinder>,
    watch: Mutex<Stopwatch>,
}

impl BenchmarkUnit {
    pub fn name(&self) -> &str {
        self.finder.name()
    }

    pub fn elapsed(&self) -> Duration {
        self.watch.lock().duration()
    }
}

/// Runs several finders on identical inputs and requires identical results.
///
/// The validator is `Sync`, but its timers assume one call at a time: when
/// calls overlap (for example one validator shared by several async waits),
/// a finder's stopwatch is already running and the overlapping segment is
/// not counted twice, so reported times undercount. Serialize calls
/// externally when the timings matter.
pub struct FinderCrossValidator {
    units: Vec<BenchmarkUnit>,
    config: CrossValidatorConfig,
    exporter: Box<dyn ImageExporter>,
}

impl FinderCrossValidator {
    /// Wraps `finders`, kept in the given order.
    pub fn new(finders: Vec<Box<dyn PatternFinder>>) -> ScreenMatchResult<Self> {
        if finders.is_empty() {
            return Err(ScreenMatchError::InvalidArgument(
                "cross-validation needs at least one finder",
            ));
        }
        let units = finders
            .into_iter()
            .map(|finder| BenchmarkUnit {
                finder,
                watch: Mutex::new(Stopwatch::new()),
            })
            .collect();
        Ok(Self {
            units,
            config: CrossValidatorConfig::default(),
            exporter: Box::new(PngExporter),
        })
    }

    pub fn with_config(mut self, config: CrossValidatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_exporter<E: ImageExporter + 'static>(mut self, exporter: E) -> Self {
        self.exporter = Box::new(exporter);
        self
    }

    pub fn config(&self) -> &CrossValidatorConfig {
        &self.config
    }

    pub fn units(&self) -> &[BenchmarkUnit] {
        &self.units
    }

    /// Accumulated time per finder, in insertion order.
    pub fn durations(&self) -> Vec<(String, Duration)> {
        self.units
            .iter()
            .map(|unit| (unit.name().to_owned(), unit.elapsed()))
            .collect()
    }

    pub fn elapsed_nanos(&self) -> Vec<(String, u128)> {
        self.durations()
            .into_iter()
            .map(|(name, elapsed)| (name, elapsed.as_nanos()))
            .collect()
    }

    pub fn elapsed_millis(&self) -> Vec<(String, f64)> {
        self.durations()
            .into_iter()
            .map(|(name, elapsed)| (name, elapsed.as_secs_f64() * 1_000.0))
            .collect()
    }

    /// One `"<name> - <ms> ms"` line per finder, in insertion order.
    pub fn report(&self) -> String {
        self.elapsed_millis()
            .iter()
            .map(|(name, ms)| format!("{name} - {ms:.3} ms"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn run_on_each<U, F>(
        &self,
        operation: &'static str,
        screen: &PixelImage,
        call: F,
    ) -> ScreenMatchResult<U>
    where
        U: PartialEq + fmt::Debug,
        F: Fn(&dyn PatternFinder) -> ScreenMatchResult<U>,
    {
        let _span = trace_span!("cross_validate", operation = operation).entered();

        let mut results = Vec::with_capacity(self.units.len());
        for unit in &self.units {
            unit.watch.lock().start();
            let result = call(unit.finder.as_ref());
            unit.watch.lock().pause();
            results.push(result);
        }

        let mut results = results.into_iter();
        let first = results.next().ok_or(ScreenMatchError::InvalidArgument(
            "cross-validation needs at least one finder",
        ))?;
        for (offset, other) in results.enumerate() {
            if other != first {
                return Err(self.violation(operation, screen, offset + 1, &first, &other));
            }
        }
        trace_event!("cross_validated", finders = self.units.len());
        first
    }

    fn violation<U: fmt::Debug>(
        &self,
        operation: &'static str,
        screen: &PixelImage,
        index: usize,
        expected: &U,
        got: &U,
    ) -> ScreenMatchError {
        let message = format!(
            "results of {} and {} differ: {:?} vs {:?}",
            self.units[0].name(),
            self.units[index].name(),
            expected,
            got
        );
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|since| since.as_millis())
            .unwrap_or_default();
        let path = self
            .config
            .export_dir
            .join(format!("cross_validation_error_{millis}.png"));
        if let Err(err) = self.exporter.export(screen, &path) {
            return err;
        }

        #[cfg(feature = "tracing")]
        {
            let export = path.display().to_string();
            let backtrace = std::backtrace::Backtrace::force_capture().to_string();
            trace_error!(
                "consistency_violation",
                operation = operation,
                message = message.as_str(),
                export = export.as_str(),
                backtrace = backtrace.as_str()
            );
        }
        ScreenMatchError::ConsistencyViolation { operation, message }
    }
}

impl fmt::Display for FinderCrossValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.report())
    }
}

impl PatternFinder for FinderCrossValidator {
    fn name(&self) -> &str {
        "cross-validator"
    }

    fn find(
        &self,
        screen: &PixelImage,
        pattern: &PixelImage,
    ) -> ScreenMatchResult<Option<Position>> {
        self.run_on_each("find", screen, |finder| finder.find(screen, pattern))
    }

    fn find_all(
        &self,
        screen: &PixelImage,
        pattern: &PixelImage,
    ) -> ScreenMatchResult<Vec<Position>> {
        self.run_on_each("find_all", screen, |finder| finder.find_all(screen, pattern))
    }

    fn find_all_batch(
        &self,
        screen: &PixelImage,
        patterns: &[PixelImage],
    ) -> ScreenMatchResult<PatternMatches> {
        self.run_on_each("find_all_batch", screen, |finder| {
            finder.find_all_batch(screen, patterns)
        })
    }

    fn at(
        &self,
        screen: &PixelImage,
        pattern: &PixelImage,
        position: Position,
    ) -> ScreenMatchResult<bool> {
        self.run_on_each("at", screen, |finder| finder.at(screen, pattern, position))
    }

    fn at_xy(
        &self,
        screen: &PixelImage,
        pattern: &PixelImage,
        x: usize,
        y: usize,
    ) -> ScreenMatchResult<bool> {
        self.run_on_each("at", screen, |finder| finder.at_xy(screen, pattern, x, y))
    }
}
