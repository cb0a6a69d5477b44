//! Screen-bound waits: capture, search, repeat.

use crate::finder::{PatternFinder, PatternMatches};
use crate::image::{PixelImage, Position};
use crate::observe::{poll, Observer, WaitHandle};
use crate::util::{ScreenMatchError, ScreenMatchResult};
use std::sync::Arc;
use std::time::Duration;

/// Produces a fresh snapshot of the live screen on demand.
pub trait ScreenSource: Send + Sync {
    fn capture(&self) -> ScreenMatchResult<PixelImage>;
}

impl<F> ScreenSource for F
where
    F: Fn() -> ScreenMatchResult<PixelImage> + Send + Sync,
{
    fn capture(&self) -> ScreenMatchResult<PixelImage> {
        self()
    }
}

/// Capture source plus finder; everything a single lookup needs.
#[derive(Clone)]
struct Probe {
    screen: Arc<dyn ScreenSource>,
    finder: Arc<dyn PatternFinder>,
}

impl Probe {
    fn position_of(&self, pattern: &PixelImage) -> ScreenMatchResult<Option<Position>> {
        let screen = self.screen.capture()?;
        self.finder.find(&screen, pattern)
    }

    fn first_position_of(&self, patterns: &[PixelImage]) -> ScreenMatchResult<Option<Position>> {
        let screen = self.screen.capture()?;
        for pattern in patterns {
            if let Some(position) = self.finder.find(&screen, pattern)? {
                return Ok(Some(position));
            }
        }
        Ok(None)
    }

    fn positions_of(&self, patterns: &[PixelImage]) -> ScreenMatchResult<PatternMatches> {
        let screen = self.screen.capture()?;
        self.finder.find_all_batch(&screen, patterns)
    }

    fn image_at(&self, pattern: &PixelImage, position: Position) -> ScreenMatchResult<bool> {
        let screen = self.screen.capture()?;
        self.finder.at(&screen, pattern, position)
    }
}

fn any_present(matches: &PatternMatches) -> bool {
    matches.values().any(|positions| !positions.is_empty())
}

fn ensure_patterns(patterns: &[PixelImage]) -> ScreenMatchResult<()> {
    if patterns.is_empty() {
        return Err(ScreenMatchError::InvalidArgument(
            "at least one pattern is required",
        ));
    }
    Ok(())
}

/// Waits for patterns to appear on or disappear from a live screen.
///
/// Every tick captures a new snapshot from the [`ScreenSource`] and searches
/// it with the configured [`PatternFinder`].
#[derive(Clone)]
pub struct ScreenObserver {
    observer: Observer,
    probe: Probe,
    refresh_interval: Duration,
}

impl ScreenObserver {
    pub fn new(
        observer: Observer,
        screen: Arc<dyn ScreenSource>,
        finder: Arc<dyn PatternFinder>,
    ) -> Self {
        let refresh_interval = observer.refresh_interval();
        Self {
            observer,
            probe: Probe { screen, finder },
            refresh_interval,
        }
    }

    /// Overrides the observer's default refresh interval for this instance.
    pub fn with_refresh_interval(mut self, refresh_interval: Duration) -> ScreenMatchResult<Self> {
        poll::ensure_interval(refresh_interval)?;
        self.refresh_interval = refresh_interval;
        Ok(self)
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }

    /// Captures once and returns the first match of `pattern`.
    pub fn position_of(&self, pattern: &PixelImage) -> ScreenMatchResult<Option<Position>> {
        self.probe.position_of(pattern)
    }

    /// Captures once and returns the first match of the first pattern found,
    /// trying patterns in order.
    pub fn first_position_of(
        &self,
        patterns: &[PixelImage],
    ) -> ScreenMatchResult<Option<Position>> {
        self.probe.first_position_of(patterns)
    }

    /// Captures once and returns all matches of every pattern.
    pub fn positions_of(&self, patterns: &[PixelImage]) -> ScreenMatchResult<PatternMatches> {
        self.probe.positions_of(patterns)
    }

    /// Captures once and checks `pattern` at `position`.
    pub fn image_at(&self, pattern: &PixelImage, position: Position) -> ScreenMatchResult<bool> {
        self.probe.image_at(pattern, position)
    }

    /// Waits until `pattern` appears and returns where.
    pub fn wait_until(
        &self,
        pattern: &PixelImage,
        timeout: Duration,
    ) -> ScreenMatchResult<Option<Position>> {
        self.observer.wait_until(
            || self.probe.position_of(pattern),
            timeout,
            self.refresh_interval,
        )
    }

    /// Waits until `pattern` is gone from where it was last seen.
    ///
    /// `None` means it disappeared (or was never there); a position means it
    /// was still showing when the timeout elapsed.
    pub fn wait_while(
        &self,
        pattern: &PixelImage,
        timeout: Duration,
    ) -> ScreenMatchResult<Option<Position>> {
        self.observer.wait_while(
            || self.probe.position_of(pattern),
            |position| self.probe.image_at(pattern, *position),
            timeout,
            self.refresh_interval,
        )
    }

    /// Waits until any of `patterns` appears; earlier patterns win ties.
    pub fn wait_until_one(
        &self,
        patterns: &[PixelImage],
        timeout: Duration,
    ) -> ScreenMatchResult<Option<Position>> {
        ensure_patterns(patterns)?;
        self.observer.wait_until(
            || self.probe.first_position_of(patterns),
            timeout,
            self.refresh_interval,
        )
    }

    /// Waits until none of `patterns` is visible and returns that final
    /// observation, in which every pattern maps to an empty list.
    pub fn wait_while_one(
        &self,
        patterns: &[PixelImage],
        timeout: Duration,
    ) -> ScreenMatchResult<Option<PatternMatches>> {
        ensure_patterns(patterns)?;
        self.observer.wait_while_one(
            || self.probe.positions_of(patterns),
            any_present,
            timeout,
            self.refresh_interval,
        )
    }

    pub fn wait_until_async(
        &self,
        pattern: PixelImage,
        timeout: Duration,
    ) -> ScreenMatchResult<WaitHandle<Position>> {
        let probe = self.probe.clone();
        let interval = self.refresh_interval;
        Ok(self.observer.spawn(move |clock, cancel| {
            poll::poll_until(
                clock,
                cancel,
                || probe.position_of(&pattern),
                timeout,
                interval,
            )
        }))
    }

    pub fn wait_while_async(
        &self,
        pattern: PixelImage,
        timeout: Duration,
    ) -> ScreenMatchResult<WaitHandle<Position>> {
        let probe = self.probe.clone();
        let interval = self.refresh_interval;
        Ok(self.observer.spawn(move |clock, cancel| {
            poll::poll_while(
                clock,
                cancel,
                || probe.position_of(&pattern),
                |position| probe.image_at(&pattern, *position),
                timeout,
                interval,
            )
        }))
    }

    /// Rejects an empty pattern list before anything is submitted.
    pub fn wait_until_one_async(
        &self,
        patterns: Vec<PixelImage>,
        timeout: Duration,
    ) -> ScreenMatchResult<WaitHandle<Position>> {
        ensure_patterns(&patterns)?;
        let probe = self.probe.clone();
        let interval = self.refresh_interval;
        Ok(self.observer.spawn(move |clock, cancel| {
            poll::poll_until(
                clock,
                cancel,
                || probe.first_position_of(&patterns),
                timeout,
                interval,
            )
        }))
    }

    pub fn wait_while_one_async(
        &self,
        patterns: Vec<PixelImage>,
        timeout: Duration,
    ) -> ScreenMatchResult<WaitHandle<PatternMatches>> {
        ensure_patterns(&patterns)?;
        let probe = self.probe.clone();
        let interval = self.refresh_interval;
        Ok(self.observer.spawn(move |clock, cancel| {
            poll::poll_while_one(
                clock,
                cancel,
                || probe.positions_of(&patterns),
                any_present,
                timeout,
                interval,
            )
        }))
    }
}
