//! Time-bounded waiting on top of one-shot lookups.
//!
//! An [`Observer`] turns a lookup (usually a capture followed by a pattern
//! search) into "wait until present" and "wait while present" semantics.
//! Each wait is a self-contained session `POLLING -> {SATISFIED, TIMED_OUT}`
//! measured on the observer's [`Clock`]; running out of time is reported as
//! `Ok(None)`, not as an error. Every wait has an `_async` counterpart that
//! validates its arguments, runs on a dedicated worker pool and returns a
//! cancellable [`WaitHandle`].

use crate::util::{ScreenMatchError, ScreenMatchResult};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

mod clock;
mod handle;
mod poll;
mod screen;

pub use clock::{Clock, ManualClock, SystemClock};
pub use handle::{CancelFlag, WaitHandle};
pub use screen::{ScreenObserver, ScreenSource};

/// Refresh interval used when none is given explicitly.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(1_000);

/// Observer configuration.
#[derive(Clone, Debug)]
pub struct ObserverConfig {
    /// Default delay between two lookups; must be positive.
    pub refresh_interval: Duration,
    /// Worker threads running asynchronous waits. A blocked wait occupies a
    /// worker for its whole duration.
    pub worker_threads: usize,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            worker_threads: 4,
        }
    }
}

/// Polls lookups on a clock, synchronously or on a worker pool.
#[derive(Clone)]
pub struct Observer {
    clock: Arc<dyn Clock>,
    pool: Arc<ThreadPool>,
    refresh_interval: Duration,
}

impl Observer {
    pub fn new(clock: Arc<dyn Clock>) -> ScreenMatchResult<Self> {
        Self::with_config(clock, ObserverConfig::default())
    }

    pub fn with_config(clock: Arc<dyn Clock>, config: ObserverConfig) -> ScreenMatchResult<Self> {
        poll::ensure_interval(config.refresh_interval)?;
        if config.worker_threads == 0 {
            return Err(ScreenMatchError::InvalidArgument(
                "observer needs at least one worker thread",
            ));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.worker_threads)
            .thread_name(|idx| format!("screenmatch-wait-{idx}"))
            .build()
            .map_err(|err| ScreenMatchError::ThreadPool {
                reason: err.to_string(),
            })?;
        Ok(Self {
            clock,
            pool: Arc::new(pool),
            refresh_interval: config.refresh_interval,
        })
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Default refresh interval from the configuration.
    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Polls `lookup` every `refresh_interval` until it yields a value.
    ///
    /// Returns the first value found, or `None` once `timeout` has elapsed.
    /// A zero timeout checks exactly once.
    pub fn wait_until<T, F>(
        &self,
        lookup: F,
        timeout: Duration,
        refresh_interval: Duration,
    ) -> ScreenMatchResult<Option<T>>
    where
        F: FnMut() -> ScreenMatchResult<Option<T>>,
    {
        poll::poll_until(
            self.clock.as_ref(),
            &CancelFlag::new(),
            lookup,
            timeout,
            refresh_interval,
        )
    }

    /// Polls until `lookup` yields nothing or `still_present` rejects the last
    /// value found.
    ///
    /// Returns `None` once the value is gone and the last value seen if it is
    /// still there when `timeout` elapses.
    pub fn wait_while<T, F, P>(
        &self,
        lookup: F,
        still_present: P,
        timeout: Duration,
        refresh_interval: Duration,
    ) -> ScreenMatchResult<Option<T>>
    where
        F: FnMut() -> ScreenMatchResult<Option<T>>,
        P: FnMut(&T) -> ScreenMatchResult<bool>,
    {
        poll::poll_while(
            self.clock.as_ref(),
            &CancelFlag::new(),
            lookup,
            still_present,
            timeout,
            refresh_interval,
        )
    }

    /// Polls several lookups; the first one to yield a value wins, ties
    /// broken by slice order.
    pub fn wait_until_one<T, F>(
        &self,
        lookups: &mut [F],
        timeout: Duration,
        refresh_interval: Duration,
    ) -> ScreenMatchResult<Option<T>>
    where
        F: FnMut() -> ScreenMatchResult<Option<T>>,
    {
        poll::poll_until_one(
            self.clock.as_ref(),
            &CancelFlag::new(),
            lookups,
            timeout,
            refresh_interval,
        )
    }

    /// Polls snapshots until `any_present` is false, returning that snapshot.
    pub fn wait_while_one<S, F, P>(
        &self,
        lookup: F,
        any_present: P,
        timeout: Duration,
        refresh_interval: Duration,
    ) -> ScreenMatchResult<Option<S>>
    where
        F: FnMut() -> ScreenMatchResult<S>,
        P: FnMut(&S) -> bool,
    {
        poll::poll_while_one(
            self.clock.as_ref(),
            &CancelFlag::new(),
            lookup,
            any_present,
            timeout,
            refresh_interval,
        )
    }

    /// Runs [`Observer::wait_until`] on the worker pool.
    ///
    /// Arguments are validated before the wait is submitted.
    pub fn wait_until_async<T, F>(
        &self,
        mut lookup: F,
        timeout: Duration,
        refresh_interval: Duration,
    ) -> ScreenMatchResult<WaitHandle<T>>
    where
        T: Send + 'static,
        F: FnMut() -> ScreenMatchResult<Option<T>> + Send + 'static,
    {
        poll::ensure_interval(refresh_interval)?;
        Ok(self.spawn(move |clock, cancel| {
            poll::poll_until(clock, cancel, &mut lookup, timeout, refresh_interval)
        }))
    }

    pub fn wait_while_async<T, F, P>(
        &self,
        mut lookup: F,
        mut still_present: P,
        timeout: Duration,
        refresh_interval: Duration,
    ) -> ScreenMatchResult<WaitHandle<T>>
    where
        T: Send + 'static,
        F: FnMut() -> ScreenMatchResult<Option<T>> + Send + 'static,
        P: FnMut(&T) -> ScreenMatchResult<bool> + Send + 'static,
    {
        poll::ensure_interval(refresh_interval)?;
        Ok(self.spawn(move |clock, cancel| {
            poll::poll_while(
                clock,
                cancel,
                &mut lookup,
                &mut still_present,
                timeout,
                refresh_interval,
            )
        }))
    }

    pub fn wait_until_one_async<T, F>(
        &self,
        mut lookups: Vec<F>,
        timeout: Duration,
        refresh_interval: Duration,
    ) -> ScreenMatchResult<WaitHandle<T>>
    where
        T: Send + 'static,
        F: FnMut() -> ScreenMatchResult<Option<T>> + Send + 'static,
    {
        poll::ensure_interval(refresh_interval)?;
        poll::ensure_lookups(lookups.len())?;
        Ok(self.spawn(move |clock, cancel| {
            poll::poll_until_one(clock, cancel, &mut lookups, timeout, refresh_interval)
        }))
    }

    pub fn wait_while_one_async<S, F, P>(
        &self,
        mut lookup: F,
        mut any_present: P,
        timeout: Duration,
        refresh_interval: Duration,
    ) -> ScreenMatchResult<WaitHandle<S>>
    where
        S: Send + 'static,
        F: FnMut() -> ScreenMatchResult<S> + Send + 'static,
        P: FnMut(&S) -> bool + Send + 'static,
    {
        poll::ensure_interval(refresh_interval)?;
        Ok(self.spawn(move |clock, cancel| {
            poll::poll_while_one(
                clock,
                cancel,
                &mut lookup,
                &mut any_present,
                timeout,
                refresh_interval,
            )
        }))
    }

    /// Submits `wait` to the worker pool. The task only holds the clock, so
    /// the pool can be dropped while waits are still pending.
    pub(crate) fn spawn<T, W>(&self, wait: W) -> WaitHandle<T>
    where
        T: Send + 'static,
        W: FnOnce(&dyn Clock, &CancelFlag) -> ScreenMatchResult<Option<T>> + Send + 'static,
    {
        let cancel = CancelFlag::new();
        let (sender, receiver) = mpsc::sync_channel(1);
        let clock = Arc::clone(&self.clock);
        let flag = cancel.clone();
        self.pool.spawn(move || {
            let result = wait(clock.as_ref(), &flag);
            let result = if flag.is_cancelled() {
                Err(ScreenMatchError::Cancelled)
            } else {
                result
            };
            // The handle may be gone already; nobody is left to tell.
            let _ = sender.send(result);
        });
        WaitHandle::new(cancel, receiver)
    }
}
