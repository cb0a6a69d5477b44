//! Polling loops shared by the synchronous and asynchronous waits.
//!
//! A session checks once immediately, then sleeps `min(refresh_interval,
//! remaining)` between checks, so the last check lands on the deadline.
//! Lookups within one session never overlap.

use crate::observe::clock::Clock;
use crate::observe::handle::CancelFlag;
use crate::trace::{trace_event, trace_span};
use crate::util::{ScreenMatchError, ScreenMatchResult};
use std::time::Duration;

struct WaitSession<'a> {
    clock: &'a dyn Clock,
    cancel: &'a CancelFlag,
    deadline: Duration,
    refresh_interval: Duration,
    ticks: usize,
}

impl<'a> WaitSession<'a> {
    fn start(
        clock: &'a dyn Clock,
        cancel: &'a CancelFlag,
        timeout: Duration,
        refresh_interval: Duration,
    ) -> ScreenMatchResult<Self> {
        ensure_interval(refresh_interval)?;
        cancel.check()?;
        Ok(Self {
            clock,
            cancel,
            deadline: clock.now().saturating_add(timeout),
            refresh_interval,
            ticks: 0,
        })
    }

    /// Sleeps until the next check; false once the deadline has passed.
    fn next_tick(&mut self) -> ScreenMatchResult<bool> {
        let now = self.clock.now();
        if now >= self.deadline {
            return Ok(false);
        }
        self.clock.sleep(self.refresh_interval.min(self.deadline - now));
        self.cancel.check()?;
        self.ticks += 1;
        Ok(true)
    }

    fn satisfied<T>(&self, value: T) -> ScreenMatchResult<Option<T>> {
        trace_event!("wait_satisfied", ticks = self.ticks);
        Ok(Some(value))
    }

    fn timed_out<T>(&self) -> ScreenMatchResult<Option<T>> {
        trace_event!("wait_timed_out", ticks = self.ticks);
        Ok(None)
    }
}

pub(crate) fn ensure_interval(refresh_interval: Duration) -> ScreenMatchResult<()> {
    if refresh_interval.is_zero() {
        return Err(ScreenMatchError::InvalidArgument(
            "refresh interval must be positive",
        ));
    }
    Ok(())
}

pub(crate) fn ensure_lookups(count: usize) -> ScreenMatchResult<()> {
    if count == 0 {
        return Err(ScreenMatchError::InvalidArgument(
            "at least one lookup is required",
        ));
    }
    Ok(())
}

/// Polls `lookup` until it yields a value or the timeout elapses.
pub(crate) fn poll_until<T, F>(
    clock: &dyn Clock,
    cancel: &CancelFlag,
    mut lookup: F,
    timeout: Duration,
    refresh_interval: Duration,
) -> ScreenMatchResult<Option<T>>
where
    F: FnMut() -> ScreenMatchResult<Option<T>>,
{
    let _span = trace_span!("wait_until", timeout_ms = timeout.as_millis() as u64).entered();
    let mut session = WaitSession::start(clock, cancel, timeout, refresh_interval)?;
    loop {
        if let Some(value) = lookup()? {
            return session.satisfied(value);
        }
        if !session.next_tick()? {
            return session.timed_out();
        }
    }
}

/// Polls until `lookup` yields nothing or `still_present` rejects the last
/// value. Returns `None` on success and the last value on timeout.
pub(crate) fn poll_while<T, F, P>(
    clock: &dyn Clock,
    cancel: &CancelFlag,
    mut lookup: F,
    mut still_present: P,
    timeout: Duration,
    refresh_interval: Duration,
) -> ScreenMatchResult<Option<T>>
where
    F: FnMut() -> ScreenMatchResult<Option<T>>,
    P: FnMut(&T) -> ScreenMatchResult<bool>,
{
    let _span = trace_span!("wait_while", timeout_ms = timeout.as_millis() as u64).entered();
    let mut session = WaitSession::start(clock, cancel, timeout, refresh_interval)?;
    let Some(mut last) = lookup()? else {
        trace_event!("wait_gone", ticks = session.ticks);
        return Ok(None);
    };
    while session.next_tick()? {
        if !still_present(&last)? {
            trace_event!("wait_gone", ticks = session.ticks);
            return Ok(None);
        }
        match lookup()? {
            Some(value) => last = value,
            None => {
                trace_event!("wait_gone", ticks = session.ticks);
                return Ok(None);
            }
        }
    }
    trace_event!("wait_timed_out", ticks = session.ticks);
    Ok(Some(last))
}

/// Runs every lookup in order each tick; the first value found wins.
pub(crate) fn poll_until_one<T, F>(
    clock: &dyn Clock,
    cancel: &CancelFlag,
    lookups: &mut [F],
    timeout: Duration,
    refresh_interval: Duration,
) -> ScreenMatchResult<Option<T>>
where
    F: FnMut() -> ScreenMatchResult<Option<T>>,
{
    ensure_lookups(lookups.len())?;
    let _span = trace_span!("wait_until_one", lookups = lookups.len()).entered();
    let mut session = WaitSession::start(clock, cancel, timeout, refresh_interval)?;
    loop {
        for lookup in lookups.iter_mut() {
            if let Some(value) = lookup()? {
                return session.satisfied(value);
            }
        }
        if !session.next_tick()? {
            return session.timed_out();
        }
    }
}

/// Polls snapshots until `any_present` is false for one of them and
/// returns that snapshot; `None` on timeout.
pub(crate) fn poll_while_one<S, F, P>(
    clock: &dyn Clock,
    cancel: &CancelFlag,
    mut lookup: F,
    mut any_present: P,
    timeout: Duration,
    refresh_interval: Duration,
) -> ScreenMatchResult<Option<S>>
where
    F: FnMut() -> ScreenMatchResult<S>,
    P: FnMut(&S) -> bool,
{
    let _span = trace_span!("wait_while_one", timeout_ms = timeout.as_millis() as u64).entered();
    let mut session = WaitSession::start(clock, cancel, timeout, refresh_interval)?;
    loop {
        let snapshot = lookup()?;
        if !any_present(&snapshot) {
            return session.satisfied(snapshot);
        }
        if !session.next_tick()? {
            return session.timed_out();
        }
    }
}
