//! Cancellation and result retrieval for asynchronous waits.

use crate::util::{ScreenMatchError, ScreenMatchResult};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;

/// Cooperative cancellation flag shared between a handle and its wait.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Fails with `Cancelled` once cancellation was requested.
    pub fn check(&self) -> ScreenMatchResult<()> {
        if self.is_cancelled() {
            Err(ScreenMatchError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Handle to a wait running on the observer's worker pool.
///
/// Dropping the handle does not stop the wait; call [`WaitHandle::cancel`].
pub struct WaitHandle<T> {
    cancel: CancelFlag,
    receiver: Receiver<ScreenMatchResult<Option<T>>>,
    settled: Mutex<Option<ScreenMatchResult<Option<T>>>>,
}

impl<T> WaitHandle<T> {
    pub(crate) fn new(
        cancel: CancelFlag,
        receiver: Receiver<ScreenMatchResult<Option<T>>>,
    ) -> Self {
        Self {
            cancel,
            receiver,
            settled: Mutex::new(None),
        }
    }

    /// Requests that the wait stops before its next tick. A result produced
    /// by a lookup already in flight is discarded.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Returns true once the wait has produced its result.
    pub fn is_finished(&self) -> bool {
        let mut settled = self.settled.lock();
        if settled.is_some() {
            return true;
        }
        match self.receiver.try_recv() {
            Ok(result) => {
                *settled = Some(result);
                true
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                *settled = Some(Err(ScreenMatchError::WorkerLost));
                true
            }
        }
    }

    /// Blocks until the wait finishes and returns its outcome.
    ///
    /// `Ok(None)` means the timeout elapsed; a cancelled wait yields
    /// `Err(Cancelled)`.
    pub fn join(self) -> ScreenMatchResult<Option<T>> {
        if let Some(result) = self.settled.into_inner() {
            return result;
        }
        self.receiver
            .recv()
            .unwrap_or(Err(ScreenMatchError::WorkerLost))
    }
}
