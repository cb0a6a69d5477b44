//! Accumulating stopwatch with start/pause semantics.

use std::time::{Duration, Instant};

/// Sums the time spent between `start` and `pause` calls.
#[derive(Clone, Debug, Default)]
pub struct Stopwatch {
    started: Option<Instant>,
    elapsed: Duration,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts or resumes timing. Has no effect while already running.
    pub fn start(&mut self) {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
    }

    /// Stops timing and adds the running segment to the total.
    pub fn pause(&mut self) {
        if let Some(started) = self.started.take() {
            self.elapsed += started.elapsed();
        }
    }

    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }

    /// Total accumulated time, including a segment still running.
    pub fn duration(&self) -> Duration {
        match self.started {
            Some(started) => self.elapsed + started.elapsed(),
            None => self.elapsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Stopwatch;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn segments_accumulate_across_pauses() {
        let mut watch = Stopwatch::new();
        assert_eq!(watch.duration(), Duration::ZERO);

        watch.start();
        thread::sleep(Duration::from_millis(2));
        watch.pause();
        let first = watch.duration();
        assert!(first >= Duration::from_millis(2));

        thread::sleep(Duration::from_millis(2));
        assert_eq!(watch.duration(), first);

        watch.start();
        thread::sleep(Duration::from_millis(2));
        watch.pause();
        assert!(watch.duration() >= first + Duration::from_millis(2));
        assert!(!watch.is_running());
    }
}
