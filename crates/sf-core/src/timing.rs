//! Wall-clock measurement for throughput reporting.
//!
//! Nothing here feeds back into simulation results; elapsed wall time is
//! only ever used to describe how fast a run is going.

use std::time::Instant;

/// A restartable stopwatch measuring wall time since the last lap.
#[derive(Clone, Copy, Debug)]
pub struct Stopwatch {
    start: Instant,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::start()
    }
}

impl Stopwatch {
    /// Create and start a new stopwatch.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Seconds elapsed since the stopwatch was started or last lapped.
    pub fn elapsed_seconds(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Return elapsed seconds and restart the measurement from now.
    pub fn lap(&mut self) -> f64 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.start).as_secs_f64();
        self.start = now;
        elapsed
    }
}
