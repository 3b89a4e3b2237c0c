//! Time sources for frame-rate estimation.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Monotonic time source read once per processed frame.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Deterministic clock that advances by a fixed step on every read.
///
/// The first read returns the origin.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    step: Duration,
    reads: Cell<u32>,
}

impl ManualClock {
    pub fn new(step: Duration) -> Self {
        Self {
            origin: Instant::now(),
            step,
            reads: Cell::new(0),
        }
    }

    /// Clock ticking at `fps` reads per second.
    pub fn at_fps(fps: f64) -> Self {
        Self::new(Duration::from_secs_f64(1.0 / fps))
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let reads = self.reads.get();
        self.reads.set(reads + 1);
        self.origin + self.step * reads
    }
}
