use std::time::Instant;

/// Monotonic milliseconds for the stopwatch core.
pub trait TimeSource {
    fn now_ms(&self) -> u64;
}

/// Milliseconds since the app started, from `Instant` so wall-clock
/// adjustments never reach the stopwatch.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}
