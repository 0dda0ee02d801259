//! Clocks: where the scheduler reads "now".
//!
//! Deadlines are kept as `f64` seconds on a monotonic timeline and are only
//! quantized when the next wakeup is requested from the host.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// A monotonic time source measured in seconds.
pub trait Clock {
    /// Current time in seconds. Must never decrease.
    fn now(&self) -> f64;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock whose zero is the moment of construction.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// The instant this clock reads as zero.
    pub const fn origin(&self) -> Instant {
        self.origin
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same reading, so a test can keep one handle and give
/// another to the scheduler.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    /// Create a manual clock reading `start` seconds.
    pub fn new(start: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Jump to an absolute time.
    ///
    /// Moving backwards is ignored to keep the clock monotonic.
    pub fn set(&self, seconds: f64) {
        if seconds > self.now.get() {
            self.now.set(seconds);
        }
    }

    /// Move forward by `seconds`.
    pub fn advance(&self, seconds: f64) {
        self.set(self.now.get() + seconds);
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> f64 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared() {
        let clock = ManualClock::new(1.0);
        let handle = clock.clone();
        handle.advance(0.5);
        assert_eq!(clock.now(), 1.5);
    }

    #[test]
    fn test_manual_clock_never_goes_back() {
        let clock = ManualClock::new(2.0);
        clock.set(1.0);
        assert_eq!(clock.now(), 2.0);
    }

    #[test]
    fn test_monotonic_clock_advances() {
        let clock = MonotonicClock::new();
        let a = clock.now();
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(clock.now() > a);
    }
}
