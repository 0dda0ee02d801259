//! Loop configuration.

use crate::error::{Error, Result};

/// Highest accepted tick or frame rate. Shorter periods vanish into the
/// rounding of a seconds-based deadline and stop advancing it.
pub const MAX_RATE: f64 = 1_000_000.0;

fn valid_rate(rate: f64) -> bool {
    rate.is_finite() && rate > 0.0 && rate <= MAX_RATE
}

/// How the reschedule delay is rounded before it is handed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DelayQuantization {
    /// Floor to whole milliseconds, like a timer that only takes integers.
    #[default]
    Millis,
    /// Keep the full precision of the computed delay.
    Exact,
}

/// Configuration for the fixed-timestep loop.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopConfig {
    /// Simulation ticks per second.
    pub ticks_per_second: f64,
    /// Target draw rate.
    pub frames_per_second: f64,
    /// Upper bound on catch-up ticks per scheduling pass.
    pub max_frameskip: u32,
    /// Rounding applied to the reschedule delay.
    pub quantization: DelayQuantization,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 20.0,
            frames_per_second: 60.0,
            max_frameskip: 5,
            quantization: DelayQuantization::Millis,
        }
    }
}

impl LoopConfig {
    /// Create a config with the given rates and the default quantization.
    pub fn new(ticks_per_second: f64, frames_per_second: f64, max_frameskip: u32) -> Self {
        Self {
            ticks_per_second,
            frames_per_second,
            max_frameskip,
            ..Self::default()
        }
    }

    /// Replace the delay quantization.
    #[must_use]
    pub const fn with_quantization(mut self, quantization: DelayQuantization) -> Self {
        self.quantization = quantization;
        self
    }

    /// Reject rates that would divide by zero or exceed [`MAX_RATE`], and a
    /// frameskip that would never let a pass finish a catch-up tick.
    pub fn validate(&self) -> Result<()> {
        if !valid_rate(self.ticks_per_second) {
            return Err(Error::InvalidTickRate(self.ticks_per_second));
        }
        if !valid_rate(self.frames_per_second) {
            return Err(Error::InvalidFrameRate(self.frames_per_second));
        }
        if self.max_frameskip < 1 {
            return Err(Error::InvalidFrameskip(self.max_frameskip));
        }
        Ok(())
    }

    /// Seconds of simulated time per tick.
    #[inline]
    pub fn tick_delay(&self) -> f64 {
        1.0 / self.ticks_per_second
    }

    /// Seconds between draws.
    #[inline]
    pub fn frame_delay(&self) -> f64 {
        1.0 / self.frames_per_second
    }
}
