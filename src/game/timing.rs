//! Timestep arithmetic for the scheduling pass.
//!
//! All inputs are seconds on the scheduler's clock. Nothing here touches
//! entities or the surface, so the math can be checked in isolation.

use super::config::DelayQuantization;
use std::time::Duration;

/// Shortest delay ever requested from the host.
pub const MIN_DELAY: Duration = Duration::from_millis(1);

/// How far `now` sits past the last simulated tick boundary, in ticks.
///
/// The last boundary is `next_update - tick_delay`, so the result is 0 right
/// after a tick, approaches 1 just before the next one, and exceeds 1 when
/// the loop has fallen behind and frameskip stopped the catch-up.
#[inline]
pub fn interpolation(now: f64, next_update: f64, tick_delay: f64) -> f64 {
    (now + tick_delay - next_update) / tick_delay
}

/// Push a draw deadline forward in whole frames until it lies after `now`.
///
/// Missed frames are skipped, never replayed. The result is always strictly
/// greater than `now`, including when a deadline lands exactly on it.
pub fn advance_draw_deadline(next_draw: f64, frame_delay: f64, now: f64) -> f64 {
    if next_draw > now {
        return next_draw;
    }
    let missed = ((now - next_draw) / frame_delay).floor() + 1.0;
    let next = next_draw + missed * frame_delay;
    if next > now {
        return next;
    }
    // Rounding left the deadline on or before `now`
    let next = next + frame_delay;
    if next > now {
        next
    } else {
        // At least one ulp of `now`
        now + frame_delay.max(now.abs() * f64::EPSILON)
    }
}

/// Delay until the earlier of the two deadlines, rounded for the host.
///
/// Overdue or sub-millisecond results are clamped to [`MIN_DELAY`] so the
/// chain always makes progress without spinning.
pub fn reschedule_delay(
    now: f64,
    next_update: f64,
    next_draw: f64,
    quantization: DelayQuantization,
) -> Duration {
    let remaining = next_draw.min(next_update) - now;
    let delay = match quantization {
        DelayQuantization::Millis => {
            let millis = (remaining * 1000.0).floor();
            if millis < 1.0 {
                return MIN_DELAY;
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let millis = millis as u64;
            Duration::from_millis(millis)
        }
        DelayQuantization::Exact => {
            if remaining.is_nan() || remaining <= 0.0 {
                return MIN_DELAY;
            }
            Duration::try_from_secs_f64(remaining).unwrap_or(Duration::MAX)
        }
    };
    delay.max(MIN_DELAY)
}
