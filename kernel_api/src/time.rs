//! Tick and time conversion
//!
//! Counters count ticks, not time. A counter's `ticks_per_base` says how
//! many ticks make up one base unit, and the base unit is a configured
//! length of time (one millisecond unless stated otherwise).

use core_types::TickType;
pub use core::time::Duration;
use serde::{Deserialize, Serialize};

/// Conversion between ticks and time for one counter
///
/// `ticks_per_base` ticks make up one `base` unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickRate {
    /// Ticks per base unit; never zero for a validated counter
    pub ticks_per_base: TickType,
    /// Length of one base unit
    pub base: Duration,
}

impl TickRate {
    pub const fn new(ticks_per_base: TickType, base: Duration) -> Self {
        Self {
            ticks_per_base,
            base,
        }
    }

    /// Converts a tick count into the time it spans
    ///
    /// Rounds down to the nanosecond. Returns a zero duration for a
    /// degenerate zero `ticks_per_base`.
    pub fn ticks_to_duration(&self, ticks: u64) -> Duration {
        if self.ticks_per_base == 0 {
            return Duration::ZERO;
        }
        let nanos = ticks as u128 * self.base.as_nanos() / self.ticks_per_base as u128;
        Duration::from_nanos(saturate(nanos))
    }

    /// Converts a duration into whole ticks, rounding down
    pub fn duration_to_ticks(&self, duration: Duration) -> u64 {
        let base = self.base.as_nanos();
        if base == 0 {
            return 0;
        }
        saturate(duration.as_nanos() * self.ticks_per_base as u128 / base)
    }
}

fn saturate(value: u128) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}
