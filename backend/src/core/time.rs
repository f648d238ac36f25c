//! Virtual clock for the simulation
//!
//! Timestamps are milliseconds since the simulation epoch. The epoch is pinned
//! to a configurable minute of the day so rush windows (expressed in minutes
//! since midnight) can be evaluated without a calendar.

use serde::{Deserialize, Serialize};

pub const MS_PER_SECOND: u64 = 1_000;
pub const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Monotonic simulation clock
///
/// # Example
/// ```
/// use kiosk_simulator_core_rs::SimClock;
///
/// let mut clock = SimClock::new(8 * 60); // epoch at 08:00
/// clock.advance_by(90 * 60_000);
/// assert_eq!(clock.minute_of_day(), 9 * 60 + 30);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimClock {
    now_ms: u64,
    start_minute_of_day: u32,
}

impl SimClock {
    /// Create a clock whose epoch falls on `start_minute_of_day`
    ///
    /// # Panics
    /// Panics if `start_minute_of_day` is not within a single day
    pub fn new(start_minute_of_day: u32) -> Self {
        assert!(
            start_minute_of_day < MINUTES_PER_DAY,
            "start_minute_of_day must be < 1440"
        );
        Self {
            now_ms: 0,
            start_minute_of_day,
        }
    }

    /// Milliseconds since the simulation epoch
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Move time forward by `delta_ms`
    pub fn advance_by(&mut self, delta_ms: u64) {
        self.now_ms = self.now_ms.saturating_add(delta_ms);
    }

    /// Move time forward to `target_ms`; earlier targets are ignored
    pub fn advance_to(&mut self, target_ms: u64) {
        if target_ms > self.now_ms {
            self.now_ms = target_ms;
        }
    }

    /// Minutes since midnight at the current instant (wraps across days)
    pub fn minute_of_day(&self) -> u32 {
        let elapsed_minutes = (self.now_ms / MS_PER_MINUTE) % MINUTES_PER_DAY as u64;
        (self.start_minute_of_day + elapsed_minutes as u32) % MINUTES_PER_DAY
    }

    /// Whole minutes elapsed since `timestamp_ms` (0 for future timestamps)
    pub fn minutes_since(&self, timestamp_ms: u64) -> u64 {
        self.now_ms.saturating_sub(timestamp_ms) / MS_PER_MINUTE
    }

    pub fn start_minute_of_day(&self) -> u32 {
        self.start_minute_of_day
    }
}
