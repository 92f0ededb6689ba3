//! Session countdown driven by its own one-second cadence.

use std::time::Duration;

/// Countdown measured in whole seconds.
///
/// The clock keeps its own deadline on the virtual timeline and is independent
/// of the spawn cadence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionClock {
    remaining_secs: u32,
    interval: Duration,
    next_tick_at: Option<Duration>,
}

impl SessionClock {
    /// Creates a stopped clock with no time on it.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            remaining_secs: 0,
            interval: Duration::ZERO,
            next_tick_at: None,
        }
    }

    /// Sets the remaining time and schedules the first decrement one
    /// `interval` after `now`.
    pub fn start(&mut self, duration_secs: u32, now: Duration, interval: Duration) {
        self.remaining_secs = duration_secs;
        self.interval = interval;
        self.next_tick_at = if duration_secs == 0 || interval.is_zero() {
            None
        } else {
            Some(now.saturating_add(interval))
        };
    }

    /// Removes one second, saturating at zero.
    ///
    /// A running clock schedules its next decrement unless it just expired.
    pub fn tick(&mut self) {
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        self.next_tick_at = match self.next_tick_at {
            Some(at) if !self.is_expired() => Some(at.saturating_add(self.interval)),
            _ => None,
        };
    }

    /// Halts decrementing. The remaining time is kept for reporting.
    pub fn stop(&mut self) {
        self.next_tick_at = None;
    }

    /// Reports whether the countdown reached zero.
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        self.remaining_secs == 0
    }

    /// Reports whether the clock is still counting down.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.next_tick_at.is_some()
    }

    /// Seconds left on the clock.
    #[must_use]
    pub const fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// Virtual time of the next decrement, if the clock is running.
    #[must_use]
    pub const fn next_deadline(&self) -> Option<Duration> {
        self.next_tick_at
    }
}
