//! Wall-clock values and the clock seam.
//!
//! `ClockTime` is the hour/minute value everything else schedules against.
//! It is always normalized: construction and arithmetic wrap around the
//! 24-hour dial instead of clamping, so `23:xx + 1h` lands on `00:xx` and
//! `00:xx - 1h` lands on `23:xx`.

use std::fmt;

use chrono::{Local, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A wall-clock hour/minute pair, normalized to `0..24` / `0..60`.
///
/// Immutable value type; arithmetic returns new instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    /// Build a normalized time from arbitrary signed inputs.
    ///
    /// Minute overflow/underflow carries into the hour, and the hour wraps
    /// modulo 24 in both directions.
    pub fn from_hm(hour: i32, minute: i32) -> Self {
        let carry = minute.div_euclid(60);
        Self {
            hour: (hour + carry).rem_euclid(24) as u8,
            minute: minute.rem_euclid(60) as u8,
        }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Shift by whole hours, wrapping around the dial.
    pub fn add_hours(self, delta: i32) -> Self {
        Self {
            hour: (self.hour as i32 + delta).rem_euclid(24) as u8,
            minute: self.minute,
        }
    }

    /// Shift by `delta` minutes, where `step` is the configured minute
    /// increment the caller is stepping with.
    ///
    /// Overflow past 59 carries exactly one hour. Underflow below 0 lands on
    /// `60 - step` (not 59) with the hour decremented, so repeated
    /// decrements stay on the step grid.
    pub fn add_minutes(self, delta: i32, step: u32) -> Self {
        let sum = self.minute as i32 + delta;
        if sum > 59 {
            Self {
                minute: (sum - 60).rem_euclid(60) as u8,
                ..self.add_hours(1)
            }
        } else if sum < 0 {
            Self {
                minute: (60 - step.clamp(1, 59)) as u8,
                ..self.add_hours(-1)
            }
        } else {
            Self {
                minute: sum as u8,
                ..self
            }
        }
    }

    /// The same wall-clock value as a chrono time with seconds zeroed.
    pub fn as_naive_time(&self) -> NaiveTime {
        // hour/minute are normalized by construction, so this cannot fail
        NaiveTime::from_hms_opt(self.hour as u32, self.minute as u32, 0)
            .expect("ClockTime is always in range")
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Source of "now" for scheduling decisions.
///
/// The core never reads the system clock directly; tests substitute a
/// manually driven clock to make timer behavior deterministic.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in the host's local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hour_wraps_in_both_directions() {
        assert_eq!(ClockTime::from_hm(23, 0).add_hours(1).hour(), 0);
        assert_eq!(ClockTime::from_hm(0, 0).add_hours(-1).hour(), 23);
        assert_eq!(ClockTime::from_hm(5, 30).add_hours(48).hour(), 5);
    }

    #[test]
    fn test_normalization_matches_modulo() {
        for h in 0..24 {
            for d in [-50, -24, -1, 0, 1, 24, 50] {
                let normalized = ClockTime::from_hm(h + d, 0);
                assert_eq!(normalized.hour() as i32, ((h + d) % 24 + 24) % 24);
                assert_eq!(normalized.minute(), 0);
            }
        }
    }

    #[test]
    fn test_minute_overflow_carries_one_hour() {
        let t = ClockTime::from_hm(7, 59).add_minutes(1, 1);
        assert_eq!((t.hour(), t.minute()), (8, 0));

        let t = ClockTime::from_hm(23, 45).add_minutes(15, 15);
        assert_eq!((t.hour(), t.minute()), (0, 0));
    }

    #[test]
    fn test_minute_underflow_lands_on_step_grid() {
        // step 1 behaves like the familiar 0 -> 59 wrap
        let t = ClockTime::from_hm(8, 0).add_minutes(-1, 1);
        assert_eq!((t.hour(), t.minute()), (7, 59));

        // step 5 wraps to 55, keeping the grid aligned
        let t = ClockTime::from_hm(8, 0).add_minutes(-5, 5);
        assert_eq!((t.hour(), t.minute()), (7, 55));

        // step 15 wraps to 45
        let t = ClockTime::from_hm(0, 0).add_minutes(-15, 15);
        assert_eq!((t.hour(), t.minute()), (23, 45));
    }

    #[test]
    fn test_from_hm_carries_minutes() {
        let t = ClockTime::from_hm(7, 63);
        assert_eq!((t.hour(), t.minute()), (8, 3));

        let t = ClockTime::from_hm(0, -1);
        assert_eq!((t.hour(), t.minute()), (23, 59));
    }

    #[test]
    fn test_display_zero_pads() {
        assert_eq!(ClockTime::from_hm(5, 7).to_string(), "05:07");
        assert_eq!(ClockTime::from_hm(23, 59).to_string(), "23:59");
    }
}
