//! Snooze arithmetic.

use crate::time::ClockTime;

/// Computes the next wall-clock time for a snooze cycle.
///
/// This is an add-with-carry over the minute field, not generic
/// normalization: the step is a small configured increment, so at most one
/// hour is ever carried per call, and the hour wraps past 23 back to 0.
#[derive(Debug, Clone, Copy)]
pub struct SnoozeEngine {
    step_minutes: u32,
}

impl SnoozeEngine {
    pub fn new(step_minutes: u32) -> Self {
        Self { step_minutes }
    }

    /// `base` plus the configured step.
    ///
    /// Chain semantics are owned by the controller: the first snooze after a
    /// fresh primary firing passes the primary target as `base`, every
    /// later snooze in the same chain passes the previous snooze result, so
    /// successive snoozes accumulate instead of re-adding to a stale base.
    pub fn next_snooze(&self, base: ClockTime) -> ClockTime {
        let sum = base.minute() as u32 + self.step_minutes;
        if sum > 59 {
            ClockTime::from_hm(base.hour() as i32 + 1, (sum - 60) as i32)
        } else {
            ClockTime::from_hm(base.hour() as i32, sum as i32)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_addition() {
        let engine = SnoozeEngine::new(5);
        assert_eq!(
            engine.next_snooze(ClockTime::from_hm(7, 30)),
            ClockTime::from_hm(7, 35)
        );
    }

    #[test]
    fn test_minute_overflow_carries_one_hour() {
        let engine = SnoozeEngine::new(5);
        assert_eq!(
            engine.next_snooze(ClockTime::from_hm(7, 58)),
            ClockTime::from_hm(8, 3)
        );
    }

    #[test]
    fn test_chain_accumulates_from_previous_result() {
        let engine = SnoozeEngine::new(5);
        let first = engine.next_snooze(ClockTime::from_hm(7, 58));
        let second = engine.next_snooze(first);
        assert_eq!(first, ClockTime::from_hm(8, 3));
        assert_eq!(second, ClockTime::from_hm(8, 8));
    }

    #[test]
    fn test_hour_wraps_past_midnight() {
        let engine = SnoozeEngine::new(10);
        assert_eq!(
            engine.next_snooze(ClockTime::from_hm(23, 55)),
            ClockTime::from_hm(0, 5)
        );
    }
}
