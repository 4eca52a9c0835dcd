//! Turning a wall-clock target into the next absolute firing instant.

use chrono::{Duration, NaiveDateTime};

use crate::time::ClockTime;

/// Compute the next occurrence of `target` relative to `now`.
///
/// The candidate is today's date combined with the target time (seconds
/// zeroed). A candidate strictly before `now` is pushed to tomorrow; a
/// candidate equal to `now` is left as-is so an alarm set for "right now"
/// is due on the very next poll.
pub fn next_occurrence(target: ClockTime, now: NaiveDateTime) -> NaiveDateTime {
    let candidate = now.date().and_time(target.as_naive_time());
    if candidate < now {
        candidate + Duration::days(1)
    } else {
        candidate
    }
}

/// Armed/disarmed state of the schedule.
///
/// Primary and snooze arming are mutually exclusive; arming one replaces
/// the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmState {
    Disarmed,
    ArmedPrimary(NaiveDateTime),
    ArmedSnooze(NaiveDateTime),
}

/// Owns the armed/disarmed state and the scheduling math.
#[derive(Debug, Clone)]
pub struct AlarmScheduler {
    state: AlarmState,
}

impl AlarmScheduler {
    pub fn new() -> Self {
        Self {
            state: AlarmState::Disarmed,
        }
    }

    /// Arm the primary alarm for the next occurrence of `target`.
    ///
    /// Arming while already armed re-arms; the previous instant is
    /// discarded.
    pub fn arm(&mut self, target: ClockTime, now: NaiveDateTime) -> NaiveDateTime {
        let instant = next_occurrence(target, now);
        self.state = AlarmState::ArmedPrimary(instant);
        instant
    }

    /// Arm the snooze alarm for the next occurrence of `target`.
    pub fn arm_snooze(&mut self, target: ClockTime, now: NaiveDateTime) -> NaiveDateTime {
        let instant = next_occurrence(target, now);
        self.state = AlarmState::ArmedSnooze(instant);
        instant
    }

    /// Re-arm the primary alarm at a previously persisted instant without
    /// recomputing it. A stale instant is caught by the immediate due-check
    /// the restore path performs.
    pub fn restore_primary(&mut self, instant: NaiveDateTime) {
        self.state = AlarmState::ArmedPrimary(instant);
    }

    pub fn disarm(&mut self) {
        self.state = AlarmState::Disarmed;
    }

    pub fn state(&self) -> AlarmState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        !matches!(self.state, AlarmState::Disarmed)
    }

    /// The scheduled instant, whichever of primary/snooze is armed.
    pub fn next_instant(&self) -> Option<NaiveDateTime> {
        match self.state {
            AlarmState::Disarmed => None,
            AlarmState::ArmedPrimary(instant) | AlarmState::ArmedSnooze(instant) => Some(instant),
        }
    }
}

impl Default for AlarmScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_future_target_is_today() {
        let next = next_occurrence(ClockTime::from_hm(7, 30), at(7, 0, 0));
        assert_eq!(next, at(7, 30, 0));
    }

    #[test]
    fn test_past_target_is_tomorrow() {
        let next = next_occurrence(ClockTime::from_hm(7, 0), at(7, 1, 0));
        assert_eq!(next, at(7, 0, 0) + Duration::days(1));
    }

    #[test]
    fn test_equal_instant_is_not_advanced() {
        let next = next_occurrence(ClockTime::from_hm(7, 0), at(7, 0, 0));
        assert_eq!(next, at(7, 0, 0));
    }

    #[test]
    fn test_result_is_never_before_now() {
        let now = at(13, 37, 42);
        for hour in 0..24 {
            for minute in [0, 15, 37, 59] {
                let next = next_occurrence(ClockTime::from_hm(hour, minute), now);
                assert!(next >= now, "{:02}:{:02} scheduled in the past", hour, minute);
            }
        }
    }

    #[test]
    fn test_seconds_are_zeroed() {
        // now has non-zero seconds; target at the same minute already passed
        let next = next_occurrence(ClockTime::from_hm(13, 37), at(13, 37, 42));
        assert_eq!(next, at(13, 37, 0) + Duration::days(1));
    }

    #[test]
    fn test_arming_replaces_previous_state() {
        let mut scheduler = AlarmScheduler::new();
        assert!(!scheduler.is_armed());

        scheduler.arm(ClockTime::from_hm(7, 0), at(6, 0, 0));
        assert!(matches!(scheduler.state(), AlarmState::ArmedPrimary(_)));

        let snooze_instant = scheduler.arm_snooze(ClockTime::from_hm(7, 5), at(7, 0, 0));
        assert_eq!(scheduler.state(), AlarmState::ArmedSnooze(snooze_instant));
        assert_eq!(scheduler.next_instant(), Some(snooze_instant));

        scheduler.disarm();
        assert_eq!(scheduler.next_instant(), None);

        // disarming twice is a no-op
        scheduler.disarm();
        assert!(!scheduler.is_armed());
    }
}
