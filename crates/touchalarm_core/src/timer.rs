//! The one-second polling engine.
//!
//! A single poll task is alive at any time. It is owned through a
//! [`RunnerGuard`] that aborts the task when cancelled, replaced or
//! dropped, so a stale poller can never keep ticking alongside a new one.

use std::time::Duration;

use chrono::NaiveDateTime;
use tokio::task::JoinHandle;
use tokio::time::Interval;

/// Poll resolution of both the alarm poller and the volume fader.
pub const POLL_PERIOD: Duration = Duration::from_secs(1);

/// What the live poll task is currently watching for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    /// Nothing armed, nothing ringing; no polling.
    Idle,
    /// Armed; waiting for "now" to cross the scheduled instant.
    PollingForFire,
    /// Ringing; waiting for acknowledgement or the ring timeout.
    PollingForTimeout,
}

/// A one-second interval whose first tick completes immediately, so a
/// freshly armed alarm gets its due-check right away.
pub(crate) fn poll_interval() -> Interval {
    tokio::time::interval(POLL_PERIOD)
}

/// Has an armed alarm crossed its scheduled instant?
///
/// Equality fires: an alarm scheduled for exactly "now" is due. The
/// comparison is re-evaluated from scratch every poll, so host clock jumps
/// need no special recovery; a forward jump past the instant fires on the
/// next poll instead of being skipped.
pub fn fire_due(now: NaiveDateTime, instant: NaiveDateTime) -> bool {
    now >= instant
}

/// Has a ringing alarm gone unacknowledged past the configured timeout?
pub fn timeout_due(now: NaiveDateTime, fired_at: NaiveDateTime, timeout_minutes: u32) -> bool {
    now.signed_duration_since(fired_at) >= chrono::Duration::minutes(timeout_minutes as i64)
}

/// Owns a spawned periodic task; aborting is the only way out.
///
/// Dropping the guard aborts the task, which makes cancel-before-replace
/// structural: storing a new guard in the slot that held the old one kills
/// the old poller.
#[derive(Debug)]
pub(crate) struct RunnerGuard {
    handle: JoinHandle<()>,
}

impl RunnerGuard {
    pub(crate) fn new(handle: JoinHandle<()>) -> Self {
        Self { handle }
    }

    pub(crate) fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for RunnerGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
