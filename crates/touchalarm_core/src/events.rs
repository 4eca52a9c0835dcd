//! The typed notification boundary.
//!
//! The core emits [`AlarmEvent`]s outward through registered sinks and
//! accepts [`AlarmCommand`]s pushed inward by a host adapter. The serde
//! wire tags match the notification names of the surrounding host protocol,
//! so a JSON-speaking adapter can forward both directions verbatim.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Outbound lifecycle events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AlarmEvent {
    /// The armed/disarmed state or the target time changed. Carries the
    /// full persistable shape so a persistence collaborator can store it
    /// as-is.
    #[serde(rename = "ALARM-CHANGED")]
    Changed {
        active: bool,
        #[serde(rename = "nextAlarm")]
        next_alarm: Option<NaiveDateTime>,
        hour: u8,
        minutes: u8,
    },

    /// An armed alarm crossed its scheduled instant and started ringing.
    #[serde(rename = "ALARM-FIRED")]
    Fired { hour: u8, minutes: u8 },

    /// A ringing alarm was snoozed; `hour`/`minutes` are the re-armed time.
    #[serde(rename = "ALARM-SNOOZE")]
    Snoozed { hour: u8, minutes: u8 },
}

/// Inbound commands pushed from elsewhere (a restored session, a remote
/// control surface).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AlarmCommand {
    /// Sync the whole alarm state, e.g. from a persisted record. An active
    /// update restores the pushed instant verbatim and is re-checked for
    /// due-ness immediately.
    #[serde(rename = "UPDATE-ALARM")]
    UpdateAlarm {
        hour: i32,
        minutes: i32,
        active: bool,
        #[serde(rename = "nextAlarm")]
        next_alarm: Option<NaiveDateTime>,
    },

    /// Step the displayed minutes up or down by the configured step.
    #[serde(rename = "CHANGE-ALARM-MINUTES")]
    ChangeMinutes { up: bool },

    /// Step the displayed hour up or down.
    #[serde(rename = "CHANGE-ALARM-HOURS")]
    ChangeHours { up: bool },

    /// Arm (`on = true`) or disarm the alarm.
    #[serde(rename = "TURN-ALARM-ONOFF")]
    TurnOnOff { on: bool },

    /// Snooze the currently ringing alarm.
    #[serde(rename = "TRIGGER-SNOOZE")]
    TriggerSnooze,
}

/// Observer registered with the controller.
///
/// Sinks are invoked outside the controller's lock, in registration order,
/// with events in the order they occurred.
#[async_trait]
pub trait AlarmEventSink: Send + Sync {
    async fn send(&self, event: AlarmEvent);
}
