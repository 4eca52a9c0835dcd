#![cfg(test)]

//! Deterministic collaborator doubles shared by the unit tests.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use parking_lot::Mutex;

use crate::events::{AlarmEvent, AlarmEventSink};
use crate::sound::SoundOutput;
use crate::time::Clock;

/// Shorthand for a fixed test date.
pub fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

/// Clock that only moves when the test says so.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    pub fn starting_at(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.lock();
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SoundCall {
    Start { source: String, volume: f64 },
    SetVolume(f64),
    Stop,
}

/// Sound output that records every call for assertions.
#[derive(Debug, Default)]
pub struct RecordingSound {
    calls: Mutex<Vec<SoundCall>>,
}

impl RecordingSound {
    pub fn calls(&self) -> Vec<SoundCall> {
        self.calls.lock().clone()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SoundCall::SetVolume(v) => Some(v),
                _ => None,
            })
            .collect()
    }

    pub fn start_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, SoundCall::Start { .. }))
            .count()
    }

    pub fn stop_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, SoundCall::Stop))
            .count()
    }
}

impl SoundOutput for RecordingSound {
    fn start(&self, source: &str, volume: f64) {
        self.calls.lock().push(SoundCall::Start {
            source: source.to_string(),
            volume,
        });
    }

    fn set_volume(&self, volume: f64) {
        self.calls.lock().push(SoundCall::SetVolume(volume));
    }

    fn stop(&self) {
        self.calls.lock().push(SoundCall::Stop);
    }
}

/// Event sink that collects everything it is sent.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<AlarmEvent>>,
}

impl CollectingSink {
    pub fn events(&self) -> Vec<AlarmEvent> {
        self.events.lock().clone()
    }

    pub fn fired_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, AlarmEvent::Fired { .. }))
            .count()
    }

    pub fn changed_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, AlarmEvent::Changed { .. }))
            .count()
    }
}

#[async_trait]
impl AlarmEventSink for CollectingSink {
    async fn send(&self, event: AlarmEvent) {
        self.events.lock().push(event);
    }
}
