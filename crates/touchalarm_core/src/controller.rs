//! The alarm controller.
//!
//! Single entry point external collaborators talk to. Commands come in
//! (arm, disarm, snooze, stop, display edits), scheduling math is
//! delegated to the scheduler and snooze engine, the poll/fade tasks are
//! started and cancelled here, and lifecycle events flow out through
//! registered sinks.
//!
//! All state lives behind one mutex; the poll task re-enters through the
//! same lock, so every transition is serialized. Sinks are invoked after
//! the lock is released.

use std::sync::Arc;

use chrono::NaiveDateTime;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::config::AlarmConfig;
use crate::error::{AlarmError, Result};
use crate::events::{AlarmCommand, AlarmEvent, AlarmEventSink};
use crate::fade::{spawn_fade, FadeState};
use crate::scheduler::{AlarmScheduler, AlarmState};
use crate::snooze::SnoozeEngine;
use crate::sound::{NullSound, SoundOutput};
use crate::store::AlarmRecord;
use crate::time::{Clock, ClockTime, SystemClock};
use crate::timer::{self, poll_interval, RunnerGuard, TimerPhase};

/// Orchestrates scheduling, polling, snoozing and sound for one alarm.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct AlarmController {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for AlarmController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlarmController").finish_non_exhaustive()
    }
}

struct Shared {
    config: AlarmConfig,
    clock: Arc<dyn Clock>,
    sound: Arc<dyn SoundOutput>,
    sinks: RwLock<Vec<Arc<dyn AlarmEventSink>>>,
    state: Mutex<Inner>,
}

struct Inner {
    /// The time currently shown for editing.
    display: ClockTime,
    /// The time reported outward: the armed target, or the latest snooze
    /// time while a snooze chain is running.
    alarm_time: ClockTime,
    scheduler: AlarmScheduler,
    engine: SnoozeEngine,
    /// Base for the next snooze. `None` means the chain is fresh and the
    /// next snooze accumulates from the primary target.
    snooze_base: Option<ClockTime>,
    phase: TimerPhase,
    fired_at: Option<NaiveDateTime>,
    /// The single live poll task.
    runner: Option<RunnerGuard>,
    /// The single live fade ticker.
    fade: Option<RunnerGuard>,
}

impl AlarmController {
    /// Controller with the system clock and no sound output.
    pub fn new(config: AlarmConfig) -> Result<Self> {
        Self::with_collaborators(config, Arc::new(SystemClock), Arc::new(NullSound))
    }

    /// Controller with explicit clock and sound collaborators.
    ///
    /// Refuses to construct on an invalid configuration.
    pub fn with_collaborators(
        config: AlarmConfig,
        clock: Arc<dyn Clock>,
        sound: Arc<dyn SoundOutput>,
    ) -> Result<Self> {
        config
            .validate()
            .map_err(|cause| AlarmError::InvalidConfiguration { cause })?;

        let display = ClockTime::from_hm(config.default_hour as i32, config.default_minutes as i32);
        let engine = SnoozeEngine::new(config.snooze_minutes);
        Ok(Self {
            shared: Arc::new(Shared {
                config,
                clock,
                sound,
                sinks: RwLock::new(Vec::new()),
                state: Mutex::new(Inner {
                    display,
                    alarm_time: display,
                    scheduler: AlarmScheduler::new(),
                    engine,
                    snooze_base: None,
                    phase: TimerPhase::Idle,
                    fired_at: None,
                    runner: None,
                    fade: None,
                }),
            }),
        })
    }

    /// Register an observer for lifecycle events.
    pub fn add_sink(&self, sink: Arc<dyn AlarmEventSink>) {
        self.shared.sinks.write().push(sink);
    }

    pub fn display_time(&self) -> ClockTime {
        self.shared.state.lock().display
    }

    pub fn is_armed(&self) -> bool {
        self.shared.state.lock().scheduler.is_armed()
    }

    /// An alarm has fired and is waiting for acknowledgement or timeout.
    pub fn is_ringing(&self) -> bool {
        self.shared.state.lock().phase == TimerPhase::PollingForTimeout
    }

    /// Current persistable state.
    pub fn snapshot(&self) -> AlarmRecord {
        let s = self.shared.state.lock();
        AlarmRecord {
            hour: s.alarm_time.hour(),
            minutes: s.alarm_time.minute(),
            active: s.scheduler.is_armed(),
            next_alarm: s.scheduler.next_instant(),
        }
    }

    /// Replace the displayed time. Does not touch an armed schedule; the
    /// new value takes effect on the next `arm`.
    pub fn set_display_time(&self, hour: i32, minute: i32) {
        let mut s = self.shared.state.lock();
        s.display = ClockTime::from_hm(hour, minute);
        s.alarm_time = s.display;
        debug!(display = %s.display, "display time set");
    }

    /// Step the displayed hour up or down by one.
    pub fn change_hours(&self, up: bool) {
        let mut s = self.shared.state.lock();
        s.display = s.display.add_hours(if up { 1 } else { -1 });
        s.alarm_time = s.display;
    }

    /// Step the displayed minutes up or down by the configured step.
    pub fn change_minutes(&self, up: bool) {
        let step = self.shared.config.minutes_step_size;
        let delta = if up { step as i32 } else { -(step as i32) };
        let mut s = self.shared.state.lock();
        s.display = s.display.add_minutes(delta, step);
        s.alarm_time = s.display;
    }

    /// Arm the alarm for the next occurrence of the displayed time and
    /// start polling. A currently ringing alarm is stopped first. Arming
    /// while already armed re-arms at the displayed time.
    pub async fn arm(&self) {
        let events = {
            let mut s = self.shared.state.lock();
            if s.phase == TimerPhase::PollingForTimeout {
                Shared::stop_ringing_locked(&mut s, self.shared.sound.as_ref());
            }
            vec![self.shared.arm_locked(&mut s, None)]
        };
        self.shared.emit(events).await;
    }

    /// Disarm and return to idle. Safe to call repeatedly; only an actual
    /// armed-to-disarmed transition emits a state change.
    pub async fn disarm(&self) {
        let events = {
            let mut s = self.shared.state.lock();
            Shared::disarm_locked(&mut s, self.shared.sound.as_ref())
                .into_iter()
                .collect()
        };
        self.shared.emit(events).await;
    }

    /// Re-arm a ringing alarm at the next snooze offset.
    ///
    /// Rejected with [`AlarmError::NotRinging`] when no alarm is ringing;
    /// no state is touched in that case.
    pub async fn snooze(&self) -> Result<()> {
        let events = {
            let mut s = self.shared.state.lock();
            if s.phase != TimerPhase::PollingForTimeout {
                return Err(AlarmError::NotRinging);
            }
            Shared::stop_ringing_locked(&mut s, self.shared.sound.as_ref());

            let now = self.shared.clock.now();
            let base = s.snooze_base.unwrap_or(s.alarm_time);
            let next_time = s.engine.next_snooze(base);
            s.snooze_base = Some(next_time);
            s.alarm_time = next_time;
            s.fired_at = None;
            let instant = s.scheduler.arm_snooze(next_time, now);
            s.phase = TimerPhase::PollingForFire;
            s.runner = Some(self.shared.spawn_runner());
            info!(snooze_time = %next_time, %instant, "alarm snoozed");

            vec![
                AlarmEvent::Changed {
                    active: true,
                    next_alarm: Some(instant),
                    hour: next_time.hour(),
                    minutes: next_time.minute(),
                },
                AlarmEvent::Snoozed {
                    hour: next_time.hour(),
                    minutes: next_time.minute(),
                },
            ]
        };
        self.shared.emit(events).await;
        Ok(())
    }

    /// Cancel a ringing alarm unconditionally: sound off, fade and timeout
    /// polling cancelled, schedule disarmed. No-op when nothing is
    /// ringing. After this returns, nothing further fires.
    pub fn stop(&self) {
        let mut s = self.shared.state.lock();
        if s.phase != TimerPhase::PollingForTimeout {
            return;
        }
        Shared::stop_ringing_locked(&mut s, self.shared.sound.as_ref());
        s.scheduler.disarm();
        s.fired_at = None;
        s.phase = TimerPhase::Idle;
        if let Some(runner) = s.runner.take() {
            runner.cancel();
        }
        info!("ringing alarm stopped");
    }

    /// Dispatch an inbound boundary command.
    pub async fn handle_command(&self, command: AlarmCommand) -> Result<()> {
        debug!(?command, "inbound command");
        match command {
            AlarmCommand::UpdateAlarm {
                hour,
                minutes,
                active,
                next_alarm,
            } => self.update_alarm(hour, minutes, active, next_alarm).await,
            AlarmCommand::ChangeMinutes { up } => {
                self.change_minutes(up);
                Ok(())
            }
            AlarmCommand::ChangeHours { up } => {
                self.change_hours(up);
                Ok(())
            }
            AlarmCommand::TurnOnOff { on } => {
                if on {
                    self.arm().await;
                } else {
                    self.disarm().await;
                }
                Ok(())
            }
            AlarmCommand::TriggerSnooze => self.snooze().await,
        }
    }

    /// Restore a previously persisted record, then immediately re-check
    /// whether the restored schedule is already due.
    pub async fn restore(&self, record: AlarmRecord) -> Result<()> {
        self.handle_command(AlarmCommand::UpdateAlarm {
            hour: record.hour as i32,
            minutes: record.minutes as i32,
            active: record.active,
            next_alarm: record.next_alarm,
        })
        .await
    }

    async fn update_alarm(
        &self,
        hour: i32,
        minutes: i32,
        active: bool,
        next_alarm: Option<NaiveDateTime>,
    ) -> Result<()> {
        let events = {
            let mut s = self.shared.state.lock();
            if s.phase == TimerPhase::PollingForTimeout {
                Shared::stop_ringing_locked(&mut s, self.shared.sound.as_ref());
            }
            s.display = ClockTime::from_hm(hour, minutes);
            s.alarm_time = s.display;

            if active {
                vec![self.shared.arm_locked(&mut s, next_alarm)]
            } else {
                Shared::disarm_locked(&mut s, self.shared.sound.as_ref())
                    .into_iter()
                    .collect()
            }
        };
        self.shared.emit(events).await;

        if active {
            // a pushed instant may already lie in the past
            self.shared.tick_once().await;
        }
        Ok(())
    }
}

impl Shared {
    /// Arm the primary alarm and (re)start the poll task. With `restored`,
    /// the pushed instant is trusted instead of recomputed.
    fn arm_locked(self: &Arc<Self>, s: &mut Inner, restored: Option<NaiveDateTime>) -> AlarmEvent {
        let now = self.clock.now();
        let instant = match restored {
            Some(instant) => {
                s.scheduler.restore_primary(instant);
                instant
            }
            None => s.scheduler.arm(s.display, now),
        };
        s.alarm_time = s.display;
        s.snooze_base = None;
        s.fired_at = None;
        s.phase = TimerPhase::PollingForFire;
        // replacing the slot aborts any previous poller
        s.runner = Some(self.spawn_runner());
        info!(alarm_time = %s.alarm_time, %instant, "alarm armed");

        AlarmEvent::Changed {
            active: true,
            next_alarm: Some(instant),
            hour: s.alarm_time.hour(),
            minutes: s.alarm_time.minute(),
        }
    }

    /// Disarm whatever is armed or ringing. Returns the state-change event
    /// if the armed flag actually flipped.
    fn disarm_locked(s: &mut Inner, sound: &dyn SoundOutput) -> Option<AlarmEvent> {
        let was_ringing = s.phase == TimerPhase::PollingForTimeout;
        let was_armed = s.scheduler.is_armed();
        if !was_armed && !was_ringing && s.phase == TimerPhase::Idle {
            debug!("disarm with nothing armed");
            return None;
        }

        if was_ringing {
            Self::stop_ringing_locked(s, sound);
        }
        s.scheduler.disarm();
        s.snooze_base = None;
        s.fired_at = None;
        s.phase = TimerPhase::Idle;
        if let Some(runner) = s.runner.take() {
            runner.cancel();
        }
        info!("alarm disarmed");

        was_armed.then(|| AlarmEvent::Changed {
            active: false,
            next_alarm: None,
            hour: s.alarm_time.hour(),
            minutes: s.alarm_time.minute(),
        })
    }

    fn start_ringing_locked(self: &Arc<Self>, s: &mut Inner) {
        if !self.config.alarm_sound {
            return;
        }
        let max = self.config.alarm_sound_max_volume;
        if self.config.alarm_sound_fade {
            self.sound.start(&self.config.alarm_sound_file, 0.0);
            if let Some(old) = s.fade.take() {
                old.cancel();
            }
            s.fade = Some(spawn_fade(
                Arc::clone(&self.sound),
                FadeState::new(max, self.config.alarm_sound_fade_seconds),
            ));
        } else {
            self.sound.start(&self.config.alarm_sound_file, max);
        }
    }

    fn stop_ringing_locked(s: &mut Inner, sound: &dyn SoundOutput) {
        if let Some(fade) = s.fade.take() {
            fade.cancel();
        }
        sound.stop();
    }

    fn spawn_runner(self: &Arc<Self>) -> RunnerGuard {
        let shared = Arc::clone(self);
        RunnerGuard::new(tokio::spawn(async move {
            let mut interval = poll_interval();
            loop {
                interval.tick().await;
                if !shared.tick_once().await {
                    break;
                }
            }
        }))
    }

    /// One poll: evaluate "now" against the current phase. Returns whether
    /// the poll task should keep running.
    async fn tick_once(self: &Arc<Self>) -> bool {
        let now = self.clock.now();
        let (events, keep_running) = {
            let mut s = self.state.lock();
            match s.phase {
                TimerPhase::Idle => (Vec::new(), false),
                TimerPhase::PollingForFire => {
                    let due = s
                        .scheduler
                        .next_instant()
                        .map(|instant| timer::fire_due(now, instant))
                        .unwrap_or(false);
                    if due {
                        let was_primary =
                            matches!(s.scheduler.state(), AlarmState::ArmedPrimary(_));
                        // one-shot: the schedule is cleared before anything
                        // else can observe this tick
                        s.scheduler.disarm();
                        if was_primary {
                            s.snooze_base = None;
                        }
                        s.phase = TimerPhase::PollingForTimeout;
                        s.fired_at = Some(now);
                        self.start_ringing_locked(&mut s);
                        info!(alarm_time = %s.alarm_time, "alarm fired");

                        let (hour, minutes) = (s.alarm_time.hour(), s.alarm_time.minute());
                        (
                            vec![
                                AlarmEvent::Fired { hour, minutes },
                                AlarmEvent::Changed {
                                    active: false,
                                    next_alarm: None,
                                    hour,
                                    minutes,
                                },
                            ],
                            true,
                        )
                    } else {
                        (Vec::new(), true)
                    }
                }
                TimerPhase::PollingForTimeout => {
                    let timed_out = s
                        .fired_at
                        .map(|fired| timer::timeout_due(now, fired, self.config.alarm_timeout_minutes))
                        .unwrap_or(false);
                    if timed_out {
                        warn!(
                            timeout_minutes = self.config.alarm_timeout_minutes,
                            "alarm unacknowledged, timing out"
                        );
                        Self::stop_ringing_locked(&mut s, self.sound.as_ref());
                        s.scheduler.disarm();
                        s.fired_at = None;
                        s.phase = TimerPhase::Idle;
                        // the poll task ends on its own; no self-abort
                        (Vec::new(), false)
                    } else {
                        (Vec::new(), true)
                    }
                }
            }
        };
        self.emit(events).await;
        keep_running
    }

    async fn emit(&self, events: Vec<AlarmEvent>) {
        if events.is_empty() {
            return;
        }
        let sinks = self.sinks.read().clone();
        for event in events {
            for sink in &sinks {
                sink.send(event.clone()).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{at, CollectingSink, ManualClock, RecordingSound, SoundCall};
    use chrono::Duration;
    use std::time::Duration as StdDuration;

    fn setup(
        now: NaiveDateTime,
        config: AlarmConfig,
    ) -> (
        AlarmController,
        Arc<ManualClock>,
        Arc<RecordingSound>,
        Arc<CollectingSink>,
    ) {
        let clock = Arc::new(ManualClock::starting_at(now));
        let sound = Arc::new(RecordingSound::default());
        let controller =
            AlarmController::with_collaborators(config, clock.clone(), sound.clone()).unwrap();
        let sink = Arc::new(CollectingSink::default());
        controller.add_sink(sink.clone());
        (controller, clock, sound, sink)
    }

    async fn ticks(n: u64) {
        tokio::time::sleep(StdDuration::from_secs(n)).await;
    }

    #[test]
    fn test_invalid_configuration_is_refused() {
        let config = AlarmConfig {
            snooze_minutes: 0,
            ..Default::default()
        };
        let err = AlarmController::new(config).unwrap_err();
        assert!(matches!(err, AlarmError::InvalidConfiguration { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_arm_past_target_schedules_tomorrow() {
        let (controller, _clock, _sound, sink) = setup(at(7, 1, 0), AlarmConfig::default());

        controller.set_display_time(7, 0);
        controller.arm().await;

        let snapshot = controller.snapshot();
        assert!(snapshot.active);
        assert_eq!(snapshot.next_alarm, Some(at(7, 0, 0) + Duration::days(1)));
        assert_eq!(sink.changed_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_exactly_once_then_times_out() {
        let (controller, clock, sound, sink) = setup(at(7, 1, 0), AlarmConfig::default());

        controller.set_display_time(7, 0);
        controller.arm().await;

        // next day, right at the target
        clock.set(at(7, 0, 0) + Duration::days(1));
        ticks(2).await;

        assert_eq!(sink.fired_count(), 1);
        assert!(controller.is_ringing());
        assert!(!controller.is_armed());
        assert_eq!(sound.start_count(), 1);

        // keeps ringing, does not re-fire
        ticks(5).await;
        assert_eq!(sink.fired_count(), 1);

        // unacknowledged past the timeout: automatic stop
        clock.advance(Duration::minutes(5));
        ticks(2).await;
        assert!(!controller.is_ringing());
        assert!(sound.stop_count() >= 1);

        // quiet afterwards
        let events_before = sink.events().len();
        clock.advance(Duration::minutes(10));
        ticks(10).await;
        assert_eq!(sink.events().len(), events_before);
        assert_eq!(sink.fired_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_snooze_chain_accumulates() {
        let (controller, clock, _sound, sink) = setup(at(7, 50, 0), AlarmConfig::default());

        controller.set_display_time(7, 58);
        controller.arm().await;

        clock.set(at(7, 58, 0));
        ticks(2).await;
        assert!(controller.is_ringing());

        controller.snooze().await.unwrap();
        assert_eq!(controller.snapshot().next_alarm, Some(at(8, 3, 0)));
        assert!(sink
            .events()
            .contains(&AlarmEvent::Snoozed { hour: 8, minutes: 3 }));

        clock.set(at(8, 3, 0));
        ticks(2).await;
        assert_eq!(sink.fired_count(), 2);

        controller.snooze().await.unwrap();
        assert_eq!(controller.snapshot().next_alarm, Some(at(8, 8, 0)));
        assert!(sink
            .events()
            .contains(&AlarmEvent::Snoozed { hour: 8, minutes: 8 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_chain_resets_after_fresh_primary_fire() {
        let (controller, clock, _sound, sink) = setup(at(7, 50, 0), AlarmConfig::default());

        controller.set_display_time(7, 58);
        controller.arm().await;
        clock.set(at(7, 58, 0));
        ticks(2).await;
        controller.snooze().await.unwrap();

        // user re-arms the original time for the next morning
        controller.set_display_time(7, 58);
        controller.arm().await;
        clock.set(at(7, 58, 0) + Duration::days(1));
        ticks(2).await;
        assert!(controller.is_ringing());

        // first snooze of the new chain bases off the primary target again
        controller.snooze().await.unwrap();
        assert_eq!(
            sink.events()
                .iter()
                .filter(|e| matches!(e, AlarmEvent::Snoozed { hour: 8, minutes: 3 }))
                .count(),
            2
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_snooze_rejected_when_not_ringing() {
        let (controller, _clock, _sound, sink) = setup(at(7, 0, 0), AlarmConfig::default());

        let err = controller.snooze().await.unwrap_err();
        assert!(matches!(err, AlarmError::NotRinging));
        assert!(sink.events().is_empty());
        assert!(!controller.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_disarm_emits_single_change() {
        let (controller, _clock, _sound, sink) = setup(at(7, 0, 0), AlarmConfig::default());

        controller.set_display_time(8, 0);
        controller.arm().await;
        assert_eq!(sink.changed_count(), 1);

        controller.disarm().await;
        assert_eq!(sink.changed_count(), 2);

        controller.disarm().await;
        assert_eq!(sink.changed_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_cancels_pending_fire() {
        let (controller, clock, _sound, sink) = setup(at(7, 0, 0), AlarmConfig::default());

        controller.set_display_time(7, 1);
        controller.arm().await;
        controller.disarm().await;

        clock.set(at(7, 5, 0));
        ticks(3).await;
        assert_eq!(sink.fired_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_arm_while_ringing_stops_the_ring_first() {
        let (controller, clock, sound, _sink) = setup(at(6, 59, 0), AlarmConfig::default());

        controller.set_display_time(7, 0);
        controller.arm().await;
        clock.set(at(7, 0, 0));
        ticks(2).await;
        assert!(controller.is_ringing());

        controller.arm().await;
        assert!(!controller.is_ringing());
        assert!(controller.is_armed());
        assert!(sound.stop_count() >= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_acknowledges_ringing() {
        let (controller, clock, sound, sink) = setup(at(6, 59, 0), AlarmConfig::default());

        controller.set_display_time(7, 0);
        controller.arm().await;
        clock.set(at(7, 0, 0));
        ticks(2).await;
        assert!(controller.is_ringing());

        controller.stop();
        assert!(!controller.is_ringing());
        assert!(!controller.is_armed());
        assert!(sound.stop_count() >= 1);

        // stop is not a state-change the boundary needs to hear about
        let events_before = sink.events().len();
        ticks(5).await;
        assert_eq!(sink.events().len(), events_before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_display_does_not_affect_armed_schedule() {
        let (controller, _clock, _sound, _sink) = setup(at(6, 0, 0), AlarmConfig::default());

        controller.set_display_time(7, 0);
        controller.arm().await;
        let armed_instant = controller.snapshot().next_alarm;

        controller.set_display_time(9, 30);
        assert_eq!(controller.display_time(), ClockTime::from_hm(9, 30));
        assert_eq!(controller.snapshot().next_alarm, armed_instant);
    }

    #[tokio::test(start_paused = true)]
    async fn test_change_steps_follow_the_grid() {
        let config = AlarmConfig {
            minutes_step_size: 5,
            ..Default::default()
        };
        let (controller, _clock, _sound, _sink) = setup(at(6, 0, 0), config);

        // defaults show 05:20
        controller.change_minutes(false);
        assert_eq!(controller.display_time(), ClockTime::from_hm(5, 15));

        controller.set_display_time(5, 0);
        controller.change_minutes(false);
        assert_eq!(controller.display_time(), ClockTime::from_hm(4, 55));

        controller.change_hours(true);
        assert_eq!(controller.display_time(), ClockTime::from_hm(5, 55));
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_alarm_restores_and_fires_immediately() {
        let (controller, _clock, _sound, sink) = setup(at(6, 30, 0), AlarmConfig::default());

        // restored instant is already in the past
        controller
            .restore(AlarmRecord {
                hour: 6,
                minutes: 0,
                active: true,
                next_alarm: Some(at(6, 0, 0)),
            })
            .await
            .unwrap();

        assert_eq!(sink.fired_count(), 1);
        assert!(controller.is_ringing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_alarm_inactive_disarms() {
        let (controller, _clock, _sound, sink) = setup(at(6, 0, 0), AlarmConfig::default());

        controller.set_display_time(7, 0);
        controller.arm().await;

        controller
            .handle_command(AlarmCommand::UpdateAlarm {
                hour: 7,
                minutes: 0,
                active: false,
                next_alarm: None,
            })
            .await
            .unwrap();

        assert!(!controller.is_armed());
        assert_eq!(sink.changed_count(), 2);
        assert!(matches!(
            sink.events().last(),
            Some(AlarmEvent::Changed { active: false, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_turn_onoff_commands_arm_and_disarm() {
        let (controller, _clock, _sound, _sink) = setup(at(6, 0, 0), AlarmConfig::default());

        controller
            .handle_command(AlarmCommand::TurnOnOff { on: true })
            .await
            .unwrap();
        assert!(controller.is_armed());

        controller
            .handle_command(AlarmCommand::TurnOnOff { on: false })
            .await
            .unwrap();
        assert!(!controller.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sound_disabled_still_fires_and_times_out() {
        let config = AlarmConfig {
            alarm_sound: false,
            ..Default::default()
        };
        let (controller, clock, sound, sink) = setup(at(6, 59, 0), config);

        controller.set_display_time(7, 0);
        controller.arm().await;
        clock.set(at(7, 0, 0));
        ticks(2).await;

        assert_eq!(sink.fired_count(), 1);
        assert_eq!(sound.start_count(), 0);

        clock.advance(Duration::minutes(5));
        ticks(2).await;
        assert!(!controller.is_ringing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fade_disabled_starts_at_max_volume() {
        let config = AlarmConfig {
            alarm_sound_fade: false,
            alarm_sound_max_volume: 0.8,
            ..Default::default()
        };
        let (controller, clock, sound, _sink) = setup(at(6, 59, 0), config);

        controller.set_display_time(7, 0);
        controller.arm().await;
        clock.set(at(7, 0, 0));
        ticks(2).await;

        assert!(sound.calls().contains(&SoundCall::Start {
            source: "alarm.mp3".to_string(),
            volume: 0.8,
        }));
        assert!(sound.volumes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fade_ramps_while_ringing() {
        let config = AlarmConfig {
            alarm_sound_fade_seconds: 4,
            ..Default::default()
        };
        let (controller, clock, sound, _sink) = setup(at(6, 59, 0), config);

        controller.set_display_time(7, 0);
        controller.arm().await;
        clock.set(at(7, 0, 0));
        ticks(6).await;

        assert!(sound.calls().contains(&SoundCall::Start {
            source: "alarm.mp3".to_string(),
            volume: 0.0,
        }));
        let volumes = sound.volumes();
        assert_eq!(volumes.len(), 4);
        assert_eq!(*volumes.last().unwrap(), 1.0);
    }
}
