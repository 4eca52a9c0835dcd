//! Volume fade-in for the alarm sound.

use std::sync::Arc;

use tracing::trace;

use crate::sound::SoundOutput;
use crate::timer::{poll_interval, RunnerGuard};

/// Linear ramp from zero to a volume ceiling, one step per second.
///
/// Pure state; the ticking lives in [`spawn_fade`]. The last tick snaps to
/// the ceiling exactly instead of trusting accumulated float steps.
#[derive(Debug, Clone, Copy)]
pub struct FadeState {
    current: f64,
    target: f64,
    step_per_tick: f64,
    fade_seconds: u32,
    elapsed_ticks: u32,
}

impl FadeState {
    /// A ramp reaching `max_volume` after `fade_seconds` ticks.
    ///
    /// `fade_seconds` must be positive; configuration validation enforces
    /// that before a fade can exist.
    pub fn new(max_volume: f64, fade_seconds: u32) -> Self {
        Self {
            current: 0.0,
            target: max_volume,
            step_per_tick: max_volume / fade_seconds as f64,
            fade_seconds,
            elapsed_ticks: 0,
        }
    }

    /// A "ramp" that is already at the ceiling, for hosts with fading
    /// disabled.
    pub fn immediate(max_volume: f64) -> Self {
        Self {
            current: max_volume,
            target: max_volume,
            step_per_tick: 0.0,
            fade_seconds: 0,
            elapsed_ticks: 0,
        }
    }

    /// Advance one second and return the new volume.
    pub fn tick(&mut self) -> f64 {
        self.elapsed_ticks += 1;
        if self.elapsed_ticks >= self.fade_seconds {
            self.current = self.target;
        } else {
            self.current = (self.current + self.step_per_tick).min(self.target);
        }
        self.current
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    /// The ceiling was reached; ticking should stop.
    pub fn done(&self) -> bool {
        self.current >= self.target
    }
}

/// Start the once-per-second fade ticker driving `sound`.
///
/// The returned guard is the only handle; replacing or dropping it stops
/// the ramp, so two faders can never run concurrently as long as the
/// caller keeps a single slot for the guard. The ticker stops on its own
/// once the ceiling is reached.
pub(crate) fn spawn_fade(sound: Arc<dyn SoundOutput>, mut fade: FadeState) -> RunnerGuard {
    RunnerGuard::new(tokio::spawn(async move {
        let mut interval = poll_interval();
        // burn the immediate first tick; the first audible step lands a
        // second after the sound starts
        interval.tick().await;
        while !fade.done() {
            interval.tick().await;
            let volume = fade.tick();
            trace!(volume, "fade step");
            sound.set_volume(volume);
        }
    }))
}
