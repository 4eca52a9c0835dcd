//! Sound collaborator for hosts without audio hardware: playback is
//! logged, not played.

use touchalarm_core::SoundOutput;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default)]
pub struct LogSound;

impl SoundOutput for LogSound {
    fn start(&self, source: &str, volume: f64) {
        info!(source, volume, "sound: start looping playback");
    }

    fn set_volume(&self, volume: f64) {
        debug!(volume, "sound: volume");
    }

    fn stop(&self) {
        info!("sound: stop playback");
    }
}
