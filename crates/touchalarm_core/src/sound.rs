//! Sound-output collaborator boundary.

/// Playback surface the core drives when an alarm rings.
///
/// The core only knows "loop this source at this volume"; devices, codecs
/// and file resolution live on the other side of this trait. Calls are
/// synchronous and infallible: the alarm state machine keeps ringing and
/// timing out the same way whether or not playback actually happened.
pub trait SoundOutput: Send + Sync {
    /// Start looping playback of `source` at `volume` (0.0..=1.0).
    fn start(&self, source: &str, volume: f64);

    /// Adjust the volume of the running playback.
    fn set_volume(&self, volume: f64);

    /// Stop playback. Must be safe to call when nothing is playing.
    fn stop(&self);
}

/// Sound output that does nothing. Default collaborator for hosts without
/// audio and for tests that only care about state transitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSound;

impl SoundOutput for NullSound {
    fn start(&self, _source: &str, _volume: f64) {}

    fn set_volume(&self, _volume: f64) {}

    fn stop(&self) {}
}
