//! Configuration surface for the alarm core.
//!
//! All knobs are externally supplied and validated once at load time; the
//! controller refuses to start on a bad configuration instead of silently
//! falling back to defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration consumed by the alarm controller.
///
/// Field defaults mirror a small bedside alarm: one-minute steps, a five
/// minute snooze, a five minute ring timeout and a 30 second volume fade.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmConfig {
    /// Step applied by a single minute increment/decrement.
    pub minutes_step_size: u32,

    /// Minutes added per snooze cycle.
    pub snooze_minutes: u32,

    /// How long an unacknowledged ringing alarm keeps ringing before it is
    /// cancelled automatically.
    pub alarm_timeout_minutes: u32,

    /// Master switch for alarm sound. Firing and timeout behavior are
    /// unaffected when this is off.
    pub alarm_sound: bool,

    /// Sound source handed to the sound collaborator, e.g. a file name.
    pub alarm_sound_file: String,

    /// Playback volume ceiling, 0.0..=1.0.
    pub alarm_sound_max_volume: f64,

    /// Ramp the volume from zero instead of starting at the ceiling.
    pub alarm_sound_fade: bool,

    /// Seconds the volume ramp takes to reach the ceiling.
    pub alarm_sound_fade_seconds: u32,

    /// Hour shown for editing before any alarm has been set.
    pub default_hour: u8,

    /// Minutes shown for editing before any alarm has been set.
    pub default_minutes: u8,

    /// File the persisted alarm record is stored in.
    pub store_file: PathBuf,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            minutes_step_size: 1,
            snooze_minutes: 5,
            alarm_timeout_minutes: 5,
            alarm_sound: true,
            alarm_sound_file: "alarm.mp3".to_string(),
            alarm_sound_max_volume: 1.0,
            alarm_sound_fade: true,
            alarm_sound_fade_seconds: 30,
            default_hour: 5,
            default_minutes: 20,
            store_file: PathBuf::from("alarm.json"),
        }
    }
}

impl AlarmConfig {
    /// Load a configuration from a TOML file and validate it.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config: AlarmConfig =
            toml::from_str(&content).map_err(|e| ConfigError::TomlParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every invariant the rest of the core relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &str, reason: &str) -> ConfigError {
            ConfigError::InvalidValue {
                field: field.to_string(),
                reason: reason.to_string(),
            }
        }

        if self.minutes_step_size < 1 || self.minutes_step_size > 59 {
            return Err(invalid("minutes_step_size", "must be between 1 and 59"));
        }
        if self.snooze_minutes < 1 {
            return Err(invalid("snooze_minutes", "must be at least 1"));
        }
        if self.alarm_timeout_minutes < 1 {
            return Err(invalid("alarm_timeout_minutes", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.alarm_sound_max_volume) {
            return Err(invalid(
                "alarm_sound_max_volume",
                "must be between 0.0 and 1.0",
            ));
        }
        if self.alarm_sound_fade && self.alarm_sound_fade_seconds == 0 {
            return Err(invalid(
                "alarm_sound_fade_seconds",
                "must be greater than 0 when fading is enabled",
            ));
        }
        if self.default_hour > 23 {
            return Err(invalid("default_hour", "must be between 0 and 23"));
        }
        if self.default_minutes > 59 {
            return Err(invalid("default_minutes", "must be between 0 and 59"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AlarmConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.snooze_minutes, 5);
        assert_eq!(config.default_hour, 5);
        assert_eq!(config.default_minutes, 20);
    }

    #[test]
    fn test_config_serialization() {
        let config = AlarmConfig::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("minutes_step_size"));
        assert!(toml.contains("alarm_sound_fade_seconds"));

        let back: AlarmConfig = toml::from_str(&toml).unwrap();
        assert_eq!(back.alarm_sound_file, "alarm.mp3");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AlarmConfig = toml::from_str("snooze_minutes = 10").unwrap();
        assert_eq!(config.snooze_minutes, 10);
        assert_eq!(config.alarm_timeout_minutes, 5);
        assert!(config.alarm_sound);
    }

    #[test]
    fn test_rejects_zero_step() {
        let config = AlarmConfig {
            minutes_step_size: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "minutes_step_size"
        ));
    }

    #[test]
    fn test_rejects_zero_fade_seconds_only_when_fading() {
        let mut config = AlarmConfig {
            alarm_sound_fade_seconds: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.alarm_sound_fade = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_volume() {
        let config = AlarmConfig {
            alarm_sound_max_volume: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
