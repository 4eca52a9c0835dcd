use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration-specific errors
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid value for field {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Error, Diagnostic, Debug)]
pub enum AlarmError {
    #[error("Invalid alarm configuration")]
    #[diagnostic(
        code(touchalarm_core::invalid_configuration),
        help("Check the alarm configuration; step, snooze and timeout values must be positive")
    )]
    InvalidConfiguration {
        #[source]
        cause: ConfigError,
    },

    #[error("No alarm is ringing")]
    #[diagnostic(
        code(touchalarm_core::not_ringing),
        help("Snoozing is only valid while an alarm is ringing and has not timed out")
    )]
    NotRinging,

    #[error("Alarm store operation failed for {path}")]
    #[diagnostic(
        code(touchalarm_core::store_failed),
        help("Check that the alarm store file exists and is readable/writable")
    )]
    StoreFailed { path: String, cause: String },

    #[error("Malformed alarm record: {details}")]
    #[diagnostic(
        code(touchalarm_core::malformed_record),
        help("The persisted alarm record could not be parsed; delete it to start fresh")
    )]
    MalformedRecord { details: String },
}

pub type Result<T> = std::result::Result<T, AlarmError>;
