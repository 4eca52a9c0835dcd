//! Persistence collaborator boundary.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AlarmError, Result};

/// The persisted alarm state.
///
/// Shape matches what the controller reports in `Changed` events; a store
/// can persist those payloads verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlarmRecord {
    pub hour: u8,
    pub minutes: u8,
    pub active: bool,
    #[serde(rename = "nextAlarm")]
    pub next_alarm: Option<NaiveDateTime>,
}

/// Where alarm state survives restarts.
#[async_trait]
pub trait AlarmStore: Send + Sync {
    /// Previously persisted record, or `None` if nothing was stored yet.
    async fn load(&self) -> Result<Option<AlarmRecord>>;

    async fn save(&self, record: &AlarmRecord) -> Result<()>;
}

/// JSON file store, one record per file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn store_failed(&self, cause: impl ToString) -> AlarmError {
        AlarmError::StoreFailed {
            path: self.path.display().to_string(),
            cause: cause.to_string(),
        }
    }
}

#[async_trait]
impl AlarmStore for JsonFileStore {
    async fn load(&self) -> Result<Option<AlarmRecord>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.store_failed(e)),
        };
        let record = serde_json::from_slice(&bytes).map_err(|e| AlarmError::MalformedRecord {
            details: format!("{}: {}", self.path.display(), e),
        })?;
        debug!(path = %self.path.display(), "loaded alarm record");
        Ok(Some(record))
    }

    async fn save(&self, record: &AlarmRecord) -> Result<()> {
        let json = serde_json::to_vec_pretty(record).map_err(|e| self.store_failed(e))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| self.store_failed(e))?;
        debug!(path = %self.path.display(), active = record.active, "saved alarm record");
        Ok(())
    }
}
