use crate::error::{BotError, Result};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::{info, warn};

/// Single-value timestamp file marking the cutoff for already-seen threads.
///
/// The file holds an ASCII decimal unix timestamp and nothing else.
pub struct WatermarkStore {
    path: PathBuf,
    lookback_secs: i64,
}

impl WatermarkStore {
    pub fn new(path: impl Into<PathBuf>, lookback_secs: i64) -> Self {
        Self {
            path: path.into(),
            lookback_secs,
        }
    }

    #[cfg(test)]
    pub(crate) fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Read the stored watermark, or fall back to `now - lookback` when the
    /// file is missing, empty or unparseable. Never fails.
    pub fn load(&self, now: DateTime<Utc>) -> i64 {
        let fallback = now.timestamp() - self.lookback_secs;
        match self.read() {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, fallback, "Using default watermark");
                fallback
            }
        }
    }

    fn read(&self) -> Result<i64> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| {
            BotError::Persistence {
                path: self.path.clone(),
                source,
            }
        })?;

        let content = content.trim();
        if content.is_empty() {
            return Err(BotError::Shape(format!(
                "{} is empty",
                self.path.display()
            )));
        }

        content.parse::<i64>().map_err(|e| {
            BotError::Shape(format!("{}: {e}: {content:?}", self.path.display()))
        })
    }

    /// Overwrite the stored watermark with `now`. A write failure is logged
    /// and reported as `false`; the next run falls back to the lookback window.
    pub fn save(&self, now: DateTime<Utc>) -> bool {
        match std::fs::write(&self.path, now.timestamp().to_string()) {
            Ok(()) => {
                info!(path = %self.path.display(), watermark = now.timestamp(), "Watermark saved");
                true
            }
            Err(source) => {
                let e = BotError::Persistence {
                    path: self.path.clone(),
                    source,
                };
                tracing::error!(error = %e, "Failed to save watermark");
                false
            }
        }
    }
}
