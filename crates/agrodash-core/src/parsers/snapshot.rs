//! Snapshot parser with retry on parse failure

use crate::error::{CoreError, ErrorSeverity, LoadError, LoadReport};
use crate::models::Snapshot;
use crate::store::DataStore;
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Parser for JSON snapshot exports
pub struct SnapshotParser {
    /// Maximum retry attempts
    max_retries: u32,
    /// Delay between retries
    retry_delay: Duration,
}

impl Default for SnapshotParser {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_delay: Duration::from_millis(100),
        }
    }
}

impl SnapshotParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retries(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }

    /// Parse a snapshot file, retrying on parse failure
    ///
    /// An export job may still be writing the file. A missing file is not
    /// retried.
    pub async fn parse(&self, path: &Path) -> Result<Snapshot, CoreError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                debug!(attempt, "Retrying snapshot parse after delay");
                sleep(self.retry_delay).await;
            }

            match self.try_parse(path).await {
                Ok(snapshot) => return Ok(snapshot),
                Err(e @ CoreError::FileNotFound { .. }) => return Err(e),
                Err(e) => {
                    warn!(attempt, error = %e, "Snapshot parse attempt failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::FileNotFound {
            path: path.to_path_buf(),
        }))
    }

    /// Single parse attempt
    async fn try_parse(&self, path: &Path) -> Result<Snapshot, CoreError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CoreError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                CoreError::FileRead {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        serde_json::from_str(&content).map_err(|e| CoreError::JsonParse {
            path: path.to_path_buf(),
            message: e.to_string(),
            source: e,
        })
    }

    /// Parse with graceful degradation, recording errors in LoadReport
    pub async fn parse_graceful(&self, path: &Path, report: &mut LoadReport) -> Option<Snapshot> {
        match self.parse(path).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                let error = LoadError::from_core_error("snapshot", &e);
                report.add_error(LoadError {
                    severity: ErrorSeverity::Fatal,
                    ..error
                });
                None
            }
        }
    }

    /// Parse `path` and load it into `store`
    pub async fn load_into(&self, path: &Path, store: &DataStore) -> LoadReport {
        let mut report = LoadReport::new();
        if let Some(snapshot) = self.parse_graceful(path, &mut report).await {
            report.merge(store.load_snapshot(snapshot));
        }
        report
    }
}
