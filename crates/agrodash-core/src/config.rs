//! Configuration for the analytics engine and the data store
//!
//! Loaded from an optional TOML file:
//!
//! ```toml
//! [engine]
//! query_timeout_ms = 5000
//! root_timeout_ms = 2000
//! monthly_layout = "sparse"   # or "dense"
//!
//! [store]
//! enforce_references = true
//! event_capacity = 256
//! ```
//!
//! Every key is optional and falls back to its default.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::analytics::MonthlyLayout;
use crate::error::CoreError;
use crate::store::DataStoreConfig;

/// Analytics engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Budget for each independent sub-query
    pub query_timeout_ms: u64,

    /// Budget for the root entity lookup of a detail request
    pub root_timeout_ms: u64,

    pub monthly_layout: MonthlyLayout,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            query_timeout_ms: 5_000,
            root_timeout_ms: 2_000,
            monthly_layout: MonthlyLayout::Sparse,
        }
    }
}

impl EngineConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn root_timeout(&self) -> Duration {
        Duration::from_millis(self.root_timeout_ms)
    }

    /// Reject settings that would make every request fail
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.query_timeout_ms == 0 {
            return Err(CoreError::InvalidConfig {
                message: "engine.query_timeout_ms must be greater than zero".to_string(),
            });
        }
        if self.root_timeout_ms == 0 {
            return Err(CoreError::InvalidConfig {
                message: "engine.root_timeout_ms must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Store settings as written in the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub enforce_references: bool,
    pub event_capacity: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        let defaults = DataStoreConfig::default();
        Self {
            enforce_references: defaults.enforce_references,
            event_capacity: defaults.event_capacity,
        }
    }
}

impl From<&StoreSettings> for DataStoreConfig {
    fn from(settings: &StoreSettings) -> Self {
        Self {
            enforce_references: settings.enforce_references,
            event_capacity: settings.event_capacity,
        }
    }
}

/// Whole config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub engine: EngineConfig,
    pub store: StoreSettings,
}

impl Settings {
    /// Load and validate settings from a TOML file
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        if !path.exists() {
            return Err(CoreError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let settings = Self::parse(&content, path)?;
        debug!(path = %path.display(), ?settings, "Loaded settings");
        Ok(settings)
    }

    /// Load from `path` when it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self, CoreError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    fn parse(content: &str, path: &Path) -> Result<Self, CoreError> {
        let settings: Settings = toml::from_str(content).map_err(|e| CoreError::TomlParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        self.engine.validate()?;
        if self.store.event_capacity == 0 {
            return Err(CoreError::InvalidConfig {
                message: "store.event_capacity must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn store_config(&self) -> DataStoreConfig {
        DataStoreConfig::from(&self.store)
    }
}
