//! History table configuration
//!
//! Loaded from a YAML file such as:
//!
//! ```yaml
//! file_name: history.xml
//! tolerance_ms: 500
//! ```

use crate::error::{HistoryError, HistoryResult};
use crate::timestamp::{FILETIME_EPSILON_MS, Tolerance};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Name of the history file inside the output directory.
pub const DEFAULT_HISTORY_FILE: &str = "history.xml";

/// Settings for a [`crate::TargetHistoryTable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
    /// File name of the history inside the output directory
    pub file_name: String,

    /// Half-width in milliseconds of the window used when comparing output timestamps
    pub tolerance_ms: i64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_HISTORY_FILE.to_string(),
            tolerance_ms: FILETIME_EPSILON_MS,
        }
    }
}

impl HistoryConfig {
    /// Load and validate a YAML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> HistoryResult<Self> {
        let path = path.as_ref();
        debug!("Loading history configuration from {}", path.display());

        let text = std::fs::read_to_string(path).map_err(|e| HistoryError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config: Self = serde_yaml::from_str(&text).map_err(|e| HistoryError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> HistoryResult<()> {
        if self.tolerance_ms < 0 {
            return Err(HistoryError::InvalidConfig(format!(
                "tolerance_ms must not be negative, got {}",
                self.tolerance_ms
            )));
        }
        let file = Path::new(&self.file_name);
        if self.file_name.is_empty()
            || file.components().count() != 1
            || file.file_name().is_none()
        {
            return Err(HistoryError::InvalidConfig(format!(
                "file_name must be a plain file name, got {:?}",
                self.file_name
            )));
        }
        Ok(())
    }

    /// Timestamp comparison window.
    #[must_use]
    pub fn tolerance(&self) -> Tolerance {
        Tolerance::from_millis(self.tolerance_ms)
    }
}
