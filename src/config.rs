//! Store configuration
//!
//! Loaded from a JSON file; every field is optional and falls back to the
//! defaults below.
//!
//! ```json
//! { "initial_user_capacity": 101, "max_load_factor": 0.75, "log_level": "WARN" }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::observability::{Logger, Severity};

/// Configuration for a [`Catalog`](crate::Catalog) and its indexes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Initial bucket count of both user tables
    #[serde(default = "default_initial_user_capacity")]
    pub initial_user_capacity: usize,

    /// User table doubles once count / capacity exceeds this
    #[serde(default = "default_max_load_factor")]
    pub max_load_factor: f64,

    /// Default window for recent-transaction listings
    #[serde(default = "default_recent_transactions")]
    pub recent_transactions: usize,

    /// Per-user borrow limit. Never read by this crate; carried so the
    /// business layer enforcing it loads it from the same file.
    #[serde(default = "default_max_borrow_limit")]
    pub max_borrow_limit: usize,

    /// Minimum severity written by the logger
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_initial_user_capacity() -> usize {
    101
}
fn default_max_load_factor() -> f64 {
    0.75
}
fn default_recent_transactions() -> usize {
    20
}
fn default_max_borrow_limit() -> usize {
    5
}
fn default_log_level() -> String {
    "WARN".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            initial_user_capacity: default_initial_user_capacity(),
            max_load_factor: default_max_load_factor(),
            recent_transactions: default_recent_transactions(),
            max_borrow_limit: default_max_borrow_limit(),
            log_level: default_log_level(),
        }
    }
}

impl StoreConfig {
    /// Load and validate configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        let config: StoreConfig = serde_json::from_str(content)
            .map_err(|e| Error::config_invalid(format!("invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate field ranges
    pub fn validate(&self) -> Result<()> {
        if self.initial_user_capacity == 0 {
            return Err(Error::config_invalid("initial_user_capacity must be > 0"));
        }

        if !(self.max_load_factor > 0.0 && self.max_load_factor <= 1.0) {
            return Err(Error::config_invalid(format!(
                "max_load_factor must be in (0, 1], got {}",
                self.max_load_factor
            )));
        }

        self.severity()?;
        Ok(())
    }

    /// Parsed log level
    pub fn severity(&self) -> Result<Severity> {
        self.log_level.parse::<Severity>().map_err(Error::config_invalid)
    }

    /// Logger configured with this log level, WARN if the level is invalid
    pub fn logger(&self) -> Logger {
        Logger::new(self.severity().unwrap_or(Severity::Warn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.initial_user_capacity, 101);
        assert_eq!(config.max_load_factor, 0.75);
        assert_eq!(config.recent_transactions, 20);
        assert_eq!(config.max_borrow_limit, 5);
        assert_eq!(config.severity().unwrap(), Severity::Warn);
        config.validate().unwrap();
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = StoreConfig::from_json("{}").unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"initial_user_capacity": 7, "log_level": "info"}}"#).unwrap();

        let config = StoreConfig::load(file.path()).unwrap();
        assert_eq!(config.initial_user_capacity, 7);
        assert_eq!(config.max_load_factor, 0.75);
        assert_eq!(config.logger().threshold(), Severity::Info);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = StoreConfig::load(&dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ShelfConfigIo);
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let err = StoreConfig::from_json(r#"{"initial_user_capacity": 0}"#).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ShelfConfigInvalid);
    }

    #[test]
    fn test_rejects_bad_load_factor() {
        assert!(StoreConfig::from_json(r#"{"max_load_factor": 0.0}"#).is_err());
        assert!(StoreConfig::from_json(r#"{"max_load_factor": 1.5}"#).is_err());
        assert!(StoreConfig::from_json(r#"{"max_load_factor": 1.0}"#).is_ok());
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let err = StoreConfig::from_json(r#"{"log_level": "LOUD"}"#).unwrap_err();
        assert!(err.to_string().contains("LOUD"));
    }

    #[test]
    fn test_malformed_json() {
        let err = StoreConfig::from_json("{not json").unwrap_err();
        assert_eq!(err.code(), ErrorCode::ShelfConfigInvalid);
    }
}
