//! Error types shared across the workspace

use thiserror::Error;

/// Result type alias for workspace-level operations
pub type Result<T> = std::result::Result<T, CricketError>;

/// Errors raised outside the per-match ingestion path
/// (configuration and data directory checks).
#[derive(Error, Debug)]
pub enum CricketError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data directory not found: {0}")]
    DataDirNotFound(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidSetting { key: String, value: String },
}

impl CricketError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid-setting error for an environment key or CLI flag
    pub fn invalid_setting(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidSetting {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_setting_message() {
        let err = CricketError::invalid_setting("DATABASE_MAX_CONNECTIONS", "lots");
        assert_eq!(err.to_string(), "Invalid value for DATABASE_MAX_CONNECTIONS: lots");
    }

    #[test]
    fn test_data_dir_not_found_message() {
        let err = CricketError::DataDirNotFound("./data".to_string());
        assert_eq!(err.to_string(), "Data directory not found: ./data");
    }
}
