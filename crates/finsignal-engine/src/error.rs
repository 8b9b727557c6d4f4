//! Error types for the signal engine
//!
//! Analysis itself never fails: absence of signal is reported through the
//! result types. These errors only surface at the configuration and parsing
//! boundary.

use thiserror::Error;

/// Signal engine specific errors
#[derive(Debug, Error)]
pub enum SignalError {
    /// Configuration value rejected by validation or env parsing
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Unknown analysis mode selector
    #[error("Invalid analysis mode: {0}")]
    InvalidMode(String),

    /// Unknown chart kind selector
    #[error("Invalid chart kind: {0}")]
    InvalidChartKind(String),

    /// Unknown metric match policy
    #[error("Invalid match policy: {0}")]
    InvalidMatchPolicy(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type alias for signal engine operations
pub type Result<T> = std::result::Result<T, SignalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SignalError::InvalidMode("scatter".to_string());
        assert_eq!(err.to_string(), "Invalid analysis mode: scatter");

        let err = SignalError::ConfigError("histogram_bins must be greater than 0".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: histogram_bins must be greater than 0"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: SignalError = json_err.into();
        assert!(err.to_string().starts_with("JSON error"));
    }
}
