//! Error types for Astrai
//!
//! This module defines the error types used throughout the crate,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Astrai operations
///
/// Gateway failures are worded so that the heuristic
/// [`ErrorClassifier`](crate::resilience::ErrorClassifier) can recognise
/// authentication and transport problems from the rendered message.
#[derive(Error, Debug)]
pub enum AstraiError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Model gateway errors (HTTP status, empty candidates, transport)
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Authentication errors (rejected or expired API key)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Missing credentials for the gateway
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// Model output that does not have the required shape
    #[error("Malformed model output: {0}")]
    MalformedOutput(String),

    /// Tool execution errors
    #[error("Tool execution error: {0}")]
    Tool(String),

    /// Key-value store errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Astrai operations
///
/// Uses `anyhow::Error` so callers can attach context while the
/// underlying [`AstraiError`] stays reachable through `downcast_ref`.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = AstraiError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_gateway_error_display() {
        let error = AstraiError::Gateway("Rpc transport failure: reset".to_string());
        assert_eq!(
            error.to_string(),
            "Gateway error: Rpc transport failure: reset"
        );
    }

    #[test]
    fn test_missing_credentials_display() {
        let error = AstraiError::MissingCredentials("API_KEY is not configured".to_string());
        assert!(error.to_string().contains("API_KEY"));
    }

    #[test]
    fn test_malformed_output_display() {
        let error = AstraiError::MalformedOutput("Invalid Data Structure".to_string());
        assert_eq!(
            error.to_string(),
            "Malformed model output: Invalid Data Structure"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid").unwrap_err();
        let error: AstraiError = json_error.into();
        assert!(matches!(error, AstraiError::Serialization(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: AstraiError = io_error.into();
        assert!(matches!(error, AstraiError::Io(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AstraiError>();
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let err: anyhow::Error = AstraiError::Storage("flush failed".to_string()).into();
        assert!(matches!(
            err.downcast_ref::<AstraiError>(),
            Some(AstraiError::Storage(_))
        ));
    }
}
