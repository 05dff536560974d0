//! Error types for modechat
//!
//! This module defines the error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for modechat operations
///
/// Covers configuration loading, provider calls, knowledge lookups,
/// input validation and session handling.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider-related errors (API calls, unexpected responses)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Knowledge lookup errors (Wikipedia requests, decoding)
    #[error("Knowledge lookup error: {0}")]
    Knowledge(String),

    /// Rejected user input
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Unknown or expired session identifier
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Missing credentials for provider
    #[error("Missing credentials for provider: {0}")]
    MissingCredentials(String),

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

/// Result type alias for modechat operations
///
/// Uses `anyhow::Error` so callers can attach context while still being able
/// to downcast to [`ChatError`] where the variant matters (HTTP status mapping).
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = ChatError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_provider_error_display() {
        let error = ChatError::Provider("API timeout".to_string());
        assert_eq!(error.to_string(), "Provider error: API timeout");
    }

    #[test]
    fn test_knowledge_error_display() {
        let error = ChatError::Knowledge("503 Service Unavailable".to_string());
        assert_eq!(
            error.to_string(),
            "Knowledge lookup error: 503 Service Unavailable"
        );
    }

    #[test]
    fn test_validation_error_display() {
        let error = ChatError::Validation("message cannot be empty".to_string());
        assert_eq!(error.to_string(), "Invalid input: message cannot be empty");
    }

    #[test]
    fn test_session_not_found_display() {
        let error = ChatError::SessionNotFound("abc".to_string());
        assert_eq!(error.to_string(), "Session not found: abc");
    }

    #[test]
    fn test_missing_credentials_error_display() {
        let error = ChatError::MissingCredentials("openai".to_string());
        assert_eq!(error.to_string(), "Missing credentials for provider: openai");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: ChatError = io_error.into();
        assert!(matches!(error, ChatError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let error: ChatError = json_error.into();
        assert!(matches!(error, ChatError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: ChatError = yaml_error.into();
        assert!(matches!(error, ChatError::Yaml(_)));
    }

    #[test]
    fn test_downcast_from_anyhow() {
        let err: anyhow::Error = ChatError::SessionNotFound("x".to_string()).into();
        assert!(matches!(
            err.downcast_ref::<ChatError>(),
            Some(ChatError::SessionNotFound(_))
        ));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ChatError>();
    }
}
