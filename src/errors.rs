/*!
 * Error types for the subtran application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to a translation backend
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Configuration errors, surfaced before any network activity
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Batch size must be at least 1
    #[error("Invalid batch size: {0} (must be at least 1)")]
    InvalidBatchSize(usize),

    /// Provider name not recognized
    #[error("Unknown translation provider: {0}")]
    UnknownProvider(String),

    /// No API key available for a provider that requires one
    #[error("Missing API key for provider: {0}")]
    MissingApiKey(String),

    /// Temperature outside the accepted range
    #[error("Invalid temperature: {0} (must be between 0.0 and 2.0)")]
    InvalidTemperature(f32),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from a translation backend
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        let error = match error.downcast::<ConfigError>() {
            Ok(config) => return Self::Config(config),
            Err(error) => error,
        };

        let error = match error.downcast::<ServiceError>() {
            Ok(service) => return Self::Service(service),
            Err(error) => error,
        };

        match error.downcast::<std::io::Error>() {
            Ok(io) => Self::from(io),
            Err(error) => Self::Unknown(format!("{:#}", error)),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
