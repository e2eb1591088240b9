//! Centralized error types for the Chinook application.
//!
//! This module provides a typed error hierarchy that:
//! - Enables precise error handling throughout the codebase
//! - Provides user-friendly messages suitable for UI display
//! - Preserves full error context for debugging/logging

use thiserror::Error;

/// Top-level application error type.
///
/// All errors in the Chinook application should be convertible to this type.
/// Use `user_message()` to get a UI-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Fetch(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Errors from any of the remote data sources (forecast, geocoding, alerts,
/// radar, places).
///
/// `Cancelled` is not a failure: it marks a request superseded by a newer
/// selection and must be swallowed by the caller, never shown to the user.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request cancelled")]
    Cancelled,
}

impl FetchError {
    /// True when this request lost to a newer one and its outcome should be
    /// dropped without surfacing anything.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::Network(e) => e.user_message(),
            FetchError::MalformedResponse(_) => {
                "Received an unexpected response. Please try again."
            }
            FetchError::NotFound(_) => "Nothing found for this location.",
            // Cancelled results are dropped before reaching the UI; this
            // string exists only so the method stays total.
            FetchError::Cancelled => "The request was superseded.",
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The weather service is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The request failed. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "Configuration not found. Using defaults.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_connect() {
            NetworkError::ConnectionFailed(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_conversion() {
        let net = NetworkError::Timeout;
        let fetch: FetchError = net.into();
        assert!(matches!(fetch, FetchError::Network(NetworkError::Timeout)));

        let app: AppError = fetch.into();
        assert!(matches!(app, AppError::Fetch(_)));
    }

    #[test]
    fn test_user_message_propagation() {
        let app = AppError::Fetch(FetchError::Network(NetworkError::Timeout));
        assert_eq!(app.user_message(), "The request timed out. Please try again.");
    }

    #[test]
    fn test_cancelled_is_not_a_failure() {
        assert!(FetchError::Cancelled.is_cancelled());
        assert!(!FetchError::NotFound("x".into()).is_cancelled());
    }

    #[test]
    fn test_server_error_messages_distinguish_5xx() {
        let e = NetworkError::ServerError {
            status: 503,
            message: "unavailable".into(),
        };
        assert!(e.user_message().contains("later"));

        let e = NetworkError::ServerError {
            status: 404,
            message: "missing".into(),
        };
        assert!(!e.user_message().contains("later"));
    }
}
