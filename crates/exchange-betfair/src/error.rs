//! Error types for the Betfair integration.

use thiserror::Error;

/// Errors that can occur when interacting with Betfair.
#[derive(Debug, Error)]
pub enum BetfairError {
    /// Session login was rejected.
    #[error("login failed: {0}")]
    Login(String),

    /// API request returned a non-success status.
    #[error("API error: {status_code} - {message}")]
    Api {
        /// HTTP status code.
        status_code: u16,
        /// Response body or reason.
        message: String,
    },

    /// Network-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// A wire value could not be normalized into a core type.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for BetfairError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

/// Convenience alias for Betfair operations.
pub type Result<T> = std::result::Result<T, BetfairError>;
