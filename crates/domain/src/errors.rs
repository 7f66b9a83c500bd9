//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for ApiLink
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ApiLinkError {
    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure talking to the remote host.
    #[error("Network error: {0}")]
    Network(String),

    /// Rejected or missing credentials.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// A value could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Caller input the connector cannot use.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for ApiLink operations
pub type Result<T> = std::result::Result<T, ApiLinkError>;
