//! Connector call errors

use apilink_domain::{ApiLinkError, ConnectionResponse};
use thiserror::Error;

/// Failure of a single connector call
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The transport failed before or during the exchange. The record carries
    /// status 500, the failure description and the request's origin metadata.
    #[error("{}", .0.message)]
    Transport(Box<ConnectionResponse>),

    /// The request body could not be encoded as JSON. Nothing was sent.
    #[error("Failed to encode request body: {0}")]
    Encode(String),
}

impl ConnectorError {
    /// Response record of a transport failure.
    pub fn response(&self) -> Option<&ConnectionResponse> {
        match self {
            Self::Transport(response) => Some(response),
            Self::Encode(_) => None,
        }
    }

    /// Take the response record of a transport failure.
    pub fn into_response(self) -> Option<ConnectionResponse> {
        match self {
            Self::Transport(response) => Some(*response),
            Self::Encode(_) => None,
        }
    }
}

impl From<ConnectorError> for ApiLinkError {
    fn from(err: ConnectorError) -> Self {
        match err {
            ConnectorError::Transport(response) => Self::Network(response.message),
            ConnectorError::Encode(message) => Self::Serialization(message),
        }
    }
}
