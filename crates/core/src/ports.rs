//! Port interfaces for credentials and transport
//!
//! These traits define the boundaries between the connector and the
//! infrastructure that acquires tokens and moves bytes over the network.

use std::fmt;

use apilink_domain::{Headers, HttpMethod, Scheme};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use thiserror::Error;

/// Source of the credential attached to outgoing requests.
pub trait TokenProvider: Send + Sync {
    /// Opaque credential value.
    fn token(&self) -> String;

    /// Full `Authorization` header value, e.g. `Bearer <token>`.
    fn authorization_string(&self) -> String;
}

/// Connection-level failure reported by a transport.
///
/// Displays as the bare description so it can be echoed verbatim into the
/// response record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    /// Failure with the given description.
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    /// Failure description.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Options a transport needs to send one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    /// Verb of the request.
    pub method: HttpMethod,
    /// Headers to send, credential included.
    pub headers: Headers,
    /// Scheme of the configured endpoint.
    pub scheme: Scheme,
    /// Host to connect to.
    pub hostname: String,
    /// Port to connect to.
    pub port: u16,
    /// Absolute request path, prefix included.
    pub path: String,
    /// Encoded body, written once before the request is ended.
    pub body: Option<String>,
}

/// Stream of response body chunks in delivery order.
pub type ChunkStream = BoxStream<'static, Result<Bytes, TransportError>>;

/// Response head plus the body still being streamed.
pub struct TransportResponse {
    /// HTTP status of the response.
    pub status: u16,
    /// Body chunks, not yet read.
    pub body: ChunkStream,
}

impl TransportResponse {
    /// Pair a status with its body stream.
    pub fn new(status: u16, body: ChunkStream) -> Self {
        Self { status, body }
    }
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse").field("status", &self.status).finish_non_exhaustive()
    }
}

/// Sends a request and hands back the streamed response.
#[async_trait]
pub trait TransportHandler: Send + Sync {
    /// Send `request` and return once the response head has arrived.
    ///
    /// # Errors
    /// Returns `TransportError` if the connection cannot be established or the
    /// request cannot be written.
    async fn request(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}
