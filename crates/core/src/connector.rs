//! Request dispatch pipeline
//!
//! The [`Connector`] turns one caller request into exactly one transport
//! exchange and normalizes the outcome into a [`ConnectionResponse`].
//!
//! Per call it:
//! - snapshots the configuration and token provider
//! - attaches the `Authorization` header unless the call opts out
//! - encodes write-verb bodies as JSON with an exact `Content-Length`
//! - prefixes the caller's path with the versioned prefix
//! - picks the secured or plain transport
//! - accumulates the streamed body in delivery order and decodes it as JSON
//!
//! A body that is not JSON still resolves successfully, with the decode error
//! recorded on the response. Only transport failures fail the call.

use std::sync::Arc;

use apilink_domain::constants::{
    AUTHORIZATION_HEADER, CONTENT_LENGTH_HEADER, CONTENT_TYPE_HEADER, JSON_CONTENT_TYPE,
};
use apilink_domain::{
    set_header, ApiLinkError, CallOptions, ConnectionConfig, ConnectionResponse, Headers,
    HttpMethod, RequestDescriptor,
};
use bytes::BytesMut;
use futures::StreamExt;
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::errors::ConnectorError;
use crate::ports::{
    TokenProvider, TransportError, TransportHandler, TransportRequest, TransportResponse,
};

/// Outcome of a single connector call.
pub type CallResult = Result<ConnectionResponse, ConnectorError>;

/// REST connector with automatic token injection
pub struct Connector {
    config: RwLock<Arc<ConnectionConfig>>,
    token: RwLock<Option<Arc<dyn TokenProvider>>>,
    handler: Arc<dyn TransportHandler>,
    secured_handler: Arc<dyn TransportHandler>,
}

impl Connector {
    /// Create a connector without a token provider.
    ///
    /// # Arguments
    ///
    /// * `config` - Connection configuration
    /// * `handler` - Transport used for plain HTTP
    /// * `secured_handler` - Transport used for HTTPS
    pub fn new(
        config: ConnectionConfig,
        handler: Arc<dyn TransportHandler>,
        secured_handler: Arc<dyn TransportHandler>,
    ) -> Self {
        Self {
            config: RwLock::new(Arc::new(config)),
            token: RwLock::new(None),
            handler,
            secured_handler,
        }
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> ConnectorBuilder {
        ConnectorBuilder::default()
    }

    /// Attach the provider whose credential is sent with every call.
    pub fn set_token(&self, token: Arc<dyn TokenProvider>) {
        *self.token.write() = Some(token);
    }

    /// Drop the provider. Later calls are sent without credentials.
    pub fn clear_token(&self) {
        *self.token.write() = None;
    }

    /// Replace the configuration used by subsequent calls.
    ///
    /// Calls already in flight keep the configuration they started with.
    pub fn set_configuration(&self, config: ConnectionConfig) {
        *self.config.write() = Arc::new(config);
    }

    /// Snapshot of the current configuration.
    pub fn configuration(&self) -> Arc<ConnectionConfig> {
        self.config.read().clone()
    }

    /// Execute a GET request
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::Transport` if the transport fails
    #[instrument(skip(self, headers, options), fields(path = %path))]
    pub async fn get(&self, path: &str, headers: Headers, options: CallOptions) -> CallResult {
        self.execute(RequestDescriptor::new(HttpMethod::Get, path, headers, None, options)).await
    }

    /// Execute a POST request with a JSON body
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::Encode` if the body cannot be serialized, or
    /// `ConnectorError::Transport` if the transport fails
    #[instrument(skip(self, headers, body, options), fields(path = %path))]
    pub async fn post<B>(
        &self,
        path: &str,
        headers: Headers,
        body: &B,
        options: CallOptions,
    ) -> CallResult
    where
        B: Serialize + ?Sized + Sync,
    {
        self.write(HttpMethod::Post, path, headers, body, options).await
    }

    /// Execute a PUT request with a JSON body
    ///
    /// # Errors
    ///
    /// Same as [`post`](Self::post)
    #[instrument(skip(self, headers, body, options), fields(path = %path))]
    pub async fn put<B>(
        &self,
        path: &str,
        headers: Headers,
        body: &B,
        options: CallOptions,
    ) -> CallResult
    where
        B: Serialize + ?Sized + Sync,
    {
        self.write(HttpMethod::Put, path, headers, body, options).await
    }

    /// Execute a PATCH request with a JSON body
    ///
    /// # Errors
    ///
    /// Same as [`post`](Self::post)
    #[instrument(skip(self, headers, body, options), fields(path = %path))]
    pub async fn patch<B>(
        &self,
        path: &str,
        headers: Headers,
        body: &B,
        options: CallOptions,
    ) -> CallResult
    where
        B: Serialize + ?Sized + Sync,
    {
        self.write(HttpMethod::Patch, path, headers, body, options).await
    }

    /// Execute a DELETE request
    ///
    /// Goes through the same pipeline as the body-carrying verbs, with an
    /// empty JSON object as body.
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::Transport` if the transport fails
    #[instrument(skip(self, headers, options), fields(path = %path))]
    pub async fn delete(&self, path: &str, headers: Headers, options: CallOptions) -> CallResult {
        let empty = serde_json::Map::new();
        self.write(HttpMethod::Delete, path, headers, &empty, options).await
    }

    async fn write<B>(
        &self,
        method: HttpMethod,
        path: &str,
        headers: Headers,
        body: &B,
        options: CallOptions,
    ) -> CallResult
    where
        B: Serialize + ?Sized + Sync,
    {
        let text = serde_json::to_string(body).map_err(|e| ConnectorError::Encode(e.to_string()))?;
        self.execute(RequestDescriptor::new(method, path, headers, Some(text), options)).await
    }

    async fn execute(&self, descriptor: RequestDescriptor) -> CallResult {
        let config = self.configuration();
        let token = self.token.read().clone();

        let request = build_request(&config, token.as_deref(), descriptor);
        let handler = if config.uses_secured_transport() {
            &self.secured_handler
        } else {
            &self.handler
        };

        let method = request.method;
        let origin_path = request.path.clone();
        let origin_headers = request.headers.clone();

        if config.is_debug() {
            debug!(
                %method,
                host = %request.hostname,
                port = request.port,
                path = %origin_path,
                headers = ?redacted(&origin_headers),
                "dispatching request"
            );
        }

        match exchange(handler.as_ref(), request).await {
            Ok((status, body)) => {
                if config.is_debug() {
                    debug!(status, body = %body, "response received");
                }

                let response = ConnectionResponse::completed(
                    status,
                    body,
                    origin_path,
                    origin_headers,
                    method,
                );

                if !response.is_decoded() {
                    warn!(
                        %method,
                        status,
                        error = %response.error,
                        "response body is not valid JSON"
                    );
                }

                info!(%method, path = %response.origin_path, status, "request completed");
                Ok(response)
            }
            Err(err) => {
                warn!(%method, path = %origin_path, error = %err, "transport failure");
                Err(ConnectorError::Transport(Box::new(ConnectionResponse::transport_failure(
                    err.message(),
                    origin_path,
                    origin_headers,
                    method,
                ))))
            }
        }
    }
}

/// Resolve a caller request against a configuration snapshot.
fn build_request(
    config: &ConnectionConfig,
    token: Option<&dyn TokenProvider>,
    descriptor: RequestDescriptor,
) -> TransportRequest {
    let RequestDescriptor { method, path, mut headers, body, no_auth } = descriptor;

    if let Some(text) = &body {
        set_header(&mut headers, CONTENT_TYPE_HEADER, JSON_CONTENT_TYPE);
        set_header(&mut headers, CONTENT_LENGTH_HEADER, text.len().to_string());
    }

    if !no_auth {
        if let Some(token) = token {
            set_header(&mut headers, AUTHORIZATION_HEADER, token.authorization_string());
        }
    }

    TransportRequest {
        method,
        headers,
        scheme: config.scheme(),
        hostname: config.host().to_string(),
        port: config.port(),
        path: format!("{}{}", config.version_prefix(), path),
        body,
    }
}

/// Send the request and collect the full body.
async fn exchange(
    handler: &dyn TransportHandler,
    request: TransportRequest,
) -> Result<(u16, String), TransportError> {
    let TransportResponse { status, mut body } = handler.request(request).await?;

    let mut buffer = BytesMut::new();
    while let Some(chunk) = body.next().await {
        buffer.extend_from_slice(&chunk?);
    }

    Ok((status, String::from_utf8_lossy(&buffer).into_owned()))
}

fn redacted(headers: &Headers) -> Headers {
    headers
        .iter()
        .map(|(name, value)| {
            let value = if name.eq_ignore_ascii_case(AUTHORIZATION_HEADER) {
                "[redacted]".to_string()
            } else {
                value.clone()
            };
            (name.clone(), value)
        })
        .collect()
}

/// Builder for [`Connector`]
#[derive(Default)]
pub struct ConnectorBuilder {
    config: Option<ConnectionConfig>,
    token: Option<Arc<dyn TokenProvider>>,
    handler: Option<Arc<dyn TransportHandler>>,
    secured_handler: Option<Arc<dyn TransportHandler>>,
}

impl ConnectorBuilder {
    /// Set the connection configuration
    pub fn config(mut self, config: ConnectionConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the token provider
    pub fn token(mut self, token: Arc<dyn TokenProvider>) -> Self {
        self.token = Some(token);
        self
    }

    /// Use one transport for both plain and secured calls
    pub fn transport(mut self, handler: Arc<dyn TransportHandler>) -> Self {
        self.secured_handler = Some(handler.clone());
        self.handler = Some(handler);
        self
    }

    /// Set the plain HTTP transport
    pub fn handler(mut self, handler: Arc<dyn TransportHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Set the HTTPS transport
    pub fn secured_handler(mut self, handler: Arc<dyn TransportHandler>) -> Self {
        self.secured_handler = Some(handler);
        self
    }

    /// Build the connector
    ///
    /// # Errors
    ///
    /// Returns `ApiLinkError::Config` if the configuration or either transport
    /// is missing
    pub fn build(self) -> Result<Connector, ApiLinkError> {
        let config =
            self.config.ok_or_else(|| ApiLinkError::Config("Configuration not set".to_string()))?;
        let handler = self
            .handler
            .ok_or_else(|| ApiLinkError::Config("Transport handler not set".to_string()))?;
        let secured_handler = self
            .secured_handler
            .ok_or_else(|| ApiLinkError::Config("Secured transport handler not set".to_string()))?;

        let connector = Connector::new(config, handler, secured_handler);
        if let Some(token) = self.token {
            connector.set_token(token);
        }

        Ok(connector)
    }
}
