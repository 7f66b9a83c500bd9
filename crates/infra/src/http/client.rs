use std::time::Duration;

use apilink_core::{TransportError, TransportHandler, TransportRequest, TransportResponse};
use apilink_domain::{ApiLinkError, Scheme};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client as ReqwestClient, Method};
use tracing::debug;
use url::Url;

use crate::errors::{transport_error, InfraError};

/// reqwest-backed transport for one URL scheme.
///
/// Sends exactly one request per call and streams the response body back in
/// the order the chunks arrive.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: ReqwestClient,
    scheme: Scheme,
}

impl HttpTransport {
    /// Start building a new transport.
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    /// Plain HTTP transport with default settings.
    pub fn plain() -> Result<Self, ApiLinkError> {
        Self::builder().build()
    }

    /// HTTPS transport, optionally accepting invalid certificates.
    pub fn secured(accept_invalid_certs: bool) -> Result<Self, ApiLinkError> {
        Self::builder().secured(true).accept_invalid_certs(accept_invalid_certs).build()
    }

    /// Scheme this transport sends requests over.
    pub const fn scheme(&self) -> Scheme {
        self.scheme
    }

    fn url(&self, request: &TransportRequest) -> Result<Url, TransportError> {
        let raw =
            format!("{}://{}:{}{}", self.scheme, request.hostname, request.port, request.path);
        Url::parse(&raw)
            .map_err(|err| TransportError::new(format!("invalid request URL '{raw}': {err}")))
    }
}

#[async_trait]
impl TransportHandler for HttpTransport {
    async fn request(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse, TransportError> {
        let url = self.url(&request)?;
        let method = Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|err| TransportError::new(err.to_string()))?;

        let mut builder = self.client.request(method.clone(), url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        debug!(%method, %url, "sending HTTP request");

        let response = builder.send().await.map_err(|err| {
            debug!(%method, %url, error = %err, "HTTP request failed");
            transport_error(&err)
        })?;

        let status = response.status();
        debug!(%method, %url, %status, "received HTTP response");

        let body = response.bytes_stream().map(|chunk| chunk.map_err(|err| transport_error(&err)));

        Ok(TransportResponse::new(status.as_u16(), body.boxed()))
    }
}

/// Builder for [`HttpTransport`].
#[derive(Debug, Default)]
pub struct HttpTransportBuilder {
    secured: bool,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    accept_invalid_certs: bool,
}

impl HttpTransportBuilder {
    /// Send requests over HTTPS instead of plain HTTP.
    pub fn secured(mut self, secured: bool) -> Self {
        self.secured = secured;
        self
    }

    /// Overall deadline enforced by the HTTP client. None by default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Value of the `User-Agent` header.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Accept invalid TLS certificates (e.g., self-signed certs).
    pub fn accept_invalid_certs(mut self, enabled: bool) -> Self {
        self.accept_invalid_certs = enabled;
        self
    }

    /// Create the transport.
    ///
    /// # Errors
    ///
    /// Returns `ApiLinkError::Config` if the reqwest client cannot be created.
    pub fn build(self) -> Result<HttpTransport, ApiLinkError> {
        let mut builder = ReqwestClient::builder().no_proxy();

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if self.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().map_err(|err| ApiLinkError::from(InfraError::from(err)))?;
        let scheme = if self.secured { Scheme::Https } else { Scheme::Http };

        Ok(HttpTransport { client, scheme })
    }
}
