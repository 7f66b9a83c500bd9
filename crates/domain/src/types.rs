//! Request and response records exchanged with the connector

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::TRANSPORT_FAILURE_STATUS;
use crate::errors::{ApiLinkError, Result};

/// Header name to value mapping. Ordering carries no meaning.
pub type Headers = BTreeMap<String, String>;

/// Set a header, replacing any existing entry whose name matches
/// case-insensitively.
pub fn set_header(headers: &mut Headers, name: &str, value: impl Into<String>) {
    headers.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
    headers.insert(name.to_string(), value.into());
}

/// Look up a header by case-insensitive name.
pub fn header<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// HTTP methods supported by the connector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// `GET`, sent without a body.
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`, sent with an empty JSON object.
    Delete,
}

impl HttpMethod {
    /// Upper-case method name as sent on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Whether requests with this method carry a JSON body.
    pub const fn has_body(self) -> bool {
        !matches!(self, Self::Get)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ApiLinkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            other => Err(ApiLinkError::InvalidInput(format!("Unsupported HTTP method: {other}"))),
        }
    }
}

/// Per-call options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallOptions {
    /// Skip the automatic `Authorization` header for this call.
    pub no_auth: bool,
}

impl CallOptions {
    /// Options for a call sent without credentials.
    pub const fn without_auth() -> Self {
        Self { no_auth: true }
    }
}

/// A single call as requested by the caller, before configuration is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// Verb of the call.
    pub method: HttpMethod,
    /// Path relative to the versioned prefix.
    pub path: String,
    /// Caller-supplied headers.
    pub headers: Headers,
    /// Body already encoded as JSON text, sent byte for byte.
    pub body: Option<String>,
    /// Skip the automatic `Authorization` header.
    pub no_auth: bool,
}

impl RequestDescriptor {
    /// Describe a call from its parts.
    pub fn new(
        method: HttpMethod,
        path: impl Into<String>,
        headers: Headers,
        body: Option<String>,
        options: CallOptions,
    ) -> Self {
        Self { method, path: path.into(), headers, body, no_auth: options.no_auth }
    }
}

/// Normalized outcome of a call, produced once per call for success and
/// transport failure alike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionResponse {
    /// HTTP status, or 500 for a transport failure.
    pub status: u16,
    /// Raw response body, or the failure description.
    pub message: String,
    /// Parsed JSON body; `None` when the body was not valid JSON.
    pub data: Option<Value>,
    /// JSON decode error, or the failure description. Empty otherwise.
    pub error: String,
    /// Full request path, versioned prefix included.
    pub origin_path: String,
    /// Headers as sent, `Authorization` included.
    pub origin_headers: Headers,
    /// Method of the request.
    pub origin_method: HttpMethod,
}

impl ConnectionResponse {
    /// Record a completed exchange, decoding the body as JSON.
    ///
    /// A body that is not valid JSON still yields a record: `data` is `None`
    /// and `error` holds the decode message.
    pub fn completed(
        status: u16,
        body: String,
        origin_path: String,
        origin_headers: Headers,
        origin_method: HttpMethod,
    ) -> Self {
        let (data, error) = match serde_json::from_str::<Value>(&body) {
            Ok(value) => (Some(value), String::new()),
            Err(e) => (None, e.to_string()),
        };

        Self { status, message: body, data, error, origin_path, origin_headers, origin_method }
    }

    /// Record an exchange that failed at the transport level.
    pub fn transport_failure(
        description: impl Into<String>,
        origin_path: String,
        origin_headers: Headers,
        origin_method: HttpMethod,
    ) -> Self {
        let description = description.into();
        Self {
            status: TRANSPORT_FAILURE_STATUS,
            message: description.clone(),
            data: None,
            error: description,
            origin_path,
            origin_headers,
            origin_method,
        }
    }

    /// Whether the body decoded as JSON.
    pub fn is_decoded(&self) -> bool {
        self.error.is_empty()
    }

    /// Whether the status is in the 2xx range.
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Deserialize the decoded body into a typed value.
    ///
    /// # Errors
    /// Returns `ApiLinkError::Serialization` if the body did not decode as
    /// JSON or does not match `T`.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        let data = self.data.clone().ok_or_else(|| {
            ApiLinkError::Serialization(format!("response body is not JSON: {}", self.error))
        })?;

        serde_json::from_value(data).map_err(|e| ApiLinkError::Serialization(e.to_string()))
    }
}
