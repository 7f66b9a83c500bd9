//! Ready-made token providers

use apilink_domain::ConnectionConfig;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::ports::TokenProvider;

/// Authorization scheme a token is rendered with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AuthTokenType {
    /// `Bearer <token>`
    #[default]
    Bearer,
    /// `Basic <base64 id:key>`
    BasicCredentials,
}

impl AuthTokenType {
    /// Scheme name placed before the credential in the header value.
    pub const fn scheme_name(self) -> &'static str {
        match self {
            Self::Bearer => "Bearer",
            Self::BasicCredentials => "Basic",
        }
    }
}

/// Provider holding a fixed credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticToken {
    token: String,
    kind: AuthTokenType,
}

impl StaticToken {
    /// Provider for `token` rendered with the scheme of `kind`.
    pub fn new(token: impl Into<String>, kind: AuthTokenType) -> Self {
        Self { token: token.into(), kind }
    }

    /// Bearer token provider.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::new(token, AuthTokenType::Bearer)
    }

    /// Basic credentials from a client id and key (RFC 7617 encoding).
    pub fn basic_credentials(client_id: &str, client_key: &str) -> Self {
        let encoded = STANDARD.encode(format!("{client_id}:{client_key}"));
        Self::new(encoded, AuthTokenType::BasicCredentials)
    }

    /// Basic credentials from the client id and key of a configuration.
    ///
    /// Returns `None` unless both are set.
    pub fn from_client_credentials(config: &ConnectionConfig) -> Option<Self> {
        match (config.client_id(), config.client_key()) {
            (Some(id), Some(key)) => Some(Self::basic_credentials(id, key)),
            _ => None,
        }
    }

    /// Authorization scheme of the credential.
    pub const fn kind(&self) -> AuthTokenType {
        self.kind
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> String {
        self.token.clone()
    }

    fn authorization_string(&self) -> String {
        format!("{} {}", self.kind.scheme_name(), self.token)
    }
}
