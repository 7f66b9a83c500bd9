//! Connection configuration
//!
//! [`ConnectionConfig`] is an immutable value describing where and how the
//! connector talks to the API. It is produced by [`ConnectionConfigBuilder`],
//! which validates the target URI when the configuration is built.
//!
//! The scheme, host and port are derived from the URI in one step and are
//! never set on their own. The versioned path prefix is computed on read, so a
//! configuration rebuilt with a different version or prefix policy reflects the
//! change immediately.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{
    AUTHORIZE_PATH, CHECK_PATH, DEFAULT_VERSION, DEFAULT_VERSION_PREFIX, ISSUE_PATH,
    SECURED_HANDLER_NAME,
};
use crate::errors::{ApiLinkError, Result};

/// Protocol scheme of the configured endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Plain HTTP.
    Http,
    /// HTTP over TLS.
    Https,
}

impl Scheme {
    /// Scheme name as it appears in a URL (`http`, `https`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }

    /// Protocol string including the trailing colon (`http:`, `https:`).
    pub const fn protocol(self) -> &'static str {
        match self {
            Self::Http => "http:",
            Self::Https => "https:",
        }
    }

    /// Port used when the URI does not carry one.
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Http => 80,
            Self::Https => 443,
        }
    }

    /// Whether the scheme runs over TLS.
    pub const fn is_secure(self) -> bool {
        matches!(self, Self::Https)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = ApiLinkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim_end_matches(':').to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            other => Err(ApiLinkError::Config(format!("Unsupported URI scheme: {other}"))),
        }
    }
}

/// Rule the connector applies to pick the secured or the plain transport.
///
/// Deserializes through [`FromStr`], so config files accept the same
/// spellings as the environment (`handle_name`, `handle-name`, any case).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum TransportSelection {
    /// Secured transport when the parsed scheme is `https`.
    #[default]
    Scheme,
    /// Secured transport only when the protocol string equals the handler
    /// name `securedHandler`. Real URIs never match, so every call goes
    /// through the plain transport.
    HandleName,
}

impl TransportSelection {
    /// Whether a call against `scheme` goes through the secured transport.
    pub fn selects_secured(self, scheme: Scheme) -> bool {
        match self {
            Self::Scheme => scheme.is_secure(),
            Self::HandleName => scheme.protocol() == SECURED_HANDLER_NAME,
        }
    }
}

impl TryFrom<String> for TransportSelection {
    type Error = ApiLinkError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl FromStr for TransportSelection {
    type Err = ApiLinkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "scheme" => Ok(Self::Scheme),
            "handle_name" => Ok(Self::HandleName),
            other => Err(ApiLinkError::Config(format!("Unknown transport selection: {other}"))),
        }
    }
}

/// Scheme, host and port resolved from a URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    scheme: Scheme,
    host: String,
    port: u16,
}

impl Endpoint {
    /// Resolve the endpoint components of an absolute URI.
    ///
    /// # Errors
    /// Returns `ApiLinkError::Config` if the URI does not parse, uses a scheme
    /// other than `http`/`https`, or has no host.
    pub fn parse(uri: &str) -> Result<Self> {
        let url = Url::parse(uri)
            .map_err(|e| ApiLinkError::Config(format!("Invalid URI '{uri}': {e}")))?;

        let scheme: Scheme = url.scheme().parse()?;

        let host = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| ApiLinkError::Config(format!("URI '{uri}' has no host")))?
            .to_string();

        let port = url.port().unwrap_or_else(|| scheme.default_port());

        Ok(Self { scheme, host, port })
    }

    /// Scheme of the URI.
    pub const fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Host name or address, without brackets for IPv6.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Explicit port, or the scheme default.
    pub const fn port(&self) -> u16 {
        self.port
    }
}

/// Immutable connection parameters read by the connector at call time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    uri: String,
    endpoint: Endpoint,
    version: u32,
    prefix: String,
    prefix_enabled: bool,
    prefix_omits_version: bool,
    client_id: Option<String>,
    client_key: Option<String>,
    debug: bool,
    insecure: bool,
    transport_selection: TransportSelection,
}

impl ConnectionConfig {
    /// Start building a configuration with default settings.
    pub fn builder() -> ConnectionConfigBuilder {
        ConnectionConfigBuilder::default()
    }

    /// Builder seeded with every setting of this configuration.
    pub fn to_builder(&self) -> ConnectionConfigBuilder {
        ConnectionConfigBuilder {
            uri: Some(self.uri.clone()),
            endpoint: Some(Ok(self.endpoint.clone())),
            version: self.version,
            prefix: self.prefix.clone(),
            prefix_enabled: self.prefix_enabled,
            prefix_omits_version: self.prefix_omits_version,
            client_id: self.client_id.clone(),
            client_key: self.client_key.clone(),
            debug: self.debug,
            insecure: self.insecure,
            transport_selection: self.transport_selection,
        }
    }

    /// URI the configuration was built from.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Resolved scheme, host and port.
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Scheme of the endpoint.
    pub const fn scheme(&self) -> Scheme {
        self.endpoint.scheme
    }

    /// Protocol string of the endpoint, e.g. `https:`.
    pub const fn proto(&self) -> &'static str {
        self.endpoint.scheme.protocol()
    }

    /// Host of the endpoint.
    pub fn host(&self) -> &str {
        &self.endpoint.host
    }

    /// Port of the endpoint, defaulted from the scheme.
    pub const fn port(&self) -> u16 {
        self.endpoint.port
    }

    /// API version appended to the prefix.
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Base the version number is appended to (`/api/v` by default).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether request paths get the versioned prefix.
    pub const fn is_prefix_enabled(&self) -> bool {
        self.prefix_enabled
    }

    /// Whether the version number is left out of the prefix.
    pub const fn prefix_omits_version(&self) -> bool {
        self.prefix_omits_version
    }

    /// Effective path prefix prepended to every request path.
    ///
    /// Empty when the prefix is disabled, the bare prefix when the version is
    /// omitted, and the prefix followed by the version number otherwise.
    pub fn version_prefix(&self) -> String {
        match (self.prefix_enabled, self.prefix_omits_version) {
            (false, _) => String::new(),
            (true, true) => self.prefix.clone(),
            (true, false) => format!("{}{}", self.prefix, self.version),
        }
    }

    /// OAuth client id, if configured.
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    /// OAuth client key, if configured.
    pub fn client_key(&self) -> Option<&str> {
        self.client_key.as_deref()
    }

    /// Whether per-call request and response logging is on.
    pub const fn is_debug(&self) -> bool {
        self.debug
    }

    /// Whether invalid TLS certificates are accepted.
    pub const fn is_insecure(&self) -> bool {
        self.insecure
    }

    /// Rule used to pick the secured transport.
    pub const fn transport_selection(&self) -> TransportSelection {
        self.transport_selection
    }

    /// Whether calls go through the secured transport.
    pub fn uses_secured_transport(&self) -> bool {
        self.transport_selection.selects_secured(self.scheme())
    }

    /// Token check endpoint path.
    pub const fn check_path(&self) -> &'static str {
        CHECK_PATH
    }

    /// Token issue endpoint path.
    pub const fn issue_path(&self) -> &'static str {
        ISSUE_PATH
    }

    /// Authorization endpoint path.
    pub const fn authorize_path(&self) -> &'static str {
        AUTHORIZE_PATH
    }
}

/// Builder for [`ConnectionConfig`].
#[derive(Debug, Clone)]
pub struct ConnectionConfigBuilder {
    uri: Option<String>,
    endpoint: Option<Result<Endpoint>>,
    version: u32,
    prefix: String,
    prefix_enabled: bool,
    prefix_omits_version: bool,
    client_id: Option<String>,
    client_key: Option<String>,
    debug: bool,
    insecure: bool,
    transport_selection: TransportSelection,
}

impl Default for ConnectionConfigBuilder {
    fn default() -> Self {
        Self {
            uri: None,
            endpoint: None,
            version: DEFAULT_VERSION,
            prefix: DEFAULT_VERSION_PREFIX.to_string(),
            prefix_enabled: true,
            prefix_omits_version: false,
            client_id: None,
            client_key: None,
            debug: false,
            insecure: false,
            transport_selection: TransportSelection::default(),
        }
    }
}

impl ConnectionConfigBuilder {
    /// Set the API URI and resolve its scheme, host and port together.
    ///
    /// Resolution errors are reported by [`build`](Self::build).
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        self.endpoint = Some(Endpoint::parse(&uri));
        self.uri = Some(uri);
        self
    }

    /// API version. Defaults to 1.
    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// OAuth client id.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// OAuth client key.
    pub fn client_key(mut self, client_key: impl Into<String>) -> Self {
        self.client_key = Some(client_key.into());
        self
    }

    /// Log request headers and raw response bodies at `debug`.
    pub fn debug_log(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Accept invalid TLS certificates (self-signed test servers).
    pub fn insecure(mut self, enabled: bool) -> Self {
        self.insecure = enabled;
        self
    }

    /// Enable or disable the versioned path prefix.
    pub fn prefix_presence(mut self, enabled: bool) -> Self {
        self.prefix_enabled = enabled;
        self
    }

    /// Use the prefix without appending the version number.
    pub fn prefix_no_version(mut self, omit_version: bool) -> Self {
        self.prefix_omits_version = omit_version;
        self
    }

    /// Base the version number is appended to.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Rule used to pick the secured transport.
    pub fn transport_selection(mut self, selection: TransportSelection) -> Self {
        self.transport_selection = selection;
        self
    }

    /// Validate the settings and produce the configuration.
    ///
    /// # Errors
    /// Returns `ApiLinkError::Config` if no URI was set or the URI could not be
    /// resolved into an `http`/`https` endpoint with a host.
    pub fn build(self) -> Result<ConnectionConfig> {
        let (uri, endpoint) = match (self.uri, self.endpoint) {
            (Some(uri), Some(endpoint)) => (uri, endpoint?),
            _ => return Err(ApiLinkError::Config("URI not set".to_string())),
        };

        Ok(ConnectionConfig {
            uri,
            endpoint,
            version: self.version,
            prefix: self.prefix,
            prefix_enabled: self.prefix_enabled,
            prefix_omits_version: self.prefix_omits_version,
            client_id: self.client_id,
            client_key: self.client_key,
            debug: self.debug,
            insecure: self.insecure,
            transport_selection: self.transport_selection,
        })
    }
}

/// Serializable form of the connection settings, as stored in config files.
///
/// Missing optional fields take the builder defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Absolute API base URI.
    pub uri: String,
    /// API version number.
    pub version: Option<u32>,
    /// Base the version number is appended to.
    pub prefix: Option<String>,
    /// Whether the versioned prefix is applied.
    pub prefix_enabled: Option<bool>,
    /// Whether the version number is left out.
    pub prefix_no_version: Option<bool>,
    /// OAuth client id.
    pub client_id: Option<String>,
    /// OAuth client key.
    pub client_key: Option<String>,
    /// Verbose per-call logging.
    pub debug: bool,
    /// Accept invalid TLS certificates.
    pub insecure: bool,
    /// Rule used to pick the secured transport.
    pub transport_selection: TransportSelection,
}

impl ConnectionSettings {
    /// Convert the settings into a builder.
    pub fn into_builder(self) -> ConnectionConfigBuilder {
        let mut builder = ConnectionConfig::builder()
            .uri(self.uri)
            .debug_log(self.debug)
            .insecure(self.insecure)
            .transport_selection(self.transport_selection);

        if let Some(version) = self.version {
            builder = builder.version(version);
        }
        if let Some(prefix) = self.prefix {
            builder = builder.prefix(prefix);
        }
        if let Some(enabled) = self.prefix_enabled {
            builder = builder.prefix_presence(enabled);
        }
        if let Some(omit) = self.prefix_no_version {
            builder = builder.prefix_no_version(omit);
        }
        if let Some(client_id) = self.client_id {
            builder = builder.client_id(client_id);
        }
        if let Some(client_key) = self.client_key {
            builder = builder.client_key(client_key);
        }

        builder
    }

    /// Validate the settings into a [`ConnectionConfig`].
    ///
    /// # Errors
    /// Returns `ApiLinkError::Config` under the same conditions as
    /// [`ConnectionConfigBuilder::build`].
    pub fn into_config(self) -> Result<ConnectionConfig> {
        self.into_builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ConnectionConfigBuilder {
        ConnectionConfig::builder().uri("https://api.example.com:8443")
    }

    #[test]
    fn test_uri_resolves_scheme_host_and_port() {
        let config = base().build().unwrap();

        assert_eq!(config.uri(), "https://api.example.com:8443");
        assert_eq!(config.scheme(), Scheme::Https);
        assert_eq!(config.proto(), "https:");
        assert_eq!(config.host(), "api.example.com");
        assert_eq!(config.port(), 8443);
    }

    #[test]
    fn test_uri_without_port_uses_scheme_default() {
        let http = ConnectionConfig::builder().uri("http://localhost").build().unwrap();
        let https = ConnectionConfig::builder().uri("https://localhost/").build().unwrap();

        assert_eq!(http.port(), 80);
        assert_eq!(https.port(), 443);
    }

    #[test]
    fn test_setting_uri_twice_replaces_all_components() {
        let config = ConnectionConfig::builder()
            .uri("https://first.example.com:9000")
            .uri("http://second.example.com:8080")
            .build()
            .unwrap();

        assert_eq!(config.scheme(), Scheme::Http);
        assert_eq!(config.host(), "second.example.com");
        assert_eq!(config.port(), 8080);
    }

    #[test]
    fn test_defaults() {
        let config = base().build().unwrap();

        assert_eq!(config.version(), 1);
        assert_eq!(config.prefix(), "/api/v");
        assert!(config.is_prefix_enabled());
        assert!(!config.prefix_omits_version());
        assert!(!config.is_debug());
        assert!(!config.is_insecure());
        assert_eq!(config.client_id(), None);
        assert_eq!(config.client_key(), None);
        assert_eq!(config.transport_selection(), TransportSelection::Scheme);
        assert_eq!(config.check_path(), "/oauth/check");
        assert_eq!(config.issue_path(), "/oauth/token");
        assert_eq!(config.authorize_path(), "/oauth/authorize");
    }

    #[test]
    fn test_version_prefix_rules() {
        assert_eq!(base().build().unwrap().version_prefix(), "/api/v1");
        assert_eq!(base().version(3).build().unwrap().version_prefix(), "/api/v3");
        assert_eq!(base().prefix_no_version(true).build().unwrap().version_prefix(), "/api/v");
        assert_eq!(base().prefix_presence(false).build().unwrap().version_prefix(), "");
        assert_eq!(
            base().prefix_presence(false).prefix_no_version(true).build().unwrap().version_prefix(),
            ""
        );
        assert_eq!(base().prefix("/rest/").version(2).build().unwrap().version_prefix(), "/rest/2");
    }

    #[test]
    fn test_to_builder_reflects_later_changes() {
        let config = base().client_id("client").client_key("secret").build().unwrap();
        let updated = config.to_builder().version(7).build().unwrap();

        assert_eq!(updated.version_prefix(), "/api/v7");
        assert_eq!(updated.host(), config.host());
        assert_eq!(updated.client_id(), Some("client"));
        assert_eq!(updated.client_key(), Some("secret"));
        assert_eq!(config.version_prefix(), "/api/v1");
    }

    #[test]
    fn test_build_without_uri_fails() {
        let result = ConnectionConfig::builder().version(2).build();
        assert!(matches!(result, Err(ApiLinkError::Config(_))));
    }

    #[test]
    fn test_build_with_malformed_uri_fails() {
        let result = ConnectionConfig::builder().uri("not a uri").build();
        assert!(matches!(result, Err(ApiLinkError::Config(_))));
    }

    #[test]
    fn test_build_with_unsupported_scheme_fails() {
        let result = ConnectionConfig::builder().uri("ftp://files.example.com").build();
        match result {
            Err(ApiLinkError::Config(message)) => assert!(message.contains("ftp")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_scheme_parsing_accepts_protocol_form() {
        assert_eq!("https:".parse::<Scheme>().unwrap(), Scheme::Https);
        assert_eq!("HTTP".parse::<Scheme>().unwrap(), Scheme::Http);
        assert!("gopher".parse::<Scheme>().is_err());
    }

    #[test]
    fn test_transport_selection() {
        let https = base().build().unwrap();
        let http = ConnectionConfig::builder().uri("http://localhost:80").build().unwrap();
        let legacy = base().transport_selection(TransportSelection::HandleName).build().unwrap();

        assert!(https.uses_secured_transport());
        assert!(!http.uses_secured_transport());
        assert!(!legacy.uses_secured_transport());
        assert_eq!(
            "handle-name".parse::<TransportSelection>().unwrap(),
            TransportSelection::HandleName
        );
    }

    #[test]
    fn test_settings_into_config() {
        let settings = ConnectionSettings {
            uri: "http://localhost:3000".to_string(),
            version: Some(2),
            prefix_no_version: Some(true),
            client_id: Some("id".to_string()),
            insecure: true,
            ..Default::default()
        };

        let config = settings.into_config().unwrap();
        assert_eq!(config.port(), 3000);
        assert_eq!(config.version(), 2);
        assert_eq!(config.version_prefix(), "/api/v");
        assert_eq!(config.client_id(), Some("id"));
        assert!(config.is_insecure());
    }

    #[test]
    fn test_transport_selection_deserializes_like_from_str() {
        for spelling in ["handle_name", "handle-name", "HANDLE_NAME"] {
            let settings: ConnectionSettings = serde_json::from_value(serde_json::json!({
                "uri": "http://localhost",
                "transport_selection": spelling,
            }))
            .unwrap();
            assert_eq!(settings.transport_selection, TransportSelection::HandleName);
        }

        let unknown = serde_json::from_str::<TransportSelection>(r#""by_port""#);
        assert!(unknown.is_err());
        assert_eq!(
            serde_json::to_string(&TransportSelection::HandleName).unwrap(),
            r#""handle_name""#
        );
    }

    #[test]
    fn test_settings_without_uri_fail() {
        let result = ConnectionSettings::default().into_config();
        assert!(matches!(result, Err(ApiLinkError::Config(_))));
    }
}
