//! Connection defaults and wire-level constants

/// API version used when none is configured.
pub const DEFAULT_VERSION: u32 = 1;

/// Path segment the API version number is appended to.
pub const DEFAULT_VERSION_PREFIX: &str = "/api/v";

/// OAuth token introspection endpoint.
pub const CHECK_PATH: &str = "/oauth/check";

/// OAuth token issue endpoint.
pub const ISSUE_PATH: &str = "/oauth/token";

/// OAuth authorization endpoint.
pub const AUTHORIZE_PATH: &str = "/oauth/authorize";

/// Symbolic name the legacy transport selection compares the protocol against.
pub const SECURED_HANDLER_NAME: &str = "securedHandler";

/// Header carrying the token provider credential.
pub const AUTHORIZATION_HEADER: &str = "Authorization";
/// Media type header set on encoded bodies.
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
/// Byte length header set on encoded bodies.
pub const CONTENT_LENGTH_HEADER: &str = "Content-Length";
/// Media type of every request body.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Status reported on the response record of a failed exchange.
pub const TRANSPORT_FAILURE_STATUS: u16 = 500;
