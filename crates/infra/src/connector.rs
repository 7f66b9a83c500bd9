//! reqwest-backed connector assembly

use std::sync::Arc;

use apilink_core::{Connector, StaticToken, TokenProvider};
use apilink_domain::{ApiLinkError, ConnectionConfig};
use tracing::info;

use crate::http::HttpTransport;

/// Build a [`Connector`] that talks HTTP and HTTPS through reqwest.
///
/// The secured transport accepts invalid certificates when the configuration
/// is marked insecure. No token is attached; call [`Connector::set_token`]
/// once a credential is available.
///
/// # Errors
///
/// Returns `ApiLinkError::Config` if either HTTP client cannot be created.
pub fn http_connector(config: ConnectionConfig) -> Result<Connector, ApiLinkError> {
    let plain = HttpTransport::plain()?;
    let secured = HttpTransport::secured(config.is_insecure())?;

    info!(
        host = config.host(),
        port = config.port(),
        scheme = %config.scheme(),
        prefix = %config.version_prefix(),
        "created HTTP connector"
    );

    Ok(Connector::new(config, Arc::new(plain), Arc::new(secured)))
}

/// Same as [`http_connector`] but authenticates with the configured client
/// credentials as a Basic token, when both are present.
pub fn http_connector_with_client_credentials(
    config: ConnectionConfig,
) -> Result<Connector, ApiLinkError> {
    let token = StaticToken::from_client_credentials(&config);
    let connector = http_connector(config)?;

    if let Some(token) = token {
        connector.set_token(Arc::new(token) as Arc<dyn TokenProvider>);
    }

    Ok(connector)
}
