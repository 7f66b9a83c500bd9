//! Conversions from external infrastructure errors into domain errors.

use std::error::Error as StdError;

use apilink_core::TransportError;
use apilink_domain::ApiLinkError;
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;
use toml::de::Error as TomlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ApiLinkError);

impl From<InfraError> for ApiLinkError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ApiLinkError> for InfraError {
    fn from(value: ApiLinkError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoApiLinkError {
    fn into_apilink(self) -> ApiLinkError;
}

/// Render an error together with its chain of sources, outermost first.
pub fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut description = err.to_string();
    let mut source = err.source();

    while let Some(cause) = source {
        let text = cause.to_string();
        if !description.contains(&text) {
            description.push_str(": ");
            description.push_str(&text);
        }
        source = cause.source();
    }

    description
}

/// Transport failure carrying the full description of a reqwest error.
pub fn transport_error(err: &HttpError) -> TransportError {
    TransportError::new(describe(err))
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ApiLinkError */
/* -------------------------------------------------------------------------- */

impl IntoApiLinkError for HttpError {
    fn into_apilink(self) -> ApiLinkError {
        if self.is_builder() {
            return ApiLinkError::Config(format!("HTTP client setup failed: {}", describe(&self)));
        }

        if self.is_timeout() {
            return ApiLinkError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return ApiLinkError::Network(format!("HTTP connection failure: {}", describe(&self)));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => ApiLinkError::Auth(message),
                400..=499 => ApiLinkError::InvalidInput(message),
                _ => ApiLinkError::Network(message),
            };
        }

        ApiLinkError::Network(describe(&self))
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_apilink())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json / toml → ApiLinkError */
/* -------------------------------------------------------------------------- */

impl IntoApiLinkError for JsonError {
    fn into_apilink(self) -> ApiLinkError {
        ApiLinkError::Config(format!("Invalid JSON format: {self}"))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_apilink())
    }
}

impl IntoApiLinkError for TomlError {
    fn into_apilink(self) -> ApiLinkError {
        ApiLinkError::Config(format!("Invalid TOML format: {self}"))
    }
}

impl From<TomlError> for InfraError {
    fn from(value: TomlError) -> Self {
        InfraError(value.into_apilink())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use std::fmt;

    use reqwest::{Client, StatusCode};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[derive(Debug)]
    struct Layer {
        message: &'static str,
        source: Option<Box<Layer>>,
    }

    impl fmt::Display for Layer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.message)
        }
    }

    impl StdError for Layer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            self.source.as_deref().map(|s| s as &(dyn StdError + 'static))
        }
    }

    #[test]
    fn describe_joins_source_chain() {
        let err = Layer {
            message: "error sending request",
            source: Some(Box::new(Layer {
                message: "tcp connect error",
                source: Some(Box::new(Layer { message: "Connection refused", source: None })),
            })),
        };

        assert_eq!(describe(&err), "error sending request: tcp connect error: Connection refused");
    }

    #[test]
    fn describe_skips_repeated_messages() {
        let err = Layer {
            message: "connect failed: Connection refused",
            source: Some(Box::new(Layer { message: "Connection refused", source: None })),
        };

        assert_eq!(describe(&err), "connect failed: Connection refused");
    }

    #[test]
    fn json_error_maps_to_config_error() {
        let err = serde_json::from_str::<serde_json::Value>("{ not json").unwrap_err();
        let mapped: ApiLinkError = InfraError::from(err).into();
        assert!(matches!(mapped, ApiLinkError::Config(msg) if msg.contains("JSON")));
    }

    #[test]
    fn toml_error_maps_to_config_error() {
        let err = toml::from_str::<toml::Table>("uri = ").unwrap_err();
        let mapped: ApiLinkError = InfraError::from(err).into();
        assert!(matches!(mapped, ApiLinkError::Config(msg) if msg.contains("TOML")));
    }

    #[tokio::test]
    async fn http_status_401_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(StatusCode::UNAUTHORIZED))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

        let mapped: ApiLinkError = InfraError::from(error).into();
        match mapped {
            ApiLinkError::Auth(msg) => assert!(msg.contains("401")),
            other => panic!("expected auth error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn connection_refused_maps_to_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(format!("http://{addr}")).send().await.unwrap_err();

        let transport = transport_error(&error);
        assert!(!transport.message().is_empty());

        let mapped: ApiLinkError = InfraError::from(error).into();
        assert!(matches!(mapped, ApiLinkError::Network(_)));
    }
}
