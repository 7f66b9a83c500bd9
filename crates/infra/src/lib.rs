//! # ApiLink Infrastructure
//!
//! Infrastructure implementations of the core connector ports.
//!
//! This crate contains:
//! - reqwest transports for plain HTTP and HTTPS
//! - Configuration loading from environment variables and files
//! - Tracing subscriber setup
//!
//! ## Architecture
//! - Implements traits defined in `apilink-core`
//! - Contains all "impure" code (network and file I/O)

pub mod config;
pub mod connector;
pub mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use connector::{http_connector, http_connector_with_client_credentials};
pub use errors::InfraError;
pub use http::{HttpTransport, HttpTransportBuilder};
pub use observability::{init_tracing, init_tracing_for};
