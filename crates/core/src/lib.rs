//! # ApiLink Core
//!
//! Request dispatch logic - no network or platform code.
//!
//! This crate contains:
//! - The [`Connector`] request pipeline
//! - Port interfaces for token providers and transports
//! - Ready-made static token providers
//!
//! ## Architecture Principles
//! - Only depends on `apilink-domain`
//! - No HTTP client or socket code
//! - All external dependencies via traits
//! - Pure, testable dispatch logic

pub mod auth;
pub mod connector;
pub mod errors;
pub mod ports;

pub use auth::{AuthTokenType, StaticToken};
pub use connector::{CallResult, Connector, ConnectorBuilder};
pub use errors::ConnectorError;
pub use ports::{
    ChunkStream, TokenProvider, TransportError, TransportHandler, TransportRequest,
    TransportResponse,
};
