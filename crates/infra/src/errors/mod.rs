//! Infrastructure error conversions

pub mod conversions;

pub use conversions::{describe, transport_error, InfraError};
