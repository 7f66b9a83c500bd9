//! # ApiLink Domain
//!
//! Connection configuration and request/response records for ApiLink.
//!
//! This crate contains:
//! - Connection configuration and its validating builder
//! - Request descriptors and normalized response records
//! - Domain error types and Result definitions
//! - Wire-level constants
//!
//! ## Architecture
//! - No dependencies on other ApiLink crates
//! - Only external dependencies allowed
//! - Pure data types, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
