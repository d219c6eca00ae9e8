//! Core data types: HTTP configuration, request descriptors and outcomes.

pub mod http;
pub mod outcome;
pub mod request;

pub use http::{HttpConfig, HttpConfigBuilder};
pub use outcome::Outcome;
pub use request::{HttpMethod, RequestDescriptor};

/// Opaque JSON value exchanged with remote services. Schemas belong to the
/// services, so payloads are never given a Rust shape here.
pub type JsonValue = serde_json::Value;
