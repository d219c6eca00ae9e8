//! Request execution: the HTTP plumbing and the executor built on it.

pub mod executor;
pub mod http;

pub use executor::{RequestExecutor, classify_response};
