//! Error Handling Module
//!
//! This module provides the error type shared by every layer of the crate:
//! - Core error type (`ClientError`) and its coarse `ErrorCategory`
//! - Type conversions from common error types
//!
//! # Example
//!
//! ```rust,ignore
//! use apiprobe::error::{ClientError, ErrorCategory};
//!
//! let error = ClientError::api_failure(404, "Not Found");
//! assert_eq!(error.category(), ErrorCategory::Api);
//! assert_eq!(error.status(), Some(404));
//! ```

mod conversions;
pub mod types;

pub use types::*;
