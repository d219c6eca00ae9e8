//! Error types.

use thiserror::Error;

/// Fallback message used when a transport fault carries no description.
const UNKNOWN_TRANSPORT_FAILURE: &str = "transport failure";

/// Coarse classification of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The request never produced a usable HTTP response (DNS, connect, timeout, read).
    Transport,
    /// The remote service answered, but not with a decodable 2xx payload.
    Api,
    /// The request was rejected locally (configuration, parameters, parsing).
    Local,
}

/// Errors produced while building, sending or interpreting a request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// No complete HTTP response was obtained: DNS, connect, timeout, or the
    /// connection dropped while the body was being read.
    #[error("Transport failure: {message}")]
    TransportFailure { message: String },

    /// Non-2xx response.
    #[error("API returned status code {status}")]
    ApiFailure { status: u16, body: String },

    /// 2xx response whose body is not valid JSON.
    #[error("Failed to decode response with status code {status}")]
    DecodeFailure { status: u16, body: String },

    /// A required credential was not supplied (names the env variable).
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A decoded payload did not have the expected shape.
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("JSON error: {0}")]
    JsonError(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),
}

impl ClientError {
    /// Transport fault. Empty messages are replaced so the error always has
    /// something to display.
    pub fn transport(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            UNKNOWN_TRANSPORT_FAILURE.to_string()
        } else {
            message
        };
        Self::TransportFailure { message }
    }

    pub fn api_failure(status: u16, body: impl Into<String>) -> Self {
        Self::ApiFailure {
            status,
            body: body.into(),
        }
    }

    pub fn decode_failure(status: u16, body: impl Into<String>) -> Self {
        Self::DecodeFailure {
            status,
            body: body.into(),
        }
    }

    /// HTTP status associated with the error, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiFailure { status, .. } | Self::DecodeFailure { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TransportFailure { .. } => ErrorCategory::Transport,
            Self::ApiFailure { .. } | Self::DecodeFailure { .. } => ErrorCategory::Api,
            _ => ErrorCategory::Local,
        }
    }

    pub fn is_transport(&self) -> bool {
        self.category() == ErrorCategory::Transport
    }

    /// Raw response text for API errors, otherwise the error message.
    pub fn detail(&self) -> String {
        match self {
            Self::ApiFailure { body, .. } | Self::DecodeFailure { body, .. } => body.clone(),
            Self::TransportFailure { message } => message.clone(),
            other => other.to_string(),
        }
    }
}
