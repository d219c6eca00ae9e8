//! The result of one request.

use serde::{Deserialize, Serialize};

use super::JsonValue;
use crate::error::ClientError;

/// Tagged success/failure result of a single request.
///
/// `Failure.status` is `None` when no HTTP response was obtained (transport
/// fault or a request rejected before sending). `body` then holds the error
/// message instead of response text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Success { payload: JsonValue },
    Failure { status: Option<u16>, body: String },
}

impl Outcome {
    pub fn success(payload: JsonValue) -> Self {
        Self::Success { payload }
    }

    pub fn failure(status: Option<u16>, body: impl Into<String>) -> Self {
        Self::Failure {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn payload(&self) -> Option<&JsonValue> {
        match self {
            Self::Success { payload } => Some(payload),
            Self::Failure { .. } => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { status, .. } => *status,
        }
    }

    /// Convert back into a `Result`. Failures with a status become
    /// `ApiFailure`, failures without one become `TransportFailure`.
    pub fn into_result(self) -> Result<JsonValue, ClientError> {
        match self {
            Self::Success { payload } => Ok(payload),
            Self::Failure {
                status: Some(status),
                body,
            } => Err(ClientError::api_failure(status, body)),
            Self::Failure { status: None, body } => Err(ClientError::transport(body)),
        }
    }

    /// Renderable value for a UI shell: the payload itself, or an
    /// `{"error": .., "details": ..}` object.
    pub fn to_display_value(&self) -> JsonValue {
        match self {
            Self::Success { payload } => payload.clone(),
            Self::Failure {
                status: Some(status),
                body,
            } => serde_json::json!({
                "error": format!("API returned status code {status}"),
                "details": body,
            }),
            Self::Failure { status: None, body } => serde_json::json!({ "error": body }),
        }
    }
}

impl From<Result<JsonValue, ClientError>> for Outcome {
    fn from(result: Result<JsonValue, ClientError>) -> Self {
        match result {
            Ok(payload) => Self::Success { payload },
            Err(err) => Self::from(err),
        }
    }
}

impl From<ClientError> for Outcome {
    fn from(err: ClientError) -> Self {
        Self::Failure {
            status: err.status(),
            body: err.detail(),
        }
    }
}
