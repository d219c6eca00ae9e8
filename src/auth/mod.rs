//! Credentials and authentication header schemes.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ClientError;

/// Opaque bearer string proving caller identity to a remote service.
///
/// Never validated beyond presence, never mutated. `Debug` does not reveal the
/// secret.
#[derive(Clone)]
pub struct Credential(SecretString);

impl Credential {
    /// Wrap a token as-is. An empty token is allowed here; the executor still
    /// issues the call and lets the service reject it.
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Read a credential from the process environment. Absent or blank values
    /// are reported as `MissingCredential(var)`.
    pub fn from_env(var: &str) -> Result<Self, ClientError> {
        Self::from_lookup(var, |k| std::env::var(k).ok())
    }

    pub(crate) fn from_lookup<F>(var: &str, lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(var) {
            Some(v) if !v.trim().is_empty() => Ok(Self::new(v.trim())),
            _ => Err(ClientError::MissingCredential(var.to_string())),
        }
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&"[REDACTED]").finish()
    }
}

impl From<&str> for Credential {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for Credential {
    fn from(token: String) -> Self {
        Self::new(token)
    }
}

/// How a credential is attached to a request. This is configuration, not
/// logic: each service picks one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>`
    #[default]
    Bearer,
    /// `PRIVATE-TOKEN: <token>` (GitLab personal access tokens)
    PrivateToken,
    /// `<header>: <token>`
    Header { name: String },
}

impl AuthScheme {
    pub const PRIVATE_TOKEN_HEADER: &'static str = "PRIVATE-TOKEN";

    /// Header name and value carrying `token` under this scheme.
    pub fn header_pair(&self, token: &str) -> (String, String) {
        match self {
            Self::Bearer => ("Authorization".to_string(), format!("Bearer {token}")),
            Self::PrivateToken => (Self::PRIVATE_TOKEN_HEADER.to_string(), token.to_string()),
            Self::Header { name } => (name.clone(), token.to_string()),
        }
    }
}
