//! HTTP Headers Utility
//!
//! Builds the header set for a request: credential, service headers, custom
//! headers, content type and user agent.

use crate::auth::{AuthScheme, Credential};
use crate::error::ClientError;
use reqwest::header::{
    AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT,
};
use std::collections::HashMap;

/// HTTP header builder for API requests
pub struct HttpHeaderBuilder {
    headers: HeaderMap,
}

impl HttpHeaderBuilder {
    /// Create a new header builder
    pub fn new() -> Self {
        Self {
            headers: HeaderMap::new(),
        }
    }

    /// Attach a credential using the service's scheme. Empty tokens are sent
    /// as-is; rejecting them is the service's job.
    pub fn with_credential(
        self,
        scheme: &AuthScheme,
        credential: &Credential,
    ) -> Result<Self, ClientError> {
        match scheme {
            AuthScheme::Bearer => self.with_bearer_auth(credential.expose()),
            AuthScheme::PrivateToken => {
                self.with_custom_auth(AuthScheme::PRIVATE_TOKEN_HEADER, credential.expose())
            }
            AuthScheme::Header { name } => self.with_custom_auth(name, credential.expose()),
        }
    }

    /// Add Bearer token authorization
    pub fn with_bearer_auth(mut self, token: &str) -> Result<Self, ClientError> {
        let auth_value = format!("Bearer {token}");
        let mut value = HeaderValue::from_str(&auth_value).map_err(|e| {
            ClientError::ConfigurationError(format!("Invalid credential format: {e}"))
        })?;
        value.set_sensitive(true);
        self.headers.insert(AUTHORIZATION, value);
        Ok(self)
    }

    /// Add custom authorization header (e.g., PRIVATE-TOKEN for GitLab)
    pub fn with_custom_auth(mut self, header_name: &str, value: &str) -> Result<Self, ClientError> {
        let header_name = HeaderName::from_bytes(header_name.as_bytes()).map_err(|e| {
            ClientError::ConfigurationError(format!("Invalid header name '{header_name}': {e}"))
        })?;
        let mut value = HeaderValue::from_str(value).map_err(|e| {
            ClientError::ConfigurationError(format!("Invalid credential format: {e}"))
        })?;
        value.set_sensitive(true);
        self.headers.insert(header_name, value);
        Ok(self)
    }

    /// Add JSON content type
    pub fn with_json_content_type(mut self) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self
    }

    /// Add user agent
    pub fn with_user_agent(mut self, user_agent: &str) -> Result<Self, ClientError> {
        self.headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .map_err(|e| ClientError::ConfigurationError(format!("Invalid user agent: {e}")))?,
        );
        Ok(self)
    }

    /// Add multiple custom headers from a HashMap
    pub fn with_custom_headers(
        mut self,
        custom_headers: &HashMap<String, String>,
    ) -> Result<Self, ClientError> {
        for (key, value) in custom_headers {
            let header_name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                ClientError::ConfigurationError(format!("Invalid header name '{key}': {e}"))
            })?;
            self.headers.insert(
                header_name,
                HeaderValue::from_str(value).map_err(|e| {
                    ClientError::ConfigurationError(format!("Invalid header value '{value}': {e}"))
                })?,
            );
        }
        Ok(self)
    }

    /// Build the final HeaderMap
    pub fn build(self) -> HeaderMap {
        self.headers
    }
}

impl Default for HttpHeaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a HeaderMap to `HashMap<String, String>`, dropping sensitive and
/// non UTF-8 values. Used for logging.
pub fn redacted_headers(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter(|(_, v)| !v.is_sensitive())
        .filter_map(|(k, v)| {
            v.to_str()
                .ok()
                .map(|v_str| (k.as_str().to_string(), v_str.to_string()))
        })
        .collect()
}
