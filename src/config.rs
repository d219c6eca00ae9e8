//! Process configuration.
//!
//! Credentials are read once at startup and handed to the clients that need
//! them. Nothing is hardcoded: a service whose credential is absent fails with
//! `ClientError::MissingCredential` the moment a caller asks for it.

use std::collections::HashMap;
use std::path::Path;

use crate::auth::Credential;
use crate::defaults::env;
use crate::error::ClientError;
use crate::services::{ServiceKind, ServiceProfile};
use crate::types::HttpConfig;

/// Credentials and endpoint overrides for every known service.
#[derive(Debug, Clone, Default)]
pub struct ProbeConfig {
    credentials: HashMap<ServiceKind, Credential>,
    base_urls: HashMap<ServiceKind, String>,
    pub http: HttpConfig,
}

impl ProbeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Load a `.env` file (if present) into the environment, then read it.
    pub fn from_dotenv() -> Result<Self, ClientError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env file"),
            Err(e) if e.not_found() => tracing::debug!(".env file not found"),
            Err(e) => {
                return Err(ClientError::ConfigurationError(format!(
                    "Failed to load .env file: {e}"
                )));
            }
        }
        Ok(Self::from_env())
    }

    /// Read `KEY=VALUE` pairs from a dotenv file without touching the process
    /// environment.
    pub fn from_dotenv_file(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let iter = dotenvy::from_path_iter(path).map_err(|e| {
            ClientError::ConfigurationError(format!("Failed to read {}: {e}", path.display()))
        })?;
        let mut vars = HashMap::new();
        for item in iter {
            let (k, v) = item.map_err(|e| {
                ClientError::ConfigurationError(format!("Invalid entry in {}: {e}", path.display()))
            })?;
            vars.insert(k, v);
        }
        Ok(Self::from_lookup(|k| vars.get(k).cloned()))
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        for kind in ServiceKind::ALL {
            if let Ok(credential) = Credential::from_lookup(kind.credential_env(), &lookup) {
                config.credentials.insert(kind, credential);
            }
        }
        let overrides = [
            (ServiceKind::GitLab, env::GITLAB_API_URL),
            (ServiceKind::GitHub, env::GITHUB_API_URL),
            (ServiceKind::OpenAi, env::OPENAI_BASE_URL),
        ];
        for (kind, var) in overrides {
            if let Some(url) = lookup(var).filter(|v| !v.trim().is_empty()) {
                config.base_urls.insert(kind, url.trim().to_string());
            }
        }
        tracing::debug!(
            services = ?config.configured_services(),
            "configuration loaded"
        );
        config
    }

    pub fn with_credential(mut self, kind: ServiceKind, credential: impl Into<Credential>) -> Self {
        self.credentials.insert(kind, credential.into());
        self
    }

    pub fn with_base_url(mut self, kind: ServiceKind, base_url: impl Into<String>) -> Self {
        self.base_urls.insert(kind, base_url.into());
        self
    }

    pub fn with_http_config(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    /// Credential for `kind`, or `MissingCredential(<ENV_VAR>)`.
    pub fn credential(&self, kind: ServiceKind) -> Result<Credential, ClientError> {
        self.credentials
            .get(&kind)
            .cloned()
            .ok_or_else(|| ClientError::MissingCredential(kind.credential_env().to_string()))
    }

    pub fn has_credential(&self, kind: ServiceKind) -> bool {
        self.credentials.contains_key(&kind)
    }

    /// Preset profile for `kind` with any base URL override applied.
    pub fn profile(&self, kind: ServiceKind) -> ServiceProfile {
        let profile = kind.profile();
        match self.base_urls.get(&kind) {
            Some(url) => profile.with_base_url(url.clone()),
            None => profile,
        }
    }

    pub fn configured_services(&self) -> Vec<ServiceKind> {
        ServiceKind::ALL
            .into_iter()
            .filter(|k| self.credentials.contains_key(k))
            .collect()
    }
}
