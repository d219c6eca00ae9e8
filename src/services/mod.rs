//! Service profiles.
//!
//! A profile is the fixed base URL a request path is resolved against plus
//! the header convention the service expects for its credential.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::auth::AuthScheme;
use crate::defaults;

/// Known services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    GitLab,
    GitHub,
    OpenAi,
    DeepSeek,
    Eraser,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 5] = [
        Self::GitLab,
        Self::GitHub,
        Self::OpenAi,
        Self::DeepSeek,
        Self::Eraser,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Self::GitLab => "gitlab",
            Self::GitHub => "github",
            Self::OpenAi => "openai",
            Self::DeepSeek => "deepseek",
            Self::Eraser => "eraser",
        }
    }

    /// Environment variable holding this service's credential.
    pub fn credential_env(&self) -> &'static str {
        match self {
            Self::GitLab => defaults::env::GITLAB_TOKEN,
            Self::GitHub => defaults::env::GITHUB_TOKEN,
            Self::OpenAi => defaults::env::OPENAI_API_KEY,
            Self::DeepSeek => defaults::env::DEEPSEEK_API_KEY,
            Self::Eraser => defaults::env::ERASER_API_KEY,
        }
    }

    pub fn profile(&self) -> ServiceProfile {
        match self {
            Self::GitLab => ServiceProfile::gitlab(),
            Self::GitHub => ServiceProfile::github(),
            Self::OpenAi => ServiceProfile::openai(),
            Self::DeepSeek => ServiceProfile::deepseek(),
            Self::Eraser => ServiceProfile::eraser(),
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Where and how to talk to one service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceProfile {
    /// Identifier used in logs.
    pub id: String,
    /// Service base, e.g. `https://gitlab.com/api/v4`.
    pub base_url: String,
    pub auth: AuthScheme,
    /// Static headers sent with every request to this service.
    #[serde(default)]
    pub extra_headers: HashMap<String, String>,
}

impl ServiceProfile {
    pub fn new(id: impl Into<String>, base_url: impl Into<String>, auth: AuthScheme) -> Self {
        Self {
            id: id.into(),
            base_url: base_url.into(),
            auth,
            extra_headers: HashMap::new(),
        }
    }

    /// GitLab REST v4. Bearer works for personal, project and OAuth tokens.
    pub fn gitlab() -> Self {
        Self::new(ServiceKind::GitLab.id(), defaults::base_url::GITLAB, AuthScheme::Bearer)
    }

    pub fn github() -> Self {
        Self::new(ServiceKind::GitHub.id(), defaults::base_url::GITHUB, AuthScheme::Bearer)
            .with_header("Accept", "application/vnd.github+json")
    }

    pub fn openai() -> Self {
        Self::new(ServiceKind::OpenAi.id(), defaults::base_url::OPENAI, AuthScheme::Bearer)
    }

    /// DeepSeek speaks the OpenAI chat completions protocol.
    pub fn deepseek() -> Self {
        Self::new(
            ServiceKind::DeepSeek.id(),
            defaults::base_url::DEEPSEEK,
            AuthScheme::Bearer,
        )
    }

    pub fn eraser() -> Self {
        Self::new(ServiceKind::Eraser.id(), defaults::base_url::ERASER, AuthScheme::Bearer)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_auth(mut self, auth: AuthScheme) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(name.into(), value.into());
        self
    }
}
