//! Default values shared across the crate.

/// HTTP defaults.
pub mod http {
    /// User agent sent when none is configured. GitHub rejects requests without one.
    pub const USER_AGENT: &str = concat!("apiprobe/", env!("CARGO_PKG_VERSION"));
}

/// Service base URLs.
pub mod base_url {
    pub const GITLAB: &str = "https://gitlab.com/api/v4";
    pub const GITHUB: &str = "https://api.github.com";
    pub const OPENAI: &str = "https://api.openai.com/v1";
    pub const DEEPSEEK: &str = "https://api.deepseek.com";
    pub const ERASER: &str = "https://app.eraser.io/api";
}

/// Environment variable names read by [`crate::config::ProbeConfig`].
pub mod env {
    pub const GITLAB_TOKEN: &str = "GITLAB_TOKEN";
    pub const GITHUB_TOKEN: &str = "GITHUB_TOKEN";
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    pub const DEEPSEEK_API_KEY: &str = "DEEPSEEK_API_KEY";
    pub const ERASER_API_KEY: &str = "ERASER_API_KEY";

    pub const GITLAB_API_URL: &str = "GITLAB_API_URL";
    pub const GITHUB_API_URL: &str = "GITHUB_API_URL";
    pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";

    pub const LOG_LEVEL: &str = "APIPROBE_LOG_LEVEL";
    pub const LOG_FORMAT: &str = "APIPROBE_LOG_FORMAT";
    pub const LOG_FILE: &str = "APIPROBE_LOG_FILE";
}

/// Chat completion defaults.
pub mod chat {
    pub const MODEL: &str = "gpt-4";
    pub const TEMPERATURE: f32 = 0.7;
    pub const MAX_TOKENS: u32 = 1000;
    pub const FREQUENCY_PENALTY: f32 = 0.0;
    pub const SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";
}

/// Placeholder shown instead of a credential in previews.
pub const MASKED_CREDENTIAL: &str = "••••••••••";
