//! # apiprobe
//!
//! Authenticated REST calls against a handful of fixed services (GitLab,
//! GitHub, OpenAI-compatible chat, Eraser) with every response folded into a
//! uniform [`Outcome`] a UI can render directly.
#![deny(unsafe_code)]

//! ## Shape
//!
//! - **Request Executor**: one call in, one [`Outcome`] out. No retries,
//!   pagination traversal or caching.
//! - **Service profiles**: base URL plus credential header convention per
//!   service, with base URL overrides from the environment.
//! - **Transport seam**: the executor sends through an [`HttpTransport`], so
//!   tests and callers can swap in a stub.
//! - **Fail fast on missing credentials**: nothing is hardcoded.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use apiprobe::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ClientError> {
//!     let config = ProbeConfig::from_dotenv()?;
//!     let gitlab = GitLabClient::new(ServiceClient::from_config(&config, ServiceKind::GitLab)?);
//!
//!     let outcome = gitlab.project(68479344).await;
//!     println!("{}", outcome.to_display_value());
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
pub mod conversation;
pub mod defaults;
pub mod error;
pub mod execution;
pub mod providers;
pub mod render;
pub mod services;
pub mod telemetry;
pub mod types;

pub use auth::{AuthScheme, Credential};
pub use config::ProbeConfig;
pub use error::{ClientError, ErrorCategory};
pub use execution::RequestExecutor;
pub use execution::http::{HttpInterceptor, HttpTransport, LoggingInterceptor, ReqwestTransport};
pub use render::CommandPreview;
pub use services::{ServiceKind, ServiceProfile};
pub use types::{HttpConfig, HttpMethod, JsonValue, Outcome, RequestDescriptor};

/// Common imports.
pub mod prelude {
    pub use crate::auth::{AuthScheme, Credential};
    pub use crate::config::ProbeConfig;
    pub use crate::conversation::{Conversation, Synthesizer, Transcriber, Turn, VoiceAgent};
    pub use crate::error::{ClientError, ErrorCategory};
    pub use crate::execution::RequestExecutor;
    pub use crate::execution::http::{HttpInterceptor, HttpTransport, LoggingInterceptor};
    pub use crate::providers::{
        ChatClient, ChatOverrides, ChatReply, CommitSummary, EraserClient, GitHubClient,
        GitLabClient, Page, ServiceClient,
    };
    pub use crate::render::CommandPreview;
    pub use crate::services::{ServiceKind, ServiceProfile};
    pub use crate::types::{HttpConfig, HttpMethod, JsonValue, Outcome, RequestDescriptor};
}
