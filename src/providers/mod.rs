//! Service Helpers
//!
//! Thin typed wrappers over [`RequestExecutor`] for the services the crate
//! knows about. Each helper only builds request descriptors; payloads stay
//! opaque JSON except where a small typed view is useful for display
//! (commit summaries, chat replies, file paths).
//!
//! Pagination parameters are forwarded as-is and never followed.

pub mod eraser;
pub mod github;
pub mod gitlab;
pub mod openai;

pub use eraser::{EraserClient, RepositoryDiagram, diagram_from_repository};
pub use github::GitHubClient;
pub use gitlab::{CommitSummary, DashboardSnapshot, GitLabClient, Page, ProjectDetail};
pub use openai::{ChatClient, ChatDefaults, ChatMessage, ChatOverrides, ChatReply, ChatRole};

use std::sync::Arc;

use crate::auth::Credential;
use crate::config::ProbeConfig;
use crate::error::ClientError;
use crate::execution::RequestExecutor;
use crate::execution::http::HttpInterceptor;
use crate::services::{ServiceKind, ServiceProfile};
use crate::types::{JsonValue, Outcome, RequestDescriptor};

/// An executor paired with the credential it sends.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    executor: Arc<RequestExecutor>,
    credential: Credential,
}

impl ServiceClient {
    pub fn new(executor: RequestExecutor, credential: Credential) -> Self {
        Self {
            executor: Arc::new(executor),
            credential,
        }
    }

    /// Build a client for `kind` from loaded configuration.
    ///
    /// Fails with `MissingCredential` when the service's variable is unset.
    pub fn from_config(config: &ProbeConfig, kind: ServiceKind) -> Result<Self, ClientError> {
        let credential = config.credential(kind)?;
        let executor = RequestExecutor::new(config.profile(kind), &config.http)?;
        Ok(Self::new(executor, credential))
    }

    /// Like [`ServiceClient::from_config`], with interceptors attached.
    pub fn from_config_with_interceptors(
        config: &ProbeConfig,
        kind: ServiceKind,
        interceptors: Vec<Arc<dyn HttpInterceptor>>,
    ) -> Result<Self, ClientError> {
        let credential = config.credential(kind)?;
        let executor = interceptors.into_iter().fold(
            RequestExecutor::new(config.profile(kind), &config.http)?,
            |exec, i| exec.with_interceptor(i),
        );
        Ok(Self::new(executor, credential))
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    pub fn profile(&self) -> &ServiceProfile {
        self.executor.profile()
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub async fn execute(&self, request: &RequestDescriptor) -> Outcome {
        self.executor.execute(request, &self.credential).await
    }

    pub async fn try_execute(&self, request: &RequestDescriptor) -> Result<JsonValue, ClientError> {
        self.executor.try_execute(request, &self.credential).await
    }
}

/// Encode an id or name for use as a single path segment
/// (`group/project` becomes `group%2Fproject`).
pub(crate) fn path_segment(id: impl ToString) -> String {
    urlencoding::encode(&id.to_string()).into_owned()
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::ServiceClient;
    use crate::error::ClientError;
    use crate::execution::RequestExecutor;
    use crate::execution::http::{HttpTransport, HttpTransportRequest, HttpTransportResponse};
    use crate::services::ServiceProfile;

    /// Replays queued responses in order and records every request.
    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<HttpTransportResponse, ClientError>>>,
        seen: Mutex<Vec<HttpTransportRequest>>,
    }

    impl ScriptedTransport {
        pub(crate) fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub(crate) fn respond(self: &Arc<Self>, status: u16, body: &str) -> Arc<Self> {
            self.responses
                .lock()
                .unwrap()
                .push_back(Ok(HttpTransportResponse::new(status, body.to_string())));
            self.clone()
        }

        pub(crate) fn fail(self: &Arc<Self>, message: &str) -> Arc<Self> {
            self.responses
                .lock()
                .unwrap()
                .push_back(Err(ClientError::transport(message)));
            self.clone()
        }

        pub(crate) fn requests(&self) -> Vec<HttpTransportRequest> {
            self.seen.lock().unwrap().clone()
        }

        pub(crate) fn last(&self) -> HttpTransportRequest {
            self.requests().pop().expect("no request sent")
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn send(
            &self,
            request: HttpTransportRequest,
        ) -> Result<HttpTransportResponse, ClientError> {
            self.seen.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ClientError::transport("no scripted response")))
        }
    }

    pub(crate) fn client(profile: ServiceProfile, transport: Arc<ScriptedTransport>) -> ServiceClient {
        ServiceClient::new(
            RequestExecutor::with_transport(profile, transport),
            "test-token".into(),
        )
    }
}
