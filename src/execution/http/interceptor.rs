//! HTTP Interceptor interfaces
//!
//! Interceptors observe requests before they are sent, observe responses, and
//! are notified of failures. The hooks are best-effort and should avoid
//! expensive work.

use crate::error::ClientError;
use crate::execution::http::transport::{HttpTransportRequest, HttpTransportResponse};
use crate::types::HttpMethod;

/// Context passed to interceptors describing the request.
#[derive(Clone, Debug)]
pub struct HttpRequestContext {
    pub request_id: String,
    pub service_id: String,
    pub method: HttpMethod,
    pub url: String,
}

/// Generate a unique id for correlating log lines of one request.
pub fn generate_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// HTTP interceptor trait
pub trait HttpInterceptor: Send + Sync {
    /// Called before sending a request. Interceptors may add headers. Return an
    /// error to short-circuit the request.
    fn on_before_send(
        &self,
        _ctx: &HttpRequestContext,
        _request: &mut HttpTransportRequest,
    ) -> Result<(), ClientError> {
        Ok(())
    }

    /// Called for every response that reached the client, whatever its status.
    fn on_response(&self, _ctx: &HttpRequestContext, _response: &HttpTransportResponse) {}

    /// Called when the request ends in an error (transport, API or decode).
    fn on_error(&self, _ctx: &HttpRequestContext, _error: &ClientError) {}
}

/// A simple logging interceptor backed by `tracing` (no sensitive data).
#[derive(Clone, Default)]
pub struct LoggingInterceptor;

impl HttpInterceptor for LoggingInterceptor {
    fn on_before_send(
        &self,
        ctx: &HttpRequestContext,
        request: &mut HttpTransportRequest,
    ) -> Result<(), ClientError> {
        tracing::debug!(
            target: "apiprobe::http",
            request_id = %ctx.request_id,
            service = %ctx.service_id,
            method = %ctx.method,
            url = %ctx.url,
            headers = ?crate::execution::http::headers::redacted_headers(&request.headers),
            has_body = request.body.is_some(),
            "sending request"
        );
        Ok(())
    }

    fn on_response(&self, ctx: &HttpRequestContext, response: &HttpTransportResponse) {
        tracing::debug!(
            target: "apiprobe::http",
            request_id = %ctx.request_id,
            service = %ctx.service_id,
            url = %ctx.url,
            status = response.status,
            bytes = response.body.len(),
            "response received"
        );
    }

    fn on_error(&self, ctx: &HttpRequestContext, error: &ClientError) {
        tracing::warn!(
            target: "apiprobe::http",
            request_id = %ctx.request_id,
            service = %ctx.service_id,
            url = %ctx.url,
            status = ?error.status(),
            error = %error,
            "request failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthScheme;
    use crate::execution::RequestExecutor;
    use crate::providers::test_support::ScriptedTransport;
    use crate::services::ServiceProfile;
    use crate::types::RequestDescriptor;
    use std::sync::Arc;
    use tracing_test::traced_test;

    fn executor(transport: Arc<ScriptedTransport>, auth: AuthScheme) -> RequestExecutor {
        RequestExecutor::with_transport(
            ServiceProfile::gitlab()
                .with_base_url("https://gitlab.test/api/v4")
                .with_auth(auth),
            transport,
        )
        .with_interceptor(Arc::new(LoggingInterceptor))
    }

    #[test]
    fn request_ids_are_unique() {
        assert_ne!(generate_request_id(), generate_request_id());
    }

    #[tokio::test]
    #[traced_test]
    async fn logging_interceptor_never_logs_bearer_token() {
        let transport = ScriptedTransport::new().respond(200, "{}");
        executor(transport, AuthScheme::Bearer)
            .execute(&RequestDescriptor::get("/user"), &"glpat-super-secret".into())
            .await;

        assert!(logs_contain("sending request"));
        assert!(logs_contain("response received"));
        assert!(logs_contain("https://gitlab.test/api/v4/user"));
        assert!(!logs_contain("glpat-super-secret"));
    }

    #[tokio::test]
    #[traced_test]
    async fn logging_interceptor_never_logs_private_token() {
        let transport = ScriptedTransport::new().respond(401, r#"{"message":"401 Unauthorized"}"#);
        executor(transport, AuthScheme::PrivateToken)
            .execute(&RequestDescriptor::get("/groups"), &"glpat-other-secret".into())
            .await;

        assert!(logs_contain("request failed"));
        assert!(logs_contain("401"));
        assert!(!logs_contain("glpat-other-secret"));
    }
}
