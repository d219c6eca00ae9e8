//! Request executor.
//!
//! One stateless pipeline: build the URL and headers for a descriptor, send it
//! through the transport, classify the response. No retries, no pagination
//! traversal, no caching.

use std::collections::HashMap;
use std::sync::Arc;

use crate::auth::Credential;
use crate::error::ClientError;
use crate::execution::http::headers::HttpHeaderBuilder;
use crate::execution::http::interceptor::{
    HttpInterceptor, HttpRequestContext, generate_request_id,
};
use crate::execution::http::transport::{
    HttpTransport, HttpTransportRequest, HttpTransportResponse, ReqwestTransport,
};
use crate::services::ServiceProfile;
use crate::types::{HttpConfig, JsonValue, Outcome, RequestDescriptor};

/// Executes requests against one service.
///
/// The executor holds no credential: the caller passes it per call so one
/// executor can serve several UI sessions.
#[derive(Clone)]
pub struct RequestExecutor {
    profile: ServiceProfile,
    transport: Arc<dyn HttpTransport>,
    interceptors: Vec<Arc<dyn HttpInterceptor>>,
    custom_headers: HashMap<String, String>,
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("profile", &self.profile)
            .field("interceptors", &self.interceptors.len())
            .field("custom_headers", &self.custom_headers)
            .finish()
    }
}

impl RequestExecutor {
    /// Executor using the reqwest transport configured from `http`.
    pub fn new(profile: ServiceProfile, http: &HttpConfig) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::new(http)?;
        Ok(Self::with_transport(profile, Arc::new(transport))
            .with_custom_headers(http.headers.clone()))
    }

    /// Executor using a caller-supplied transport (stubs, recorders, ...).
    pub fn with_transport(profile: ServiceProfile, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            profile,
            transport,
            interceptors: Vec::new(),
            custom_headers: HashMap::new(),
        }
    }

    pub fn with_interceptor(mut self, interceptor: Arc<dyn HttpInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    pub fn with_custom_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.custom_headers.extend(headers);
        self
    }

    pub fn profile(&self) -> &ServiceProfile {
        &self.profile
    }

    /// Run one request and fold the result into an [`Outcome`].
    pub async fn execute(&self, request: &RequestDescriptor, credential: &Credential) -> Outcome {
        self.try_execute(request, credential).await.into()
    }

    /// Run one request, returning the decoded payload or the typed error.
    pub async fn try_execute(
        &self,
        request: &RequestDescriptor,
        credential: &Credential,
    ) -> Result<JsonValue, ClientError> {
        let url = request.url(&self.profile.base_url);
        let ctx = HttpRequestContext {
            request_id: generate_request_id(),
            service_id: self.profile.id.clone(),
            method: request.method,
            url: url.clone(),
        };

        if request.body.is_some() && request.effective_body().is_none() {
            tracing::debug!(
                request_id = %ctx.request_id,
                method = %request.method,
                "ignoring body on non-POST request"
            );
        }

        let transport_request = match self.build_transport_request(&ctx, request, credential, url)
        {
            Ok(r) => r,
            Err(e) => {
                self.notify_error(&ctx, &e);
                return Err(e);
            }
        };

        let response = match self.transport.send(transport_request).await {
            Ok(r) => r,
            Err(e) => {
                self.notify_error(&ctx, &e);
                return Err(e);
            }
        };

        for interceptor in &self.interceptors {
            interceptor.on_response(&ctx, &response);
        }

        let result = classify_response(&response);
        if let Err(e) = &result {
            self.notify_error(&ctx, e);
        }
        result
    }

    /// GET `path` with optional query pairs.
    pub async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
        credential: &Credential,
    ) -> Outcome {
        let request = query
            .iter()
            .fold(RequestDescriptor::get(path), |r, (k, v)| r.with_query(*k, v));
        self.execute(&request, credential).await
    }

    /// POST `body` as JSON to `path`.
    pub async fn post(&self, path: &str, body: JsonValue, credential: &Credential) -> Outcome {
        self.execute(&RequestDescriptor::post(path, body), credential)
            .await
    }

    fn build_transport_request(
        &self,
        ctx: &HttpRequestContext,
        request: &RequestDescriptor,
        credential: &Credential,
        url: String,
    ) -> Result<HttpTransportRequest, ClientError> {
        let body = request.effective_body().cloned();

        let mut builder = HttpHeaderBuilder::new()
            .with_custom_headers(&self.profile.extra_headers)?
            .with_custom_headers(&self.custom_headers)?
            .with_credential(&self.profile.auth, credential)?;
        if body.is_some() {
            builder = builder.with_json_content_type();
        }

        let mut transport_request = HttpTransportRequest {
            ctx: ctx.clone(),
            method: request.method,
            url,
            headers: builder.build(),
            body,
        };

        for interceptor in &self.interceptors {
            interceptor.on_before_send(ctx, &mut transport_request)?;
        }
        Ok(transport_request)
    }

    fn notify_error(&self, ctx: &HttpRequestContext, error: &ClientError) {
        for interceptor in &self.interceptors {
            interceptor.on_error(ctx, error);
        }
    }
}

/// Map a raw response to the payload or a typed error.
///
/// 2xx with a JSON body is a success; 2xx with anything else (including an
/// empty body) is a `DecodeFailure`; every other status is an `ApiFailure`.
pub fn classify_response(response: &HttpTransportResponse) -> Result<JsonValue, ClientError> {
    let text = response.text();
    if !response.is_success() {
        return Err(ClientError::api_failure(response.status, text));
    }
    serde_json::from_str::<JsonValue>(&text)
        .map_err(|_| ClientError::decode_failure(response.status, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthScheme;
    use crate::types::HttpMethod;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Returns a fixed response and records what it was asked to send.
    struct StubTransport {
        status: u16,
        body: String,
        seen: Mutex<Vec<HttpTransportRequest>>,
    }

    impl StubTransport {
        fn new(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                status,
                body: body.to_string(),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn last(&self) -> HttpTransportRequest {
            self.seen.lock().unwrap().last().cloned().expect("no request sent")
        }

        fn count(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl HttpTransport for StubTransport {
        async fn send(
            &self,
            request: HttpTransportRequest,
        ) -> Result<HttpTransportResponse, ClientError> {
            self.seen.lock().unwrap().push(request);
            Ok(HttpTransportResponse::new(self.status, self.body.clone()))
        }
    }

    struct FailingTransport;

    #[async_trait]
    impl HttpTransport for FailingTransport {
        async fn send(
            &self,
            _request: HttpTransportRequest,
        ) -> Result<HttpTransportResponse, ClientError> {
            Err(ClientError::transport("dns error: failed to lookup address"))
        }
    }

    struct FlagInterceptor(Arc<Mutex<Vec<&'static str>>>);

    impl HttpInterceptor for FlagInterceptor {
        fn on_before_send(
            &self,
            _ctx: &HttpRequestContext,
            request: &mut HttpTransportRequest,
        ) -> Result<(), ClientError> {
            self.0.lock().unwrap().push("before");
            request
                .headers
                .insert("x-intercepted", reqwest::header::HeaderValue::from_static("1"));
            Ok(())
        }
        fn on_response(&self, _ctx: &HttpRequestContext, _response: &HttpTransportResponse) {
            self.0.lock().unwrap().push("response");
        }
        fn on_error(&self, _ctx: &HttpRequestContext, _error: &ClientError) {
            self.0.lock().unwrap().push("error");
        }
    }

    fn gitlab(stub: Arc<StubTransport>) -> RequestExecutor {
        RequestExecutor::with_transport(
            ServiceProfile::gitlab().with_base_url("https://gitlab.test/api/v4"),
            stub,
        )
    }

    #[tokio::test]
    async fn success_returns_decoded_payload() {
        let stub = StubTransport::new(200, r#"{"id":68479344,"name":"demo"}"#);
        let exec = gitlab(stub.clone());
        let outcome = exec
            .execute(&RequestDescriptor::get("/projects/68479344"), &"tok".into())
            .await;

        assert_eq!(outcome, Outcome::success(json!({"id": 68479344, "name": "demo"})));
        let sent = stub.last();
        assert_eq!(sent.url, "https://gitlab.test/api/v4/projects/68479344");
        assert_eq!(sent.method, HttpMethod::Get);
        assert_eq!(sent.headers.get("authorization").unwrap(), "Bearer tok");
        assert!(sent.body.is_none());
    }

    #[tokio::test]
    async fn non_2xx_keeps_exact_status_and_raw_body() {
        let stub = StubTransport::new(404, "Not Found");
        let outcome = gitlab(stub)
            .execute(&RequestDescriptor::get("/projects/0"), &"tok".into())
            .await;
        assert_eq!(outcome, Outcome::failure(Some(404), "Not Found"));
    }

    #[tokio::test]
    async fn undecodable_2xx_is_a_failure_with_raw_text() {
        let stub = StubTransport::new(200, "<html>maintenance</html>");
        let outcome = gitlab(stub)
            .execute(&RequestDescriptor::get("/user"), &"tok".into())
            .await;
        assert_eq!(outcome, Outcome::failure(Some(200), "<html>maintenance</html>"));
    }

    #[tokio::test]
    async fn empty_2xx_body_is_a_decode_failure() {
        let stub = StubTransport::new(204, "");
        let err = gitlab(stub)
            .try_execute(&RequestDescriptor::get("/user"), &"tok".into())
            .await
            .unwrap_err();
        assert_eq!(err, ClientError::decode_failure(204, ""));
    }

    #[tokio::test]
    async fn transport_fault_has_no_status_and_a_message() {
        let exec = RequestExecutor::with_transport(ServiceProfile::gitlab(), Arc::new(FailingTransport));
        let outcome = exec
            .execute(&RequestDescriptor::get("/user"), &"tok".into())
            .await;
        match outcome {
            Outcome::Failure { status: None, body } => assert!(!body.is_empty()),
            other => panic!("expected transport failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn post_sends_json_body_and_content_type() {
        let stub = StubTransport::new(201, r#"{"title":"t","description":"d"}"#);
        let exec = gitlab(stub.clone());
        let outcome = exec
            .post(
                "/projects/68479344/issues",
                json!({"title": "t", "description": "d"}),
                &"tok".into(),
            )
            .await;

        assert_eq!(outcome, Outcome::success(json!({"title": "t", "description": "d"})));
        let sent = stub.last();
        assert_eq!(sent.method, HttpMethod::Post);
        assert_eq!(sent.body, Some(json!({"title": "t", "description": "d"})));
        assert_eq!(sent.headers.get("content-type").unwrap(), "application/json");
    }

    #[tokio::test]
    async fn get_drops_body_and_encodes_query() {
        let stub = StubTransport::new(200, "[]");
        let exec = gitlab(stub.clone());
        let request = RequestDescriptor::get("/projects")
            .with_query("membership", true)
            .with_query("page", 2)
            .with_body(json!({"ignored": true}));
        exec.execute(&request, &"tok".into()).await;

        let sent = stub.last();
        assert_eq!(
            sent.url,
            "https://gitlab.test/api/v4/projects?membership=true&page=2"
        );
        assert!(sent.body.is_none());
        assert!(sent.headers.get("content-type").is_none());
    }

    #[tokio::test]
    async fn empty_credential_is_still_sent() {
        let stub = StubTransport::new(401, r#"{"message":"401 Unauthorized"}"#);
        let exec = RequestExecutor::with_transport(
            ServiceProfile::gitlab().with_auth(AuthScheme::PrivateToken),
            stub.clone(),
        );
        let outcome = exec
            .execute(&RequestDescriptor::get("/user"), &Credential::new(""))
            .await;

        assert_eq!(stub.count(), 1);
        assert_eq!(stub.last().headers.get("private-token").unwrap(), "");
        assert_eq!(outcome.status(), Some(401));
    }

    #[tokio::test]
    async fn repeated_get_yields_identical_outcomes() {
        let stub = StubTransport::new(200, r#"{"id":1}"#);
        let exec = gitlab(stub.clone());
        let request = RequestDescriptor::get("/projects/1").with_query("statistics", true);
        let first = exec.execute(&request, &"tok".into()).await;
        let second = exec.execute(&request, &"tok".into()).await;
        assert_eq!(first, second);
        assert_eq!(stub.count(), 2);
    }

    #[tokio::test]
    async fn invalid_credential_fails_before_sending() {
        let stub = StubTransport::new(200, "{}");
        let outcome = gitlab(stub.clone())
            .execute(&RequestDescriptor::get("/user"), &Credential::new("a\nb"))
            .await;
        assert_eq!(stub.count(), 0);
        assert_eq!(outcome.status(), None);
    }

    #[tokio::test]
    async fn interceptors_see_request_response_and_error() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let stub = StubTransport::new(500, "boom");
        let exec = gitlab(stub.clone()).with_interceptor(Arc::new(FlagInterceptor(log.clone())));
        let outcome = exec
            .execute(&RequestDescriptor::get("/groups"), &"tok".into())
            .await;

        assert_eq!(outcome.status(), Some(500));
        assert_eq!(*log.lock().unwrap(), vec!["before", "response", "error"]);
        assert_eq!(stub.last().headers.get("x-intercepted").unwrap(), "1");
    }

    #[tokio::test]
    async fn profile_and_custom_headers_are_applied() {
        let stub = StubTransport::new(200, "[]");
        let exec = RequestExecutor::with_transport(
            ServiceProfile::github().with_base_url("https://gh.test"),
            stub.clone(),
        )
        .with_custom_headers(HashMap::from([(
            "X-GitHub-Api-Version".to_string(),
            "2022-11-28".to_string(),
        )]));
        exec.get("/repos/o/r/contents", &[], &"ghp".into()).await;

        let sent = stub.last();
        assert_eq!(sent.headers.get("accept").unwrap(), "application/vnd.github+json");
        assert_eq!(sent.headers.get("x-github-api-version").unwrap(), "2022-11-28");
    }

    #[tokio::test]
    async fn reqwest_backed_executor_against_mock_server() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api/v4/projects")
            .match_header("authorization", "Bearer glpat")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("page".into(), "1".into()),
                mockito::Matcher::UrlEncoded("per_page".into(), "20".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id":1}]"#)
            .create_async()
            .await;

        let exec = RequestExecutor::new(
            ServiceProfile::gitlab().with_base_url(format!("{}/api/v4", server.url())),
            &HttpConfig::default(),
        )
        .unwrap();
        let outcome = exec
            .get("/projects", &[("page", "1"), ("per_page", "20")], &"glpat".into())
            .await;
        assert_eq!(outcome, Outcome::success(json!([{"id": 1}])));
    }

    #[tokio::test]
    async fn connection_refused_maps_to_transport_failure() {
        let exec = RequestExecutor::new(
            ServiceProfile::gitlab().with_base_url("http://127.0.0.1:1"),
            &HttpConfig::default(),
        )
        .unwrap();
        let outcome = exec
            .execute(&RequestDescriptor::get("/user"), &"tok".into())
            .await;
        assert_eq!(outcome.status(), None);
        assert!(!outcome.is_success());
    }

    mod classification {
        use crate::execution::classify_response;
        use crate::execution::http::HttpTransportResponse;
        use proptest::prelude::*;
        use serde_json::Value;

        fn json_value() -> impl Strategy<Value = Value> {
            let leaf = prop_oneof![
                Just(Value::Null),
                any::<bool>().prop_map(Value::from),
                any::<i64>().prop_map(Value::from),
                ".*".prop_map(Value::from),
            ];
            leaf.prop_recursive(3, 32, 4, |inner| {
                prop_oneof![
                    prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                    prop::collection::btree_map("[a-z_]{0,8}", inner, 0..4)
                        .prop_map(|m| Value::Object(m.into_iter().collect())),
                ]
            })
        }

        proptest! {
            // Any status outside 2xx fails with exactly that status, whatever the body.
            #[test]
            fn any_non_2xx_status_is_an_api_failure(
                status in (100u16..=599).prop_filter("non-2xx", |s| !(200..300).contains(s)),
                body in ".*",
            ) {
                let err = classify_response(&HttpTransportResponse::new(status, body.clone()))
                    .unwrap_err();
                prop_assert_eq!(err.status(), Some(status));
                prop_assert_eq!(err.detail(), body);
            }

            // Any JSON document served with a 2xx status decodes to an equal payload.
            #[test]
            fn any_json_payload_round_trips_on_2xx(
                status in 200u16..300,
                value in json_value(),
            ) {
                let body = serde_json::to_string(&value).unwrap();
                let payload = classify_response(&HttpTransportResponse::new(status, body)).unwrap();
                prop_assert_eq!(payload, value);
            }
        }
    }
}
