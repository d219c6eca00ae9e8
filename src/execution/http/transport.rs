//! HTTP transport abstraction.
//!
//! The executor never talks to `reqwest` directly. It hands a fully built
//! request to an `HttpTransport`, which lets callers and tests substitute a
//! stub that returns canned responses.

use crate::error::ClientError;
use crate::execution::http::interceptor::HttpRequestContext;
use crate::types::{HttpConfig, HttpMethod, JsonValue};
use async_trait::async_trait;
use reqwest::header::HeaderMap;

/// Transport-level request data.
#[derive(Debug, Clone)]
pub struct HttpTransportRequest {
    pub ctx: HttpRequestContext,
    pub method: HttpMethod,
    /// Absolute URL including the encoded query string.
    pub url: String,
    pub headers: HeaderMap,
    /// JSON body, only ever present for POST.
    pub body: Option<JsonValue>,
}

/// Transport-level response data.
#[derive(Debug, Clone)]
pub struct HttpTransportResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpTransportResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends one request and returns the raw response.
///
/// Implementations return `Err` only for transport faults; any HTTP status,
/// including errors, is an `Ok` response.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpTransportRequest)
    -> Result<HttpTransportResponse, ClientError>;
}

/// Default transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client honouring timeouts, proxy and user agent from `config`.
    pub fn new(config: &HttpConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| ClientError::ConfigurationError(format!("Invalid proxy: {e}")))?;
            builder = builder.proxy(proxy);
        }
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        let client = builder.build().map_err(|e| {
            ClientError::ConfigurationError(format!("Failed to build HTTP client: {e}"))
        })?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        request: HttpTransportRequest,
    ) -> Result<HttpTransportResponse, ClientError> {
        let mut rb = self
            .client
            .request(request.method.into(), &request.url)
            .headers(request.headers);
        if let Some(body) = &request.body {
            rb = rb.json(body);
        }

        let resp = rb.send().await.map_err(ClientError::from)?;

        let status = resp.status().as_u16();
        let headers = resp.headers().clone();
        // A body cut short is a transport fault; the status already read is
        // discarded.
        let body = resp
            .bytes()
            .await
            .map_err(|e| ClientError::transport(format!("Failed to read response body: {e}")))?;

        Ok(HttpTransportResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::http::interceptor::generate_request_id;

    fn ctx(url: &str) -> HttpRequestContext {
        HttpRequestContext {
            request_id: generate_request_id(),
            service_id: "test".into(),
            method: HttpMethod::Get,
            url: url.into(),
        }
    }

    #[tokio::test]
    async fn reqwest_transport_returns_error_statuses_as_responses() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/missing")
            .with_status(404)
            .with_body("Not Found")
            .create_async()
            .await;

        let url = format!("{}/missing", server.url());
        let transport = ReqwestTransport::new(&HttpConfig::default()).unwrap();
        let resp = transport
            .send(HttpTransportRequest {
                ctx: ctx(&url),
                method: HttpMethod::Get,
                url: url.clone(),
                headers: HeaderMap::new(),
                body: None,
            })
            .await
            .expect("404 is not a transport error");

        assert_eq!(resp.status, 404);
        assert!(!resp.is_success());
        assert_eq!(resp.text(), "Not Found");
    }

    #[tokio::test]
    async fn reqwest_transport_posts_json_body() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/echo")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::Json(serde_json::json!({"a": 1})))
            .with_status(201)
            .with_body("{\"a\":1}")
            .create_async()
            .await;

        let url = format!("{}/echo", server.url());
        let transport = ReqwestTransport::new(&HttpConfig::default()).unwrap();
        let resp = transport
            .send(HttpTransportRequest {
                ctx: ctx(&url),
                method: HttpMethod::Post,
                url: url.clone(),
                headers: HeaderMap::new(),
                body: Some(serde_json::json!({"a": 1})),
            })
            .await
            .unwrap();

        assert_eq!(resp.status, 201);
    }

    /// Answers one request with a 200 whose body stops short of its
    /// `Content-Length`, then closes the connection.
    fn serve_truncated_body() -> String {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let _ = stream.write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\n{\"id\"",
                );
                let _ = stream.flush();
            }
        });
        format!("http://{addr}/projects/1")
    }

    #[tokio::test]
    async fn truncated_body_is_a_transport_error() {
        let url = serve_truncated_body();
        let transport = ReqwestTransport::new(&HttpConfig::default()).unwrap();
        let err = transport
            .send(HttpTransportRequest {
                ctx: ctx(&url),
                method: HttpMethod::Get,
                url: url.clone(),
                headers: HeaderMap::new(),
                body: None,
            })
            .await
            .unwrap_err();

        assert!(err.is_transport());
        assert_eq!(err.status(), None);
        assert!(!err.detail().is_empty());
    }

    #[test]
    fn invalid_proxy_is_a_configuration_error() {
        let config = HttpConfig::builder().proxy(Some("http://[::1")).build();
        let err = ReqwestTransport::new(&config).unwrap_err();
        assert!(matches!(err, ClientError::ConfigurationError(_)));
    }
}
