//! Request descriptors.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::JsonValue;

/// HTTP method. Only the verbs the executor issues are modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

/// One request against a service, relative to the service base.
///
/// Built fresh per call. Query pairs are kept sorted by key so identical
/// descriptors always produce identical URLs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    pub path: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub query: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<JsonValue>,
}

impl RequestDescriptor {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: BTreeMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>, body: JsonValue) -> Self {
        Self::new(HttpMethod::Post, path).with_body(body)
    }

    /// Add a query parameter; scalar values are rendered with `Display`.
    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.insert(key.into(), value.to_string());
        self
    }

    /// Add a query parameter only when a value is present.
    pub fn with_optional_query<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.with_query(key, v),
            None => self,
        }
    }

    pub fn with_body(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    /// The body that will actually be sent: only POST requests carry one.
    pub fn effective_body(&self) -> Option<&JsonValue> {
        match self.method {
            HttpMethod::Post => self.body.as_ref(),
            HttpMethod::Get => None,
        }
    }

    /// Path plus encoded query string, e.g. `/projects?page=1&per_page=20`.
    ///
    /// A path that already carries a query keeps it; the pairs are appended
    /// after an `&`.
    pub fn path_and_query(&self) -> String {
        let path = if self.path.starts_with('/') || self.path.is_empty() {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };
        if self.query.is_empty() {
            return path;
        }
        let query = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let sep = if !path.contains('?') {
            "?"
        } else if path.ends_with(['?', '&']) {
            ""
        } else {
            "&"
        };
        format!("{path}{sep}{query}")
    }

    /// Resolve against a service base URL.
    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path_and_query())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn url_joins_base_and_path() {
        let req = RequestDescriptor::get("/projects/68479344");
        assert_eq!(
            req.url("https://gitlab.com/api/v4/"),
            "https://gitlab.com/api/v4/projects/68479344"
        );
        let req = RequestDescriptor::get("user");
        assert_eq!(req.url("https://gitlab.com/api/v4"), "https://gitlab.com/api/v4/user");
    }

    #[test]
    fn query_extends_a_query_already_in_the_path() {
        let req = RequestDescriptor::get("/projects?x=1").with_query("page", 1);
        assert_eq!(req.path_and_query(), "/projects?x=1&page=1");

        let req = RequestDescriptor::get("/projects?").with_query("page", 1);
        assert_eq!(req.path_and_query(), "/projects?page=1");

        let req = RequestDescriptor::get("/search?q=a&").with_query("page", 2);
        assert_eq!(req.path_and_query(), "/search?q=a&page=2");
    }

    #[test]
    fn query_is_sorted_and_encoded() {
        let req = RequestDescriptor::get("/projects")
            .with_query("per_page", 20)
            .with_query("page", 1)
            .with_query("search", "a b&c")
            .with_optional_query::<u32>("skip", None);
        assert_eq!(
            req.path_and_query(),
            "/projects?page=1&per_page=20&search=a%20b%26c"
        );
    }

    #[test]
    fn body_is_only_effective_for_post() {
        let body = json!({"title": "t"});
        let get = RequestDescriptor::get("/x").with_body(body.clone());
        assert!(get.effective_body().is_none());
        let post = RequestDescriptor::post("/x", body.clone());
        assert_eq!(post.effective_body(), Some(&body));
    }

    #[test]
    fn method_serializes_uppercase() {
        assert_eq!(serde_json::to_value(HttpMethod::Post).unwrap(), json!("POST"));
        assert_eq!(HttpMethod::Get.to_string(), "GET");
    }
}
