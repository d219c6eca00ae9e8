//! Renderable views of requests for UI shells.
//!
//! `CommandPreview` shows the `curl` and HTTPie equivalents of a request so a
//! user can reproduce it outside the app. The credential is masked unless the
//! caller explicitly asks to reveal it.

use crate::auth::Credential;
use crate::defaults::MASKED_CREDENTIAL;
use crate::services::ServiceProfile;
use crate::types::{HttpMethod, JsonValue, RequestDescriptor};

/// Shell command equivalents of one request.
#[derive(Debug, Clone)]
pub struct CommandPreview<'a> {
    profile: &'a ServiceProfile,
    request: &'a RequestDescriptor,
    credential: &'a Credential,
    reveal: bool,
}

impl<'a> CommandPreview<'a> {
    pub fn new(
        profile: &'a ServiceProfile,
        request: &'a RequestDescriptor,
        credential: &'a Credential,
    ) -> Self {
        Self {
            profile,
            request,
            credential,
            reveal: false,
        }
    }

    /// Show the real credential instead of the mask.
    pub fn reveal_credential(mut self, reveal: bool) -> Self {
        self.reveal = reveal;
        self
    }

    fn token(&self) -> &str {
        if self.reveal {
            self.credential.expose()
        } else {
            MASKED_CREDENTIAL
        }
    }

    /// Header pairs in a stable order: credential first, then service headers
    /// sorted by name.
    fn header_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![self.profile.auth.header_pair(self.token())];
        let mut extra: Vec<_> = self
            .profile
            .extra_headers
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        extra.sort();
        pairs.extend(extra);
        pairs
    }

    pub fn curl(&self) -> String {
        let url = self.request.url(&self.profile.base_url);
        let headers: Vec<String> = self
            .header_pairs()
            .into_iter()
            .map(|(k, v)| format!("--header \"{k}: {v}\""))
            .collect();

        match (self.request.method, self.request.effective_body()) {
            (HttpMethod::Post, Some(body)) => {
                let mut lines = vec![format!("curl --request POST {}", headers.join(" "))];
                lines.push("--header \"Content-Type: application/json\"".to_string());
                lines.push(format!("--data '{}'", body));
                lines.push(format!("\"{url}\""));
                lines.join(" \\\n")
            }
            (HttpMethod::Post, None) => {
                format!("curl --request POST {} \"{url}\"", headers.join(" "))
            }
            (HttpMethod::Get, _) => format!("curl {} \"{url}\"", headers.join(" ")),
        }
    }

    pub fn httpie(&self) -> String {
        let url = self.request.url(&self.profile.base_url);
        let headers: Vec<String> = self
            .header_pairs()
            .into_iter()
            .map(|(k, v)| format!("\"{k}:{v}\""))
            .collect();

        match self.request.effective_body() {
            Some(body) => {
                let mut lines = vec![format!("http {} {url}", self.request.method)];
                lines.extend(headers);
                lines.extend(httpie_fields(body));
                lines.join(" \\\n")
            }
            None => format!("http {} {url} {}", self.request.method, headers.join(" ")),
        }
    }
}

/// HTTPie request items for a JSON body: `key="text"` for strings,
/// `key:='<json>'` for everything else. Non-object bodies are sent raw.
fn httpie_fields(body: &JsonValue) -> Vec<String> {
    match body {
        JsonValue::Object(map) => map
            .iter()
            .map(|(k, v)| match v {
                JsonValue::String(s) => format!("{k}=\"{s}\""),
                other => format!("{k}:='{other}'"),
            })
            .collect(),
        other => vec![format!("--raw '{other}'")],
    }
}
