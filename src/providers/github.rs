//! GitHub repository contents.

use serde::Deserialize;

use super::{ServiceClient, path_segment};
use crate::error::ClientError;
use crate::types::{JsonValue, Outcome, RequestDescriptor};

#[derive(Debug, Deserialize)]
struct ContentEntry {
    #[serde(rename = "type")]
    kind: String,
    path: String,
}

#[derive(Debug, Clone)]
pub struct GitHubClient {
    service: ServiceClient,
}

impl GitHubClient {
    pub fn new(service: ServiceClient) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &ServiceClient {
        &self.service
    }

    /// `GET /repos/{owner}/{repo}/contents/{path}`.
    ///
    /// `repository` is the `owner/name` form; `path` may be empty for the root.
    pub fn contents_request(repository: &str, path: &str) -> Result<RequestDescriptor, ClientError> {
        let (owner, name) = split_repository(repository)?;
        let mut url = format!("/repos/{}/{}/contents", path_segment(owner), path_segment(name));
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            url.push('/');
            url.push_str(&path_segment(segment));
        }
        Ok(RequestDescriptor::get(url))
    }

    pub async fn repository_contents(&self, repository: &str, path: &str) -> Outcome {
        match Self::contents_request(repository, path) {
            Ok(request) => self.service.execute(&request).await,
            Err(e) => e.into(),
        }
    }

    /// Paths of the plain files directly under `path`. Directories, symlinks
    /// and submodules are skipped.
    pub async fn repository_file_paths(
        &self,
        repository: &str,
        path: &str,
    ) -> Result<Vec<String>, ClientError> {
        let request = Self::contents_request(repository, path)?;
        let payload = self.service.try_execute(&request).await?;
        file_paths(&payload)
    }
}

/// Extract `path` of every `type == "file"` entry of a contents listing.
pub fn file_paths(listing: &JsonValue) -> Result<Vec<String>, ClientError> {
    let entries: Vec<ContentEntry> = match listing {
        JsonValue::Array(_) => serde_json::from_value(listing.clone())
            .map_err(|e| ClientError::ParseError(format!("Unexpected contents listing: {e}")))?,
        // A single file path returns the file object itself.
        JsonValue::Object(_) => vec![serde_json::from_value(listing.clone()).map_err(|e| {
            ClientError::ParseError(format!("Unexpected contents entry: {e}"))
        })?],
        other => {
            return Err(ClientError::ParseError(format!(
                "Unexpected contents payload: {other}"
            )));
        }
    };
    Ok(entries
        .into_iter()
        .filter(|e| e.kind == "file")
        .map(|e| e.path)
        .collect())
}

fn split_repository(repository: &str) -> Result<(&str, &str), ClientError> {
    match repository.trim().split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok((owner, name))
        }
        _ => Err(ClientError::InvalidParameter(format!(
            "Repository must be in owner/name form, got '{repository}'"
        ))),
    }
}
