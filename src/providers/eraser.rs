//! Eraser diagram rendering.

use serde_json::json;

use super::{ChatClient, GitHubClient, ServiceClient};
use crate::error::ClientError;
use crate::types::{JsonValue, Outcome, RequestDescriptor};

const DIAGRAM_INSTRUCTION: &str = "Describe an architecture diagram for a repository containing the files below. \
Name the main components and how they connect, in a form suitable for a diagram generator.";

#[derive(Debug, Clone)]
pub struct EraserClient {
    service: ServiceClient,
}

impl EraserClient {
    pub fn new(service: ServiceClient) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &ServiceClient {
        &self.service
    }

    pub fn render_prompt_request(text: &str) -> RequestDescriptor {
        RequestDescriptor::post("/render/prompt", json!({ "text": text }))
    }

    /// Render a diagram from a natural-language prompt. The payload is opaque.
    pub async fn render_prompt(&self, text: &str) -> Outcome {
        self.service
            .execute(&Self::render_prompt_request(text))
            .await
    }
}

/// Result of [`diagram_from_repository`]: each intermediate artefact is kept
/// so a UI can show it.
#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryDiagram {
    pub files: Vec<String>,
    pub prompt: String,
    pub diagram: Outcome,
}

/// List the repository's root files, ask the chat model for a diagram
/// description, then render it. Steps run strictly in sequence; a failure in
/// listing or chat stops before the render call.
pub async fn diagram_from_repository(
    github: &GitHubClient,
    chat: &ChatClient,
    eraser: &EraserClient,
    repository: &str,
) -> Result<RepositoryDiagram, ClientError> {
    let files = github.repository_file_paths(repository, "").await?;
    if files.is_empty() {
        return Err(ClientError::InvalidParameter(format!(
            "Repository '{repository}' has no files at its root"
        )));
    }

    let listing = files.join("\n");
    let reply = chat
        .generate_response(
            DIAGRAM_INSTRUCTION,
            &[("files", listing.as_str())],
            &Default::default(),
        )
        .await?;

    let diagram = eraser.render_prompt(&reply.content).await;
    Ok(RepositoryDiagram {
        files,
        prompt: reply.content,
        diagram,
    })
}

/// The URL of a rendered diagram, when the payload carries one.
pub fn diagram_url(payload: &JsonValue) -> Option<&str> {
    ["imageUrl", "diagram_url", "url"]
        .iter()
        .find_map(|k| payload.get(*k).and_then(JsonValue::as_str))
}
