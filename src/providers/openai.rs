//! OpenAI-compatible chat completions.
//!
//! Works against any base that speaks `POST /chat/completions`; the OpenAI and
//! DeepSeek profiles are the two presets. One call sends an optional system
//! message and one user message. Conversation history is not replayed.

use serde::{Deserialize, Serialize};

use super::ServiceClient;
use crate::defaults;
use crate::error::ClientError;
use crate::types::{JsonValue, RequestDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Sampling parameters used when a call does not override them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatDefaults {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub frequency_penalty: f32,
}

impl Default for ChatDefaults {
    fn default() -> Self {
        Self {
            model: defaults::chat::MODEL.to_string(),
            temperature: defaults::chat::TEMPERATURE,
            max_tokens: defaults::chat::MAX_TOKENS,
            frequency_penalty: defaults::chat::FREQUENCY_PENALTY,
        }
    }
}

/// Per-call overrides. `None` falls back to [`ChatDefaults`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatOverrides {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub frequency_penalty: Option<f32>,
}

impl ChatOverrides {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn frequency_penalty(mut self, penalty: f32) -> Self {
        self.frequency_penalty = Some(penalty);
        self
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    frequency_penalty: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

/// Text of the first choice and the reported token usage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub content: String,
    pub total_tokens: Option<u32>,
}

impl ChatReply {
    pub fn from_payload(payload: JsonValue) -> Result<Self, ClientError> {
        let response: ChatCompletionResponse = serde_json::from_value(payload)
            .map_err(|e| ClientError::ParseError(format!("Unexpected chat completion: {e}")))?;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                ClientError::ParseError("Chat completion has no message content".to_string())
            })?;
        Ok(Self {
            content,
            total_tokens: response.usage.map(|u| u.total_tokens),
        })
    }
}

/// Chat completion client.
#[derive(Debug, Clone)]
pub struct ChatClient {
    service: ServiceClient,
    system_prompt: Option<String>,
    defaults: ChatDefaults,
}

impl ChatClient {
    pub fn new(service: ServiceClient) -> Self {
        Self {
            service,
            system_prompt: None,
            defaults: ChatDefaults::default(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_defaults(mut self, defaults: ChatDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    pub fn defaults(&self) -> &ChatDefaults {
        &self.defaults
    }

    pub fn service(&self) -> &ServiceClient {
        &self.service
    }

    /// Build the completion request. Dynamic inputs are appended to the user
    /// prompt as `\n{key}: {value}` lines, in the given order.
    pub fn completion_request(
        &self,
        user_prompt: &str,
        dynamic_inputs: &[(&str, &str)],
        overrides: &ChatOverrides,
    ) -> Result<RequestDescriptor, ClientError> {
        let mut prompt = user_prompt.to_string();
        for (key, value) in dynamic_inputs {
            prompt.push_str(&format!("\n{key}: {value}"));
        }

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &self.system_prompt {
            messages.push(ChatMessage::system(system.clone()));
        }
        messages.push(ChatMessage::user(prompt));

        let body = ChatCompletionRequest {
            model: overrides.model.as_deref().unwrap_or(&self.defaults.model),
            messages,
            temperature: overrides.temperature.unwrap_or(self.defaults.temperature),
            max_tokens: overrides.max_tokens.unwrap_or(self.defaults.max_tokens),
            frequency_penalty: overrides
                .frequency_penalty
                .unwrap_or(self.defaults.frequency_penalty),
        };
        Ok(RequestDescriptor::post(
            "/chat/completions",
            serde_json::to_value(body)?,
        ))
    }

    pub async fn generate_response(
        &self,
        user_prompt: &str,
        dynamic_inputs: &[(&str, &str)],
        overrides: &ChatOverrides,
    ) -> Result<ChatReply, ClientError> {
        let request = self.completion_request(user_prompt, dynamic_inputs, overrides)?;
        let payload = self.service.try_execute(&request).await?;
        let reply = ChatReply::from_payload(payload)?;
        tracing::debug!(
            service = %self.service.profile().id,
            total_tokens = ?reply.total_tokens,
            "chat completion received"
        );
        Ok(reply)
    }

    /// [`ChatClient::generate_response`] with no extra inputs and no overrides.
    pub async fn complete(&self, user_prompt: &str) -> Result<ChatReply, ClientError> {
        self.generate_response(user_prompt, &[], &ChatOverrides::default())
            .await
    }
}
