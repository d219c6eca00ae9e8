//! Conversation loop
//!
//! A voice or text turn runs strictly in order: transcribe (voice only), ask
//! the chat model, record the exchange, speak the reply. Speech engines sit
//! behind the [`Transcriber`] and [`Synthesizer`] seams; none ship with the
//! crate.
//!
//! Failure rules:
//! - transcription or chat failure aborts the turn and nothing is recorded;
//! - synthesis failure is logged and reported as `spoken == false`, the turn
//!   is kept.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::ClientError;
use crate::providers::ChatClient;

/// Speech-to-text engine.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, _audio: Vec<u8>) -> Result<String, ClientError> {
        Err(ClientError::UnsupportedOperation(
            "Speech-to-text not supported by this engine".to_string(),
        ))
    }
}

/// Text-to-speech engine. Returns once the text has been played.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn speak(&self, _text: &str) -> Result<(), ClientError> {
        Err(ClientError::UnsupportedOperation(
            "Text-to-speech not supported by this engine".to_string(),
        ))
    }
}

/// One user message and the assistant's reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub user: String,
    pub assistant: String,
    pub at: DateTime<Utc>,
}

/// Ordered turn history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, user: impl Into<String>, assistant: impl Into<String>) -> &Turn {
        self.turns.push(Turn {
            user: user.into(),
            assistant: assistant.into(),
            at: Utc::now(),
        });
        &self.turns[self.turns.len() - 1]
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

/// What one completed turn produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnResult {
    pub turn: Turn,
    /// Whether the reply was played back.
    pub spoken: bool,
    pub total_tokens: Option<u32>,
}

/// Drives turns against a chat model and keeps the history.
pub struct VoiceAgent {
    chat: ChatClient,
    transcriber: Option<Arc<dyn Transcriber>>,
    synthesizer: Option<Arc<dyn Synthesizer>>,
    conversation: Conversation,
}

impl std::fmt::Debug for VoiceAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceAgent")
            .field("chat", &self.chat)
            .field("has_transcriber", &self.transcriber.is_some())
            .field("has_synthesizer", &self.synthesizer.is_some())
            .field("turns", &self.conversation.len())
            .finish()
    }
}

impl VoiceAgent {
    /// Agent over `chat`. A client without a system prompt gets the default
    /// assistant prompt.
    pub fn new(chat: ChatClient) -> Self {
        let chat = if chat.system_prompt().is_some() {
            chat
        } else {
            chat.with_system_prompt(defaults::chat::SYSTEM_PROMPT)
        };
        Self {
            chat,
            transcriber: None,
            synthesizer: None,
            conversation: Conversation::new(),
        }
    }

    pub fn with_transcriber(mut self, transcriber: Arc<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn Synthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn clear(&mut self) {
        self.conversation.clear();
    }

    /// Run a turn from typed input. Blank input is rejected before any call.
    pub async fn text_turn(&mut self, text: &str) -> Result<TurnResult, ClientError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ClientError::InvalidParameter(
                "Message must not be empty".to_string(),
            ));
        }
        self.respond(text.to_string()).await
    }

    /// Run a turn from recorded audio.
    pub async fn voice_turn(&mut self, audio: Vec<u8>) -> Result<TurnResult, ClientError> {
        let transcriber = self.transcriber.as_ref().ok_or_else(|| {
            ClientError::UnsupportedOperation("No transcriber configured".to_string())
        })?;
        let text = transcriber.transcribe(audio).await.inspect_err(|e| {
            tracing::warn!(error = %e, "transcription failed");
        })?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ClientError::ParseError(
                "Could not understand audio".to_string(),
            ));
        }
        tracing::debug!(chars = text.len(), "audio transcribed");
        self.respond(text.to_string()).await
    }

    async fn respond(&mut self, user: String) -> Result<TurnResult, ClientError> {
        let reply = self.chat.complete(&user).await.inspect_err(|e| {
            tracing::warn!(error = %e, "chat completion failed, turn discarded");
        })?;

        let turn = self.conversation.record(user, reply.content).clone();
        let spoken = self.speak(&turn.assistant).await;

        Ok(TurnResult {
            turn,
            spoken,
            total_tokens: reply.total_tokens,
        })
    }

    async fn speak(&self, text: &str) -> bool {
        let Some(synthesizer) = &self.synthesizer else {
            return false;
        };
        match synthesizer.speak(text).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "text-to-speech failed");
                false
            }
        }
    }
}
