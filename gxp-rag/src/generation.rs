//! Text generation provider trait and chat request types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The author of a chat message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions that frame the assistant's behaviour.
    System,
    /// A turn written by the user.
    User,
    /// A turn written by the model.
    Assistant,
}

/// A single message in a chat completion request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    /// Who wrote the message.
    pub role: Role,
    /// The message text.
    pub content: String,
}

impl ChatMessage {
    /// A system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    /// A user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// A chat completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model identifier, e.g. `gpt-3.5-turbo`.
    pub model: String,
    /// Conversation to complete, oldest first.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

/// A provider that completes a chat conversation with generated text.
///
/// Implementations wrap a specific chat-completion service; tests substitute
/// deterministic fakes.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate the assistant reply for `request`.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// A short provider name used in logs.
    fn name(&self) -> &str {
        "generation"
    }
}
