use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::QuillError;

/// A message in a chat conversation with the LLM.
///
/// # Examples
///
/// ```
/// use quill_core::{ChatMessage, Role};
///
/// let msg = ChatMessage::user("Suggest the next post");
/// assert!(matches!(msg.role, Role::User));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: Role,
    /// Text content of the message.
    pub content: String,
}

impl ChatMessage {
    /// A user-role message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Role in the chat conversation.
///
/// # Examples
///
/// ```
/// use quill_core::Role;
///
/// let role = Role::User;
/// assert_eq!(serde_json::to_string(&role).unwrap(), "\"user\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System-level instructions.
    System,
    /// User input.
    User,
    /// Assistant response.
    Assistant,
}

/// A single-turn chat completion request.
///
/// # Examples
///
/// ```
/// use quill_core::ChatRequest;
///
/// let req = ChatRequest::single("Review this post", 8192, 0.3);
/// assert_eq!(req.messages.len(), 1);
/// assert_eq!(req.max_tokens, 8192);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// Conversation so far. Quill only ever sends one user message.
    pub messages: Vec<ChatMessage>,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

impl ChatRequest {
    /// A request carrying a single user message.
    pub fn single(prompt: impl Into<String>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            messages: vec![ChatMessage::user(prompt)],
            max_tokens,
            temperature,
        }
    }
}

/// A text-generation backend answering single-turn chat requests.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identifier sent with every request.
    fn model(&self) -> &str;

    /// Send the request and return the content of the first choice.
    ///
    /// # Errors
    ///
    /// Returns [`QuillError::Llm`] on transport or response-shape errors.
    async fn chat(&self, request: &ChatRequest) -> Result<String, QuillError>;
}
