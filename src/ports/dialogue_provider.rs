//! Dialogue Provider Port - Interface for chat-completion integrations.
//!
//! This port abstracts the text-generation endpoint, enabling the phase
//! controller to request replies without coupling to a specific vendor.
//!
//! # Design
//!
//! - Request = optional leading system instruction + ordered role-tagged
//!   messages; response = the single best reply
//! - Provider-agnostic message format
//! - Error types for the common failure modes (timeouts, rate limits,
//!   unreachable upstream), all treated by the caller as "the step did
//!   not happen"
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//!
//! struct CannedProvider;
//!
//! #[async_trait]
//! impl DialogueProvider for CannedProvider {
//!     async fn complete(
//!         &self,
//!         _request: CompletionRequest,
//!     ) -> Result<CompletionResponse, DialogueError> {
//!         Ok(CompletionResponse::new("안녕하세요!", "canned"))
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for chat-completion interactions.
///
/// Implementations connect to an external text-generation service and
/// translate between the vendor API and our message format.
#[async_trait]
pub trait DialogueProvider: Send + Sync {
    /// Generate a single completion for the given transcript.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, DialogueError>;
}

/// Request for one completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Optional system instruction guiding model behavior.
    pub system_instruction: Option<String>,
    /// Conversation messages in order (history + current user message).
    pub messages: Vec<ChatMessage>,
}

impl CompletionRequest {
    /// Creates an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the system instruction.
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Adds a message to the conversation.
    pub fn with_message(mut self, role: ChatRole, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage {
            role,
            content: content.into(),
        });
        self
    }

    /// Adds a batch of messages in order.
    pub fn with_messages(mut self, messages: impl IntoIterator<Item = ChatMessage>) -> Self {
        self.messages.extend(messages);
        self
    }
}

/// A role-tagged message sent to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who sent this message.
    pub role: ChatRole,
    /// Message content.
    pub content: String,
}

impl ChatMessage {
    /// Creates a new message.
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }
}

/// Role of the message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Participant input.
    User,
    /// Model response.
    Assistant,
}

impl ChatRole {
    /// Returns the wire name used by chat-completion APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// Response from a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    /// Generated reply text.
    pub content: String,
    /// Model that generated the reply.
    pub model: String,
}

impl CompletionResponse {
    /// Creates a new response.
    pub fn new(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: model.into(),
        }
    }
}

/// Dialogue provider errors.
///
/// Every variant means the requested reply was not produced; callers must
/// not advance phase or commit transcript entries on any of them.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DialogueError {
    /// Upstream service is unreachable or returned a server error.
    #[error("service unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u32,
    },

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Rate limited by the provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until retry is allowed.
        retry_after_secs: u32,
    },

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Failed to parse the provider response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid request configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl DialogueError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a rate limited error.
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Returns true if retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DialogueError::Unavailable { .. }
                | DialogueError::Timeout { .. }
                | DialogueError::Network(_)
                | DialogueError::RateLimited { .. }
        )
    }
}
