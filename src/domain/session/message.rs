//! Transcript message entity.
//!
//! Messages are immutable records of user/assistant exchanges within a
//! conversational phase. The transcript is append-only within a phase and
//! reset only when style collection begins.

use crate::domain::foundation::{Timestamp, ValidationError};
use serde::{Deserialize, Serialize};

/// Role of a transcript message sender.
///
/// The transcript holds only user-visible turns; system instructions are
/// request-level concerns and never land in the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Participant input.
    User,
    /// Chatbot response.
    Assistant,
}

impl Role {
    /// Returns the name persisted in conversation rows.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// An immutable message within the transcript.
///
/// # Invariants
///
/// - `content` is non-empty (validated at construction)
/// - `created_at` is set at construction and never changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender.
    role: Role,

    /// The content of the message.
    content: String,

    /// When the message was created.
    created_at: Timestamp,
}

impl Message {
    /// Creates a new message with the given role and content.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if content is empty or whitespace only
    pub fn new(role: Role, content: impl Into<String>) -> Result<Self, ValidationError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(ValidationError::empty_field("content"));
        }

        Ok(Self {
            role,
            content,
            created_at: Timestamp::now(),
        })
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(Role::User, content)
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(Role::Assistant, content)
    }

    /// Returns the role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns when the message was created.
    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Returns true if this message is from the participant.
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// Returns true if this message is from the chatbot.
    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}
