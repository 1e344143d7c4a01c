//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::ValidationError;

/// Opaque short identifier for a participant run.
///
/// Generated once at session creation as the first 8 hex characters of a
/// random UUID, and stable for the remainder of the run. Short tokens keep
/// the persisted rows readable while staying unique enough for a study of
/// this size.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Number of hex characters kept from the generated UUID.
    const LEN: usize = 8;

    /// Generates a new random ParticipantId.
    pub fn generate() -> Self {
        let token = Uuid::new_v4().simple().to_string();
        Self(token[..Self::LEN].to_string())
    }

    /// Creates a ParticipantId from an existing token.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the token is empty or whitespace only
    pub fn new(token: impl Into<String>) -> Result<Self, ValidationError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ValidationError::empty_field("participant_id"));
        }
        Ok(Self(token))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
