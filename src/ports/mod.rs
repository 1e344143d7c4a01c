//! Ports - interfaces to the system's external collaborators.
//!
//! The chatbot orchestrates exactly two external services: a
//! chat-completion endpoint and a spreadsheet-backed row store. Both are
//! reached only through the narrow traits defined here, so the phase
//! controller is testable with in-process doubles.

mod dialogue_provider;
mod row_store;

pub use dialogue_provider::{
    ChatMessage, ChatRole, CompletionRequest, CompletionResponse, DialogueError, DialogueProvider,
};
pub use row_store::{RowStore, StoreError};
