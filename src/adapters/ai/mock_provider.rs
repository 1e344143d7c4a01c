//! Mock dialogue provider for testing.
//!
//! Provides a configurable in-process implementation of the
//! DialogueProvider port, allowing controller and extractor tests to run
//! without calling a real API.
//!
//! # Features
//!
//! - Pre-queued replies, consumed in order
//! - Error injection for failure-path testing
//! - Call tracking for request verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockDialogueProvider::new()
//!     .with_reply("안녕하세요!")
//!     .with_failure(DialogueError::unavailable("down"));
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::ports::{
    CompletionRequest, CompletionResponse, DialogueError, DialogueProvider,
};

/// A queued mock outcome.
#[derive(Debug, Clone)]
enum MockOutcome {
    Reply(String),
    Failure(DialogueError),
}

/// Scripted dialogue provider.
///
/// Outcomes are consumed front-to-back; an exhausted queue fails with
/// `Unavailable` so an unexpected extra call is visible in tests.
#[derive(Debug, Clone, Default)]
pub struct MockDialogueProvider {
    outcomes: Arc<Mutex<VecDeque<MockOutcome>>>,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockDialogueProvider {
    /// Creates a provider with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful reply.
    pub fn with_reply(self, content: impl Into<String>) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(MockOutcome::Reply(content.into()));
        self
    }

    /// Queues a failure.
    pub fn with_failure(self, error: DialogueError) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(MockOutcome::Failure(error));
        self
    }

    /// Returns every request received so far, in order.
    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DialogueProvider for MockDialogueProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, DialogueError> {
        self.calls.lock().unwrap().push(request);

        let outcome = self.outcomes.lock().unwrap().pop_front();
        match outcome {
            Some(MockOutcome::Reply(content)) => Ok(CompletionResponse::new(content, "mock")),
            Some(MockOutcome::Failure(error)) => Err(error),
            None => Err(DialogueError::unavailable("mock reply queue empty")),
        }
    }
}
