//! Style profile extraction.
//!
//! Derives a short natural-language description of the participant's tone,
//! formality, and personality from their last few utterances. This is a
//! thin wrapper over the dialogue provider with a fixed analysis prompt;
//! it shares the provider's failure semantics.

use std::sync::Arc;

use crate::domain::session::prompts;
use crate::ports::{ChatRole, CompletionRequest, DialogueError, DialogueProvider};

/// Derives a style profile from collected utterances.
pub struct StyleProfileExtractor {
    provider: Arc<dyn DialogueProvider>,
    /// How many of the most recent samples feed the analysis.
    sample_window: usize,
}

impl StyleProfileExtractor {
    /// Creates an extractor over the given provider.
    pub fn new(provider: Arc<dyn DialogueProvider>, sample_window: usize) -> Self {
        Self {
            provider,
            sample_window,
        }
    }

    /// Produces a style profile from the most recent samples.
    ///
    /// Only the last `sample_window` utterances are analyzed; earlier ones
    /// are ignored. The reply is trimmed before being returned.
    ///
    /// # Errors
    ///
    /// - any `DialogueError` from the provider; the caller treats it as
    ///   "the step did not happen" and may retry
    /// - `Parse` if the provider returns an empty reply
    pub async fn extract(&self, samples: &[String]) -> Result<String, DialogueError> {
        if samples.is_empty() {
            return Err(DialogueError::InvalidRequest(
                "no style samples collected".to_string(),
            ));
        }

        let start = samples.len().saturating_sub(self.sample_window);
        let window = &samples[start..];
        tracing::debug!(samples = window.len(), "extracting style profile");

        let request = CompletionRequest::new()
            .with_message(ChatRole::User, prompts::style_analysis_prompt(window));

        let response = self.provider.complete(request).await?;
        let profile = response.content.trim().to_string();
        if profile.is_empty() {
            return Err(DialogueError::parse("empty style analysis reply"));
        }

        Ok(profile)
    }
}
