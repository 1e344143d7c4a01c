//! Render instructions produced by the phase controller.
//!
//! The controller never draws anything itself: each handled event yields
//! one `RenderInstruction` describing what the front end should show and
//! what kind of input to offer next. This keeps the core a pure
//! `(state, event) -> (state, render)` step, testable without a UI.

use super::message::Message;

/// What the participant-facing surface should display next.
#[derive(Debug, Clone)]
pub enum RenderInstruction {
    /// Mode selection screen: two arm buttons.
    ModeChoice {
        /// Screen prompt.
        prompt: String,
    },

    /// Chat screen: transcript plus an input box.
    Chat {
        /// One-time banner above the transcript (e.g. style analysis).
        banner: Option<String>,
        /// Transcript to display, in order.
        messages: Vec<Message>,
        /// Placeholder for the input box.
        input_hint: String,
    },

    /// Task time limit reached; pause briefly, then show the survey.
    TimedOut {
        /// Termination notice to display.
        message: String,
        /// How long the front end should pause before advancing.
        pause_secs: u64,
    },

    /// Survey form, optionally with a validation warning.
    Survey {
        /// Warning to display above the form; entered values are kept.
        warning: Option<String>,
    },

    /// Inline failure; the participant stays on the current screen.
    Failure {
        /// Participant-visible error message.
        message: String,
        /// Whether resubmitting may succeed.
        retryable: bool,
    },

    /// Terminal success screen; the run is over.
    Completed {
        /// Success message.
        message: String,
        /// Whether conversation rows were written alongside the survey.
        transcript_saved: bool,
    },
}

impl RenderInstruction {
    /// Builds a chat render without a banner.
    pub fn chat(messages: Vec<Message>, input_hint: impl Into<String>) -> Self {
        Self::Chat {
            banner: None,
            messages,
            input_hint: input_hint.into(),
        }
    }

    /// Builds a chat render with a banner line.
    pub fn chat_with_banner(
        banner: impl Into<String>,
        messages: Vec<Message>,
        input_hint: impl Into<String>,
    ) -> Self {
        Self::Chat {
            banner: Some(banner.into()),
            messages,
            input_hint: input_hint.into(),
        }
    }

    /// Builds an inline failure render.
    pub fn failure(message: impl Into<String>, retryable: bool) -> Self {
        Self::Failure {
            message: message.into(),
            retryable,
        }
    }

    /// Returns true for the terminal success render.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// Returns true for an inline failure render.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }
}
