//! Session phase state machine.
//!
//! A participant run moves through a fixed, one-directional sequence of
//! conversational phases. There is no backtracking: each phase hands off
//! to exactly one successor, and the survey is terminal.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// The current phase of a participant run.
///
/// Phases advance strictly in order:
/// `ModeSelection → StyleCollection → PreTaskNotice → TaskConversation → Consent`
///
/// - `ModeSelection`: participant picks an experiment arm
/// - `StyleCollection`: casual exchanges that collect style samples
/// - `PreTaskNotice`: analysis result shown, task notice prepared
/// - `TaskConversation`: timed task dialogue (travel planning)
/// - `Consent`: survey form and optional transcript retention; terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Waiting for the participant to choose an arm.
    #[default]
    ModeSelection,

    /// Collecting natural-language samples over a few casual exchanges.
    StyleCollection,

    /// Deriving and announcing the task invitation; advances automatically.
    PreTaskNotice,

    /// Active task dialogue bounded by the study's time limit.
    TaskConversation,

    /// Survey and submission; no further phase.
    Consent,
}

impl SessionPhase {
    /// Returns true if the participant types chat messages in this phase.
    pub fn accepts_chat_input(&self) -> bool {
        matches!(self, Self::StyleCollection | Self::TaskConversation)
    }

    /// Returns true if this phase advances without participant input.
    pub fn is_automatic(&self) -> bool {
        matches!(self, Self::PreTaskNotice)
    }

    /// Returns a short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ModeSelection => "mode_selection",
            Self::StyleCollection => "style_collection",
            Self::PreTaskNotice => "pre_task_notice",
            Self::TaskConversation => "task_conversation",
            Self::Consent => "consent",
        }
    }
}

impl StateMachine for SessionPhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SessionPhase::*;
        matches!(
            (self, target),
            // Arm chosen, start collecting style samples
            (ModeSelection, StyleCollection) |
            // Style profile derived
            (StyleCollection, PreTaskNotice) |
            // Task notice prepared, timer started
            (PreTaskNotice, TaskConversation) |
            // Time limit reached
            (TaskConversation, Consent)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SessionPhase::*;
        match self {
            ModeSelection => vec![StyleCollection],
            StyleCollection => vec![PreTaskNotice],
            PreTaskNotice => vec![TaskConversation],
            TaskConversation => vec![Consent],
            Consent => vec![],
        }
    }
}
