//! Experiment arm assignment.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The experiment condition assigned to a participant.
///
/// Chosen once during mode selection and immutable for the rest of the
/// run. The arm decides every persona-related prompt downstream: the task
/// notice, and the system instruction used in the task conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperimentArm {
    /// Constant chatbot persona (formal 존댓말, option "A").
    Fixed,
    /// Persona adapted to the participant's derived style (option "B").
    Mirroring,
}

impl ExperimentArm {
    /// Returns the anonymized label persisted in survey rows.
    pub fn sheet_label(&self) -> &'static str {
        match self {
            ExperimentArm::Fixed => "A",
            ExperimentArm::Mirroring => "B",
        }
    }

    /// Returns true for the style-mirroring condition.
    pub fn is_mirroring(&self) -> bool {
        matches!(self, ExperimentArm::Mirroring)
    }
}

impl fmt::Display for ExperimentArm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExperimentArm::Fixed => "fixed",
            ExperimentArm::Mirroring => "mirroring",
        };
        write!(f, "{}", s)
    }
}
