//! Input events delivered to the phase controller.

use crate::domain::survey::SurveyForm;

use super::arm::ExperimentArm;

/// A single participant interaction, as delivered by the front end.
///
/// Every event is handled synchronously and in order; the controller
/// performs at most one provider round per event before rendering.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The participant chose an experiment arm (mode selection buttons).
    ArmChosen(ExperimentArm),

    /// The participant submitted a chat message.
    MessageSubmitted(String),

    /// A render tick with no new input (screen shown again, automatic
    /// advance, or the front end checking the task clock).
    Advance,

    /// The participant submitted the survey form.
    SurveySubmitted(SurveyForm),
}

impl SessionEvent {
    /// Returns a short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            SessionEvent::ArmChosen(_) => "arm_chosen",
            SessionEvent::MessageSubmitted(_) => "message_submitted",
            SessionEvent::Advance => "advance",
            SessionEvent::SurveySubmitted(_) => "survey_submitted",
        }
    }
}
