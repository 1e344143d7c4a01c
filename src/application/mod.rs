//! Application services orchestrating the ports.

mod controller;
mod style_extractor;
mod submission;

pub use controller::{PhaseController, StudySettings};
pub use style_extractor::StyleProfileExtractor;
pub use submission::{SubmissionError, SubmissionReceipt, SurveySubmission};
