//! Shared value objects for the domain layer.

mod errors;
mod ids;
mod likert;
mod state_machine;
mod timestamp;

pub use errors::ValidationError;
pub use ids::ParticipantId;
pub use likert::LikertResponse;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
