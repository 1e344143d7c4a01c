//! Survey form, validation, and persisted row types.

pub mod form;
pub mod record;

pub use form::{
    AgeBand, CompletedSurvey, Education, FormValidationError, Gender, SurveyField, SurveyForm,
};
pub use record::{
    ConversationRecord, SurveyRecord, CONVERSATION_HEADER, CONVERSATION_TABLE, SURVEY_HEADER,
    SURVEY_TABLE,
};
