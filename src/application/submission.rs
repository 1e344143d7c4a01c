//! Survey submission.
//!
//! The single write path of the system: validates the form, ensures both
//! table headers, appends the survey row, and (when the participant opted
//! in) appends one conversation row per transcript entry in order.
//! Success is reported only when every required append succeeded; partial
//! transcript writes are surfaced distinctly from total failure.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::foundation::Timestamp;
use crate::domain::session::SessionState;
use crate::domain::survey::{
    ConversationRecord, FormValidationError, SurveyForm, SurveyRecord, CONVERSATION_HEADER,
    CONVERSATION_TABLE, SURVEY_HEADER, SURVEY_TABLE,
};
use crate::ports::{RowStore, StoreError};

/// Errors that can occur when submitting the survey.
#[derive(Debug, Clone, Error)]
pub enum SubmissionError {
    /// Required fields are missing; nothing was written.
    #[error(transparent)]
    Validation(#[from] FormValidationError),

    /// The session is missing data the row layout needs.
    #[error("session incomplete: {0}")]
    SessionIncomplete(&'static str),

    /// The survey row could not be written; nothing was saved.
    #[error("survey write failed: {0}")]
    SurveyWrite(#[source] StoreError),

    /// The survey row was saved but the transcript was not fully written.
    #[error("transcript write failed after {written} of {total} rows: {source}")]
    TranscriptWrite {
        /// Conversation rows that made it into the table.
        written: usize,
        /// Transcript entries that should have been written.
        total: usize,
        /// Underlying store failure.
        source: StoreError,
    },
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    /// Whether conversation rows were written alongside the survey.
    pub transcript_saved: bool,
    /// Number of conversation rows written.
    pub conversation_rows: usize,
}

/// Writes one participant run's results to the row store.
pub struct SurveySubmission {
    store: Arc<dyn RowStore>,
}

impl SurveySubmission {
    /// Creates a submission service over the given store.
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self { store }
    }

    /// Validates and persists a submission.
    ///
    /// Write order is fixed: survey header, survey row, then (opt-in only)
    /// conversation header and one row per transcript entry in transcript
    /// order. All rows of the submission share one timestamp.
    ///
    /// # Errors
    ///
    /// - `Validation` if any required field is unanswered (no writes)
    /// - `SurveyWrite` if the survey row could not be appended (no rows
    ///   were saved)
    /// - `TranscriptWrite` if the survey row was saved but conversation
    ///   rows were not all appended
    pub async fn submit(
        &self,
        state: &SessionState,
        form: &SurveyForm,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let survey = form.validate()?;
        let arm = state
            .arm()
            .ok_or(SubmissionError::SessionIncomplete("experiment_arm"))?;

        let submitted_at = Timestamp::now();
        let style_profile = state.style_profile().unwrap_or_default();
        let record = SurveyRecord::new(
            submitted_at,
            state.participant_id(),
            arm,
            &survey,
            style_profile,
        );

        self.store
            .ensure_header(SURVEY_TABLE, &SURVEY_HEADER)
            .await
            .map_err(SubmissionError::SurveyWrite)?;
        self.store
            .append_row(SURVEY_TABLE, record.to_row())
            .await
            .map_err(SubmissionError::SurveyWrite)?;
        tracing::info!(
            participant = %state.participant_id(),
            arm = %arm,
            "survey row written"
        );

        if !survey.save_transcript {
            return Ok(SubmissionReceipt {
                transcript_saved: false,
                conversation_rows: 0,
            });
        }

        let total = state.transcript().len();
        self.store
            .ensure_header(CONVERSATION_TABLE, &CONVERSATION_HEADER)
            .await
            .map_err(|source| SubmissionError::TranscriptWrite {
                written: 0,
                total,
                source,
            })?;

        for (written, message) in state.transcript().iter().enumerate() {
            let record = ConversationRecord::new(submitted_at, state.participant_id(), message);
            self.store
                .append_row(CONVERSATION_TABLE, record.to_row())
                .await
                .map_err(|source| SubmissionError::TranscriptWrite {
                    written,
                    total,
                    source,
                })?;
        }
        tracing::info!(
            participant = %state.participant_id(),
            rows = total,
            "conversation rows written"
        );

        Ok(SubmissionReceipt {
            transcript_saved: true,
            conversation_rows: total,
        })
    }
}
