//! Per-participant session state.
//!
//! One `SessionState` exists per participant run. It is created on the
//! first interaction, mutated only by the phase controller, and discarded
//! when the process ends; nothing here is ever persisted or recovered.

use crate::domain::foundation::{ParticipantId, StateMachine, Timestamp, ValidationError};

use super::arm::ExperimentArm;
use super::message::Message;
use super::phase::SessionPhase;

/// Mutable record of one participant's run.
///
/// # Invariants
///
/// - the experiment arm is set exactly once, during mode selection
/// - the style profile is set exactly once, after style collection
/// - phase transitions follow the one-directional sequence
/// - the task notice lands in the transcript at most once
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Stable identifier for this run.
    participant_id: ParticipantId,

    /// Current phase.
    phase: SessionPhase,

    /// Assigned experiment arm; `None` until mode selection completes.
    arm: Option<ExperimentArm>,

    /// Role-tagged message log of the current conversational phase.
    transcript: Vec<Message>,

    /// Raw participant utterances collected during style collection.
    style_samples: Vec<String>,

    /// Derived style summary; `None` until the extractor runs.
    style_profile: Option<String>,

    /// Task invitation shown at the start of the task conversation.
    task_notice: Option<String>,

    /// When the task conversation started.
    task_started_at: Option<Timestamp>,

    /// How many model-generated follow-up questions have been asked.
    follow_up_count: u8,

    /// Guards the one-time insertion of the task notice.
    notice_inserted: bool,

    /// Set once the survey submission succeeded.
    submitted: bool,

    /// Whether conversation rows were written with the survey.
    transcript_saved: bool,
}

impl SessionState {
    /// Creates the state for a fresh participant run.
    pub fn new() -> Self {
        Self {
            participant_id: ParticipantId::generate(),
            phase: SessionPhase::ModeSelection,
            arm: None,
            transcript: Vec::new(),
            style_samples: Vec::new(),
            style_profile: None,
            task_notice: None,
            task_started_at: None,
            follow_up_count: 0,
            notice_inserted: false,
            submitted: false,
            transcript_saved: false,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    /// Returns the participant identifier.
    pub fn participant_id(&self) -> &ParticipantId {
        &self.participant_id
    }

    /// Returns the current phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Returns the assigned arm, if mode selection has happened.
    pub fn arm(&self) -> Option<ExperimentArm> {
        self.arm
    }

    /// Returns the transcript of the current conversational phase.
    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// Returns the collected style samples.
    pub fn style_samples(&self) -> &[String] {
        &self.style_samples
    }

    /// Returns the derived style profile, if extracted.
    pub fn style_profile(&self) -> Option<&str> {
        self.style_profile.as_deref()
    }

    /// Returns the prepared task notice, if any.
    pub fn task_notice(&self) -> Option<&str> {
        self.task_notice.as_deref()
    }

    /// Returns when the task conversation started.
    pub fn task_started_at(&self) -> Option<&Timestamp> {
        self.task_started_at.as_ref()
    }

    /// Returns the number of model-generated follow-up questions so far.
    pub fn follow_up_count(&self) -> u8 {
        self.follow_up_count
    }

    /// Returns true once the survey submission succeeded.
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Returns true if conversation rows were written at submission.
    pub fn transcript_saved(&self) -> bool {
        self.transcript_saved
    }

    /// Returns seconds elapsed in the task conversation, if started.
    pub fn task_elapsed_secs(&self, now: Timestamp) -> Option<i64> {
        self.task_started_at
            .map(|started| now.duration_since(&started).num_seconds())
    }

    /// Returns true if the task has run longer than the given limit.
    pub fn task_expired(&self, now: Timestamp, limit_secs: u64) -> bool {
        self.task_elapsed_secs(now)
            .is_some_and(|elapsed| elapsed > limit_secs as i64)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mutators
    // ─────────────────────────────────────────────────────────────────────

    /// Assigns the experiment arm and resets style-collection state.
    ///
    /// The reset is defensive: a re-entered mode selection must never leak
    /// transcript or profile data into a new run.
    ///
    /// # Errors
    ///
    /// - `AlreadySet` if an arm was assigned before
    pub fn assign_arm(&mut self, arm: ExperimentArm) -> Result<(), ValidationError> {
        if self.arm.is_some() {
            return Err(ValidationError::already_set("experiment_arm"));
        }
        self.arm = Some(arm);
        self.transcript.clear();
        self.style_samples.clear();
        self.style_profile = None;
        Ok(())
    }

    /// Advances to the target phase, validating the transition.
    pub fn advance_phase(&mut self, target: SessionPhase) -> Result<(), ValidationError> {
        self.phase = self.phase.transition_to(target)?;
        Ok(())
    }

    /// Appends a single message to the transcript.
    pub fn push_message(&mut self, message: Message) {
        self.transcript.push(message);
    }

    /// Commits a completed user/assistant exchange atomically.
    ///
    /// The controller stages both sides of an exchange and commits them
    /// together, so a failed provider call leaves no partial user turn.
    pub fn record_exchange(&mut self, user: Message, reply: Message) {
        self.transcript.push(user);
        self.transcript.push(reply);
    }

    /// Records a raw style sample.
    pub fn push_style_sample(&mut self, sample: impl Into<String>) {
        self.style_samples.push(sample.into());
    }

    /// Counts one more model-generated follow-up question.
    pub fn increment_follow_ups(&mut self) {
        self.follow_up_count += 1;
    }

    /// Stores the derived style profile.
    ///
    /// # Errors
    ///
    /// - `AlreadySet` if a profile was stored before
    pub fn set_style_profile(&mut self, profile: impl Into<String>) -> Result<(), ValidationError> {
        if self.style_profile.is_some() {
            return Err(ValidationError::already_set("style_profile"));
        }
        self.style_profile = Some(profile.into());
        Ok(())
    }

    /// Stores the task notice and starts the task clock.
    ///
    /// # Errors
    ///
    /// - `AlreadySet` if the task was started before
    pub fn begin_task(&mut self, notice: impl Into<String>, now: Timestamp) -> Result<(), ValidationError> {
        if self.task_started_at.is_some() {
            return Err(ValidationError::already_set("task_start_time"));
        }
        self.task_notice = Some(notice.into());
        self.task_started_at = Some(now);
        Ok(())
    }

    /// Appends the task notice to the transcript, at most once.
    ///
    /// Returns true if the notice was inserted by this call. Repeated
    /// renders of the task phase hit the guard and leave the transcript
    /// unchanged.
    pub fn insert_notice_once(&mut self) -> Result<bool, ValidationError> {
        if self.notice_inserted {
            return Ok(false);
        }
        let notice = self
            .task_notice
            .as_ref()
            .ok_or_else(|| ValidationError::empty_field("task_notice"))?;
        let message = Message::assistant(notice.clone())?;
        self.transcript.push(message);
        self.notice_inserted = true;
        Ok(true)
    }

    /// Marks the survey submission as completed.
    pub fn mark_submitted(&mut self, transcript_saved: bool) {
        self.submitted = true;
        self.transcript_saved = transcript_saved;
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
