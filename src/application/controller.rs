//! Phase controller - the session's decision core.
//!
//! Every UI event lands here. The controller reads and mutates the session
//! state, performs at most one dialogue round and the submission writes,
//! and answers with a render instruction. Nothing is drawn and nothing
//! blocks outside the awaited service calls, so the whole sequence is
//! testable with in-process doubles.
//!
//! Failure rule: a provider or store error means "the step did not
//! happen": the phase does not advance and no transcript entry is
//! committed without its reply.

use std::sync::Arc;

use crate::domain::foundation::Timestamp;
use crate::domain::session::prompts;
use crate::domain::session::{
    ExperimentArm, Message, RenderInstruction, Role, SessionEvent, SessionPhase, SessionState,
};
use crate::domain::survey::SurveyForm;
use crate::ports::{ChatMessage, ChatRole, CompletionRequest, DialogueProvider};

use super::style_extractor::StyleProfileExtractor;
use super::submission::{SubmissionError, SurveySubmission};

/// Study-level knobs for the phase sequence.
#[derive(Debug, Clone)]
pub struct StudySettings {
    /// Task conversation time limit in seconds.
    pub task_duration_secs: u64,
    /// Model-generated follow-up questions during style collection.
    pub follow_up_cap: u8,
    /// Most recent samples fed to the style extractor.
    pub style_sample_window: usize,
    /// Transcript entries sent as context in the task conversation.
    pub task_context_window: usize,
    /// Pause after the termination notice, before the survey.
    pub termination_pause_secs: u64,
}

impl Default for StudySettings {
    fn default() -> Self {
        Self {
            task_duration_secs: 180,
            follow_up_cap: 2,
            style_sample_window: 3,
            task_context_window: 6,
            termination_pause_secs: 5,
        }
    }
}

/// Finite-state controller over one participant session.
pub struct PhaseController {
    dialogue: Arc<dyn DialogueProvider>,
    extractor: StyleProfileExtractor,
    submission: SurveySubmission,
    settings: StudySettings,
}

impl PhaseController {
    /// Creates a controller over the given services.
    pub fn new(
        dialogue: Arc<dyn DialogueProvider>,
        extractor: StyleProfileExtractor,
        submission: SurveySubmission,
        settings: StudySettings,
    ) -> Self {
        Self {
            dialogue,
            extractor,
            submission,
            settings,
        }
    }

    /// Handles one event against the wall clock.
    pub async fn handle(
        &self,
        state: &mut SessionState,
        event: SessionEvent,
    ) -> RenderInstruction {
        self.handle_at(state, event, Timestamp::now()).await
    }

    /// Handles one event at an explicit point in time.
    ///
    /// The task deadline is evaluated against `now`, opportunistically:
    /// only when an event is processed, never from a background timer. A
    /// submission arriving after the limit is still answered before the
    /// session moves to the survey.
    pub async fn handle_at(
        &self,
        state: &mut SessionState,
        event: SessionEvent,
        now: Timestamp,
    ) -> RenderInstruction {
        tracing::debug!(
            phase = state.phase().label(),
            event = event.label(),
            "handling session event"
        );

        match (state.phase(), event) {
            (SessionPhase::ModeSelection, SessionEvent::ArmChosen(arm)) => {
                self.start_style_collection(state, arm)
            }
            (SessionPhase::StyleCollection, SessionEvent::MessageSubmitted(text)) => {
                self.handle_style_message(state, &text, now).await
            }
            (SessionPhase::PreTaskNotice, _) => self.enter_task(state, now).await,
            (SessionPhase::TaskConversation, SessionEvent::MessageSubmitted(text)) => {
                self.handle_task_message(state, &text, now).await
            }
            (SessionPhase::TaskConversation, SessionEvent::Advance) => self.tick_task(state, now),
            (SessionPhase::Consent, SessionEvent::SurveySubmitted(form)) => {
                self.handle_submission(state, &form).await
            }
            // Anything else is out of phase: re-render without mutating.
            (_, event) => {
                tracing::debug!(
                    phase = state.phase().label(),
                    event = event.label(),
                    "ignoring out-of-phase event"
                );
                self.render_current(state)
            }
        }
    }

    /// Re-renders the current phase without side effects.
    fn render_current(&self, state: &SessionState) -> RenderInstruction {
        match state.phase() {
            SessionPhase::ModeSelection => RenderInstruction::ModeChoice {
                prompt: prompts::MODE_SELECTION_PROMPT.to_string(),
            },
            SessionPhase::StyleCollection => RenderInstruction::chat(
                state.transcript().to_vec(),
                prompts::COLLECTION_INPUT_HINT,
            ),
            SessionPhase::PreTaskNotice | SessionPhase::TaskConversation => {
                RenderInstruction::chat(state.transcript().to_vec(), prompts::TASK_INPUT_HINT)
            }
            SessionPhase::Consent => {
                if state.is_submitted() {
                    RenderInstruction::Completed {
                        message: if state.transcript_saved() {
                            prompts::SUBMISSION_SUCCESS.to_string()
                        } else {
                            prompts::SUBMISSION_SUCCESS_SURVEY_ONLY.to_string()
                        },
                        transcript_saved: state.transcript_saved(),
                    }
                } else {
                    RenderInstruction::Survey { warning: None }
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mode selection
    // ─────────────────────────────────────────────────────────────────────

    fn start_style_collection(
        &self,
        state: &mut SessionState,
        arm: ExperimentArm,
    ) -> RenderInstruction {
        if let Err(err) = state.assign_arm(arm) {
            tracing::warn!(%err, "arm already assigned, ignoring choice");
            return self.render_current(state);
        }
        if let Err(err) = state.advance_phase(SessionPhase::StyleCollection) {
            tracing::error!(%err, "could not enter style collection");
            return self.render_current(state);
        }

        match Message::assistant(prompts::SEED_QUESTION) {
            Ok(seed) => state.push_message(seed),
            Err(err) => tracing::error!(%err, "seed question rejected"),
        }
        tracing::info!(participant = %state.participant_id(), %arm, "session started");
        self.render_current(state)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Style collection
    // ─────────────────────────────────────────────────────────────────────

    async fn handle_style_message(
        &self,
        state: &mut SessionState,
        text: &str,
        now: Timestamp,
    ) -> RenderInstruction {
        let text = text.trim();
        let user = match Message::user(text) {
            Ok(message) => message,
            Err(_) => return self.render_current(state),
        };

        if state.follow_up_count() < self.settings.follow_up_cap {
            self.ask_follow_up(state, user).await
        } else {
            self.finish_collection(state, user, now).await
        }
    }

    /// Asks the next casual follow-up question, staying in this phase.
    async fn ask_follow_up(&self, state: &mut SessionState, user: Message) -> RenderInstruction {
        let request = CompletionRequest::new()
            .with_system_instruction(prompts::COLLECTION_INSTRUCTION)
            .with_messages(to_chat_messages(state.transcript()))
            .with_message(ChatRole::User, user.content());

        match self.dialogue.complete(request).await {
            Ok(response) => {
                let reply = match Message::assistant(response.content.trim()) {
                    Ok(message) => message,
                    Err(_) => {
                        tracing::warn!("provider returned an empty follow-up");
                        return RenderInstruction::failure(prompts::SERVICE_ERROR_MESSAGE, true);
                    }
                };
                state.push_style_sample(user.content());
                state.record_exchange(user, reply);
                state.increment_follow_ups();
                self.render_current(state)
            }
            Err(err) => {
                tracing::warn!(%err, "follow-up generation failed");
                RenderInstruction::failure(prompts::SERVICE_ERROR_MESSAGE, err.is_retryable())
            }
        }
    }

    /// Final collection turn: derive the style profile and move on.
    async fn finish_collection(
        &self,
        state: &mut SessionState,
        user: Message,
        now: Timestamp,
    ) -> RenderInstruction {
        let mut samples = state.style_samples().to_vec();
        samples.push(user.content().to_string());

        match self.extractor.extract(&samples).await {
            Ok(profile) => {
                state.push_style_sample(user.content());
                state.push_message(user);
                if let Err(err) = state.set_style_profile(profile) {
                    tracing::error!(%err, "style profile already set");
                    return self.render_current(state);
                }
                if let Err(err) = state.advance_phase(SessionPhase::PreTaskNotice) {
                    tracing::error!(%err, "could not leave style collection");
                    return self.render_current(state);
                }
                tracing::info!(participant = %state.participant_id(), "style profile derived");
                self.enter_task(state, now).await
            }
            Err(err) => {
                tracing::warn!(%err, "style extraction failed");
                RenderInstruction::failure(prompts::SERVICE_ERROR_MESSAGE, err.is_retryable())
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Pre-task notice
    // ─────────────────────────────────────────────────────────────────────

    /// Prepares the task notice and advances into the task conversation.
    ///
    /// Automatic: no participant input is involved. On a provider failure
    /// the session stays in the notice phase and any subsequent event
    /// retries the preparation.
    async fn enter_task(&self, state: &mut SessionState, now: Timestamp) -> RenderInstruction {
        let Some(arm) = state.arm() else {
            tracing::error!("no arm assigned at pre-task notice");
            return self.render_current(state);
        };

        let notice = match arm {
            ExperimentArm::Fixed => prompts::FIXED_TASK_NOTICE.to_string(),
            ExperimentArm::Mirroring => {
                let profile = state.style_profile().unwrap_or_default();
                let request = CompletionRequest::new()
                    .with_message(ChatRole::User, prompts::mirroring_notice_prompt(profile));
                match self.dialogue.complete(request).await {
                    Ok(response) => {
                        let notice = response.content.trim().to_string();
                        if notice.is_empty() {
                            tracing::warn!("empty mirroring notice reply");
                            return RenderInstruction::failure(
                                prompts::SERVICE_ERROR_MESSAGE,
                                true,
                            );
                        }
                        notice
                    }
                    Err(err) => {
                        tracing::warn!(%err, "mirroring notice generation failed");
                        return RenderInstruction::failure(
                            prompts::SERVICE_ERROR_MESSAGE,
                            err.is_retryable(),
                        );
                    }
                }
            }
        };

        if let Err(err) = state.begin_task(notice, now) {
            tracing::error!(%err, "task already started");
            return self.render_current(state);
        }
        if let Err(err) = state.advance_phase(SessionPhase::TaskConversation) {
            tracing::error!(%err, "could not enter task conversation");
            return self.render_current(state);
        }
        if let Err(err) = state.insert_notice_once() {
            tracing::error!(%err, "could not insert task notice");
        }
        tracing::info!(participant = %state.participant_id(), "task conversation started");

        let banner = prompts::analysis_banner(state.style_profile().unwrap_or_default());
        RenderInstruction::chat_with_banner(
            banner,
            state.transcript().to_vec(),
            prompts::TASK_INPUT_HINT,
        )
    }

    // ─────────────────────────────────────────────────────────────────────
    // Task conversation
    // ─────────────────────────────────────────────────────────────────────

    async fn handle_task_message(
        &self,
        state: &mut SessionState,
        text: &str,
        now: Timestamp,
    ) -> RenderInstruction {
        if let Err(err) = state.insert_notice_once() {
            tracing::error!(%err, "could not insert task notice");
        }

        let text = text.trim();
        let user = match Message::user(text) {
            Ok(message) => message,
            Err(_) => return self.tick_task(state, now),
        };

        let instruction = match state.arm() {
            Some(ExperimentArm::Mirroring) => {
                prompts::mirroring_task_instruction(state.style_profile().unwrap_or_default())
            }
            _ => prompts::FIXED_TASK_INSTRUCTION.to_string(),
        };

        // Bounded context: only the most recent entries, including the
        // just-submitted user turn.
        let mut context = to_chat_messages(state.transcript());
        context.push(ChatMessage::user(user.content()));
        let keep_from = context.len().saturating_sub(self.settings.task_context_window);
        let context = context.split_off(keep_from);

        let request = CompletionRequest::new()
            .with_system_instruction(instruction)
            .with_messages(context);

        match self.dialogue.complete(request).await {
            Ok(response) => {
                let reply = match Message::assistant(response.content.trim()) {
                    Ok(message) => message,
                    Err(_) => {
                        tracing::warn!("provider returned an empty task reply");
                        return RenderInstruction::failure(prompts::SERVICE_ERROR_MESSAGE, true);
                    }
                };
                state.record_exchange(user, reply);
                // Deadline is checked only after the exchange is committed,
                // so a late submission still gets its reply.
                if state.task_expired(now, self.settings.task_duration_secs) {
                    self.expire_task(state)
                } else {
                    self.render_current(state)
                }
            }
            Err(err) => {
                tracing::warn!(%err, "task reply generation failed");
                RenderInstruction::failure(prompts::SERVICE_ERROR_MESSAGE, err.is_retryable())
            }
        }
    }

    /// Render tick in the task phase: notice guard plus deadline check.
    fn tick_task(&self, state: &mut SessionState, now: Timestamp) -> RenderInstruction {
        if let Err(err) = state.insert_notice_once() {
            tracing::error!(%err, "could not insert task notice");
        }
        if state.task_expired(now, self.settings.task_duration_secs) {
            self.expire_task(state)
        } else {
            self.render_current(state)
        }
    }

    fn expire_task(&self, state: &mut SessionState) -> RenderInstruction {
        if let Err(err) = state.advance_phase(SessionPhase::Consent) {
            tracing::error!(%err, "could not enter consent");
            return self.render_current(state);
        }
        tracing::info!(participant = %state.participant_id(), "task time limit reached");
        RenderInstruction::TimedOut {
            message: prompts::TERMINATION_NOTICE.to_string(),
            pause_secs: self.settings.termination_pause_secs,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Consent / survey
    // ─────────────────────────────────────────────────────────────────────

    async fn handle_submission(
        &self,
        state: &mut SessionState,
        form: &SurveyForm,
    ) -> RenderInstruction {
        if state.is_submitted() {
            return self.render_current(state);
        }

        match self.submission.submit(state, form).await {
            Ok(receipt) => {
                state.mark_submitted(receipt.transcript_saved);
                self.render_current(state)
            }
            Err(SubmissionError::Validation(err)) => {
                tracing::debug!(missing = err.missing.len(), "survey form incomplete");
                RenderInstruction::Survey {
                    warning: Some(format!(
                        "{} ({})",
                        prompts::INCOMPLETE_SURVEY_WARNING,
                        err.missing_labels().join(", ")
                    )),
                }
            }
            Err(SubmissionError::SurveyWrite(err)) => {
                tracing::warn!(%err, "survey write failed");
                RenderInstruction::failure(prompts::SURVEY_SAVE_ERROR, true)
            }
            Err(err @ SubmissionError::SessionIncomplete(_)) => {
                tracing::error!(%err, "submission rejected");
                RenderInstruction::failure(prompts::SURVEY_SAVE_ERROR, false)
            }
            Err(SubmissionError::TranscriptWrite { written, total, source }) => {
                tracing::warn!(%source, written, total, "transcript write incomplete");
                RenderInstruction::failure(prompts::transcript_save_error(written, total), true)
            }
        }
    }
}

/// Maps transcript messages into the provider's wire format.
fn to_chat_messages(messages: &[Message]) -> Vec<ChatMessage> {
    messages
        .iter()
        .map(|message| {
            let role = match message.role() {
                Role::User => ChatRole::User,
                Role::Assistant => ChatRole::Assistant,
            };
            ChatMessage::new(role, message.content())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockDialogueProvider;
    use crate::adapters::sheets::InMemoryRowStore;
    use crate::domain::foundation::LikertResponse;
    use crate::domain::survey::form::{AgeBand, Education, Gender};
    use crate::domain::survey::{CONVERSATION_TABLE, SURVEY_TABLE};
    use crate::ports::DialogueError;

    fn controller(
        provider: Arc<MockDialogueProvider>,
        store: Arc<InMemoryRowStore>,
    ) -> PhaseController {
        let settings = StudySettings::default();
        PhaseController::new(
            provider.clone(),
            StyleProfileExtractor::new(provider, settings.style_sample_window),
            SurveySubmission::new(store),
            settings,
        )
    }

    fn answered_form(save_transcript: bool) -> SurveyForm {
        SurveyForm {
            gender: Some(Gender::Female),
            age: Some(AgeBand::Twenties),
            education: Some(Education::University),
            job: "대학생".to_string(),
            similarity: Some(LikertResponse::Agree),
            trust: Some(LikertResponse::Agree),
            enjoyment: Some(LikertResponse::StronglyAgree),
            humanness: Some(LikertResponse::Neutral),
            reuse_intent: Some(LikertResponse::Agree),
            usefulness: Some(LikertResponse::Agree),
            save_transcript,
        }
    }

    /// Drives a session up to the task conversation on the fixed arm.
    ///
    /// Queued provider replies: two follow-up questions and the style
    /// analysis. The fixed arm needs no notice call.
    async fn session_in_task(
        provider: &Arc<MockDialogueProvider>,
        store: &Arc<InMemoryRowStore>,
        start: Timestamp,
    ) -> (PhaseController, SessionState) {
        let controller = controller(provider.clone(), store.clone());
        let mut state = SessionState::new();

        controller
            .handle_at(
                &mut state,
                SessionEvent::ArmChosen(ExperimentArm::Fixed),
                start,
            )
            .await;
        for text in ["날씨가 좋았어요", "산책을 했어요", "기분이 좋아요"] {
            controller
                .handle_at(&mut state, SessionEvent::MessageSubmitted(text.into()), start)
                .await;
        }
        assert_eq!(state.phase(), SessionPhase::TaskConversation);
        (controller, state)
    }

    mod mode_selection {
        use super::*;

        #[tokio::test]
        async fn arm_choice_seeds_the_collection_chat() {
            let provider = Arc::new(MockDialogueProvider::new());
            let store = Arc::new(InMemoryRowStore::new());
            let controller = controller(provider, store);
            let mut state = SessionState::new();

            let render = controller
                .handle(&mut state, SessionEvent::ArmChosen(ExperimentArm::Mirroring))
                .await;

            assert_eq!(state.phase(), SessionPhase::StyleCollection);
            assert_eq!(state.arm(), Some(ExperimentArm::Mirroring));
            assert_eq!(state.transcript().len(), 1);
            assert_eq!(state.transcript()[0].content(), prompts::SEED_QUESTION);
            match render {
                RenderInstruction::Chat { input_hint, .. } => {
                    assert_eq!(input_hint, prompts::COLLECTION_INPUT_HINT);
                }
                other => panic!("expected chat render, got {:?}", other),
            }
        }

        #[tokio::test]
        async fn initial_render_is_the_mode_choice() {
            let provider = Arc::new(MockDialogueProvider::new());
            let store = Arc::new(InMemoryRowStore::new());
            let controller = controller(provider, store);
            let mut state = SessionState::new();

            let render = controller.handle(&mut state, SessionEvent::Advance).await;
            assert!(matches!(render, RenderInstruction::ModeChoice { .. }));
            assert_eq!(state.phase(), SessionPhase::ModeSelection);
        }

        #[tokio::test]
        async fn arm_cannot_change_after_leaving_mode_selection() {
            let provider = Arc::new(MockDialogueProvider::new());
            let store = Arc::new(InMemoryRowStore::new());
            let controller = controller(provider, store);
            let mut state = SessionState::new();

            controller
                .handle(&mut state, SessionEvent::ArmChosen(ExperimentArm::Fixed))
                .await;
            controller
                .handle(&mut state, SessionEvent::ArmChosen(ExperimentArm::Mirroring))
                .await;

            assert_eq!(state.arm(), Some(ExperimentArm::Fixed));
            assert_eq!(state.phase(), SessionPhase::StyleCollection);
        }
    }

    mod style_collection {
        use super::*;

        #[tokio::test]
        async fn follow_ups_stay_in_phase_and_count() {
            let provider = Arc::new(
                MockDialogueProvider::new()
                    .with_reply("주말에는 주로 뭘 하세요?")
                    .with_reply("좋아하는 음식이 있나요?"),
            );
            let store = Arc::new(InMemoryRowStore::new());
            let controller = controller(provider.clone(), store);
            let mut state = SessionState::new();

            controller
                .handle(&mut state, SessionEvent::ArmChosen(ExperimentArm::Fixed))
                .await;
            controller
                .handle(&mut state, SessionEvent::MessageSubmitted("좋았어요".into()))
                .await;
            controller
                .handle(&mut state, SessionEvent::MessageSubmitted("산책했어요".into()))
                .await;

            assert_eq!(state.phase(), SessionPhase::StyleCollection);
            assert_eq!(state.follow_up_count(), 2);
            // seed + 2 * (user, assistant)
            assert_eq!(state.transcript().len(), 5);
            assert_eq!(state.style_samples().len(), 2);

            // Follow-up requests carry the fixed instruction and history.
            let calls = provider.calls();
            assert_eq!(
                calls[0].system_instruction.as_deref(),
                Some(prompts::COLLECTION_INSTRUCTION)
            );
            assert_eq!(calls[0].messages.len(), 2); // seed + user
        }

        #[tokio::test]
        async fn third_turn_extracts_profile_and_starts_the_task() {
            let provider = Arc::new(
                MockDialogueProvider::new()
                    .with_reply("질문 2")
                    .with_reply("질문 3")
                    .with_reply("짧고 담백한 말투"),
            );
            let store = Arc::new(InMemoryRowStore::new());
            let (_, state) =
                session_in_task(&provider, &store, Timestamp::from_unix_secs(1000)).await;

            // Exactly 3 user turns were collected, regardless of content.
            assert_eq!(state.style_samples().len(), 3);
            assert_eq!(state.style_profile(), Some("짧고 담백한 말투"));
            assert!(state.task_started_at().is_some());
        }

        #[tokio::test]
        async fn provider_failure_commits_nothing_and_retry_succeeds() {
            let provider = Arc::new(
                MockDialogueProvider::new()
                    .with_failure(DialogueError::unavailable("down"))
                    .with_reply("다시 질문"),
            );
            let store = Arc::new(InMemoryRowStore::new());
            let controller = controller(provider, store);
            let mut state = SessionState::new();

            controller
                .handle(&mut state, SessionEvent::ArmChosen(ExperimentArm::Fixed))
                .await;
            let before = state.transcript().len();

            let render = controller
                .handle(&mut state, SessionEvent::MessageSubmitted("안녕".into()))
                .await;

            // Failed step: no partial user turn, same phase, retryable.
            assert!(render.is_failure());
            assert_eq!(state.transcript().len(), before);
            assert_eq!(state.follow_up_count(), 0);
            assert!(state.style_samples().is_empty());
            assert_eq!(state.phase(), SessionPhase::StyleCollection);

            let render = controller
                .handle(&mut state, SessionEvent::MessageSubmitted("안녕".into()))
                .await;
            assert!(!render.is_failure());
            assert_eq!(state.follow_up_count(), 1);
        }

        #[tokio::test]
        async fn failed_extraction_keeps_the_session_in_collection() {
            let provider = Arc::new(
                MockDialogueProvider::new()
                    .with_reply("질문 2")
                    .with_reply("질문 3")
                    .with_failure(DialogueError::Timeout { timeout_secs: 60 }),
            );
            let store = Arc::new(InMemoryRowStore::new());
            let controller = controller(provider, store);
            let mut state = SessionState::new();

            controller
                .handle(&mut state, SessionEvent::ArmChosen(ExperimentArm::Fixed))
                .await;
            for text in ["하나", "둘"] {
                controller
                    .handle(&mut state, SessionEvent::MessageSubmitted(text.into()))
                    .await;
            }
            let render = controller
                .handle(&mut state, SessionEvent::MessageSubmitted("셋".into()))
                .await;

            assert!(render.is_failure());
            assert_eq!(state.phase(), SessionPhase::StyleCollection);
            assert!(state.style_profile().is_none());
            assert_eq!(state.style_samples().len(), 2);
        }

        #[tokio::test]
        async fn empty_input_is_ignored() {
            let provider = Arc::new(MockDialogueProvider::new());
            let store = Arc::new(InMemoryRowStore::new());
            let controller = controller(provider.clone(), store);
            let mut state = SessionState::new();

            controller
                .handle(&mut state, SessionEvent::ArmChosen(ExperimentArm::Fixed))
                .await;
            controller
                .handle(&mut state, SessionEvent::MessageSubmitted("   ".into()))
                .await;

            assert_eq!(state.transcript().len(), 1);
            assert!(provider.calls().is_empty());
        }
    }

    mod pre_task_notice {
        use super::*;

        #[tokio::test]
        async fn mirroring_arm_generates_a_styled_notice() {
            let provider = Arc::new(
                MockDialogueProvider::new()
                    .with_reply("질문 2")
                    .with_reply("질문 3")
                    .with_reply("장난기 있는 반말")
                    .with_reply("  우리 3분 동안 여행 계획 짜보자!  "),
            );
            let store = Arc::new(InMemoryRowStore::new());
            let controller = controller(provider.clone(), store);
            let mut state = SessionState::new();

            controller
                .handle(&mut state, SessionEvent::ArmChosen(ExperimentArm::Mirroring))
                .await;
            for text in ["하나", "둘", "셋"] {
                controller
                    .handle(&mut state, SessionEvent::MessageSubmitted(text.into()))
                    .await;
            }

            assert_eq!(state.phase(), SessionPhase::TaskConversation);
            assert_eq!(state.task_notice(), Some("우리 3분 동안 여행 계획 짜보자!"));

            // The notice request embeds the derived profile.
            let calls = provider.calls();
            let notice_call = &calls[calls.len() - 1];
            assert!(notice_call.messages[0].content.contains("장난기 있는 반말"));
        }

        #[tokio::test]
        async fn fixed_arm_uses_the_constant_notice_without_a_call() {
            let provider = Arc::new(
                MockDialogueProvider::new()
                    .with_reply("질문 2")
                    .with_reply("질문 3")
                    .with_reply("차분한 존댓말"),
            );
            let store = Arc::new(InMemoryRowStore::new());
            let (_, state) =
                session_in_task(&provider, &store, Timestamp::from_unix_secs(1000)).await;

            assert_eq!(state.task_notice(), Some(prompts::FIXED_TASK_NOTICE));
            // Two follow-ups + one analysis; no notice generation.
            assert_eq!(provider.calls().len(), 3);
        }

        #[tokio::test]
        async fn failed_notice_generation_stays_in_notice_phase_until_retry() {
            let provider = Arc::new(
                MockDialogueProvider::new()
                    .with_reply("질문 2")
                    .with_reply("질문 3")
                    .with_reply("담백한 말투")
                    .with_failure(DialogueError::unavailable("down"))
                    .with_reply("여행 얘기 해볼까?"),
            );
            let store = Arc::new(InMemoryRowStore::new());
            let controller = controller(provider, store);
            let mut state = SessionState::new();

            controller
                .handle(&mut state, SessionEvent::ArmChosen(ExperimentArm::Mirroring))
                .await;
            for text in ["하나", "둘"] {
                controller
                    .handle(&mut state, SessionEvent::MessageSubmitted(text.into()))
                    .await;
            }
            let render = controller
                .handle(&mut state, SessionEvent::MessageSubmitted("셋".into()))
                .await;

            // Profile extraction succeeded, notice generation did not.
            assert!(render.is_failure());
            assert_eq!(state.phase(), SessionPhase::PreTaskNotice);
            assert!(state.style_profile().is_some());
            assert!(state.task_started_at().is_none());

            // The automatic phase retries on the next render tick.
            let render = controller.handle(&mut state, SessionEvent::Advance).await;
            assert!(!render.is_failure());
            assert_eq!(state.phase(), SessionPhase::TaskConversation);
        }

        #[tokio::test]
        async fn task_render_carries_the_analysis_banner() {
            let provider = Arc::new(
                MockDialogueProvider::new()
                    .with_reply("질문 2")
                    .with_reply("질문 3")
                    .with_reply("차분한 존댓말"),
            );
            let store = Arc::new(InMemoryRowStore::new());
            let controller = controller(provider, store);
            let mut state = SessionState::new();

            controller
                .handle(&mut state, SessionEvent::ArmChosen(ExperimentArm::Fixed))
                .await;
            for text in ["하나", "둘"] {
                controller
                    .handle(&mut state, SessionEvent::MessageSubmitted(text.into()))
                    .await;
            }
            let render = controller
                .handle(&mut state, SessionEvent::MessageSubmitted("셋".into()))
                .await;

            match render {
                RenderInstruction::Chat { banner, .. } => {
                    assert_eq!(
                        banner.as_deref(),
                        Some(prompts::analysis_banner("차분한 존댓말").as_str())
                    );
                }
                other => panic!("expected chat render, got {:?}", other),
            }
        }
    }

    mod task_conversation {
        use super::*;

        #[tokio::test]
        async fn notice_appears_in_the_transcript_exactly_once() {
            let provider = Arc::new(
                MockDialogueProvider::new()
                    .with_reply("질문 2")
                    .with_reply("질문 3")
                    .with_reply("담백한 말투"),
            );
            let store = Arc::new(InMemoryRowStore::new());
            let start = Timestamp::from_unix_secs(1000);
            let (controller, mut state) = session_in_task(&provider, &store, start).await;

            // Re-render the phase several times without new input.
            for _ in 0..3 {
                controller
                    .handle_at(&mut state, SessionEvent::Advance, start.plus_secs(10))
                    .await;
            }

            let notices = state
                .transcript()
                .iter()
                .filter(|m| m.content() == prompts::FIXED_TASK_NOTICE)
                .count();
            assert_eq!(notices, 1);
        }

        #[tokio::test]
        async fn fixed_arm_uses_the_formal_instruction() {
            let provider = Arc::new(
                MockDialogueProvider::new()
                    .with_reply("질문 2")
                    .with_reply("질문 3")
                    .with_reply("담백한 말투")
                    .with_reply("부산 2박 3일 코스를 추천드립니다."),
            );
            let store = Arc::new(InMemoryRowStore::new());
            let start = Timestamp::from_unix_secs(1000);
            let (controller, mut state) = session_in_task(&provider, &store, start).await;

            controller
                .handle_at(
                    &mut state,
                    SessionEvent::MessageSubmitted("부산 여행 코스 알려줘".into()),
                    start.plus_secs(30),
                )
                .await;

            let calls = provider.calls();
            let task_call = calls.last().unwrap();
            assert_eq!(
                task_call.system_instruction.as_deref(),
                Some(prompts::FIXED_TASK_INSTRUCTION)
            );
        }

        #[tokio::test]
        async fn mirroring_arm_embeds_the_profile_in_the_instruction() {
            let provider = Arc::new(
                MockDialogueProvider::new()
                    .with_reply("질문 2")
                    .with_reply("질문 3")
                    .with_reply("장난기 있는 반말")
                    .with_reply("여행 가자!")
                    .with_reply("어디로 갈까?"),
            );
            let store = Arc::new(InMemoryRowStore::new());
            let controller = controller(provider.clone(), store);
            let mut state = SessionState::new();

            controller
                .handle(&mut state, SessionEvent::ArmChosen(ExperimentArm::Mirroring))
                .await;
            for text in ["하나", "둘", "셋"] {
                controller
                    .handle(&mut state, SessionEvent::MessageSubmitted(text.into()))
                    .await;
            }
            controller
                .handle(&mut state, SessionEvent::MessageSubmitted("제주도 어때?".into()))
                .await;

            let calls = provider.calls();
            let task_call = calls.last().unwrap();
            let instruction = task_call.system_instruction.as_deref().unwrap();
            assert!(instruction.contains("장난기 있는 반말"));
        }

        #[tokio::test]
        async fn task_context_is_bounded_to_the_last_six_entries() {
            let mut provider = MockDialogueProvider::new()
                .with_reply("질문 2")
                .with_reply("질문 3")
                .with_reply("담백한 말투");
            for i in 0..6 {
                provider = provider.with_reply(format!("답변 {i}"));
            }
            let provider = Arc::new(provider);
            let store = Arc::new(InMemoryRowStore::new());
            let start = Timestamp::from_unix_secs(1000);
            let (controller, mut state) = session_in_task(&provider, &store, start).await;

            for i in 0..6 {
                controller
                    .handle_at(
                        &mut state,
                        SessionEvent::MessageSubmitted(format!("메시지 {i}")),
                        start.plus_secs(10),
                    )
                    .await;
            }

            let calls = provider.calls();
            let last_call = calls.last().unwrap();
            assert_eq!(last_call.messages.len(), 6);
            // Most recent entry is the just-submitted user turn.
            assert_eq!(last_call.messages[5].content, "메시지 5");
        }

        #[tokio::test]
        async fn late_submission_is_answered_then_moves_to_consent() {
            let provider = Arc::new(
                MockDialogueProvider::new()
                    .with_reply("질문 2")
                    .with_reply("질문 3")
                    .with_reply("담백한 말투")
                    .with_reply("마지막 답변입니다."),
            );
            let store = Arc::new(InMemoryRowStore::new());
            let start = Timestamp::from_unix_secs(1000);
            let (controller, mut state) = session_in_task(&provider, &store, start).await;

            // Submit at T+181s: the reply is handled, then the phase flips.
            let render = controller
                .handle_at(
                    &mut state,
                    SessionEvent::MessageSubmitted("고마워".into()),
                    start.plus_secs(181),
                )
                .await;

            assert!(matches!(render, RenderInstruction::TimedOut { .. }));
            assert_eq!(state.phase(), SessionPhase::Consent);
            let last = state.transcript().last().unwrap();
            assert_eq!(last.content(), "마지막 답변입니다.");
        }

        #[tokio::test]
        async fn deadline_is_not_reached_at_exactly_the_limit() {
            let provider = Arc::new(
                MockDialogueProvider::new()
                    .with_reply("질문 2")
                    .with_reply("질문 3")
                    .with_reply("담백한 말투"),
            );
            let store = Arc::new(InMemoryRowStore::new());
            let start = Timestamp::from_unix_secs(1000);
            let (controller, mut state) = session_in_task(&provider, &store, start).await;

            let render = controller
                .handle_at(&mut state, SessionEvent::Advance, start.plus_secs(180))
                .await;

            assert!(matches!(render, RenderInstruction::Chat { .. }));
            assert_eq!(state.phase(), SessionPhase::TaskConversation);
        }

        #[tokio::test]
        async fn advance_past_the_deadline_times_out() {
            let provider = Arc::new(
                MockDialogueProvider::new()
                    .with_reply("질문 2")
                    .with_reply("질문 3")
                    .with_reply("담백한 말투"),
            );
            let store = Arc::new(InMemoryRowStore::new());
            let start = Timestamp::from_unix_secs(1000);
            let (controller, mut state) = session_in_task(&provider, &store, start).await;

            let render = controller
                .handle_at(&mut state, SessionEvent::Advance, start.plus_secs(181))
                .await;

            match render {
                RenderInstruction::TimedOut { message, pause_secs } => {
                    assert_eq!(message, prompts::TERMINATION_NOTICE);
                    assert_eq!(pause_secs, 5);
                }
                other => panic!("expected timeout render, got {:?}", other),
            }
            assert_eq!(state.phase(), SessionPhase::Consent);
        }

        #[tokio::test]
        async fn failed_reply_leaves_the_clock_and_transcript_alone() {
            let provider = Arc::new(
                MockDialogueProvider::new()
                    .with_reply("질문 2")
                    .with_reply("질문 3")
                    .with_reply("담백한 말투")
                    .with_failure(DialogueError::rate_limited(30)),
            );
            let store = Arc::new(InMemoryRowStore::new());
            let start = Timestamp::from_unix_secs(1000);
            let (controller, mut state) = session_in_task(&provider, &store, start).await;
            let before = state.transcript().len();

            let render = controller
                .handle_at(
                    &mut state,
                    SessionEvent::MessageSubmitted("추천해줘".into()),
                    start.plus_secs(30),
                )
                .await;

            assert!(render.is_failure());
            assert_eq!(state.transcript().len(), before);
            assert_eq!(state.phase(), SessionPhase::TaskConversation);
        }
    }

    mod consent {
        use super::*;

        async fn session_in_consent(
            provider: &Arc<MockDialogueProvider>,
            store: &Arc<InMemoryRowStore>,
        ) -> (PhaseController, SessionState) {
            let start = Timestamp::from_unix_secs(1000);
            let (controller, mut state) = session_in_task(provider, store, start).await;
            controller
                .handle_at(&mut state, SessionEvent::Advance, start.plus_secs(200))
                .await;
            assert_eq!(state.phase(), SessionPhase::Consent);
            (controller, state)
        }

        fn collection_provider() -> Arc<MockDialogueProvider> {
            Arc::new(
                MockDialogueProvider::new()
                    .with_reply("질문 2")
                    .with_reply("질문 3")
                    .with_reply("담백한 말투"),
            )
        }

        #[tokio::test]
        async fn valid_submission_with_opt_in_saves_everything() {
            let provider = collection_provider();
            let store = Arc::new(InMemoryRowStore::new());
            let (controller, mut state) = session_in_consent(&provider, &store).await;
            let transcript_len = state.transcript().len();

            let render = controller
                .handle(
                    &mut state,
                    SessionEvent::SurveySubmitted(answered_form(true)),
                )
                .await;

            match render {
                RenderInstruction::Completed {
                    transcript_saved, ..
                } => assert!(transcript_saved),
                other => panic!("expected completed render, got {:?}", other),
            }
            assert!(state.is_submitted());
            assert_eq!(store.rows(SURVEY_TABLE).len(), 2);
            assert_eq!(store.rows(CONVERSATION_TABLE).len(), transcript_len + 1);
        }

        #[tokio::test]
        async fn opt_out_saves_only_the_survey() {
            let provider = collection_provider();
            let store = Arc::new(InMemoryRowStore::new());
            let (controller, mut state) = session_in_consent(&provider, &store).await;

            let render = controller
                .handle(
                    &mut state,
                    SessionEvent::SurveySubmitted(answered_form(false)),
                )
                .await;

            match render {
                RenderInstruction::Completed {
                    transcript_saved, ..
                } => assert!(!transcript_saved),
                other => panic!("expected completed render, got {:?}", other),
            }
            assert_eq!(store.rows(SURVEY_TABLE).len(), 2);
            assert!(store.rows(CONVERSATION_TABLE).is_empty());
        }

        #[tokio::test]
        async fn placeholder_field_blocks_all_writes_with_a_warning() {
            let provider = collection_provider();
            let store = Arc::new(InMemoryRowStore::new());
            let (controller, mut state) = session_in_consent(&provider, &store).await;

            let mut form = answered_form(true);
            form.age = None; // "선택 안 함"
            let render = controller
                .handle(&mut state, SessionEvent::SurveySubmitted(form))
                .await;

            match render {
                RenderInstruction::Survey { warning } => {
                    let warning = warning.unwrap();
                    assert!(warning.contains("빠짐없이"));
                    assert!(warning.contains("연령대"));
                }
                other => panic!("expected survey render, got {:?}", other),
            }
            assert!(!state.is_submitted());
            assert!(store.rows(SURVEY_TABLE).is_empty());
            assert!(store.rows(CONVERSATION_TABLE).is_empty());
        }

        #[tokio::test]
        async fn store_failure_blocks_the_success_message() {
            let provider = collection_provider();
            let store = Arc::new(InMemoryRowStore::new().failing_after(0));
            let (controller, mut state) = session_in_consent(&provider, &store).await;

            let render = controller
                .handle(
                    &mut state,
                    SessionEvent::SurveySubmitted(answered_form(false)),
                )
                .await;

            assert!(render.is_failure());
            assert!(!state.is_submitted());
        }

        #[tokio::test]
        async fn partial_transcript_failure_is_reported_distinctly() {
            let provider = collection_provider();
            // Survey header + row + conversation header succeed, first
            // conversation row fails.
            let store = Arc::new(InMemoryRowStore::new().failing_after(3));
            let (controller, mut state) = session_in_consent(&provider, &store).await;

            let render = controller
                .handle(
                    &mut state,
                    SessionEvent::SurveySubmitted(answered_form(true)),
                )
                .await;

            match render {
                RenderInstruction::Failure { message, .. } => {
                    assert!(message.contains("설문은 저장되었지만"));
                }
                other => panic!("expected failure render, got {:?}", other),
            }
            assert!(!state.is_submitted());
            assert_eq!(store.rows(SURVEY_TABLE).len(), 2);
        }

        #[tokio::test]
        async fn repeated_submission_after_success_is_a_no_op() {
            let provider = collection_provider();
            let store = Arc::new(InMemoryRowStore::new());
            let (controller, mut state) = session_in_consent(&provider, &store).await;

            controller
                .handle(
                    &mut state,
                    SessionEvent::SurveySubmitted(answered_form(false)),
                )
                .await;
            let render = controller
                .handle(
                    &mut state,
                    SessionEvent::SurveySubmitted(answered_form(false)),
                )
                .await;

            assert!(render.is_completed());
            // Still exactly one survey row.
            assert_eq!(store.rows(SURVEY_TABLE).len(), 2);
        }
    }
}
