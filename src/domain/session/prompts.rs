//! Participant-facing texts and model prompt templates.
//!
//! The study ran in Korean; every string shown to a participant is kept
//! verbatim, while the system instructions sent to the model stay in
//! English as the study authors wrote them.

/// Opening question that seeds the style-collection transcript.
pub const SEED_QUESTION: &str =
    "안녕하세요! 오늘 하루 어땠는지 궁금해요. 날씨나 기분 같은 걸 말해줘요 :)";

/// System instruction for the style-collection follow-up questions.
pub const COLLECTION_INSTRUCTION: &str = "You are a friendly chatbot collecting natural language \
samples from the user. Ask a new, casual and personal question each time based on their last reply.";

/// Task notice used by the fixed arm.
pub const FIXED_TASK_NOTICE: &str = "안녕하세요. 챗봇과 함께 3분 동안 여행 계획을 세워보세요. \
궁금한 점이 있으면 언제든지 물어보셔도 됩니다.";

/// System instruction for the fixed arm's task conversation.
pub const FIXED_TASK_INSTRUCTION: &str = "You are a formal, concise Korean chatbot. Respond \
politely in 존댓말, and avoid casual or playful expressions.";

/// Notice shown when the task time limit is reached.
pub const TERMINATION_NOTICE: &str =
    "⏰ 시간이 다 되어 챗봇 대화를 종료합니다. 설문지로 이동합니다.";

/// Screen prompt for the mode-selection choice.
pub const MODE_SELECTION_PROMPT: &str = "시작하기 전에 한 가지를 선택해 주세요:";

/// Input placeholder for the style-collection chat.
pub const COLLECTION_INPUT_HINT: &str = "챗봇과 대화해보세요";

/// Input placeholder for the task chat.
pub const TASK_INPUT_HINT: &str = "챗봇과 여행 계획을 대화해보세요";

/// Warning shown when the survey is submitted with missing answers.
pub const INCOMPLETE_SURVEY_WARNING: &str =
    "⚠️ 모든 항목을 빠짐없이 입력해 주세요. 빈 항목이 있으면 저장되지 않습니다.";

/// Success message after both tables were written.
pub const SUBMISSION_SUCCESS: &str = "✅ 설문과 대화가 각각 저장되었습니다!";

/// Success message when only the survey row was requested and written.
pub const SUBMISSION_SUCCESS_SURVEY_ONLY: &str = "✅ 설문이 저장되었습니다!";

/// Inline message when a chatbot reply could not be fetched.
pub const SERVICE_ERROR_MESSAGE: &str =
    "⚠️ 챗봇 응답을 가져오지 못했습니다. 잠시 후 다시 시도해 주세요.";

/// Message when nothing could be saved at submission.
pub const SURVEY_SAVE_ERROR: &str =
    "⚠️ 저장 중 오류가 발생했습니다. 잠시 후 다시 제출해 주세요.";

/// Builds the partial-save warning naming how much transcript landed.
pub fn transcript_save_error(written: usize, total: usize) -> String {
    format!(
        "⚠️ 설문은 저장되었지만 대화 내용은 {written}/{total}개만 저장되었습니다. 다시 제출해 주세요."
    )
}

/// Builds the style-analysis prompt over the collected samples.
pub fn style_analysis_prompt(samples: &[String]) -> String {
    let history = samples.join("\n");
    format!(
        "Analyze the user's writing style based on the following utterances:\n{history}\n\n\
Summarize the user's tone, formality, and personality. Be concise, and express the tone in \
Korean if possible."
    )
}

/// Builds the prompt that asks for a style-matched task invitation.
pub fn mirroring_notice_prompt(style_profile: &str) -> String {
    format!(
        "다음 말투에 맞춰, 사용자에게 3분간 여행 계획 대화를 시작하도록 제안하는 한국어 문장을 \
만들어줘.\n말투 요약: {style_profile}"
    )
}

/// Builds the system instruction for the mirroring arm's task conversation.
pub fn mirroring_task_instruction(style_profile: &str) -> String {
    format!(
        "You are a Korean chatbot that mirrors the user's style.\nHere is the style guide:\n\
{style_profile}\nRespond naturally in that style."
    )
}

/// Builds the banner announcing the participant's style analysis result.
pub fn analysis_banner(style_profile: &str) -> String {
    format!("📝 당신의 말투 분석 결과: {style_profile}")
}
