//! Persisted row types for the two study tables.
//!
//! Each table is an append log with a fixed header. A survey record is
//! written exactly once per completed run; conversation records are
//! written only when the participant opts in, one per transcript entry.

use crate::domain::foundation::{ParticipantId, Timestamp};
use crate::domain::session::{ExperimentArm, Message};

use super::form::CompletedSurvey;

/// Name of the survey table.
pub const SURVEY_TABLE: &str = "survey";

/// Name of the conversation table.
pub const CONVERSATION_TABLE: &str = "conversation";

/// Header row of the survey table.
pub const SURVEY_HEADER: [&str; 14] = [
    "timestamp",
    "user_id",
    "mode",
    "gender",
    "age",
    "education",
    "job",
    "similarity",
    "trust",
    "enjoyment",
    "humanness",
    "reuse_intent",
    "usefulness",
    "style_prompt",
];

/// Header row of the conversation table.
pub const CONVERSATION_HEADER: [&str; 4] = ["timestamp", "user_id", "role", "message"];

/// One completed survey submission, ready to append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyRecord {
    timestamp: String,
    user_id: String,
    mode: &'static str,
    gender: &'static str,
    age: &'static str,
    education: &'static str,
    job: String,
    similarity: &'static str,
    trust: &'static str,
    enjoyment: &'static str,
    humanness: &'static str,
    reuse_intent: &'static str,
    usefulness: &'static str,
    style_prompt: String,
}

impl SurveyRecord {
    /// Builds the record from a validated survey.
    ///
    /// The timestamp is shared with the run's conversation records so all
    /// rows of one submission carry the same moment.
    pub fn new(
        timestamp: Timestamp,
        participant: &ParticipantId,
        arm: ExperimentArm,
        survey: &CompletedSurvey,
        style_profile: &str,
    ) -> Self {
        Self {
            timestamp: timestamp.sheet_format(),
            user_id: participant.as_str().to_string(),
            mode: arm.sheet_label(),
            gender: survey.gender.label(),
            age: survey.age.label(),
            education: survey.education.label(),
            job: survey.job.clone(),
            similarity: survey.similarity.label(),
            trust: survey.trust.label(),
            enjoyment: survey.enjoyment.label(),
            humanness: survey.humanness.label(),
            reuse_intent: survey.reuse_intent.label(),
            usefulness: survey.usefulness.label(),
            style_prompt: style_profile.to_string(),
        }
    }

    /// Returns the row in header order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.timestamp.clone(),
            self.user_id.clone(),
            self.mode.to_string(),
            self.gender.to_string(),
            self.age.to_string(),
            self.education.to_string(),
            self.job.clone(),
            self.similarity.to_string(),
            self.trust.to_string(),
            self.enjoyment.to_string(),
            self.humanness.to_string(),
            self.reuse_intent.to_string(),
            self.usefulness.to_string(),
            self.style_prompt.clone(),
        ]
    }
}

/// One transcript entry, ready to append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationRecord {
    timestamp: String,
    user_id: String,
    role: &'static str,
    message: String,
}

impl ConversationRecord {
    /// Builds the record for one transcript message.
    pub fn new(timestamp: Timestamp, participant: &ParticipantId, message: &Message) -> Self {
        Self {
            timestamp: timestamp.sheet_format(),
            user_id: participant.as_str().to_string(),
            role: message.role().as_str(),
            message: message.content().to_string(),
        }
    }

    /// Returns the row in header order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.timestamp.clone(),
            self.user_id.clone(),
            self.role.to_string(),
            self.message.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::LikertResponse;
    use crate::domain::survey::form::{AgeBand, Education, Gender};

    fn completed_survey() -> CompletedSurvey {
        CompletedSurvey {
            gender: Gender::Male,
            age: AgeBand::Thirties,
            education: Education::GraduateSchool,
            job: "회사원".to_string(),
            similarity: LikertResponse::Agree,
            trust: LikertResponse::StronglyAgree,
            enjoyment: LikertResponse::Neutral,
            humanness: LikertResponse::Disagree,
            reuse_intent: LikertResponse::Agree,
            usefulness: LikertResponse::StronglyAgree,
            save_transcript: true,
        }
    }

    #[test]
    fn survey_row_matches_header_width() {
        let record = SurveyRecord::new(
            Timestamp::from_unix_secs(1705276800),
            &ParticipantId::new("ab12cd34").unwrap(),
            ExperimentArm::Mirroring,
            &completed_survey(),
            "차분한 존댓말",
        );

        assert_eq!(record.to_row().len(), SURVEY_HEADER.len());
    }

    #[test]
    fn survey_row_columns_line_up_with_the_header() {
        let record = SurveyRecord::new(
            Timestamp::from_unix_secs(1705276800),
            &ParticipantId::new("ab12cd34").unwrap(),
            ExperimentArm::Fixed,
            &completed_survey(),
            "차분한 존댓말",
        );
        let row = record.to_row();

        assert_eq!(row[0], "2024-01-15 00:00:00"); // timestamp
        assert_eq!(row[1], "ab12cd34"); // user_id
        assert_eq!(row[2], "A"); // mode
        assert_eq!(row[3], "남성"); // gender
        assert_eq!(row[4], "30대"); // age
        assert_eq!(row[5], "대학원 재학/졸업"); // education
        assert_eq!(row[6], "회사원"); // job
        assert_eq!(row[7], "그렇다"); // similarity
        assert_eq!(row[8], "매우 그렇다"); // trust
        assert_eq!(row[13], "차분한 존댓말"); // style_prompt
    }

    #[test]
    fn mirroring_arm_is_labelled_b() {
        let record = SurveyRecord::new(
            Timestamp::from_unix_secs(0),
            &ParticipantId::new("ab12cd34").unwrap(),
            ExperimentArm::Mirroring,
            &completed_survey(),
            "",
        );
        assert_eq!(record.to_row()[2], "B");
    }

    #[test]
    fn conversation_row_matches_header() {
        let message = Message::user("부산 여행 추천해줘").unwrap();
        let record = ConversationRecord::new(
            Timestamp::from_unix_secs(1705276800),
            &ParticipantId::new("ab12cd34").unwrap(),
            &message,
        );
        let row = record.to_row();

        assert_eq!(row.len(), CONVERSATION_HEADER.len());
        assert_eq!(row[0], "2024-01-15 00:00:00");
        assert_eq!(row[1], "ab12cd34");
        assert_eq!(row[2], "user");
        assert_eq!(row[3], "부산 여행 추천해줘");
    }

    #[test]
    fn assistant_rows_carry_the_assistant_role() {
        let message = Message::assistant("부산이라면 해운대부터 추천드려요.").unwrap();
        let record = ConversationRecord::new(
            Timestamp::from_unix_secs(0),
            &ParticipantId::new("ab12cd34").unwrap(),
            &message,
        );
        assert_eq!(record.to_row()[2], "assistant");
    }
}
