//! Survey form and validation.
//!
//! The form mirrors the study questionnaire: three demographic selects, a
//! free-text job field, six five-point Likert questions, and an opt-in
//! checkbox for transcript retention. Unanswered selects are `None`
//! (the participant left them at "선택 안 함"); validation converts a fully
//! answered form into a `CompletedSurvey` so downstream code never sees
//! optionals.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::LikertResponse;

/// Participant gender selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Returns the Korean label shown to participants and persisted in rows.
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "남성",
            Gender::Female => "여성",
            Gender::Other => "기타",
        }
    }

    /// Returns all options in display order.
    pub fn all() -> [Self; 3] {
        [Gender::Male, Gender::Female, Gender::Other]
    }
}

/// Participant age band selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeBand {
    Teens,
    Twenties,
    Thirties,
    Forties,
    FiftiesPlus,
}

impl AgeBand {
    /// Returns the Korean label shown to participants and persisted in rows.
    pub fn label(&self) -> &'static str {
        match self {
            AgeBand::Teens => "10대",
            AgeBand::Twenties => "20대",
            AgeBand::Thirties => "30대",
            AgeBand::Forties => "40대",
            AgeBand::FiftiesPlus => "50대 이상",
        }
    }

    /// Returns all options in display order.
    pub fn all() -> [Self; 5] {
        [
            AgeBand::Teens,
            AgeBand::Twenties,
            AgeBand::Thirties,
            AgeBand::Forties,
            AgeBand::FiftiesPlus,
        ]
    }
}

/// Participant education selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Education {
    HighSchoolOrBelow,
    University,
    GraduateSchool,
}

impl Education {
    /// Returns the Korean label shown to participants and persisted in rows.
    pub fn label(&self) -> &'static str {
        match self {
            Education::HighSchoolOrBelow => "고등학교 졸업 이하",
            Education::University => "대학교 재학/졸업",
            Education::GraduateSchool => "대학원 재학/졸업",
        }
    }

    /// Returns all options in display order.
    pub fn all() -> [Self; 3] {
        [
            Education::HighSchoolOrBelow,
            Education::University,
            Education::GraduateSchool,
        ]
    }
}

/// The ten required survey fields, in questionnaire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurveyField {
    Gender,
    Age,
    Education,
    Job,
    Similarity,
    Trust,
    Enjoyment,
    Humanness,
    ReuseIntent,
    Usefulness,
}

impl SurveyField {
    /// Returns the question text shown to participants.
    pub fn prompt(&self) -> &'static str {
        match self {
            SurveyField::Gender => "성별을 선택해 주세요:",
            SurveyField::Age => "연령대를 선택해 주세요:",
            SurveyField::Education => "최종 학력을 선택해 주세요:",
            SurveyField::Job => "현재 직업을 입력해 주세요 (예: 대학생, 회사원 등)",
            SurveyField::Similarity => "이 챗봇은 당신과 말투가 비슷하다고 느꼈나요?",
            SurveyField::Trust => "이 챗봇은 믿을 만하다고 느꼈나요?",
            SurveyField::Enjoyment => "이 챗봇과의 대화가 즐거웠나요?",
            SurveyField::Humanness => "이 챗봇은 사람처럼 느껴졌나요?",
            SurveyField::ReuseIntent => "이 챗봇을 다시 사용하고 싶으신가요?",
            SurveyField::Usefulness => "이 챗봇이 제공한 여행 계획은 도움이 되었나요?",
        }
    }

    /// Returns a short field name for warnings and logs.
    pub fn label(&self) -> &'static str {
        match self {
            SurveyField::Gender => "성별",
            SurveyField::Age => "연령대",
            SurveyField::Education => "최종 학력",
            SurveyField::Job => "직업",
            SurveyField::Similarity => "말투 유사성",
            SurveyField::Trust => "신뢰",
            SurveyField::Enjoyment => "즐거움",
            SurveyField::Humanness => "인간다움",
            SurveyField::ReuseIntent => "재사용 의향",
            SurveyField::Usefulness => "유용성",
        }
    }
}

/// The survey form as entered by the participant.
///
/// `None` selects and a blank job field are placeholder values; the form
/// is a plain input record and stays editable across validation failures
/// so entered values are preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyForm {
    pub gender: Option<Gender>,
    pub age: Option<AgeBand>,
    pub education: Option<Education>,
    pub job: String,
    pub similarity: Option<LikertResponse>,
    pub trust: Option<LikertResponse>,
    pub enjoyment: Option<LikertResponse>,
    pub humanness: Option<LikertResponse>,
    pub reuse_intent: Option<LikertResponse>,
    pub usefulness: Option<LikertResponse>,
    pub save_transcript: bool,
}

impl SurveyForm {
    /// Creates an empty form (everything at the placeholder value).
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the form, producing the completed survey.
    ///
    /// All ten required fields are checked in questionnaire order and every
    /// missing one is reported, so the warning can name them all at once.
    ///
    /// # Errors
    ///
    /// - `FormValidationError` listing each unanswered field; the job field
    ///   counts as unanswered when empty after trimming
    pub fn validate(&self) -> Result<CompletedSurvey, FormValidationError> {
        let mut missing = Vec::new();

        let gender = require(self.gender, SurveyField::Gender, &mut missing);
        let age = require(self.age, SurveyField::Age, &mut missing);
        let education = require(self.education, SurveyField::Education, &mut missing);
        let job = self.job.trim();
        if job.is_empty() {
            missing.push(SurveyField::Job);
        }
        let similarity = require(self.similarity, SurveyField::Similarity, &mut missing);
        let trust = require(self.trust, SurveyField::Trust, &mut missing);
        let enjoyment = require(self.enjoyment, SurveyField::Enjoyment, &mut missing);
        let humanness = require(self.humanness, SurveyField::Humanness, &mut missing);
        let reuse_intent = require(self.reuse_intent, SurveyField::ReuseIntent, &mut missing);
        let usefulness = require(self.usefulness, SurveyField::Usefulness, &mut missing);

        match (
            gender, age, education, similarity, trust, enjoyment, humanness, reuse_intent,
            usefulness,
        ) {
            (
                Some(gender),
                Some(age),
                Some(education),
                Some(similarity),
                Some(trust),
                Some(enjoyment),
                Some(humanness),
                Some(reuse_intent),
                Some(usefulness),
            ) if missing.is_empty() => Ok(CompletedSurvey {
                gender,
                age,
                education,
                job: job.to_string(),
                similarity,
                trust,
                enjoyment,
                humanness,
                reuse_intent,
                usefulness,
                save_transcript: self.save_transcript,
            }),
            _ => Err(FormValidationError { missing }),
        }
    }
}

/// Records the field as missing when unanswered, passing the value through.
fn require<T>(value: Option<T>, field: SurveyField, missing: &mut Vec<SurveyField>) -> Option<T> {
    if value.is_none() {
        missing.push(field);
    }
    value
}

/// A fully answered survey; produced only by [`SurveyForm::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedSurvey {
    pub gender: Gender,
    pub age: AgeBand,
    pub education: Education,
    pub job: String,
    pub similarity: LikertResponse,
    pub trust: LikertResponse,
    pub enjoyment: LikertResponse,
    pub humanness: LikertResponse,
    pub reuse_intent: LikertResponse,
    pub usefulness: LikertResponse,
    pub save_transcript: bool,
}

/// Validation failure naming every unanswered field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("survey form incomplete: {} field(s) unanswered", .missing.len())]
pub struct FormValidationError {
    /// Unanswered fields, in questionnaire order.
    pub missing: Vec<SurveyField>,
}

impl FormValidationError {
    /// Returns the short Korean names of the missing fields.
    pub fn missing_labels(&self) -> Vec<&'static str> {
        self.missing.iter().map(|f| f.label()).collect()
    }
}
