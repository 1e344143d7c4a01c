//! Likert response value object (five-point agreement scale).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Five-point Likert response: 1 (strongly disagree) to 5 (strongly agree).
///
/// The survey's "선택 안 함" placeholder is not a response; form fields model
/// an unanswered question as `None`, never as a variant of this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum LikertResponse {
    StronglyDisagree = 1,
    Disagree = 2,
    Neutral = 3,
    Agree = 4,
    StronglyAgree = 5,
}

impl LikertResponse {
    /// Creates a response from an integer, returning error if out of range.
    pub fn try_from_u8(value: u8) -> Result<Self, ValidationError> {
        match value {
            1 => Ok(LikertResponse::StronglyDisagree),
            2 => Ok(LikertResponse::Disagree),
            3 => Ok(LikertResponse::Neutral),
            4 => Ok(LikertResponse::Agree),
            5 => Ok(LikertResponse::StronglyAgree),
            _ => Err(ValidationError::out_of_range("likert", 1, 5, value as i32)),
        }
    }

    /// Returns the numeric value.
    pub fn value(&self) -> u8 {
        *self as u8
    }

    /// Returns the Korean anchor shown to participants and persisted in rows.
    pub fn label(&self) -> &'static str {
        match self {
            LikertResponse::StronglyDisagree => "전혀 아니다",
            LikertResponse::Disagree => "아니다",
            LikertResponse::Neutral => "보통이다",
            LikertResponse::Agree => "그렇다",
            LikertResponse::StronglyAgree => "매우 그렇다",
        }
    }

    /// Returns all responses in ascending order, for rendering the scale.
    pub fn all() -> [Self; 5] {
        [
            LikertResponse::StronglyDisagree,
            LikertResponse::Disagree,
            LikertResponse::Neutral,
            LikertResponse::Agree,
            LikertResponse::StronglyAgree,
        ]
    }
}

impl fmt::Display for LikertResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_from_u8_accepts_valid_values() {
        assert_eq!(
            LikertResponse::try_from_u8(1).unwrap(),
            LikertResponse::StronglyDisagree
        );
        assert_eq!(LikertResponse::try_from_u8(3).unwrap(), LikertResponse::Neutral);
        assert_eq!(
            LikertResponse::try_from_u8(5).unwrap(),
            LikertResponse::StronglyAgree
        );
    }

    #[test]
    fn try_from_u8_rejects_invalid_values() {
        assert!(LikertResponse::try_from_u8(0).is_err());
        assert!(LikertResponse::try_from_u8(6).is_err());
        assert!(LikertResponse::try_from_u8(42).is_err());
    }

    #[test]
    fn value_returns_scale_position() {
        assert_eq!(LikertResponse::StronglyDisagree.value(), 1);
        assert_eq!(LikertResponse::Neutral.value(), 3);
        assert_eq!(LikertResponse::StronglyAgree.value(), 5);
    }

    #[test]
    fn labels_are_the_korean_anchors() {
        assert_eq!(LikertResponse::StronglyDisagree.label(), "전혀 아니다");
        assert_eq!(LikertResponse::Disagree.label(), "아니다");
        assert_eq!(LikertResponse::Neutral.label(), "보통이다");
        assert_eq!(LikertResponse::Agree.label(), "그렇다");
        assert_eq!(LikertResponse::StronglyAgree.label(), "매우 그렇다");
    }

    #[test]
    fn all_lists_the_scale_in_order() {
        let values: Vec<u8> = LikertResponse::all().iter().map(|r| r.value()).collect();
        assert_eq!(values, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn ordering_follows_the_scale() {
        assert!(LikertResponse::StronglyDisagree < LikertResponse::Disagree);
        assert!(LikertResponse::Agree < LikertResponse::StronglyAgree);
    }

    #[test]
    fn display_uses_label() {
        assert_eq!(format!("{}", LikertResponse::Agree), "그렇다");
    }
}
