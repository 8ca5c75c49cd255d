//! Feedback domain types shared by the analyzer, the store and the API.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{AppError, Result};

pub const NOT_APPLICABLE: &str = "N/A";
pub const MISSING_MESSAGE: &str = "Missing 'message' field";

/// A 1 (very bad) to 10 (excellent) rating, or the "N/A" marker when the
/// subject was neither mentioned nor implied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawScore")]
pub enum Score {
    Rated(u8),
    NotApplicable,
}

impl Score {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn rated(value: i64) -> Option<Self> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Some(Score::Rated(value as u8))
        } else {
            None
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Rated(value) => write!(f, "{}", value),
            Score::NotApplicable => f.write_str(NOT_APPLICABLE),
        }
    }
}

impl FromStr for Score {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(NOT_APPLICABLE) {
            return Ok(Score::NotApplicable);
        }
        s.parse::<i64>()
            .ok()
            .and_then(Score::rated)
            .ok_or_else(|| format!("score {:?} is neither 1-10 nor \"N/A\"", s))
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Score::Rated(value) => serializer.serialize_u8(*value),
            Score::NotApplicable => serializer.serialize_str(NOT_APPLICABLE),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawScore {
    Number(serde_json::Number),
    Text(String),
}

impl TryFrom<RawScore> for Score {
    type Error = String;

    fn try_from(raw: RawScore) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawScore::Text(text) => text.parse(),
            RawScore::Number(number) => {
                let integral = number.as_i64().or_else(|| {
                    number
                        .as_f64()
                        .filter(|f| f.fract() == 0.0)
                        .map(|f| f as i64)
                });
                integral
                    .and_then(Score::rated)
                    .ok_or_else(|| format!("score {} is outside 1-10", number))
            }
        }
    }
}

/// Structured assessment of one feedback message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub doctor: Score,
    pub nurse: Score,
    pub hospital: Score,
    #[serde(alias = "notes_analysis", alias = "Notes Analysis")]
    pub notes: String,
}

/// One stored feedback row as returned by the listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackRecord {
    pub id: u64,
    pub message: String,
    pub doctor_score: Score,
    pub nurse_score: Score,
    pub hospital_score: Score,
    pub notes_analysis: String,
    pub created_at: DateTime<Utc>,
}

/// Trims the submitted text; blank input is rejected before any analysis.
pub fn validate_message(raw: &str) -> Result<String> {
    let message = raw.trim();
    if message.is_empty() {
        return Err(AppError::Validation(MISSING_MESSAGE.to_string()));
    }
    Ok(message.to_string())
}
