use serde_json::Value;

use crate::error::{AppError, Result};
use crate::feedback::FeedbackRecord;

/// Body of `POST /feedback`.
pub struct FeedbackRequest {
    pub message: String,
}

impl FeedbackRequest {
    /// A body that is not a JSON object is rejected outright; a missing or
    /// non-string `message` reads as empty and is left to validation.
    pub fn from_bytes(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| AppError::InvalidBody(e.to_string()))?;

        let Value::Object(fields) = value else {
            return Err(AppError::InvalidBody("expected a JSON object".to_string()));
        };

        let message = fields
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(Self { message })
    }
}

pub type FeedbackList = Vec<FeedbackRecord>;
