use tracing::info;

use crate::AppState;
use crate::error::Result;
use crate::feedback::{validate_message, Analysis, FeedbackRecord};

/// Validates, analyzes and stores one message.
///
/// Nothing is written unless the analysis succeeds, and the analysis is only
/// returned once the row is stored.
pub async fn submit_feedback(state: &AppState, raw_message: &str) -> Result<Analysis> {
    let message = validate_message(raw_message)?;

    let analysis = state.analyzer.analyze(&message).await?;
    let id = state.store.insert(&message, &analysis).await?;

    info!(
        id,
        doctor = %analysis.doctor,
        nurse = %analysis.nurse,
        hospital = %analysis.hospital,
        "feedback analyzed and stored"
    );
    Ok(analysis)
}

pub async fn list_feedback(state: &AppState) -> Result<Vec<FeedbackRecord>> {
    let records = state.store.list().await?;
    info!(count = records.len(), "listed feedback");
    Ok(records)
}
