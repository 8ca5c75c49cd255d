use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::api::cors::cors;
use crate::api::models::{FeedbackList, FeedbackRequest};
use crate::api::response::{self, ApiResponse};
use crate::error::{AppError, ErrorResponse, Result};
use crate::feedback::Analysis;
use crate::service;
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/feedback",
            post(submit_handler).get(list_handler).fallback(method_not_allowed),
        )
        // Paths used by the earlier serverless deployment
        .route("/api/feedback", post(submit_handler).fallback(method_not_allowed))
        .route("/api/feedback/list", get(list_handler).fallback(method_not_allowed))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(app_state.clone(), cors))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn submit_handler(
    State(state): State<AppState>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Analysis>>)> {
    // Buffering failures, including the body size limit, use the JSON error envelope
    let body = body.map_err(AppError::from).inspect_err(log_failure)?;
    let req = FeedbackRequest::from_bytes(&body).inspect_err(log_failure)?;
    let analysis = service::submit_feedback(&state, &req.message)
        .await
        .inspect_err(log_failure)?;

    Ok(response::success(analysis))
}

async fn list_handler(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<FeedbackList>>)> {
    let records = service::list_feedback(&state).await.inspect_err(log_failure)?;
    Ok(response::success(records))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new("Not found")))
}

async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse::new("Method not allowed")),
    )
}

fn log_failure(err: &AppError) {
    match err {
        AppError::Validation(msg) => warn!("Validation error: {}", msg),
        other => error!(status = other.status_code().as_u16(), "{}", other),
    }
}
