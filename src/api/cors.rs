//! Cross-origin handling against the configured origin allow-list.
//!
//! Preflight requests are answered here on any path: 204 for an allowed
//! origin, 403 otherwise. Every other response gets the permitted origin
//! stamped on it, or the literal `null` when the caller is not allowed.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::AppState;

pub const ALLOWED_METHODS: &str = "POST, GET, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type";

/// Returns the origin to echo back, if it is on the allow-list.
pub fn permitted_origin<'a>(allowed: &[String], origin: Option<&'a str>) -> Option<&'a str> {
    origin.filter(|origin| allowed.iter().any(|candidate| candidate == origin))
}

pub async fn cors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let permitted = permitted_origin(&state.config.allowed_origins, origin.as_deref());

    if permitted.is_none() {
        if let Some(origin) = origin.as_deref() {
            warn!(origin, "origin not on allow-list");
        }
    }

    if request.method() == Method::OPTIONS {
        let status = match permitted {
            Some(_) => StatusCode::NO_CONTENT,
            None => StatusCode::FORBIDDEN,
        };
        let mut response = status.into_response();
        let headers = response.headers_mut();
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
        stamp_origin(&mut response, permitted);
        return response;
    }

    let mut response = next.run(request).await;
    stamp_origin(&mut response, permitted);
    response
}

fn stamp_origin(response: &mut Response, permitted: Option<&str>) {
    let value = permitted
        .and_then(|origin| HeaderValue::from_str(origin).ok())
        .unwrap_or_else(|| HeaderValue::from_static("null"));

    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    headers.insert(header::VARY, HeaderValue::from_static("Origin"));
}
