#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;

use feedback_analyzer::api::routes::create_router;
use feedback_analyzer::config::Config;
use feedback_analyzer::error::{AppError, Result};
use feedback_analyzer::feedback::{Analysis, FeedbackRecord};
use feedback_analyzer::llm::FeedbackAnalyzer;
use feedback_analyzer::store::FeedbackStore;
use feedback_analyzer::AppState;

pub const ALLOWED_ORIGIN: &str = "https://surveyai.rosystems.net";

/// Analyzer that returns a canned analysis, or fails, and counts calls.
pub struct StubAnalyzer {
    reply: Option<Analysis>,
    calls: AtomicUsize,
}

impl StubAnalyzer {
    pub fn returning(analysis: Analysis) -> Arc<Self> {
        Arc::new(Self { reply: Some(analysis), calls: AtomicUsize::new(0) })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { reply: None, calls: AtomicUsize::new(0) })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedbackAnalyzer for StubAnalyzer {
    async fn analyze(&self, _message: &str) -> Result<Analysis> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply
            .clone()
            .ok_or_else(|| AppError::Analysis("model API returned 503 Service Unavailable".into()))
    }
}

/// In-memory table with server-assigned ids and timestamps.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<FeedbackRecord>>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn unavailable() -> Arc<Self> {
        Arc::new(Self { unavailable: true, ..Self::default() })
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl FeedbackStore for MemoryStore {
    async fn insert(&self, message: &str, analysis: &Analysis) -> Result<u64> {
        if self.unavailable {
            return Err(AppError::Persistence("Failed to connect to database: refused".into()));
        }
        let mut rows = self.rows.lock().unwrap();
        let id = rows.len() as u64 + 1;
        rows.push(FeedbackRecord {
            id,
            message: message.to_string(),
            doctor_score: analysis.doctor,
            nurse_score: analysis.nurse,
            hospital_score: analysis.hospital,
            notes_analysis: analysis.notes.clone(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<FeedbackRecord>> {
        if self.unavailable {
            return Err(AppError::Persistence("Failed to connect to database: refused".into()));
        }
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }
}

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "OPENAI_API_KEY" => Some("sk-test".into()),
        "DB_HOST" => Some("localhost".into()),
        "DB_USER" => Some("feedback".into()),
        "DB_PASSWORD" => Some("secret".into()),
        "DB_NAME" => Some("survey".into()),
        _ => None,
    })
    .expect("test config")
}

pub fn app(analyzer: Arc<StubAnalyzer>, store: Arc<MemoryStore>) -> Router {
    create_router(AppState {
        config: Arc::new(test_config()),
        analyzer,
        store,
    })
}

pub fn post_feedback(body: &str) -> Request<Body> {
    Request::post("/feedback")
        .header("content-type", "application/json")
        .header("origin", ALLOWED_ORIGIN)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_feedback() -> Request<Body> {
    Request::get("/feedback")
        .header("origin", ALLOWED_ORIGIN)
        .body(Body::empty())
        .unwrap()
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub async fn send(app: Router, request: Request<Body>) -> TestResponse {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    TestResponse { status, headers, body }
}
