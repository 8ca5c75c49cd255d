pub mod api;
pub mod config;
pub mod error;
pub mod feedback;
pub mod llm;
pub mod service;
pub mod store;

use std::sync::Arc;
use config::Config;
use llm::FeedbackAnalyzer;
use store::FeedbackStore;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub analyzer: Arc<dyn FeedbackAnalyzer>,
    pub store: Arc<dyn FeedbackStore>,
}
