use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use feedback_analyzer::{
    config::Config,
    api::routes::create_router,
    llm::OpenAiAnalyzer,
    store::MySqlStore,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::load()?;
    let server_addr = config.server_addr;
    info!(
        model = %config.openai.model,
        db_host = %config.database.host,
        db_name = %config.database.name,
        origins = ?config.allowed_origins,
        "configuration loaded"
    );

    // Create application state
    let app_state = AppState {
        analyzer: Arc::new(OpenAiAnalyzer::new(config.openai.clone())),
        store: Arc::new(MySqlStore::new(&config.database)),
        config: Arc::new(config),
    };

    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;

    info!("Listening on {}", server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
