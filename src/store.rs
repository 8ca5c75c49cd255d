//! Persistence for analyzed feedback.
//!
//! The MySQL store opens one connection per operation and closes it before
//! returning; nothing is pooled across requests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions, Connection, FromRow};
use tracing::{debug, warn};

use crate::config::DatabaseConfig;
use crate::error::{AppError, Result};
use crate::feedback::{Analysis, FeedbackRecord, Score};

#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Appends one analyzed message and returns its generated id.
    async fn insert(&self, message: &str, analysis: &Analysis) -> Result<u64>;

    /// All records, newest first.
    async fn list(&self) -> Result<Vec<FeedbackRecord>>;
}

pub struct MySqlStore {
    options: MySqlConnectOptions,
}

impl MySqlStore {
    pub fn new(config: &DatabaseConfig) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name);

        Self::with_options(options)
    }

    pub fn with_options(options: MySqlConnectOptions) -> Self {
        Self { options }
    }

    async fn connect(&self) -> Result<MySqlConnection> {
        self.options
            .connect()
            .await
            .map_err(|e| AppError::Persistence(format!("Failed to connect to database: {}", e)))
    }
}

#[async_trait]
impl FeedbackStore for MySqlStore {
    async fn insert(&self, message: &str, analysis: &Analysis) -> Result<u64> {
        let mut conn = self.connect().await?;

        let result = sqlx::query(
            "INSERT INTO analyzed_feedback (message, doctor_score, nurse_score, hospital_score, notes_analysis) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(message)
        .bind(analysis.doctor.to_string())
        .bind(analysis.nurse.to_string())
        .bind(analysis.hospital.to_string())
        .bind(&analysis.notes)
        .execute(&mut conn)
        .await
        .map_err(|e| AppError::Persistence(format!("Failed to insert feedback: {}", e)))?;

        close_quietly(conn).await;

        let id = result.last_insert_id();
        debug!(id, "feedback row inserted");
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<FeedbackRecord>> {
        let mut conn = self.connect().await?;

        let rows = sqlx::query_as::<_, FeedbackRow>(
            "SELECT id, message, doctor_score, nurse_score, hospital_score, notes_analysis, created_at \
             FROM analyzed_feedback ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&mut conn)
        .await
        .map_err(|e| AppError::Persistence(format!("Failed to fetch feedback: {}", e)))?;

        close_quietly(conn).await;

        rows.into_iter().map(FeedbackRecord::try_from).collect()
    }
}

/// The statement has already completed; a failed close must not turn it into an error.
async fn close_quietly(conn: MySqlConnection) {
    if let Err(e) = conn.close().await {
        warn!("Failed to close database connection: {}", e);
    }
}

#[derive(Debug, FromRow)]
struct FeedbackRow {
    id: u64,
    message: String,
    doctor_score: String,
    nurse_score: String,
    hospital_score: String,
    notes_analysis: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<FeedbackRow> for FeedbackRecord {
    type Error = AppError;

    fn try_from(row: FeedbackRow) -> Result<Self> {
        let score = |column: &str, raw: &str| {
            raw.parse::<Score>()
                .map_err(|e| AppError::Persistence(format!("row {} {}: {}", row.id, column, e)))
        };

        Ok(FeedbackRecord {
            id: row.id,
            doctor_score: score("doctor_score", &row.doctor_score)?,
            nurse_score: score("nurse_score", &row.nurse_score)?,
            hospital_score: score("hospital_score", &row.hospital_score)?,
            message: row.message,
            notes_analysis: row.notes_analysis,
            created_at: row.created_at,
        })
    }
}
