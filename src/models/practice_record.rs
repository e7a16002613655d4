use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::{types::Json, FromRow};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PracticeRecord {
    pub id: i64,
    pub user_id: i64,
    pub question_id: i64,
    /// Path relative to the media root.
    pub audio_url: Option<String>,
    pub text_answer: Option<String>,
    pub overall_score: Option<f64>,
    pub pronunciation_score: Option<f64>,
    pub fluency_score: Option<f64>,
    pub vocabulary_score: Option<f64>,
    pub coherence_score: Option<f64>,
    pub feedback_json: Option<Json<JsonValue>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
