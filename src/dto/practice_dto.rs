use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::dto::pagination::Page;
use crate::models::practice_record::PracticeRecord;
use crate::services::diagnosis_service::SubmissionOutcome;
use crate::services::scoring_service::DimensionScores;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HistoryQuery {
    pub user_id: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// Body of a successful `audio_diagnosis` submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisResponse {
    pub record_id: i64,
    pub overall_score: f64,
    pub scores: DimensionScores,
    pub feedback: JsonValue,
}

impl From<SubmissionOutcome> for DiagnosisResponse {
    fn from(value: SubmissionOutcome) -> Self {
        Self {
            record_id: value.record.id,
            overall_score: value.diagnosis.overall_score,
            scores: value.diagnosis.scores,
            feedback: value.diagnosis.feedback,
        }
    }
}

pub type PracticeRecordPage = Page<PracticeRecordResponse>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PracticeRecordResponse {
    pub id: i64,
    pub user: i64,
    pub question: i64,
    pub audio_url: Option<String>,
    pub text_answer: Option<String>,
    pub overall_score: Option<f64>,
    pub pronunciation_score: Option<f64>,
    pub fluency_score: Option<f64>,
    pub vocabulary_score: Option<f64>,
    pub coherence_score: Option<f64>,
    pub feedback_json: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PracticeRecord> for PracticeRecordResponse {
    fn from(value: PracticeRecord) -> Self {
        Self {
            id: value.id,
            user: value.user_id,
            question: value.question_id,
            audio_url: value.audio_url,
            text_answer: value.text_answer,
            overall_score: value.overall_score,
            pronunciation_score: value.pronunciation_score,
            fluency_score: value.fluency_score,
            vocabulary_score: value.vocabulary_score,
            coherence_score: value.coherence_score,
            feedback_json: value.feedback_json.map(|json| json.0),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}
