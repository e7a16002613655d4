use sqlx::{types::Json, SqlitePool};

use crate::dto::pagination::{Page, PageRequest};
use crate::error::{Error, Result};
use crate::models::practice_record::PracticeRecord;
use crate::services::scoring_service::Diagnosis;
use crate::services::user_service::ensure_user;
use crate::utils::time::{now, to_db_timestamp};

const COLUMNS: &str = "id, user_id, question_id, audio_url, text_answer, overall_score, \
    pronunciation_score, fluency_score, vocabulary_score, coherence_score, feedback_json, \
    created_at, updated_at";

#[derive(Clone)]
pub struct PracticeService {
    pool: SqlitePool,
}

impl PracticeService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts the record for one scored submission. The user mirror row,
    /// the question lookup and the insert share a transaction, and every
    /// score comes from the same `Diagnosis`.
    ///
    /// The first statement is a write so the transaction takes SQLite's
    /// write lock up front (waiting under the busy timeout) instead of
    /// upgrading a read lock later.
    pub async fn create_scored(
        &self,
        user_id: i64,
        question_id: i64,
        audio_url: &str,
        diagnosis: &Diagnosis,
    ) -> Result<PracticeRecord> {
        let mut tx = self.pool.begin().await?;

        ensure_user(&mut *tx, user_id).await?;

        let question = sqlx::query_scalar::<_, i64>("SELECT id FROM speaking_questions WHERE id = ?")
            .bind(question_id)
            .fetch_optional(&mut *tx)
            .await?;
        if question.is_none() {
            return Err(Error::NotFound(format!(
                "Question {} does not exist",
                question_id
            )));
        }

        let timestamp = to_db_timestamp(now());
        let query = format!(
            "INSERT INTO practice_records (
                user_id, question_id, audio_url, text_answer,
                overall_score, pronunciation_score, fluency_score, vocabulary_score, coherence_score,
                feedback_json, created_at, updated_at
             ) VALUES (?, ?, ?, NULL, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {}",
            COLUMNS
        );
        let record = sqlx::query_as::<_, PracticeRecord>(&query)
            .bind(user_id)
            .bind(question_id)
            .bind(audio_url)
            .bind(diagnosis.overall_score)
            .bind(diagnosis.scores.pronunciation)
            .bind(diagnosis.scores.fluency)
            .bind(diagnosis.scores.vocabulary)
            .bind(diagnosis.scores.coherence)
            .bind(Json(&diagnosis.feedback))
            .bind(&timestamp)
            .bind(&timestamp)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(record)
    }

    pub async fn history(&self, user_id: i64, page: PageRequest) -> Result<Page<PracticeRecord>> {
        let total = self.count_for_user(user_id).await?;
        let window = page.window(total);

        let query = format!(
            "SELECT {}
             FROM practice_records
             WHERE user_id = ?
             ORDER BY created_at DESC, id DESC
             LIMIT ? OFFSET ?",
            COLUMNS
        );
        let items = sqlx::query_as::<_, PracticeRecord>(&query)
            .bind(user_id)
            .bind(window.limit)
            .bind(window.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(items, total, window))
    }

    pub async fn count_for_user(&self, user_id: i64) -> Result<i64> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM practice_records WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}
