use sqlx::SqlitePool;

use crate::dto::pagination::{Page, PageRequest};
use crate::dto::question_dto::CreateQuestionPayload;
use crate::error::{Error, Result};
use crate::models::speaking_question::{SpeakingQuestion, TaskType};
use crate::utils::time::{now, to_db_timestamp};

const COLUMNS: &str = "id, task_type, prompt_text, sample_answer, created_at";

#[derive(Clone)]
pub struct QuestionService {
    pool: SqlitePool,
}

impl QuestionService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateQuestionPayload) -> Result<SpeakingQuestion> {
        let query = format!(
            "INSERT INTO speaking_questions (task_type, prompt_text, sample_answer, created_at)
             VALUES (?, ?, ?, ?)
             RETURNING {}",
            COLUMNS
        );
        let question = sqlx::query_as::<_, SpeakingQuestion>(&query)
            .bind(payload.task_type)
            .bind(payload.prompt_text)
            .bind(payload.sample_answer)
            .bind(to_db_timestamp(now()))
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(question_id = question.id, task_type = ?question.task_type, "created question");
        Ok(question)
    }

    pub async fn list(
        &self,
        task_type: Option<TaskType>,
        page: PageRequest,
    ) -> Result<Page<SpeakingQuestion>> {
        let where_clause = if task_type.is_some() {
            "WHERE task_type = ?"
        } else {
            ""
        };

        let total_query = format!("SELECT COUNT(*) FROM speaking_questions {}", where_clause);
        let mut total_statement = sqlx::query_scalar::<_, i64>(&total_query);
        if let Some(task_type) = task_type {
            total_statement = total_statement.bind(task_type);
        }
        let total = total_statement.fetch_one(&self.pool).await?;

        let window = page.window(total);
        let items_query = format!(
            "SELECT {}
             FROM speaking_questions
             {}
             ORDER BY created_at DESC, id DESC
             LIMIT ? OFFSET ?",
            COLUMNS, where_clause
        );
        let mut items_statement = sqlx::query_as::<_, SpeakingQuestion>(&items_query);
        if let Some(task_type) = task_type {
            items_statement = items_statement.bind(task_type);
        }
        let items = items_statement
            .bind(window.limit)
            .bind(window.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(items, total, window))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<SpeakingQuestion> {
        let query = format!("SELECT {} FROM speaking_questions WHERE id = ?", COLUMNS);
        sqlx::query_as::<_, SpeakingQuestion>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Question {} does not exist", id)))
    }

    pub async fn exists(&self, id: i64) -> Result<bool> {
        let found = sqlx::query_scalar::<_, i64>("SELECT id FROM speaking_questions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }
}
