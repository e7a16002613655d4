use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::pagination::Page;
use crate::models::speaking_question::{SpeakingQuestion, TaskType};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct QuestionListQuery {
    pub task_type: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateQuestionPayload {
    pub task_type: TaskType,
    #[validate(length(min = 1, max = 2000))]
    pub prompt_text: String,
    pub sample_answer: Option<String>,
}

pub type QuestionPage = Page<QuestionResponse>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub id: i64,
    pub task_type: TaskType,
    pub prompt_text: String,
    pub sample_answer: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<SpeakingQuestion> for QuestionResponse {
    fn from(value: SpeakingQuestion) -> Self {
        Self {
            id: value.id,
            task_type: value.task_type,
            prompt_text: value.prompt_text,
            sample_answer: value.sample_answer,
            created_at: value.created_at,
        }
    }
}
