use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The two fixed TOEFL speaking prompt structures. Serialized as `1` / `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(try_from = "i32", into = "i32")]
#[repr(i32)]
pub enum TaskType {
    Task1 = 1,
    Task2 = 2,
}

impl TaskType {
    /// Lenient parse used by list filters: anything other than `1`/`2` is
    /// treated as "no filter".
    pub fn from_query(raw: &str) -> Option<Self> {
        raw.trim().parse::<i32>().ok().and_then(|v| Self::try_from(v).ok())
    }
}

impl TryFrom<i32> for TaskType {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(TaskType::Task1),
            2 => Ok(TaskType::Task2),
            other => Err(format!("task_type must be 1 or 2, got {}", other)),
        }
    }
}

impl From<TaskType> for i32 {
    fn from(value: TaskType) -> Self {
        value as i32
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SpeakingQuestion {
    pub id: i64,
    pub task_type: TaskType,
    pub prompt_text: String,
    pub sample_answer: Option<String>,
    pub created_at: DateTime<Utc>,
}
