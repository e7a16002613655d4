use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::{types::Json, FromRow};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DailyPlan {
    pub id: i64,
    pub user_id: i64,
    pub plan_date: NaiveDate,
    pub tasks_json: Json<JsonValue>,
    pub created_at: DateTime<Utc>,
}
