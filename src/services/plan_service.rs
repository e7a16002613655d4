use chrono::NaiveDate;
use serde_json::Value as JsonValue;
use sqlx::{types::Json, SqlitePool};

use crate::error::Result;
use crate::models::daily_plan::DailyPlan;
use crate::services::user_service::ensure_user;
use crate::utils::time::{now, to_db_timestamp};

#[derive(Clone)]
pub struct PlanService {
    pool: SqlitePool,
}

impl PlanService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn for_date(&self, user_id: i64, date: NaiveDate) -> Result<Option<DailyPlan>> {
        let plan = sqlx::query_as::<_, DailyPlan>(
            r#"
            SELECT id, user_id, plan_date, tasks_json, created_at
            FROM daily_plans
            WHERE user_id = ? AND plan_date = ?
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(plan)
    }

    /// One plan per (user, date): a second upsert replaces the task list.
    pub async fn upsert(&self, user_id: i64, date: NaiveDate, tasks: JsonValue) -> Result<DailyPlan> {
        let mut tx = self.pool.begin().await?;
        ensure_user(&mut *tx, user_id).await?;

        let plan = sqlx::query_as::<_, DailyPlan>(
            r#"
            INSERT INTO daily_plans (user_id, plan_date, tasks_json, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (user_id, plan_date) DO UPDATE SET tasks_json = excluded.tasks_json
            RETURNING id, user_id, plan_date, tasks_json, created_at
            "#,
        )
        .bind(user_id)
        .bind(date)
        .bind(Json(tasks))
        .bind(to_db_timestamp(now()))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(user_id, plan_date = %date, plan_id = plan.id, "stored daily plan");
        Ok(plan)
    }
}
