use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use validator::{Validate, ValidationError};

use crate::models::daily_plan::DailyPlan;

pub const PLAN_NOT_FOUND: &str = "plan_not_found";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PlanQuery {
    pub user_id: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpsertPlanPayload {
    #[validate(range(min = 1))]
    pub user_id: i64,
    pub plan_date: NaiveDate,
    #[validate(custom(function = "validate_task_list"))]
    pub tasks: JsonValue,
}

fn validate_task_list(tasks: &JsonValue) -> Result<(), ValidationError> {
    if tasks.is_array() {
        Ok(())
    } else {
        Err(ValidationError::new("tasks_must_be_array"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyPlanResponse {
    pub id: i64,
    pub user: i64,
    pub plan_date: NaiveDate,
    pub tasks_json: JsonValue,
    pub created_at: DateTime<Utc>,
}

impl From<DailyPlan> for DailyPlanResponse {
    fn from(value: DailyPlan) -> Self {
        Self {
            id: value.id,
            user: value.user_id,
            plan_date: value.plan_date,
            tasks_json: value.tasks_json.0,
            created_at: value.created_at,
        }
    }
}

/// A missing plan is a normal state and is answered with an empty task list.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PlanLookupResponse {
    Found(DailyPlanResponse),
    Missing {
        detail: &'static str,
        tasks: Vec<JsonValue>,
    },
}

impl From<Option<DailyPlan>> for PlanLookupResponse {
    fn from(value: Option<DailyPlan>) -> Self {
        match value {
            Some(plan) => PlanLookupResponse::Found(plan.into()),
            None => PlanLookupResponse::Missing {
                detail: PLAN_NOT_FOUND,
                tasks: Vec::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_plan_renders_empty_task_list() {
        let body = serde_json::to_value(PlanLookupResponse::from(None)).unwrap();
        assert_eq!(body, json!({ "detail": "plan_not_found", "tasks": [] }));
    }

    #[test]
    fn tasks_must_be_a_list() {
        let payload = UpsertPlanPayload {
            user_id: 3,
            plan_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            tasks: json!({ "task": 1 }),
        };
        assert!(payload.validate().is_err());

        let payload = UpsertPlanPayload {
            tasks: json!([{ "question_id": 7, "dimension": "fluency" }]),
            ..payload
        };
        assert!(payload.validate().is_ok());
    }
}
