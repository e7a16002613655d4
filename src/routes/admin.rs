use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::plan_dto::{DailyPlanResponse, UpsertPlanPayload},
    dto::question_dto::{CreateQuestionPayload, QuestionResponse},
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/v1/admin/questions/",
    request_body = CreateQuestionPayload,
    responses(
        (status = 201, description = "Question created", body = Json<QuestionResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Caller is not an admin")
    )
)]
#[axum::debug_handler]
pub async fn create_question(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateQuestionPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    payload.validate()?;
    let question = state.question_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(QuestionResponse::from(question))))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/plans/",
    request_body = UpsertPlanPayload,
    responses(
        (status = 200, description = "Plan stored", body = Json<DailyPlanResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Caller is not an admin")
    )
)]
#[axum::debug_handler]
pub async fn upsert_plan(
    State(state): State<AppState>,
    payload: std::result::Result<Json<UpsertPlanPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    payload.validate()?;
    let plan = state
        .plan_service
        .upsert(payload.user_id, payload.plan_date, payload.tasks)
        .await?;
    Ok(Json(DailyPlanResponse::from(plan)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/{id}/",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User and their practice data deleted"),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    state.user_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
