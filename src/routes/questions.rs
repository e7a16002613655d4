use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
};

use crate::{
    dto::pagination::PageRequest,
    dto::question_dto::{QuestionListQuery, QuestionPage, QuestionResponse},
    error::Result,
    models::speaking_question::TaskType,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/v1/questions/",
    params(
        ("task_type" = Option<i32>, Query, description = "1 or 2; other values are ignored"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("page_size" = Option<i64>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Paginated questions, newest first", body = Json<QuestionPage>),
        (status = 400, description = "Invalid page parameters")
    )
)]
#[axum::debug_handler]
pub async fn list_questions(
    State(state): State<AppState>,
    Query(query): Query<QuestionListQuery>,
) -> Result<impl IntoResponse> {
    let task_type = query.task_type.as_deref().and_then(TaskType::from_query);
    let page = PageRequest::from_query(query.page.as_deref(), query.page_size.as_deref())?;
    let result = state.question_service.list(task_type, page).await?;
    let page: QuestionPage = result.map(QuestionResponse::from);
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/v1/questions/{id}/",
    params(
        ("id" = i64, Path, description = "Question ID")
    ),
    responses(
        (status = 200, description = "Question found", body = Json<QuestionResponse>),
        (status = 404, description = "Question not found")
    )
)]
#[axum::debug_handler]
pub async fn get_question(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let question = state.question_service.get_by_id(id).await?;
    Ok(Json(QuestionResponse::from(question)))
}
