use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
    Extension,
};

use crate::{
    dto::plan_dto::{PlanLookupResponse, PlanQuery},
    error::{Error, Result},
    middleware::auth::AuthUser,
    utils::time::parse_plan_date,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/v1/plans/today/",
    params(
        ("user_id" = i64, Query, description = "Must equal the caller's own id"),
        ("date" = String, Query, description = "Plan date, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "The plan, or an empty task list when none exists", body = Json<PlanLookupResponse>),
        (status = 400, description = "Missing user_id or date"),
        (status = 403, description = "user_id belongs to someone else")
    )
)]
#[axum::debug_handler]
pub async fn today_plan(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<PlanQuery>,
) -> Result<impl IntoResponse> {
    let raw_date = query
        .date
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());
    let (Some(_), Some(raw_date)) = (query.user_id.as_deref(), raw_date) else {
        return Err(Error::BadRequest("user_id and date are required".into()));
    };
    let owner = user.require_self(query.user_id.as_deref())?;
    let date = parse_plan_date(raw_date)?;

    let plan = state.plan_service.for_date(owner, date).await?;
    if plan.is_none() {
        tracing::debug!(user_id = owner, plan_date = %date, "no daily plan stored");
    }
    Ok(Json(PlanLookupResponse::from(plan)))
}
