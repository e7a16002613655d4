use axum::{
    extract::{multipart::MultipartRejection, Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};

use crate::{
    dto::pagination::PageRequest,
    dto::practice_dto::{DiagnosisResponse, HistoryQuery, PracticeRecordPage, PracticeRecordResponse},
    error::{Error, Result},
    middleware::auth::AuthUser,
    services::diagnosis_service::AudioUpload,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/v1/practice/audio_diagnosis/",
    responses(
        (status = 201, description = "Recording scored and stored", body = Json<DiagnosisResponse>),
        (status = 400, description = "Missing question_id or audio_file"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "Question not found"),
        (status = 502, description = "Scoring provider failed")
    )
)]
#[axum::debug_handler]
pub async fn submit_audio_diagnosis(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse> {
    let mut multipart = multipart?;
    let mut question_id: Option<String> = None;
    let mut upload: Option<AudioUpload> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "question_id" => question_id = Some(field.text().await?),
            "audio_file" => {
                let file_name = field.file_name().unwrap_or("audio").to_string();
                let data = field.bytes().await?;
                if !data.is_empty() {
                    upload = Some(AudioUpload { file_name, data });
                }
            }
            _ => {}
        }
    }

    let question_id = question_id.map(|raw| raw.trim().to_string()).filter(|raw| !raw.is_empty());
    let (Some(question_id), Some(upload)) = (question_id, upload) else {
        return Err(Error::BadRequest(
            "question_id and audio_file are required".into(),
        ));
    };
    let question_id: i64 = question_id.parse().map_err(|_| {
        Error::BadRequest(format!("question_id must be an integer, got '{}'", question_id))
    })?;

    tracing::info!(
        user_id = user.id,
        question_id,
        file_name = %upload.file_name,
        bytes = upload.data.len(),
        "audio diagnosis requested"
    );

    let outcome = state
        .diagnosis_service
        .submit(user.id, question_id, upload)
        .await?;
    Ok((StatusCode::CREATED, Json(DiagnosisResponse::from(outcome))))
}

#[utoipa::path(
    get,
    path = "/api/v1/practice/history/",
    params(
        ("user_id" = i64, Query, description = "Must equal the caller's own id"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("page_size" = Option<i64>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Caller's practice records, newest first", body = Json<PracticeRecordPage>),
        (status = 400, description = "Missing or malformed user_id"),
        (status = 403, description = "user_id belongs to someone else")
    )
)]
#[axum::debug_handler]
pub async fn practice_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse> {
    let owner = user.require_self(query.user_id.as_deref())?;
    let page = PageRequest::from_query(query.page.as_deref(), query.page_size.as_deref())?;
    let records = state.practice_service.history(owner, page).await?;
    let page: PracticeRecordPage = records.map(PracticeRecordResponse::from);
    Ok(Json(page))
}
