pub mod admin;
pub mod health;
pub mod plans;
pub mod practice;
pub mod questions;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::middleware::{auth, rate_limit};
use crate::AppState;

pub fn router(state: AppState) -> Router {
    let config = state.config.clone();

    let catalog_api = Router::new()
        .route("/api/v1/questions/", get(questions::list_questions))
        .route("/api/v1/questions/:id/", get(questions::get_question));

    let member_api = Router::new()
        .route(
            "/api/v1/practice/audio_diagnosis/",
            post(practice::submit_audio_diagnosis),
        )
        .route("/api/v1/practice/history/", get(practice::practice_history))
        .route("/api/v1/plans/today/", get(plans::today_plan))
        .route_layer(from_fn_with_state(state.clone(), auth::require_bearer_auth));

    let admin_api = Router::new()
        .route("/api/v1/admin/questions/", post(admin::create_question))
        .route("/api/v1/admin/plans/", put(admin::upsert_plan))
        .route("/api/v1/admin/users/:id/", delete(admin::delete_user))
        .route_layer(from_fn_with_state(state.clone(), auth::require_admin));

    let api = catalog_api
        .merge(member_api)
        .merge(admin_api)
        .layer(from_fn_with_state(
            rate_limit::RateLimiter::new(config.public_rps),
            rate_limit::rps_middleware,
        ));

    let media = Router::new()
        .nest_service("/media", ServeDir::new(&config.media_root))
        .layer(from_fn_with_state(state.clone(), auth::require_media_owner));

    Router::new()
        .route("/health", get(health::health))
        .merge(api)
        .merge(media)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
}
