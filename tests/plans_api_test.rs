mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{admin_bearer, bearer, get, send_json, setup};

#[tokio::test]
async fn missing_plan_is_empty_not_404() {
    let app = setup().await;
    let (status, body) = get(
        &app.router,
        "/api/v1/plans/today/?user_id=3&date=2025-06-01",
        Some(&bearer(3)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "detail": "plan_not_found", "tasks": [] }));
}

#[tokio::test]
async fn stored_plan_is_returned_for_its_date_only() {
    let app = setup().await;
    let tasks = json!([
        { "question_id": 7, "dimension": "fluency" },
        { "question_id": 8, "dimension": "coherence" }
    ]);
    let (status, _) = send_json(
        &app.router,
        "PUT",
        "/api/v1/admin/plans/",
        Some(&admin_bearer(1)),
        json!({ "user_id": 3, "plan_date": "2025-06-01", "tasks": tasks }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(
        &app.router,
        "/api/v1/plans/today/?user_id=3&date=2025-06-01",
        Some(&bearer(3)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"], 3);
    assert_eq!(body["plan_date"], "2025-06-01");
    assert_eq!(body["tasks_json"], tasks);
    assert!(body["id"].is_i64());

    let (_, body) = get(
        &app.router,
        "/api/v1/plans/today/?user_id=3&date=2025-06-02",
        Some(&bearer(3)),
    )
    .await;
    assert_eq!(body["tasks"], json!([]));
}

#[tokio::test]
async fn plan_lookup_is_owner_only() {
    let app = setup().await;
    send_json(
        &app.router,
        "PUT",
        "/api/v1/admin/plans/",
        Some(&admin_bearer(1)),
        json!({ "user_id": 4, "plan_date": "2025-06-01", "tasks": [] }),
    )
    .await;

    for uri in [
        "/api/v1/plans/today/?user_id=4&date=2025-06-01",
        "/api/v1/plans/today/?user_id=12345&date=2025-06-01",
    ] {
        let (status, body) = get(&app.router, uri, Some(&bearer(3))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["detail"], "forbidden");
    }
}

#[tokio::test]
async fn plan_lookup_validates_parameters() {
    let app = setup().await;
    let auth = bearer(3);

    for uri in [
        "/api/v1/plans/today/?user_id=3",
        "/api/v1/plans/today/?date=2025-06-01",
        "/api/v1/plans/today/?user_id=3&date=01-06-2025",
    ] {
        let (status, body) = get(&app.router, uri, Some(&auth)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["detail"], "invalid_input");
    }

    let (status, _) = get(
        &app.router,
        "/api/v1/plans/today/?user_id=3&date=2025-06-01",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
