#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value as JsonValue};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

use toefl_speaking_backend::{
    config::{Config, LogFormat, ScoringConfig},
    database::pool::{create_pool, run_migrations},
    error::{Error, Result},
    middleware::auth::issue_token,
    routes,
    utils::time::{now, to_db_timestamp},
    services::scoring_service::{Diagnosis, DimensionScores, OmniScoringClient, ScoringClient},
    AppState,
};

pub const JWT_SECRET: &str = "integration-test-secret";
pub const BOUNDARY: &str = "toefl-test-boundary";

/// Scoring client that returns a canned result and counts calls.
pub struct StubScorer {
    pub calls: Arc<AtomicUsize>,
    outcome: std::result::Result<Diagnosis, String>,
    delay: Duration,
}

impl StubScorer {
    pub fn succeeding(diagnosis: Diagnosis) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            outcome: Ok(diagnosis),
            delay: Duration::ZERO,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            outcome: Err(message.to_string()),
            delay: Duration::ZERO,
        }
    }

    /// Holds every call open for `delay`, so concurrent submissions overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl ScoringClient for StubScorer {
    async fn diagnose(&self, audio_path: &std::path::Path) -> Result<Diagnosis> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(audio_path.exists(), "scorer called before audio was stored");
        tokio::time::sleep(self.delay).await;
        self.outcome.clone().map_err(Error::ExternalService)
    }
}

pub fn sample_diagnosis() -> Diagnosis {
    Diagnosis {
        overall_score: 24.5,
        scores: DimensionScores {
            pronunciation: 25.0,
            fluency: 23.0,
            vocabulary: 24.0,
            coherence: 26.0,
        },
        feedback: json!({
            "pronunciation_advice": "Stress the second syllable of 'develop'.",
            "fluency_advice": "Fewer filler words.",
            "vocabulary_advice": "Vary your linking words.",
            "coherence_advice": "State both reasons up front."
        }),
    }
}

pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub media: TempDir,
    pub db_dir: Option<TempDir>,
    pub scorer_calls: Arc<AtomicUsize>,
}

pub fn test_config(media: &TempDir, scoring_endpoint: &str) -> Config {
    Config {
        server_address: "127.0.0.1:0".into(),
        database_url: "sqlite::memory:".into(),
        database_max_connections: 1,
        jwt_secret: JWT_SECRET.into(),
        media_root: media.path().to_path_buf(),
        scoring: ScoringConfig {
            endpoint: scoring_endpoint.into(),
            access_key_id: "test-key-id".into(),
            access_key_secret: "test-key-secret".into(),
            model: "Qwen2.5-Omni-7B".into(),
            timeout_secs: 5,
        },
        validate_question_before_scoring: false,
        public_rps: 10_000,
        max_upload_bytes: 10 * 1024 * 1024,
        log_format: LogFormat::Text,
    }
}

async fn test_pool() -> SqlitePool {
    let pool = create_pool("sqlite::memory:", 1).await.expect("pool");
    run_migrations(&pool).await.expect("migrations");
    pool
}

async fn app_with_stub(pool: SqlitePool, db_dir: Option<TempDir>, scorer: StubScorer) -> TestApp {
    let media = tempfile::tempdir().expect("media dir");
    let scorer_calls = scorer.calls.clone();
    let config = test_config(&media, "http://127.0.0.1:9/unused");
    let state = AppState::new(pool.clone(), config, Arc::new(scorer));
    TestApp {
        router: routes::router(state),
        pool,
        media,
        db_dir,
        scorer_calls,
    }
}

pub async fn setup_with_stub(scorer: StubScorer) -> TestApp {
    app_with_stub(test_pool().await, None, scorer).await
}

/// Same as [`setup_with_stub`] but backed by a database file with several
/// pooled connections, the way the service runs in production.
pub async fn setup_file_backed(scorer: StubScorer) -> TestApp {
    let db_dir = tempfile::tempdir().expect("db dir");
    let url = format!("sqlite://{}", db_dir.path().join("toefl.db").display());
    let pool = create_pool(&url, 4).await.expect("pool");
    run_migrations(&pool).await.expect("migrations");
    app_with_stub(pool, Some(db_dir), scorer).await
}

pub async fn setup() -> TestApp {
    setup_with_stub(StubScorer::succeeding(sample_diagnosis())).await
}

/// Uses the real HTTP scoring client against `endpoint`.
pub async fn setup_with_endpoint(endpoint: &str) -> TestApp {
    let media = tempfile::tempdir().expect("media dir");
    let pool = test_pool().await;
    let config = test_config(&media, endpoint);
    let scorer = OmniScoringClient::new(&config.scoring).expect("scoring client");
    let state = AppState::new(pool.clone(), config, Arc::new(scorer));
    TestApp {
        router: routes::router(state),
        pool,
        media,
        db_dir: None,
        scorer_calls: Arc::new(AtomicUsize::new(0)),
    }
}

pub fn bearer(user_id: i64) -> String {
    format!(
        "Bearer {}",
        issue_token(JWT_SECRET, user_id, Some("student"), 3600).expect("token")
    )
}

pub fn admin_bearer(user_id: i64) -> String {
    format!(
        "Bearer {}",
        issue_token(JWT_SECRET, user_id, Some("admin"), 3600).expect("token")
    )
}

pub async fn seed_question(pool: &SqlitePool, id: i64, task_type: i32, prompt: &str) {
    sqlx::query(
        "INSERT INTO speaking_questions (id, task_type, prompt_text, created_at)
         VALUES (?, ?, ?, ?)",
    )
    .bind(id)
    .bind(task_type)
    .bind(prompt)
    .bind(to_db_timestamp(now()))
    .execute(pool)
    .await
    .expect("seed question");
}

pub async fn record_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM practice_records")
        .fetch_one(pool)
        .await
        .expect("count records")
}

pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((name, file_name, data)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: audio/wav\r\n\r\n",
                BOUNDARY, name, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, JsonValue) {
    let resp = app.clone().oneshot(req).await.expect("response");
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.expect("body");
    let body = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            JsonValue::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}

pub async fn get(app: &Router, uri: &str, auth: Option<&str>) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: JsonValue,
) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

pub async fn submit_audio(
    app: &Router,
    auth: Option<&str>,
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/v1/practice/audio_diagnosis/")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    send(app, builder.body(Body::from(multipart_body(fields, file))).unwrap()).await
}
