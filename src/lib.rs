pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::services::{
    audio_storage::AudioStorage,
    diagnosis_service::DiagnosisService,
    plan_service::PlanService,
    practice_service::PracticeService,
    question_service::QuestionService,
    scoring_service::{OmniScoringClient, ScoringClient},
    user_service::UserService,
};
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<Config>,
    pub question_service: QuestionService,
    pub practice_service: PracticeService,
    pub plan_service: PlanService,
    pub user_service: UserService,
    pub diagnosis_service: DiagnosisService,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: Config, scorer: Arc<dyn ScoringClient>) -> Self {
        let question_service = QuestionService::new(pool.clone());
        let practice_service = PracticeService::new(pool.clone());
        let plan_service = PlanService::new(pool.clone());
        let user_service = UserService::new(pool.clone());
        let diagnosis_service = DiagnosisService::new(
            AudioStorage::new(config.media_root.clone()),
            scorer,
            question_service.clone(),
            practice_service.clone(),
            config.validate_question_before_scoring,
        );

        Self {
            pool,
            config: Arc::new(config),
            question_service,
            practice_service,
            plan_service,
            user_service,
            diagnosis_service,
        }
    }

    /// State wired to the real scoring provider from `config.scoring`.
    pub fn from_config(pool: SqlitePool, config: Config) -> Result<Self> {
        let scorer = OmniScoringClient::new(&config.scoring)?;
        Ok(Self::new(pool, config, Arc::new(scorer)))
    }
}
