pub mod audio_storage;
pub mod diagnosis_service;
pub mod plan_service;
pub mod practice_service;
pub mod question_service;
pub mod scoring_service;
pub mod user_service;
