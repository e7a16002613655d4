use std::sync::Arc;

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::models::practice_record::PracticeRecord;
use crate::services::audio_storage::AudioStorage;
use crate::services::practice_service::PracticeService;
use crate::services::question_service::QuestionService;
use crate::services::scoring_service::{Diagnosis, ScoringClient};

#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub file_name: String,
    pub data: Bytes,
}

#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub record: PracticeRecord,
    pub diagnosis: Diagnosis,
}

/// Runs one audio submission end to end: store the recording, score it,
/// persist the record. There are no retries and the stored file is never
/// removed, whichever step fails.
#[derive(Clone)]
pub struct DiagnosisService {
    storage: AudioStorage,
    scorer: Arc<dyn ScoringClient>,
    questions: QuestionService,
    practice: PracticeService,
    validate_question_first: bool,
}

impl DiagnosisService {
    pub fn new(
        storage: AudioStorage,
        scorer: Arc<dyn ScoringClient>,
        questions: QuestionService,
        practice: PracticeService,
        validate_question_first: bool,
    ) -> Self {
        Self {
            storage,
            scorer,
            questions,
            practice,
            validate_question_first,
        }
    }

    pub async fn submit(
        &self,
        user_id: i64,
        question_id: i64,
        upload: AudioUpload,
    ) -> Result<SubmissionOutcome> {
        if self.validate_question_first && !self.questions.exists(question_id).await? {
            return Err(Error::NotFound(format!(
                "Question {} does not exist",
                question_id
            )));
        }

        let stored = self
            .storage
            .save(user_id, question_id, &upload.file_name, &upload.data)
            .await?;

        let diagnosis = match self.scorer.diagnose(&stored.absolute_path).await {
            Ok(diagnosis) => diagnosis,
            Err(e) => {
                tracing::warn!(
                    user_id,
                    question_id,
                    path = %stored.relative_path,
                    error = %e,
                    "scoring provider call failed"
                );
                return Err(match e {
                    Error::ExternalService(_) => e,
                    other => Error::ExternalService(other.to_string()),
                });
            }
        };

        let record = self
            .practice
            .create_scored(user_id, question_id, &stored.relative_path, &diagnosis)
            .await?;

        tracing::info!(
            user_id,
            question_id,
            record_id = record.id,
            overall_score = diagnosis.overall_score,
            "created practice record"
        );

        Ok(SubmissionOutcome { record, diagnosis })
    }
}
