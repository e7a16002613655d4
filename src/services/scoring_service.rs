use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::config::ScoringConfig;
use crate::error::{Error, Result};

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 30.0;

const SYSTEM_PROMPT: &str = r#"You are an expert TOEFL speaking rater. You will receive a recording of a student's spoken answer.
Score it on four dimensions, each from 0 to 30: pronunciation, fluency, vocabulary and coherence (logical structure).
Give one piece of concrete advice for each dimension.
Respond with a single JSON object and nothing else, exactly in this shape:
{
  "overall_score": number,
  "scores": {
    "pronunciation": number,
    "fluency": number,
    "vocabulary": number,
    "coherence": number
  },
  "feedback": {
    "pronunciation_advice": string,
    "fluency_advice": string,
    "vocabulary_advice": string,
    "coherence_advice": string
  }
}"#;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionScores {
    pub pronunciation: f64,
    pub fluency: f64,
    pub vocabulary: f64,
    pub coherence: f64,
}

/// Scores and advice for one recording. All five scores are mandatory, so a
/// partial score set never gets past decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub overall_score: f64,
    pub scores: DimensionScores,
    #[serde(default = "empty_feedback")]
    pub feedback: JsonValue,
}

fn empty_feedback() -> JsonValue {
    JsonValue::Object(Default::default())
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScoringClient: Send + Sync {
    async fn diagnose(&self, audio_path: &Path) -> Result<Diagnosis>;
}

/// Chat-completions style client for an omni-modal model that accepts the
/// recording as base64 in the user turn.
#[derive(Clone)]
pub struct OmniScoringClient {
    client: Client,
    endpoint: String,
    access_key_id: String,
    access_key_secret: String,
    model: String,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    modalities: [&'a str; 2],
    messages: Vec<Msg<'a>>,
    stream: bool,
}

impl OmniScoringClient {
    pub fn new(config: &ScoringConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            access_key_id: config.access_key_id.clone(),
            access_key_secret: config.access_key_secret.clone(),
            model: config.model.clone(),
        })
    }

    fn authorization(&self) -> String {
        format!("Bearer {}:{}", self.access_key_id, self.access_key_secret)
    }
}

#[async_trait]
impl ScoringClient for OmniScoringClient {
    async fn diagnose(&self, audio_path: &Path) -> Result<Diagnosis> {
        let audio = match tokio::fs::read(audio_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ExternalService(format!(
                    "Audio file does not exist: {}",
                    audio_path.display()
                )))
            }
            Err(e) => {
                return Err(Error::ExternalService(format!(
                    "Failed to read audio file {}: {}",
                    audio_path.display(),
                    e
                )))
            }
        };
        let audio_b64 = BASE64.encode(&audio);

        let req = Req {
            model: &self.model,
            modalities: ["text", "audio"],
            messages: vec![
                Msg {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Msg {
                    role: "user",
                    content: &audio_b64,
                },
            ],
            stream: false,
        };

        tracing::debug!(
            endpoint = %self.endpoint,
            audio_bytes = audio.len(),
            "sending recording to scoring provider"
        );

        let res = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .json(&req)
            .send()
            .await
            .map_err(|e| Error::ExternalService(format!("Scoring provider request failed: {}", e)))?;

        let status = res.status();
        let text = res.text().await.map_err(|e| {
            Error::ExternalService(format!("Failed to read scoring provider response: {}", e))
        })?;

        if !status.is_success() {
            return Err(Error::ExternalService(format!(
                "Scoring provider returned HTTP {}: {}",
                status, text
            )));
        }

        parse_completion(&text)
    }
}

/// Pulls `choices[0].message.content` out of a completion body and decodes
/// it as a [`Diagnosis`].
pub fn parse_completion(body: &str) -> Result<Diagnosis> {
    let body: JsonValue = serde_json::from_str(body).map_err(|e| {
        Error::ExternalService(format!("Scoring provider returned a non-JSON body: {}", e))
    })?;

    let content = body
        .pointer("/choices/0/message/content")
        .and_then(|c| c.as_str())
        .ok_or_else(|| {
            Error::ExternalService(format!(
                "Scoring provider response is missing choices[0].message.content: {}",
                body
            ))
        })?;

    parse_diagnosis(content)
}

pub fn parse_diagnosis(content: &str) -> Result<Diagnosis> {
    let mut diagnosis: Diagnosis = serde_json::from_str(strip_code_fence(content)).map_err(|e| {
        Error::ExternalService(format!(
            "Failed to parse scoring content: {}\nContent: {}",
            e, content
        ))
    })?;

    let scores = &mut diagnosis.scores;
    for (name, value) in [
        ("overall_score", &mut diagnosis.overall_score),
        ("pronunciation", &mut scores.pronunciation),
        ("fluency", &mut scores.fluency),
        ("vocabulary", &mut scores.vocabulary),
        ("coherence", &mut scores.coherence),
    ] {
        if !value.is_finite() || *value < MIN_SCORE || *value > MAX_SCORE {
            return Err(Error::ExternalService(format!(
                "Scoring content has {} = {} outside {}..={}",
                name, value, MIN_SCORE, MAX_SCORE
            )));
        }
        *value = round_one_decimal(*value);
    }

    Ok(diagnosis)
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
