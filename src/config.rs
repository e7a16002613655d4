use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub media_root: PathBuf,
    pub scoring: ScoringConfig,
    /// Check that the question exists before storing audio and calling the
    /// scoring provider. Off by default, which keeps the check after scoring.
    pub validate_question_before_scoring: bool,
    pub public_rps: u32,
    pub max_upload_bytes: usize,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub endpoint: String,
    pub access_key_id: String,
    pub access_key_secret: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let scoring = ScoringConfig {
            endpoint: get_endpoint("SCORING_ENDPOINT")?,
            access_key_id: get_env("SCORING_ACCESS_KEY_ID")?,
            access_key_secret: get_env("SCORING_ACCESS_KEY_SECRET")?,
            model: get_env_or("SCORING_MODEL", "Qwen2.5-Omni-7B"),
            timeout_secs: get_env_parse_or("SCORING_TIMEOUT_SECS", 60)?,
        };

        let log_format = match get_env_or("LOG_FORMAT", "text").to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "text" => LogFormat::Text,
            other => {
                return Err(Error::Config(format!(
                    "Invalid value for LOG_FORMAT: {} (expected text or json)",
                    other
                )))
            }
        };

        Ok(Self {
            server_address: get_env_or("SERVER_ADDRESS", "0.0.0.0:8000"),
            database_url: get_env("DATABASE_URL")?,
            database_max_connections: get_env_parse_or("DATABASE_MAX_CONNECTIONS", 10)?,
            jwt_secret: get_env("JWT_SECRET")?,
            media_root: PathBuf::from(get_env_or("MEDIA_ROOT", "media")),
            scoring,
            validate_question_before_scoring: get_env_parse_or(
                "VALIDATE_QUESTION_BEFORE_SCORING",
                false,
            )?,
            public_rps: get_env_parse_or("PUBLIC_RPS", 50)?,
            max_upload_bytes: get_env_parse_or("MAX_UPLOAD_BYTES", 50 * 1024 * 1024)?,
            log_format,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

fn get_endpoint(name: &str) -> Result<String> {
    let raw = get_env(name)?;
    let parsed = Url::parse(&raw)
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(Error::Config(format!(
            "Invalid value for {}: only http and https endpoints are supported",
            name
        )));
    }
    Ok(raw)
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> Result<&'static Config> {
    CONFIG
        .get()
        .ok_or_else(|| Error::Config("Configuration has not been initialized".to_string()))
}
