use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::analysis::outcome::OutcomeModel;
use crate::errors::AppError;
use crate::llm_client::retry::RetryPolicy;

/// Application configuration loaded from environment variables.
///
/// Provider credentials are optional at startup: a missing API key or project id
/// is reported per request as a configuration error instead of refusing to boot.
#[derive(Debug, Clone)]
pub struct Config {
    pub watsonx_api_key: Option<String>,
    pub watsonx_project_id: Option<String>,
    pub watsonx_url: String,
    pub iam_url: String,
    pub api_version: String,
    pub generation_model_id: String,
    pub embedding_model_id: String,
    pub corpus_path: PathBuf,
    pub knowledge_base_path: Option<PathBuf>,
    pub outcome: OutcomeModel,
    pub practices_top_k: usize,
    pub provider_timeout: Duration,
    pub retry: RetryPolicy,
    pub port: u16,
    pub rust_log: String,
}

/// Credentials needed to talk to the hosted model provider.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
    pub project_id: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let outcome = OutcomeModel {
            neighbors: parse_env("OUTCOME_NEIGHBORS", 3)?,
            smoothing: parse_env("OUTCOME_SMOOTHING", 1.0)?,
            threshold: parse_env("OUTCOME_THRESHOLD", 0.5)?,
        };
        check_outcome_model(&outcome)?;

        let retry = RetryPolicy {
            max_attempts: parse_env("PROVIDER_MAX_ATTEMPTS", 3)?,
            base_delay: Duration::from_millis(parse_env("PROVIDER_BASE_DELAY_MS", 1000)?),
            ..RetryPolicy::default()
        };

        Ok(Config {
            watsonx_api_key: optional_env("WATSONX_API_KEY"),
            watsonx_project_id: optional_env("WATSONX_PROJECT_ID"),
            watsonx_url: env_or("WATSONX_URL", "https://us-south.ml.cloud.ibm.com"),
            iam_url: env_or("WATSONX_IAM_URL", "https://iam.cloud.ibm.com/identity/token"),
            api_version: env_or("WATSONX_API_VERSION", "2023-05-29"),
            generation_model_id: env_or("GENERATION_MODEL_ID", "ibm/granite-13b-chat-v2"),
            embedding_model_id: env_or("EMBEDDING_MODEL_ID", "ibm/slate-125m-english-rtrvr"),
            corpus_path: PathBuf::from(env_or(
                "HISTORICAL_CORPUS_PATH",
                "data/historical_proposals.json",
            )),
            knowledge_base_path: optional_env("KNOWLEDGE_BASE_PATH").map(PathBuf::from),
            outcome,
            practices_top_k: parse_env("PRACTICES_TOP_K", 5)?,
            provider_timeout: Duration::from_secs(parse_env("PROVIDER_TIMEOUT_SECS", 120)?),
            retry,
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    /// Returns the provider credentials, or a configuration error naming what is missing.
    pub fn credentials(&self) -> Result<Credentials, AppError> {
        match (&self.watsonx_api_key, &self.watsonx_project_id) {
            (Some(api_key), Some(project_id)) => Ok(Credentials {
                api_key: api_key.clone(),
                project_id: project_id.clone(),
            }),
            (None, _) => Err(AppError::Configuration(
                "WATSONX_API_KEY is not configured".to_string(),
            )),
            (_, None) => Err(AppError::Configuration(
                "WATSONX_PROJECT_ID is not configured".to_string(),
            )),
        }
    }
}

/// Rejects vote settings that would produce probabilities outside [0, 1].
fn check_outcome_model(model: &OutcomeModel) -> Result<()> {
    if !model.smoothing.is_finite() || model.smoothing < 0.0 {
        bail!(
            "OUTCOME_SMOOTHING must be a finite, non-negative number, got {}",
            model.smoothing
        );
    }
    if !model.threshold.is_finite() || !(0.0..=1.0).contains(&model.threshold) {
        bail!(
            "OUTCOME_THRESHOLD must be between 0 and 1, got {}",
            model.threshold
        );
    }
    Ok(())
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration with defaults and dummy credentials, for handler tests.
    pub fn for_tests() -> Self {
        Config {
            watsonx_api_key: Some("test-key".to_string()),
            watsonx_project_id: Some("test-project".to_string()),
            watsonx_url: "http://localhost:0".to_string(),
            iam_url: "http://localhost:0/identity/token".to_string(),
            api_version: "2023-05-29".to_string(),
            generation_model_id: "test/generator".to_string(),
            embedding_model_id: "test/embedder".to_string(),
            corpus_path: PathBuf::from("data/historical_proposals.json"),
            knowledge_base_path: None,
            outcome: OutcomeModel::default(),
            practices_top_k: 5,
            provider_timeout: Duration::from_secs(5),
            retry: RetryPolicy::default(),
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}
