/// LLM client: the single point of entry for all hosted-model calls.
///
/// ARCHITECTURAL RULE: No other module may call the provider API directly.
/// Token exchange, embeddings and text generation all go through this module,
/// behind the traits below so the scoring core can be exercised with test doubles.
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{Config, Credentials};
use self::retry::RetryPolicy;

pub mod prompts;
pub mod retry;

/// An embedding vector as returned by the provider. Never mutated after creation.
pub type Embedding = Vec<f32>;

const IAM_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Provider returned empty content")]
    EmptyContent,

    /// The provider answered, but the answer breaks the interface contract
    /// (wrong number of vectors, mixed dimensions, ...).
    #[error("Provider contract violation: {0}")]
    Contract(String),
}

impl LlmError {
    /// Upstream HTTP status, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            LlmError::Api { status, .. } => Some(*status),
            LlmError::RateLimited { .. } => Some(429),
            LlmError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            LlmError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Provider traits
// ────────────────────────────────────────────────────────────────────────────

/// Exchanges an API key for a short-lived bearer token.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn get_token(&self, api_key: &str) -> Result<String, LlmError>;
}

/// Turns an ordered list of texts into one vector per text, in the same order.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>, LlmError>;
}

/// Produces text for a prompt. Treated as a black box.
#[async_trait]
pub trait TextGenerationProvider: Send + Sync {
    fn model_id(&self) -> &str;

    async fn generate(
        &self,
        prompt: &str,
        parameters: &GenerationParameters,
    ) -> Result<String, LlmError>;
}

/// An authenticated, request-scoped handle to the provider.
pub trait LlmSession: EmbeddingProvider + TextGenerationProvider {}

impl<T: EmbeddingProvider + TextGenerationProvider> LlmSession for T {}

/// Opens request-scoped sessions. Carried in `AppState` as `Arc<dyn LlmBackend>`.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Acquires a token, then hands back a session bound to it.
    /// Errors here are token-exchange failures.
    async fn open_session(&self, credentials: &Credentials)
        -> Result<Box<dyn LlmSession>, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

/// Decoding parameters for a generation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationParameters {
    pub decoding_method: String,
    pub max_new_tokens: u32,
    pub min_new_tokens: u32,
    pub repetition_penalty: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stop_sequences: Vec<String>,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            decoding_method: "greedy".to_string(),
            max_new_tokens: 1024,
            min_new_tokens: 1,
            repetition_penalty: 1.0,
            temperature: None,
            stop_sequences: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    inputs: &'a [String],
    model_id: &'a str,
    project_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    results: Vec<EmbeddingResult>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResult {
    embedding: Embedding,
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    input: &'a str,
    model_id: &'a str,
    project_id: &'a str,
    parameters: &'a GenerationParameters,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    results: Vec<GenerationResult>,
}

#[derive(Debug, Deserialize)]
struct GenerationResult {
    generated_text: String,
    #[serde(default)]
    generated_token_count: Option<u32>,
    #[serde(default)]
    input_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    errors: Vec<ProviderErrorItem>,
    #[serde(default, rename = "errorMessage")]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorItem {
    message: String,
}

/// Reduces a provider error body to its human-readable messages, falling back to the raw body.
fn provider_error_message(body: String) -> String {
    match serde_json::from_str::<ProviderErrorBody>(&body) {
        Ok(parsed) if !parsed.errors.is_empty() => parsed
            .errors
            .into_iter()
            .map(|e| e.message)
            .collect::<Vec<_>>()
            .join("; "),
        Ok(ProviderErrorBody {
            error_message: Some(message),
            ..
        }) => message,
        _ => body,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// watsonx.ai client
// ────────────────────────────────────────────────────────────────────────────

/// HTTP client for IBM IAM token exchange and the watsonx.ai text APIs.
/// Every call goes through the configured `RetryPolicy`.
#[derive(Clone)]
pub struct WatsonxClient {
    client: Client,
    base_url: String,
    iam_url: String,
    api_version: String,
    generation_model_id: String,
    embedding_model_id: String,
    retry: RetryPolicy,
}

impl WatsonxClient {
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(config.provider_timeout).build()?,
            base_url: config.watsonx_url.trim_end_matches('/').to_string(),
            iam_url: config.iam_url.clone(),
            api_version: config.api_version.clone(),
            generation_model_id: config.generation_model_id.clone(),
            embedding_model_id: config.embedding_model_id.clone(),
            retry: config.retry.clone(),
        })
    }

    pub fn generation_model_id(&self) -> &str {
        &self.generation_model_id
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}?version={}", self.base_url, path, self.api_version)
    }

    /// Sends a request and decodes a JSON body, retrying per policy.
    async fn send_json<R: DeserializeOwned>(
        &self,
        operation: &str,
        build: impl Fn() -> RequestBuilder,
    ) -> Result<R, LlmError> {
        let build = &build;
        self.retry
            .run(operation, move || async move {
                let response = build().send().await?;
                let status = response.status();

                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    if status.as_u16() == 429 || status.is_server_error() {
                        warn!("{operation} returned {}: {}", status, body);
                    }
                    return Err(LlmError::Api {
                        status: status.as_u16(),
                        message: provider_error_message(body),
                    });
                }

                let body = response.text().await?;
                Ok(serde_json::from_str::<R>(&body)?)
            })
            .await
    }
}

#[async_trait]
impl TokenProvider for WatsonxClient {
    async fn get_token(&self, api_key: &str) -> Result<String, LlmError> {
        let response: TokenResponse = self
            .send_json("token exchange", || {
                self.client
                    .post(&self.iam_url)
                    .header("accept", "application/json")
                    .form(&[("grant_type", IAM_GRANT_TYPE), ("apikey", api_key)])
            })
            .await?;

        if response.access_token.is_empty() {
            return Err(LlmError::EmptyContent);
        }
        debug!("Provider token acquired");
        Ok(response.access_token)
    }
}

#[async_trait]
impl LlmBackend for WatsonxClient {
    async fn open_session(
        &self,
        credentials: &Credentials,
    ) -> Result<Box<dyn LlmSession>, LlmError> {
        let token = self.get_token(&credentials.api_key).await?;
        Ok(Box::new(WatsonxSession {
            client: self.clone(),
            token,
            project_id: credentials.project_id.clone(),
        }))
    }
}

/// A watsonx.ai session bound to one bearer token and project.
pub struct WatsonxSession {
    client: WatsonxClient,
    token: String,
    project_id: String,
}

#[async_trait]
impl EmbeddingProvider for WatsonxSession {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>, LlmError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.client.endpoint("/ml/v1/text/embeddings");
        let body = EmbeddingRequest {
            inputs: texts,
            model_id: &self.client.embedding_model_id,
            project_id: &self.project_id,
        };

        let response: EmbeddingResponse = self
            .client
            .send_json("embedding", || {
                self.client
                    .client
                    .post(&url)
                    .bearer_auth(&self.token)
                    .json(&body)
            })
            .await?;

        if response.results.len() != texts.len() {
            return Err(LlmError::Contract(format!(
                "requested {} embeddings, received {}",
                texts.len(),
                response.results.len()
            )));
        }

        debug!("Embedded {} texts", texts.len());
        Ok(response.results.into_iter().map(|r| r.embedding).collect())
    }
}

#[async_trait]
impl TextGenerationProvider for WatsonxSession {
    fn model_id(&self) -> &str {
        &self.client.generation_model_id
    }

    async fn generate(
        &self,
        prompt: &str,
        parameters: &GenerationParameters,
    ) -> Result<String, LlmError> {
        let url = self.client.endpoint("/ml/v1/text/generation");
        let body = GenerationRequest {
            input: prompt,
            model_id: &self.client.generation_model_id,
            project_id: &self.project_id,
            parameters,
        };

        let response: GenerationResponse = self
            .client
            .send_json("generation", || {
                self.client
                    .client
                    .post(&url)
                    .bearer_auth(&self.token)
                    .json(&body)
            })
            .await?;

        let result = response
            .results
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyContent)?;

        debug!(
            "Generation succeeded: input_tokens={:?}, generated_tokens={:?}",
            result.input_token_count, result.generated_token_count
        );

        if result.generated_text.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(result.generated_text)
    }
}
