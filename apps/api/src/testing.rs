//! Deterministic provider doubles shared by unit and router tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::config::Credentials;
use crate::llm_client::{
    Embedding, EmbeddingProvider, GenerationParameters, LlmBackend, LlmError, LlmSession,
    TextGenerationProvider,
};

pub const DEFAULT_VOCABULARY: &[&str] = &[
    "cloud", "migration", "security", "bakery", "retail", "budget", "timeline", "risk", "data",
    "mobile",
];

/// Embeds text as keyword counts over a fixed vocabulary.
/// Text with none of the words becomes a zero vector.
pub struct KeywordEmbedder {
    vocabulary: Vec<&'static str>,
    fail_status: Option<u16>,
    calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn new() -> Self {
        Self {
            vocabulary: DEFAULT_VOCABULARY.to_vec(),
            fail_status: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            fail_status: Some(status),
            ..Self::new()
        }
    }

    /// Number of `embed` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn vector_for(&self, text: &str) -> Embedding {
        let lower = text.to_lowercase();
        self.vocabulary
            .iter()
            .map(|word| lower.matches(word).count() as f32)
            .collect()
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.fail_status {
            return Err(LlmError::Api {
                status,
                message: "embedding backend unavailable".to_string(),
            });
        }
        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }
}

/// Returns canned text and records every prompt it was given.
pub struct StaticGenerator {
    text: String,
    fail_status: Option<u16>,
    prompts: Mutex<Vec<String>>,
}

impl StaticGenerator {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fail_status: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            fail_status: Some(status),
            ..Self::new("")
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerationProvider for StaticGenerator {
    fn model_id(&self) -> &str {
        "test/generator"
    }

    async fn generate(
        &self,
        prompt: &str,
        _parameters: &GenerationParameters,
    ) -> Result<String, LlmError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        match self.fail_status {
            Some(status) => Err(LlmError::Api {
                status,
                message: "generation backend unavailable".to_string(),
            }),
            None => Ok(self.text.clone()),
        }
    }
}

/// A session combining the two doubles.
pub struct MockSession {
    pub embedder: KeywordEmbedder,
    pub generator: StaticGenerator,
}

#[async_trait]
impl EmbeddingProvider for MockSession {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>, LlmError> {
        self.embedder.embed(texts).await
    }
}

#[async_trait]
impl TextGenerationProvider for MockSession {
    fn model_id(&self) -> &str {
        self.generator.model_id()
    }

    async fn generate(
        &self,
        prompt: &str,
        parameters: &GenerationParameters,
    ) -> Result<String, LlmError> {
        self.generator.generate(prompt, parameters).await
    }
}

/// Backend that opens `MockSession`s, or fails token exchange with `token_status`.
pub struct MockBackend {
    pub generated_text: String,
    pub token_status: Option<u16>,
    pub embedding_status: Option<u16>,
}

impl MockBackend {
    pub fn new(generated_text: impl Into<String>) -> Self {
        Self {
            generated_text: generated_text.into(),
            token_status: None,
            embedding_status: None,
        }
    }
}

#[async_trait]
impl LlmBackend for MockBackend {
    async fn open_session(
        &self,
        _credentials: &Credentials,
    ) -> Result<Box<dyn LlmSession>, LlmError> {
        if let Some(status) = self.token_status {
            return Err(LlmError::Api {
                status,
                message: "invalid api key".to_string(),
            });
        }
        let embedder = match self.embedding_status {
            Some(status) => KeywordEmbedder::failing(status),
            None => KeywordEmbedder::new(),
        };
        Ok(Box::new(MockSession {
            embedder,
            generator: StaticGenerator::new(self.generated_text.clone()),
        }))
    }
}
