use std::sync::Arc;

use crate::config::Config;
use crate::corpus::HistoricalCorpus;
use crate::errors::AppError;
use crate::llm_client::{LlmBackend, LlmSession};
use crate::retrieval::knowledge::KnowledgeBase;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything here is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable provider backend. Default: WatsonxClient.
    pub llm: Arc<dyn LlmBackend>,
    pub corpus: Arc<HistoricalCorpus>,
    pub knowledge_base: Arc<KnowledgeBase>,
}

impl AppState {
    /// Checks credentials and acquires a fresh token for this request.
    pub async fn open_session(&self) -> Result<Box<dyn LlmSession>, AppError> {
        let credentials = self.config.credentials()?;
        self.llm
            .open_session(&credentials)
            .await
            .map_err(AppError::auth)
    }
}
