// Retrieval core: similarity ranking and best-practice lookup.
// Embeddings are requested per call and never cached.

pub mod knowledge;
pub mod similarity;

use crate::errors::AppError;
use crate::llm_client::{Embedding, EmbeddingProvider, LlmError};

/// Embeds `texts` and checks the result against the provider contract:
/// one vector per input, all of the same non-zero dimension (`expected_dim` when given).
pub async fn embed_checked<E>(
    provider: &E,
    texts: &[String],
    expected_dim: Option<usize>,
) -> Result<Vec<Embedding>, AppError>
where
    E: EmbeddingProvider + ?Sized,
{
    let vectors = provider.embed(texts).await.map_err(AppError::embedding)?;
    validate_embeddings(texts.len(), &vectors, expected_dim).map_err(AppError::embedding)?;
    Ok(vectors)
}

fn validate_embeddings(
    requested: usize,
    vectors: &[Embedding],
    expected_dim: Option<usize>,
) -> Result<(), LlmError> {
    if vectors.len() != requested {
        return Err(LlmError::Contract(format!(
            "requested {requested} embeddings, received {}",
            vectors.len()
        )));
    }

    let Some(dim) = expected_dim.or_else(|| vectors.first().map(Vec::len)) else {
        return Ok(());
    };
    if dim == 0 {
        return Err(LlmError::Contract("received zero-dimension embedding".to_string()));
    }
    if let Some((index, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != dim) {
        return Err(LlmError::Contract(format!(
            "embedding {index} has dimension {}, expected {dim}",
            v.len()
        )));
    }
    Ok(())
}
