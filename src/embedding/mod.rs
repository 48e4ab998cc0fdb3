use crate::config::{Config, EmbeddingProvider};
use crate::gemini::{GeminiError, GeminiService};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by embedding providers.
#[derive(Debug, Error)]
pub enum EmbeddingClientError {
    /// Provider was unable to produce an embedding for the supplied input.
    #[error("Failed to generate embeddings: {0}")]
    GenerationFailed(String),
    /// Remote provider call failed.
    #[error(transparent)]
    Provider(#[from] GeminiError),
}

/// Interface implemented by embedding backends.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Produce an embedding vector for one text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingClientError>;

    /// Embed each text in order with one provider call per text.
    async fn embed_all(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}

/// Embedding client backed by the Gemini `embedContent` endpoint.
pub struct GeminiEmbeddingClient {
    service: Arc<GeminiService>,
    model: String,
}

impl GeminiEmbeddingClient {
    /// Construct a client that embeds with `model` through `service`.
    pub fn new(service: Arc<GeminiService>, model: impl Into<String>) -> Self {
        Self {
            service,
            model: model.into(),
        }
    }
}

#[async_trait]
impl EmbeddingClient for GeminiEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingClientError> {
        Ok(self.service.embed_content(&self.model, text).await?)
    }
}

/// Deterministic offline encoder that hashes bytes into a fixed-size unit vector.
pub struct HashingEmbeddingClient {
    dimension: usize,
}

impl HashingEmbeddingClient {
    /// Construct a new deterministic embedding client producing `dimension`-sized vectors.
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    /// Byte `i` of `text` adds its scaled value to bucket `i % dimension`; the result is
    /// L2-normalized unless every bucket is zero.
    fn encode(text: &str, dimension: usize) -> Vec<f32> {
        let mut buckets = vec![0.0_f32; dimension];
        for (slot, byte) in (0..dimension).cycle().zip(text.bytes()) {
            buckets[slot] += f32::from(byte) / 255.0;
        }

        let norm = buckets.iter().map(|value| value * value).sum::<f32>().sqrt();
        if norm > 0.0 {
            buckets.iter_mut().for_each(|value| *value /= norm);
        }
        buckets
    }
}

#[async_trait]
impl EmbeddingClient for HashingEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingClientError> {
        if self.dimension == 0 {
            return Err(EmbeddingClientError::GenerationFailed(
                "embedding dimension must be greater than zero".to_string(),
            ));
        }
        Ok(Self::encode(text, self.dimension))
    }
}

/// Build an embedding client suitable for `config`, sharing the Gemini transport.
pub fn build_embedding_client(
    config: &Config,
    service: Arc<GeminiService>,
) -> Arc<dyn EmbeddingClient> {
    tracing::debug!(
        provider = ?config.embedding_provider,
        model = %config.embedding_model,
        "Building embedding client"
    );
    match config.embedding_provider {
        EmbeddingProvider::Gemini => Arc::new(GeminiEmbeddingClient::new(
            service,
            config.embedding_model.clone(),
        )),
        EmbeddingProvider::Hashing => {
            Arc::new(HashingEmbeddingClient::new(config.embedding_dimension))
        }
    }
}
