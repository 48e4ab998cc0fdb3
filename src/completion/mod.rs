//! Language-model completion used to answer questions from retrieved context.
//!
//! The Gemini-backed client mirrors the embedding adapter: both share one [`GeminiService`]
//! transport and differ only in the endpoint and the request body.

use crate::config::Config;
use crate::gemini::{GeminiError, GeminiService};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced while generating a completion.
#[derive(Debug, Error)]
pub enum CompletionClientError {
    /// Remote provider call failed.
    #[error("Failed to generate completion: {0}")]
    Provider(#[from] GeminiError),
}

/// Interface implemented by completion providers.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Generate text for a fully assembled prompt.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionClientError>;
}

/// Completion client backed by the Gemini `generateContent` endpoint.
pub struct GeminiCompletionClient {
    service: Arc<GeminiService>,
    model: String,
    temperature: f32,
}

impl GeminiCompletionClient {
    /// Construct a client sampling `model` at a fixed `temperature`.
    pub fn new(service: Arc<GeminiService>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            service,
            model: model.into(),
            temperature,
        }
    }
}

#[async_trait]
impl CompletionClient for GeminiCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionClientError> {
        tracing::debug!(
            model = %self.model,
            temperature = self.temperature,
            prompt_chars = prompt.len(),
            "Requesting completion"
        );
        let text = self
            .service
            .generate_content(&self.model, prompt, self.temperature)
            .await?;
        Ok(text.trim().to_string())
    }
}

/// Build a completion client for `config`, sharing the Gemini transport.
pub fn build_completion_client(
    config: &Config,
    service: Arc<GeminiService>,
) -> Arc<dyn CompletionClient> {
    Arc::new(GeminiCompletionClient::new(
        service,
        config.completion_model.clone(),
        config.completion_temperature,
    ))
}
