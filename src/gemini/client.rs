//! HTTP client wrapper for the Gemini REST API.

use crate::config::Config;
use crate::gemini::types::{
    Content, EmbedContentRequest, EmbedContentResponse, GeminiError, GenerateContentRequest,
    GenerateContentResponse, GenerationConfig,
};
use reqwest::{Client, Method};
use std::time::Duration;

const API_VERSION: &str = "v1beta";

/// Lightweight HTTP client for Gemini embedding and generation calls.
pub struct GeminiService {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) api_key: String,
}

impl GeminiService {
    /// Construct a client against `base_url`, optionally bounding every request by `timeout`.
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, GeminiError> {
        let mut builder = Client::builder().user_agent("docqa/0.1");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        let base_url = normalize_base_url(base_url).map_err(GeminiError::InvalidUrl)?;
        tracing::debug!(url = %base_url, timeout = ?timeout, "Initialized Gemini HTTP client");

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
        })
    }

    /// Construct a client from the loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, GeminiError> {
        Self::new(
            &config.gemini_base_url,
            config.google_api_key.clone(),
            config.http_timeout_secs.map(Duration::from_secs),
        )
    }

    /// Embed a single text with the given model and return its vector.
    pub async fn embed_content(&self, model: &str, text: &str) -> Result<Vec<f32>, GeminiError> {
        let model = model_resource(model);
        let body = EmbedContentRequest {
            model: &model,
            content: Content::text(text),
        };

        let response = self
            .request(Method::POST, &format!("{API_VERSION}/{model}:embedContent"))
            .json(&body)
            .send()
            .await?;
        let response = self.ensure_success(response).await?;

        let payload: EmbedContentResponse = response.json().await?;
        let values = payload
            .embedding
            .map(|embedding| embedding.values)
            .unwrap_or_default();
        if values.is_empty() {
            return Err(GeminiError::InvalidResponse(
                "embedding response contained no values".into(),
            ));
        }

        tracing::trace!(model = %model, dimension = values.len(), "Embedding received");
        Ok(values)
    }

    /// Generate a completion for a single-turn prompt.
    pub async fn generate_content(
        &self,
        model: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<String, GeminiError> {
        let model = model_resource(model);
        let body = GenerateContentRequest {
            contents: vec![Content::user_text(prompt)],
            generation_config: GenerationConfig { temperature },
        };

        let response = self
            .request(
                Method::POST,
                &format!("{API_VERSION}/{model}:generateContent"),
            )
            .json(&body)
            .send()
            .await?;
        let response = self.ensure_success(response).await?;

        let payload: GenerateContentResponse = response.json().await?;
        let candidate = payload.candidates.into_iter().next().ok_or_else(|| {
            GeminiError::InvalidResponse("generation response contained no candidates".into())
        })?;

        let text = candidate
            .content
            .map(|content| content.joined_text())
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(GeminiError::InvalidResponse(format!(
                "candidate carried no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(text)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format_endpoint(&self.base_url, path);
        self.client
            .request(method, url)
            .header("x-goog-api-key", &self.api_key)
    }

    async fn ensure_success(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GeminiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = GeminiError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Gemini request failed");
            Err(error)
        }
    }
}

/// Qualify bare model names (`gemini-2.0-flash`) as `models/gemini-2.0-flash`.
fn model_resource(model: &str) -> String {
    let model = model.trim().trim_start_matches('/');
    if model.starts_with("models/") || model.starts_with("tunedModels/") {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
