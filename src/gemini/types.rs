//! Wire types for the Gemini `embedContent` and `generateContent` endpoints.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned while interacting with the Gemini API.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid Gemini URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Gemini responded with an unexpected status code.
    #[error("Unexpected Gemini response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from Gemini.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// Response decoded but carried no usable content.
    #[error("Malformed Gemini response: {0}")]
    InvalidResponse(String),
}

/// A single content block made of text parts.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Content {
    /// Author of the content (`user` or `model`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Ordered parts; only text parts are used here.
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// Text fragment within a [`Content`] block.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Part {
    /// Fragment text, absent for non-text parts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Content {
    pub(crate) fn user_text(text: &str) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }

    pub(crate) fn text(text: &str) -> Self {
        Self {
            role: None,
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }

    /// Concatenate every text part in order.
    pub fn joined_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }
}

/// Body of `POST /v1beta/{model}:embedContent`.
#[derive(Debug, Serialize)]
pub(crate) struct EmbedContentRequest<'a> {
    pub(crate) model: &'a str,
    pub(crate) content: Content,
}

/// Response of `embedContent`.
#[derive(Debug, Deserialize)]
pub(crate) struct EmbedContentResponse {
    pub(crate) embedding: Option<ContentEmbedding>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentEmbedding {
    #[serde(default)]
    pub(crate) values: Vec<f32>,
}

/// Body of `POST /v1beta/{model}:generateContent`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub(crate) contents: Vec<Content>,
    pub(crate) generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerationConfig {
    pub(crate) temperature: f32,
}

/// Response of `generateContent`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub(crate) candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    pub(crate) content: Option<Content>,
    #[serde(default)]
    pub(crate) finish_reason: Option<String>,
}
