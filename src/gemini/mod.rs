//! Gemini REST API integration shared by the embedding and completion adapters.

pub mod client;
pub mod types;

pub use client::GeminiService;
pub use types::GeminiError;
