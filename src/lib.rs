#![deny(missing_docs)]

//! Core library for the docqa PDF question-answering server.

/// HTTP routing and REST handlers.
pub mod api;
/// Language-model completion clients.
pub mod completion;
/// Environment-driven configuration management.
pub mod config;
/// Embedding client abstraction and adapters.
pub mod embedding;
/// Gemini REST API transport.
pub mod gemini;
/// Structured logging and tracing setup.
pub mod logging;
/// Ingestion and query counters.
pub mod metrics;
/// Document pipeline: staging, extraction, chunking, indexing, and answering.
pub mod processing;
