//! Core data types and error definitions for the ingestion and query pipelines.

use crate::completion::CompletionClientError;
use crate::embedding::EmbeddingClientError;
use crate::gemini::GeminiError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Opaque identifier issued for every successfully uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a client-supplied identifier; anything that is not a UUID yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Errors produced while turning extracted text into windows.
#[derive(Debug, Error)]
pub enum ChunkingError {
    /// Ingestion configured an impossible window size.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
    /// Overlap would consume the whole window.
    #[error("chunk overlap {overlap} must be smaller than chunk size {chunk_size}")]
    OverlapTooLarge {
        /// Requested overlap in characters.
        overlap: usize,
        /// Requested window size in characters.
        chunk_size: usize,
    },
}

/// Errors raised while reading text out of a PDF.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be parsed as a PDF.
    #[error("Failed to parse PDF: {0}")]
    Parse(#[from] lopdf::Error),
}

/// Errors raised while building a similarity index.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    /// Number of windows and vectors differ.
    #[error("received {vectors} vectors for {windows} windows")]
    LengthMismatch {
        /// Windows supplied.
        windows: usize,
        /// Vectors supplied.
        vectors: usize,
    },
    /// A vector's dimension differs from the first one.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension of the first vector.
        expected: usize,
        /// Offending dimension.
        actual: usize,
    },
    /// Zero-length vectors cannot be compared.
    #[error("embedding vectors must not be empty")]
    EmptyVector,
}

/// Errors emitted by the upload/ingestion pipeline.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Writing the uploaded bytes to the scoped temp file failed.
    #[error("Failed to store upload: {0}")]
    Storage(#[from] std::io::Error),
    /// The uploaded file could not be read as a PDF.
    #[error("Failed to load document: {0}")]
    Load(#[from] LoadError),
    /// The document contains no extractable text.
    #[error("Document contains no extractable text")]
    EmptyDocument,
    /// Splitting the text into windows failed.
    #[error("Failed to chunk document: {0}")]
    Chunking(#[from] ChunkingError),
    /// Embedding provider failed to produce vectors for the windows.
    #[error("Failed to generate embeddings: {0}")]
    Embedding(#[from] EmbeddingClientError),
    /// Vectors could not be assembled into an index.
    #[error("Failed to build index: {0}")]
    Index(#[from] IndexError),
    /// Blocking PDF work did not complete.
    #[error("Document worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Errors emitted while answering a question.
#[derive(Debug, Error)]
pub enum QueryError {
    /// No document is registered under the supplied identifier.
    #[error("Document not found.")]
    DocumentNotFound,
    /// Embedding provider failed to embed the question.
    #[error("Failed to embed query: {0}")]
    Embedding(#[from] EmbeddingClientError),
    /// Completion provider failed to answer.
    #[error("Failed to generate answer: {0}")]
    Completion(#[from] CompletionClientError),
}

/// Errors raised while constructing the document service at startup.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Provider HTTP client could not be built.
    #[error("Failed to initialize Gemini client: {0}")]
    Gemini(#[from] GeminiError),
    /// Upload staging directory could not be created.
    #[error("Failed to prepare upload directory {}: {source}", .path.display())]
    UploadDir {
        /// Directory that was requested.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },
}

/// Result of a successful upload.
#[derive(Debug, Clone, Copy)]
pub struct UploadOutcome {
    /// Identifier under which the document is now queryable.
    pub document_id: DocumentId,
    /// Pages read from the PDF.
    pub page_count: usize,
    /// Windows embedded into the index.
    pub chunk_count: usize,
}

/// Answer to a question together with the retrieved context.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryAnswer {
    /// Text generated by the completion provider.
    pub answer: String,
    /// Retrieved windows joined by [`crate::processing::query::SOURCE_SEPARATOR`].
    pub source_text: String,
}

/// Knobs of the ingestion and query pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Maximum window size in characters.
    pub chunk_size: usize,
    /// Characters shared by consecutive windows.
    pub chunk_overlap: usize,
    /// Windows retrieved per question.
    pub top_k: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 3,
        }
    }
}

impl From<&crate::config::Config> for PipelineSettings {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            chunk_size: config.text_splitter_chunk_size,
            chunk_overlap: config.text_splitter_chunk_overlap,
            top_k: config.search_top_k,
        }
    }
}
