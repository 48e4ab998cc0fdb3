//! Document pipeline: staging, PDF extraction, chunking, indexing, and answering.

pub mod chunking;
pub mod index;
pub mod pdf;
pub mod prompt;
pub mod query;
pub mod registry;
mod service;
pub mod storage;
pub mod types;

pub use index::{ScoredWindow, SimilarityIndex};
pub use registry::DocumentRegistry;
pub use service::{DocumentApi, DocumentService};
pub use types::{
    ChunkingError, DocumentId, IndexError, IngestError, LoadError, PipelineSettings, QueryAnswer,
    QueryError, StartupError, UploadOutcome,
};
