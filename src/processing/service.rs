//! Document service coordinating staging, extraction, chunking, embedding, and answering.

use crate::{
    completion::{CompletionClient, build_completion_client},
    config::{Config, get_config},
    embedding::{EmbeddingClient, build_embedding_client},
    gemini::GeminiService,
    metrics::{DocumentMetrics, MetricsSnapshot},
    processing::{
        chunking::chunk_text,
        index::SimilarityIndex,
        pdf::{join_pages, load_pages},
        query::answer_question,
        registry::DocumentRegistry,
        storage::ScopedUpload,
        types::{
            DocumentId, IngestError, PipelineSettings, QueryAnswer, QueryError, StartupError,
            UploadOutcome,
        },
    },
};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// Owns the provider clients, the document registry, and metrics.
///
/// Construct the service once near process start and share it through an `Arc`; every
/// registered document lives exactly as long as the service.
pub struct DocumentService {
    embedding_client: Arc<dyn EmbeddingClient>,
    completion_client: Arc<dyn CompletionClient>,
    registry: DocumentRegistry,
    metrics: Arc<DocumentMetrics>,
    settings: PipelineSettings,
    upload_dir: PathBuf,
}

/// Abstraction over the document pipeline used by the HTTP surface.
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// Stage, extract, chunk, embed, and register an uploaded PDF.
    async fn upload_document(&self, bytes: Vec<u8>) -> Result<UploadOutcome, IngestError>;

    /// Answer `question` from the document registered under `document_id`.
    async fn query_document(
        &self,
        document_id: &str,
        question: &str,
    ) -> Result<QueryAnswer, QueryError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl DocumentService {
    /// Build the service from the global configuration.
    pub fn new() -> Result<Self, StartupError> {
        Self::from_config(get_config())
    }

    /// Build the service from `config`, wiring Gemini-backed clients.
    pub fn from_config(config: &Config) -> Result<Self, StartupError> {
        tracing::info!("Initializing provider clients");
        let gemini = Arc::new(GeminiService::from_config(config)?);
        let embedding_client = build_embedding_client(config, gemini.clone());
        let completion_client = build_completion_client(config, gemini);

        let upload_dir = config
            .upload_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);
        std::fs::create_dir_all(&upload_dir).map_err(|source| StartupError::UploadDir {
            path: upload_dir.clone(),
            source,
        })?;
        tracing::debug!(upload_dir = %upload_dir.display(), "Upload directory ready");

        Ok(Self::with_clients(
            embedding_client,
            completion_client,
            PipelineSettings::from(config),
            upload_dir,
        ))
    }

    /// Build the service around explicit clients.
    pub fn with_clients(
        embedding_client: Arc<dyn EmbeddingClient>,
        completion_client: Arc<dyn CompletionClient>,
        settings: PipelineSettings,
        upload_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            embedding_client,
            completion_client,
            registry: DocumentRegistry::new(),
            metrics: Arc::new(DocumentMetrics::new()),
            settings,
            upload_dir: upload_dir.into(),
        }
    }

    /// Registry of every document ingested by this service.
    pub fn registry(&self) -> &DocumentRegistry {
        &self.registry
    }

    /// Stage, extract, chunk, embed, and register an uploaded PDF.
    ///
    /// The document becomes queryable only once its index is complete; any failure leaves the
    /// registry untouched. The staged file is removed before this returns, on every path.
    pub async fn upload_document(&self, bytes: Vec<u8>) -> Result<UploadOutcome, IngestError> {
        let document_id = DocumentId::generate();
        tracing::info!(
            document_id = %document_id,
            bytes = bytes.len(),
            "Processing upload"
        );

        let upload_dir = self.upload_dir.clone();
        let pages = tokio::task::spawn_blocking(move || -> Result<_, IngestError> {
            let upload = ScopedUpload::write(&upload_dir, &document_id, &bytes)?;
            let pages = load_pages(upload.path())?;
            Ok(pages)
        })
        .await??;

        let text = join_pages(&pages);
        if text.is_empty() {
            tracing::warn!(document_id = %document_id, pages = pages.len(), "No extractable text");
            return Err(IngestError::EmptyDocument);
        }

        let PipelineSettings {
            chunk_size,
            chunk_overlap,
            ..
        } = self.settings;
        let windows = chunk_text(&text, chunk_size, chunk_overlap)?;
        if windows.is_empty() {
            return Err(IngestError::EmptyDocument);
        }
        tracing::debug!(
            document_id = %document_id,
            windows = windows.len(),
            chunk_size,
            chunk_overlap,
            "Document chunked"
        );

        let vectors = self.embedding_client.embed_all(&windows).await?;
        let index = SimilarityIndex::build(windows, vectors)?;
        let chunk_count = index.len();
        tracing::info!(
            document_id = %document_id,
            pages = pages.len(),
            chunks = chunk_count,
            dimension = index.dimension(),
            "Document indexed"
        );

        self.registry.put(document_id, index).await;
        self.metrics.record_document(chunk_count as u64);

        Ok(UploadOutcome {
            document_id,
            page_count: pages.len(),
            chunk_count,
        })
    }

    /// Answer `question` from the document registered under `document_id`.
    pub async fn query_document(
        &self,
        document_id: &str,
        question: &str,
    ) -> Result<QueryAnswer, QueryError> {
        let id = DocumentId::parse(document_id).ok_or(QueryError::DocumentNotFound)?;
        let index = self
            .registry
            .get(&id)
            .await
            .ok_or(QueryError::DocumentNotFound)?;

        let answer = answer_question(
            question,
            &index,
            self.embedding_client.as_ref(),
            self.completion_client.as_ref(),
            self.settings.top_k,
        )
        .await?;
        self.metrics.record_query();
        tracing::info!(document_id = %id, "Query answered");
        Ok(answer)
    }

    /// Return the current metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl DocumentApi for DocumentService {
    async fn upload_document(&self, bytes: Vec<u8>) -> Result<UploadOutcome, IngestError> {
        DocumentService::upload_document(self, bytes).await
    }

    async fn query_document(
        &self,
        document_id: &str,
        question: &str,
    ) -> Result<QueryAnswer, QueryError> {
        DocumentService::query_document(self, document_id, question).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        DocumentService::metrics_snapshot(self)
    }
}
