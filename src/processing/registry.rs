//! In-memory map from document identifiers to their similarity indexes.

use super::index::SimilarityIndex;
use super::types::DocumentId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Concurrency-safe registry owned by the document service.
///
/// Entries live for the lifetime of the registry; there is no eviction or delete operation.
#[derive(Default)]
pub struct DocumentRegistry {
    entries: RwLock<HashMap<DocumentId, Arc<SimilarityIndex>>>,
}

impl DocumentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully built index, replacing any previous entry for `id`.
    pub async fn put(&self, id: DocumentId, index: SimilarityIndex) {
        self.entries.write().await.insert(id, Arc::new(index));
    }

    /// Look up the index registered under `id`.
    pub async fn get(&self, id: &DocumentId) -> Option<Arc<SimilarityIndex>> {
        self.entries.read().await.get(id).cloned()
    }

    /// Number of registered documents.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether no document has been registered.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
