//! Retrieval-augmented answering over one document's index.

use super::index::SimilarityIndex;
use super::prompt::build_prompt;
use super::types::{QueryAnswer, QueryError};
use crate::completion::CompletionClient;
use crate::embedding::EmbeddingClient;

/// Visible separator between retrieved windows in `source_text`.
pub const SOURCE_SEPARATOR: &str = "\n---\n";

/// Embed `question`, retrieve the `top_k` closest windows, and ask the completion provider.
pub async fn answer_question(
    question: &str,
    index: &SimilarityIndex,
    embedder: &dyn EmbeddingClient,
    completer: &dyn CompletionClient,
    top_k: usize,
) -> Result<QueryAnswer, QueryError> {
    let query_vector = embedder.embed(question).await?;
    let hits = index.search(&query_vector, top_k);
    tracing::debug!(
        requested = top_k,
        retrieved = hits.len(),
        best_score = hits.first().map(|hit| hit.score),
        "Retrieved context windows"
    );

    let windows: Vec<&str> = hits.iter().map(|hit| hit.text.as_str()).collect();
    let prompt = build_prompt(&windows, question);
    let answer = completer.complete(&prompt).await?;

    Ok(QueryAnswer {
        answer,
        source_text: windows.join(SOURCE_SEPARATOR),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::CompletionClientError;
    use crate::embedding::{EmbeddingClientError, HashingEmbeddingClient};
    use crate::gemini::GeminiError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingCompleter {
        prompts: Mutex<Vec<String>>,
    }

    impl RecordingCompleter {
        fn new() -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionClient for RecordingCompleter {
        async fn complete(&self, prompt: &str) -> Result<String, CompletionClientError> {
            self.prompts.lock().expect("lock").push(prompt.to_string());
            Ok("stub answer".to_string())
        }
    }

    struct FailingCompleter;

    #[async_trait]
    impl CompletionClient for FailingCompleter {
        async fn complete(&self, _prompt: &str) -> Result<String, CompletionClientError> {
            Err(CompletionClientError::Provider(GeminiError::InvalidResponse(
                "offline".into(),
            )))
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingClient for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingClientError> {
            Err(EmbeddingClientError::GenerationFailed("quota".into()))
        }
    }

    async fn index_of(embedder: &dyn EmbeddingClient, windows: &[&str]) -> SimilarityIndex {
        let texts: Vec<String> = windows.iter().map(|text| text.to_string()).collect();
        let vectors = embedder.embed_all(&texts).await.expect("vectors");
        SimilarityIndex::build(texts, vectors).expect("index")
    }

    #[tokio::test]
    async fn returns_answer_and_joined_sources() {
        let embedder = HashingEmbeddingClient::new(64);
        let windows = ["alpha window", "beta window", "gamma window", "delta"];
        let index = index_of(&embedder, &windows).await;
        let completer = RecordingCompleter::new();

        let result = answer_question("alpha window", &index, &embedder, &completer, 3)
            .await
            .expect("answer");

        assert_eq!(result.answer, "stub answer");
        let sources: Vec<&str> = result.source_text.split(SOURCE_SEPARATOR).collect();
        assert_eq!(sources.len(), 3);
        assert_eq!(sources[0], "alpha window");

        let prompts = completer.prompts.lock().expect("lock");
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("alpha window"));
        assert!(prompts[0].contains("Question:\nalpha window"));
    }

    #[tokio::test]
    async fn embedding_failure_is_reported() {
        let embedder = HashingEmbeddingClient::new(8);
        let index = index_of(&embedder, &["window"]).await;
        let error = answer_question("q", &index, &FailingEmbedder, &RecordingCompleter::new(), 3)
            .await
            .expect_err("embedding error");
        assert!(matches!(error, QueryError::Embedding(_)));
    }

    #[tokio::test]
    async fn completion_failure_is_reported() {
        let embedder = HashingEmbeddingClient::new(8);
        let index = index_of(&embedder, &["window"]).await;
        let error = answer_question("q", &index, &embedder, &FailingCompleter, 3)
            .await
            .expect_err("completion error");
        assert!(matches!(error, QueryError::Completion(_)));
    }
}
