//! Flat in-memory similarity index over embedded text windows.

use super::types::IndexError;

/// One embedded window.
#[derive(Debug, Clone)]
struct IndexedWindow {
    text: String,
    vector: Vec<f32>,
}

/// Window returned by a similarity search.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredWindow {
    /// Window text as stored at ingestion time.
    pub text: String,
    /// Cosine similarity to the query vector.
    pub score: f32,
}

/// Exhaustive cosine-similarity index for a single document.
///
/// Built once from the complete set of windows and never mutated afterwards, so a shared
/// `Arc<SimilarityIndex>` can be searched concurrently.
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    windows: Vec<IndexedWindow>,
    dimension: usize,
}

impl SimilarityIndex {
    /// Pair each window with its vector. All vectors must share one non-zero dimension.
    pub fn build(texts: Vec<String>, vectors: Vec<Vec<f32>>) -> Result<Self, IndexError> {
        if texts.len() != vectors.len() {
            return Err(IndexError::LengthMismatch {
                windows: texts.len(),
                vectors: vectors.len(),
            });
        }

        let dimension = vectors.first().map(Vec::len).unwrap_or_default();
        if !vectors.is_empty() && dimension == 0 {
            return Err(IndexError::EmptyVector);
        }
        if let Some(actual) = vectors
            .iter()
            .map(Vec::len)
            .find(|len| *len != dimension)
        {
            return Err(IndexError::DimensionMismatch {
                expected: dimension,
                actual,
            });
        }

        let windows = texts
            .into_iter()
            .zip(vectors)
            .map(|(text, vector)| IndexedWindow { text, vector })
            .collect();

        Ok(Self { windows, dimension })
    }

    pub(crate) fn len(&self) -> usize {
        self.windows.len()
    }

    pub(crate) fn dimension(&self) -> usize {
        self.dimension
    }

    /// Return up to `k` windows most similar to `query`, best first.
    ///
    /// Ties keep document order, so repeated searches return identical results.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<ScoredWindow> {
        if k == 0 {
            return Vec::new();
        }

        let mut scored: Vec<ScoredWindow> = self
            .windows
            .iter()
            .map(|window| ScoredWindow {
                text: window.text.clone(),
                score: cosine_similarity(query, &window.vector),
            })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);
        scored
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> SimilarityIndex {
        SimilarityIndex::build(
            vec!["east".into(), "north".into(), "north-east".into()],
            vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]],
        )
        .expect("index")
    }

    #[test]
    fn search_orders_by_similarity() {
        let hits = index().search(&[0.0, 2.0], 3);
        let texts: Vec<_> = hits.iter().map(|hit| hit.text.as_str()).collect();
        assert_eq!(texts, vec!["north", "north-east", "east"]);
        assert!((hits[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn search_truncates_to_k() {
        assert_eq!(index().search(&[1.0, 0.0], 2).len(), 2);
        assert_eq!(index().search(&[1.0, 0.0], 10).len(), 3);
        assert!(index().search(&[1.0, 0.0], 0).is_empty());
    }

    #[test]
    fn ties_keep_document_order() {
        let index = SimilarityIndex::build(
            vec!["first".into(), "second".into(), "third".into()],
            vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![1.0, 0.0]],
        )
        .expect("index");
        let texts: Vec<_> = index
            .search(&[1.0, 0.0], 2)
            .into_iter()
            .map(|hit| hit.text)
            .collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[test]
    fn build_rejects_mismatched_inputs() {
        assert_eq!(
            SimilarityIndex::build(vec!["a".into()], vec![]).unwrap_err(),
            IndexError::LengthMismatch {
                windows: 1,
                vectors: 0
            }
        );
        assert_eq!(
            SimilarityIndex::build(
                vec!["a".into(), "b".into()],
                vec![vec![1.0, 0.0], vec![1.0]]
            )
            .unwrap_err(),
            IndexError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        );
        assert_eq!(
            SimilarityIndex::build(vec!["a".into()], vec![vec![]]).unwrap_err(),
            IndexError::EmptyVector
        );
    }

    #[test]
    fn zero_vectors_score_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }
}
