//! In-memory vector index over FAQ documents.
//!
//! Exact top-k by cosine similarity over a linear scan. Corpora here are tens
//! to low hundreds of entries, so no approximate structure is needed.

use crate::types::{Document, MatchResult};
use faqbot_core::{AppError, AppResult};
use std::collections::HashSet;

/// Holds every FAQ document with its unit-normalized embedding.
///
/// Documents are kept in insertion order; `query` relies on that order to
/// break score ties (earlier-added ranks higher).
#[derive(Debug, Default)]
pub struct VectorIndex {
    documents: Vec<Document>,
    ids: HashSet<String>,
    dimensions: Option<usize>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document with its embedding.
    ///
    /// The first document fixes the index dimensionality. Fails with
    /// `DuplicateId` when the id is already present and with
    /// `InvalidArgument` for empty, non-finite or wrongly sized embeddings.
    pub fn add(&mut self, mut document: Document, embedding: Vec<f32>) -> AppResult<()> {
        if self.ids.contains(&document.id) {
            return Err(AppError::DuplicateId(document.id));
        }

        self.check_embedding(&embedding)?;

        document.embedding = normalize(&embedding);
        self.dimensions.get_or_insert(embedding.len());
        self.ids.insert(document.id.clone());

        tracing::debug!(id = %document.id, "Added document to index");
        self.documents.push(document);

        Ok(())
    }

    /// Return the `k` documents most similar to `query_embedding`, best first.
    ///
    /// Fails with `InvalidArgument` when the index is empty, `k` is zero, or
    /// the query embedding does not fit the index.
    pub fn query(&self, query_embedding: &[f32], k: usize) -> AppResult<Vec<MatchResult>> {
        if k == 0 {
            return Err(AppError::InvalidArgument(
                "k must be at least 1".to_string(),
            ));
        }

        if self.documents.is_empty() {
            return Err(AppError::InvalidArgument(
                "cannot query an empty index".to_string(),
            ));
        }

        self.check_embedding(query_embedding)?;
        let query = normalize(query_embedding);

        let mut results: Vec<MatchResult> = self
            .documents
            .iter()
            .map(|document| MatchResult {
                score: dot(&query, &document.embedding),
                document: document.clone(),
            })
            .collect();

        // Stable sort keeps insertion order among equal scores
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(k);

        tracing::debug!(
            "Index query returned {} of {} documents (best score: {:.3})",
            results.len(),
            self.documents.len(),
            results.first().map(|r| r.score).unwrap_or(0.0)
        );

        Ok(results)
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    /// Documents in insertion order.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    fn check_embedding(&self, embedding: &[f32]) -> AppResult<()> {
        if embedding.is_empty() {
            return Err(AppError::InvalidArgument("embedding is empty".to_string()));
        }

        if let Some(expected) = self.dimensions {
            if embedding.len() != expected {
                return Err(AppError::InvalidArgument(format!(
                    "embedding has {} dimensions, index expects {}",
                    embedding.len(),
                    expected
                )));
            }
        }

        if embedding.iter().any(|v| !v.is_finite()) {
            return Err(AppError::InvalidArgument(
                "embedding contains non-finite values".to_string(),
            ));
        }

        Ok(())
    }
}

/// Scale a vector to unit length. Zero vectors stay zero and score 0.0
/// against everything.
pub fn normalize(v: &[f32]) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter().map(|x| x / norm).collect()
    } else {
        v.to_vec()
    }
}

/// Cosine similarity between two vectors of equal length.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    dot(&normalize(a), &normalize(b))
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
