//! FAQ retrieval and answering.
//!
//! Holds FAQ entries in an in-memory vector index, matches questions by
//! cosine similarity, and enriches the matched answer through a generative
//! model behind a single-flight LRU cache.

pub mod augmentation;
pub mod cache;
pub mod config;
pub mod corpus;
pub mod embeddings;
pub mod orchestrator;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use augmentation::{AugmentationClient, AugmentationError, AugmentationErrorKind, LlmAugmenter};
pub use cache::{CacheKey, ResponseCache};
pub use config::FaqConfig;
pub use corpus::{builtin_corpus, read_corpus_file, FaqEntry};
pub use embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
pub use orchestrator::{normalize_query, FaqOrchestrator};
pub use types::{AnswerResult, Document, MatchResult};
pub use vector_index::VectorIndex;
