//! The question → answer pipeline.
//!
//! `FaqOrchestrator` owns the index and the response cache and borrows the
//! two upstream services through trait objects:
//!
//! ```text
//! question ─ normalize ─ embed ─ index.query ─ threshold ─ cache.get_or_compute ─ augment
//!              │           │                       │                                 │
//!           NoQuery     Fallback                NoMatch                          RawAnswer
//! ```
//!
//! Upstream failures never fail `answer`; each degrades to a fixed result.

use crate::augmentation::{AugmentationClient, LlmAugmenter};
use crate::cache::{CacheKey, ResponseCache};
use crate::config::FaqConfig;
use crate::corpus::FaqEntry;
use crate::embeddings::{create_provider, EmbeddingProvider};
use crate::types::{AnswerResult, Document};
use crate::vector_index::VectorIndex;
use faqbot_core::{AppError, AppResult};
use faqbot_llm::LlmClient;
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::instrument;

/// Case-fold and collapse whitespace so equivalent questions share a cache entry.
pub fn normalize_query(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub struct FaqOrchestrator {
    embedder: Arc<dyn EmbeddingProvider>,
    augmenter: Arc<dyn AugmentationClient>,
    /// Replaced wholesale by `load_corpus`; readers work on a snapshot.
    index: RwLock<Arc<VectorIndex>>,
    cache: ResponseCache,
    config: FaqConfig,
}

impl FaqOrchestrator {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        augmenter: Arc<dyn AugmentationClient>,
        config: FaqConfig,
    ) -> AppResult<Self> {
        config.validate()?;

        let capacity = NonZeroUsize::new(config.cache_capacity).ok_or_else(|| {
            AppError::Config("cache_capacity must be at least 1".to_string())
        })?;

        Ok(Self {
            embedder,
            augmenter,
            index: RwLock::new(Arc::new(VectorIndex::new())),
            cache: ResponseCache::new(capacity),
            config,
        })
    }

    /// Build the embedder from `config.embedding` and augment through `llm`.
    pub fn from_config(
        config: FaqConfig,
        llm: Arc<dyn LlmClient>,
        model: impl Into<String>,
    ) -> AppResult<Self> {
        let embedder = create_provider(&config.embedding)?;
        let augmenter = LlmAugmenter::new(llm, model)
            .with_temperature(config.temperature)
            .with_max_tokens(config.max_tokens);

        Self::new(embedder, Arc::new(augmenter), config)
    }

    /// Embed and index `entries`, replacing the current corpus.
    ///
    /// All or nothing: an empty id, an empty question, a duplicate id or an
    /// embedding failure leaves the previous corpus in place. On success the
    /// response cache is cleared. Returns the number of documents indexed.
    #[instrument(skip_all, fields(entries = entries.len()))]
    pub async fn load_corpus(&self, entries: &[FaqEntry]) -> AppResult<usize> {
        let mut seen = HashSet::new();
        for (position, entry) in entries.iter().enumerate() {
            if entry.id.trim().is_empty() {
                return Err(AppError::InvalidArgument(format!(
                    "corpus entry {} has an empty id",
                    position
                )));
            }
            if entry.question.trim().is_empty() {
                return Err(AppError::InvalidArgument(format!(
                    "corpus entry '{}' has an empty question",
                    entry.id
                )));
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(AppError::DuplicateId(entry.id.clone()));
            }
        }

        let questions: Vec<String> = entries
            .iter()
            .map(|entry| normalize_query(&entry.question))
            .collect();

        let embeddings = self.embedder.embed_batch(&questions).await?;
        if embeddings.len() != entries.len() {
            return Err(AppError::Knowledge(format!(
                "embedding provider returned {} vectors for {} questions",
                embeddings.len(),
                entries.len()
            )));
        }

        let mut staging = VectorIndex::new();
        for (entry, embedding) in entries.iter().zip(embeddings) {
            let document = Document {
                id: entry.id.clone(),
                question: entry.question.clone(),
                answer: entry.answer.clone(),
                embedding: Vec::new(),
            };
            staging.add(document, embedding)?;
        }

        let count = staging.len();
        *self.index.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(staging);
        self.cache.clear();

        tracing::info!(
            "Loaded {} FAQ entries ({} embeddings)",
            count,
            self.embedder.provider_name()
        );
        Ok(count)
    }

    /// Answer one question.
    ///
    /// Only misuse surfaces as `Err` (a query embedding that does not fit the
    /// index). Embedding failures yield `Fallback`, augmentation failures
    /// yield `RawAnswer`.
    #[instrument(skip_all, fields(query_len = raw_query.len()))]
    pub async fn answer(&self, raw_query: &str) -> AppResult<AnswerResult> {
        let normalized = normalize_query(raw_query);
        if normalized.is_empty() {
            return Ok(AnswerResult::NoQuery);
        }

        let embedding = match self.embedder.embed(&normalized).await {
            Ok(embedding) => embedding,
            Err(e) => {
                tracing::warn!("Could not embed question, falling back: {}", e);
                return Ok(AnswerResult::Fallback);
            }
        };

        let index = self.snapshot();
        if index.is_empty() {
            tracing::debug!("Corpus is empty");
            return Ok(AnswerResult::NoMatch);
        }

        let Some(best) = index.query(&embedding, self.config.top_k)?.into_iter().next() else {
            return Ok(AnswerResult::NoMatch);
        };

        if !self.config.accepts(best.score) {
            tracing::debug!(
                document_id = %best.document.id,
                "Best match {:.3} is below threshold {:.3}",
                best.score,
                self.config.match_threshold
            );
            return Ok(AnswerResult::NoMatch);
        }

        let document = best.document;
        tracing::debug!(document_id = %document.id, score = best.score, "Matched FAQ entry");

        let key = CacheKey::new(normalized, document.id.clone());
        let augmenter = Arc::clone(&self.augmenter);
        let system_prompt = self.config.system_prompt.clone();
        let question = raw_query.trim().to_string();
        let grounding = document.answer.clone();

        let outcome = self
            .cache
            .get_or_compute(key, move || async move {
                augmenter
                    .complete(&system_prompt, &question, &grounding)
                    .await
            })
            .await;

        match outcome {
            Ok(text) => Ok(AnswerResult::Augmented {
                text,
                matched_document_id: document.id,
            }),
            Err(e) => {
                tracing::warn!(
                    document_id = %document.id,
                    kind = ?e.kind,
                    "Augmentation failed, returning stored answer: {}",
                    e.message
                );
                Ok(AnswerResult::RawAnswer {
                    text: document.answer,
                    matched_document_id: document.id,
                })
            }
        }
    }

    pub fn corpus_size(&self) -> usize {
        self.snapshot().len()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn config(&self) -> &FaqConfig {
        &self.config
    }

    fn snapshot(&self) -> Arc<VectorIndex> {
        let guard = self.index.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }
}

impl std::fmt::Debug for FaqOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaqOrchestrator")
            .field("embedder", &self.embedder.provider_name())
            .field("corpus_size", &self.corpus_size())
            .field("cache", &self.cache)
            .finish()
    }
}
