//! Cross-component scenarios for the answering pipeline.
//!
//! The doubles below are deterministic: the embedder counts keyword hits and
//! the augmenter echoes its grounding answer (or fails on demand).

mod answer_flow;

use crate::augmentation::{AugmentationClient, AugmentationError, AugmentationErrorKind};
use crate::config::FaqConfig;
use crate::corpus::FaqEntry;
use crate::embeddings::EmbeddingProvider;
use crate::orchestrator::FaqOrchestrator;
use faqbot_core::{AppError, AppResult};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

const KEYWORDS: [&str; 6] = ["plumbing", "cost", "contractor", "reliab", "water", "heater"];

/// One dimension per keyword; a text's vector counts keyword occurrences.
#[derive(Debug, Default)]
pub(crate) struct KeywordEmbedder {
    pub calls: AtomicUsize,
    pub unavailable: AtomicBool,
}

impl KeywordEmbedder {
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    fn provider_name(&self) -> &str {
        "keyword"
    }

    fn model_name(&self) -> &str {
        "keyword-test"
    }

    fn dimensions(&self) -> usize {
        KEYWORDS.len()
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        self.calls.fetch_add(texts.len(), Ordering::SeqCst);

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::EmbeddingUnavailable("stub outage".to_string()));
        }

        Ok(texts
            .iter()
            .map(|text| {
                let text = text.to_lowercase();
                KEYWORDS
                    .iter()
                    .map(|keyword| text.matches(keyword).count() as f32)
                    .collect()
            })
            .collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Behavior {
    /// Return the grounding answer unchanged
    Echo,
    /// Return "<grounding> (augmented)"
    Decorate,
    /// Always fail with the given kind
    Fail(AugmentationErrorKind),
}

/// Augmenter double with a call counter, an optional delay and an optional gate.
pub(crate) struct StubAugmenter {
    pub behavior: Behavior,
    pub calls: AtomicUsize,
    pub delay: Option<Duration>,
    pub gate: Option<Arc<Notify>>,
}

impl StubAugmenter {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            delay: None,
            gate: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Block every call until `gate` is notified.
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AugmentationClient for StubAugmenter {
    async fn complete(
        &self,
        _system_prompt: &str,
        _question: &str,
        grounding_answer: &str,
    ) -> Result<String, AugmentationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.behavior {
            Behavior::Echo => Ok(grounding_answer.to_string()),
            Behavior::Decorate => Ok(format!("{} (augmented)", grounding_answer)),
            Behavior::Fail(kind) => Err(AugmentationError::new(kind, "stub failure")),
        }
    }
}

pub(crate) fn example_corpus() -> Vec<FaqEntry> {
    vec![
        FaqEntry::new("1", "average cost of plumbing", "$100-$200"),
        FaqEntry::new("2", "contractor reliability", "vetted by experience and reviews"),
    ]
}

pub(crate) fn build_orchestrator(
    embedder: Arc<KeywordEmbedder>,
    augmenter: Arc<StubAugmenter>,
    config: FaqConfig,
) -> FaqOrchestrator {
    FaqOrchestrator::new(embedder, augmenter, config).unwrap()
}
