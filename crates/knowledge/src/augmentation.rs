//! Augmentation of retrieved answers through a generative model.

use faqbot_core::AppError;
use faqbot_llm::{LlmClient, LlmRequest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Why an augmentation call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AugmentationErrorKind {
    Timeout,
    RateLimited,
    AuthFailure,
    Unknown,
}

/// Failure of the generation layer.
///
/// `Clone` so one failed computation can be handed to every caller waiting on it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("augmentation failed ({kind:?}): {message}")]
pub struct AugmentationError {
    pub kind: AugmentationErrorKind,
    pub message: String,
}

impl AugmentationError {
    pub fn new(kind: AugmentationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<AppError> for AugmentationError {
    fn from(err: AppError) -> Self {
        let kind = match err {
            AppError::LlmTimeout(_) => AugmentationErrorKind::Timeout,
            AppError::LlmRateLimited(_) => AugmentationErrorKind::RateLimited,
            AppError::LlmAuth(_) => AugmentationErrorKind::AuthFailure,
            _ => AugmentationErrorKind::Unknown,
        };

        Self::new(kind, err.to_string())
    }
}

/// Produces a richer answer from a question and a grounding answer.
#[async_trait::async_trait]
pub trait AugmentationClient: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        question: &str,
        grounding_answer: &str,
    ) -> Result<String, AugmentationError>;
}

/// `AugmentationClient` backed by any `LlmClient`.
pub struct LlmAugmenter {
    client: Arc<dyn LlmClient>,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl LlmAugmenter {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn build_request(&self, system_prompt: &str, question: &str, grounding: &str) -> LlmRequest {
        let mut request = LlmRequest::new(question, &self.model)
            .with_system(system_prompt)
            .with_grounding(grounding);

        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        request
    }
}

#[async_trait::async_trait]
impl AugmentationClient for LlmAugmenter {
    async fn complete(
        &self,
        system_prompt: &str,
        question: &str,
        grounding_answer: &str,
    ) -> Result<String, AugmentationError> {
        let request = self.build_request(system_prompt, question, grounding_answer);

        tracing::debug!(
            provider = self.client.provider_name(),
            model = %self.model,
            "Requesting augmentation"
        );

        let response = self.client.complete(&request).await?;
        let content = response.content.trim();

        if content.is_empty() {
            return Err(AugmentationError::new(
                AugmentationErrorKind::Unknown,
                format!("{} returned an empty completion", self.client.provider_name()),
            ));
        }

        Ok(content.to_string())
    }
}
