//! Ask command handler.
//!
//! Answers one or more questions against the FAQ corpus. All questions go
//! through one orchestrator, so a repeated question is served from the cache.

use super::load_entries;
use clap::Args;
use faqbot_core::{config::AppConfig, AppError, AppResult};
use faqbot_knowledge::{config::load_config, AnswerResult, FaqOrchestrator};
use faqbot_llm::create_client;
use serde::Serialize;

/// Ask the FAQ bot one or more questions
#[derive(Args, Debug)]
pub struct AskCommand {
    /// Questions to answer, in order
    #[arg(required = true)]
    pub questions: Vec<String>,

    /// Output one JSON object per question
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct JsonAnswer<'a> {
    question: &'a str,
    #[serde(flatten)]
    result: &'a AnswerResult,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        config.validate()?;

        let faq = load_config(&config.workspace)?;
        let entries = load_entries(config, &faq)?;

        let provider = config.provider.as_str();
        let endpoint = config.resolve_endpoint(provider);
        let api_key = config.resolve_api_key(provider);
        let client = create_client(
            provider,
            endpoint.as_deref(),
            api_key.as_deref(),
            config.resolve_timeout(provider),
        )
        .map_err(AppError::Config)?;

        let orchestrator = FaqOrchestrator::from_config(faq, client, &config.model)?;
        orchestrator.load_corpus(&entries).await?;

        let multiple = self.questions.len() > 1;
        for question in &self.questions {
            let result = orchestrator.answer(question).await?;
            tracing::debug!(
                matched = ?result.matched_document_id(),
                skipped = result.augmentation_skipped(),
                "Answered question"
            );

            if self.json {
                let line = serde_json::to_string(&JsonAnswer {
                    question,
                    result: &result,
                })?;
                println!("{}", line);
            } else if multiple {
                println!("> {}\n{}\n", question.trim(), result.text());
            } else {
                println!("{}", result.text());
            }
        }

        tracing::debug!("Cache holds {} answers", orchestrator.cache_len());
        Ok(())
    }
}
