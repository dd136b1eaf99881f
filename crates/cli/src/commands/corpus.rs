//! Corpus command handler.

use super::load_entries;
use clap::Args;
use faqbot_core::{config::AppConfig, AppResult};
use faqbot_knowledge::config::load_config;

/// Show the FAQ entries the bot answers from
#[derive(Args, Debug)]
pub struct CorpusCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl CorpusCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let faq = load_config(&config.workspace)?;
        let entries = load_entries(config, &faq)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&entries)?);
            return Ok(());
        }

        for entry in &entries {
            println!("[{}] {}\n    {}", entry.id, entry.question, entry.answer);
        }
        tracing::info!("{} FAQ entries", entries.len());

        Ok(())
    }
}
