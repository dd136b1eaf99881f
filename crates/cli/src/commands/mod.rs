//! Command handlers for the FAQ bot CLI.

pub mod ask;
pub mod corpus;

pub use ask::AskCommand;
pub use corpus::CorpusCommand;

use faqbot_core::{config::AppConfig, AppResult};
use faqbot_knowledge::{builtin_corpus, read_corpus_file, FaqConfig, FaqEntry};

/// FAQ entries from the configured corpus file, or the built-in set.
pub(crate) fn load_entries(config: &AppConfig, faq: &FaqConfig) -> AppResult<Vec<FaqEntry>> {
    match faq.resolve_corpus_path(&config.workspace) {
        Some(path) => {
            tracing::debug!("Reading corpus from {:?}", path);
            read_corpus_file(&path)
        }
        None => {
            tracing::debug!("Using built-in corpus");
            Ok(builtin_corpus())
        }
    }
}
