//! FAQ corpus sources: the built-in contractor FAQs and corpus files.

use faqbot_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One FAQ entry as supplied to `FaqOrchestrator::load_corpus`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub id: String,
    pub question: String,
    pub answer: String,
}

impl FaqEntry {
    pub fn new(
        id: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// The FAQs seeded when no corpus file is configured.
pub fn builtin_corpus() -> Vec<FaqEntry> {
    vec![
        FaqEntry::new(
            "1",
            "What is the average cost of plumbing services?",
            "The average repair cost for plumbing services ranges from $100 to $200 for minor fixes.",
        ),
        FaqEntry::new(
            "2",
            "How do I know the contractors are reliable?",
            "Contractors are vetted based on experience, customer reviews, and licensing, ensuring high-quality service.",
        ),
        FaqEntry::new(
            "3",
            "What is the replacement time for water heaters?",
            "The replacement time for water heaters is typically 10-15 years with regular maintenance.",
        ),
    ]
}

/// Read a corpus file: a JSON array (`.json`) or a YAML sequence
/// (`.yaml`/`.yml`) of `{id, question, answer}` entries.
///
/// Only parses. Entry validation happens when the corpus is loaded.
pub fn read_corpus_file(path: &Path) -> AppResult<Vec<FaqEntry>> {
    let content = fs::read_to_string(path).map_err(|e| {
        AppError::Knowledge(format!("Failed to read corpus file {:?}: {}", path, e))
    })?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let entries: Vec<FaqEntry> = match extension.as_deref() {
        Some("json") => serde_json::from_str(&content)?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
        _ => {
            return Err(AppError::Knowledge(format!(
                "Unsupported corpus file {:?}: expected .json, .yaml or .yml",
                path
            )))
        }
    };

    tracing::debug!("Read {} FAQ entries from {:?}", entries.len(), path);
    Ok(entries)
}
