//! FAQ knowledge type definitions.

use serde::{Deserialize, Serialize};

/// A single FAQ entry held by the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique document identifier
    pub id: String,

    /// The FAQ question (this is what gets embedded)
    pub question: String,

    /// The stored answer, used verbatim when augmentation is skipped
    pub answer: String,

    /// Unit-normalized embedding of the question
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub embedding: Vec<f32>,
}

/// A document paired with its similarity to a query.
///
/// Scores are cosine similarities in [-1, 1] and stay internal to the crate's
/// callers; they are never part of an `AnswerResult`.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub document: Document,
    pub score: f32,
}

pub const NO_MATCH_MESSAGE: &str = "Sorry, I couldn't find an answer to your question.";
pub const FALLBACK_MESSAGE: &str =
    "Sorry, I can't process your question right now. Please try again later.";
pub const NO_QUERY_MESSAGE: &str = "Please enter a question.";

/// Outcome of answering one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnswerResult {
    /// The stored answer, enriched by the generative model
    Augmented {
        text: String,
        matched_document_id: String,
    },

    /// The stored answer verbatim; augmentation was skipped after a failure
    RawAnswer {
        text: String,
        matched_document_id: String,
    },

    /// Nothing in the corpus was close enough
    NoMatch,

    /// The question could not be embedded
    Fallback,

    /// Empty or whitespace-only input
    NoQuery,
}

impl AnswerResult {
    /// Text to show the user.
    pub fn text(&self) -> &str {
        match self {
            Self::Augmented { text, .. } | Self::RawAnswer { text, .. } => text,
            Self::NoMatch => NO_MATCH_MESSAGE,
            Self::Fallback => FALLBACK_MESSAGE,
            Self::NoQuery => NO_QUERY_MESSAGE,
        }
    }

    /// Id of the FAQ entry the answer came from, if any.
    pub fn matched_document_id(&self) -> Option<&str> {
        match self {
            Self::Augmented {
                matched_document_id,
                ..
            }
            | Self::RawAnswer {
                matched_document_id,
                ..
            } => Some(matched_document_id),
            _ => None,
        }
    }

    /// Whether augmentation was attempted and skipped.
    pub fn augmentation_skipped(&self) -> bool {
        matches!(self, Self::RawAnswer { .. })
    }
}
