//! Named-entity recognition backends

mod client;
mod heuristic;

pub use client::HttpRecognizer;
pub use heuristic::HeuristicRecognizer;

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Label of organization entities
pub const ORG_LABEL: &str = "ORG";

/// Language a recognizer is tuned for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Language {
    German,
    English,
}

impl Language {
    /// ISO 639-1 code
    pub fn code(self) -> &'static str {
        match self {
            Self::German => "de",
            Self::English => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A labelled span of text
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Entity {
    #[serde(alias = "word")]
    pub text: String,
    #[serde(alias = "label_", alias = "entity_group")]
    pub label: String,
}

impl Entity {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }

    pub fn is_organization(&self) -> bool {
        self.label == ORG_LABEL
    }
}

#[derive(Debug, Error)]
pub enum NerError {
    #[error("NER request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("NER service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("NER backend failed: {0}")]
    Backend(String),
}

/// A loaded NER model for one language.
///
/// Implementations are built once at startup and shared read-only between
/// all processed files.
pub trait EntityRecognizer: Send + Sync {
    fn language(&self) -> Language;

    fn recognize(&self, text: &str) -> Result<Vec<Entity>, NerError>;
}
