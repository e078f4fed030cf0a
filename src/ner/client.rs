//! NER service client

use super::{Entity, EntityRecognizer, Language, NerError};
use serde::{Deserialize, Serialize};

/// Recognizer backed by an HTTP NER service (spaCy or transformers style).
///
/// The service receives `{"text": ..., "language": "de"}` and answers with a list of
/// `{"text", "label"}` objects, either bare or wrapped in `{"entities": [...]}`.
pub struct HttpRecognizer {
    endpoint: String,
    language: Language,
    http_client: reqwest::blocking::Client,
}

impl HttpRecognizer {
    /// Create a client; must not be called from inside an async context
    pub fn new(endpoint: impl Into<String>, language: Language) -> Result<Self, NerError> {
        Ok(Self {
            endpoint: endpoint.into(),
            language,
            http_client: reqwest::blocking::Client::builder().build()?,
        })
    }
}

impl EntityRecognizer for HttpRecognizer {
    fn language(&self) -> Language {
        self.language
    }

    fn recognize(&self, text: &str) -> Result<Vec<Entity>, NerError> {
        let request = NerRequest {
            text,
            language: self.language.code(),
        };

        let response = self.http_client.post(&self.endpoint).json(&request).send()?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            return Err(NerError::Status { status, body });
        }

        let body = response.text()?;
        let parsed: NerResponse = serde_json::from_str(&body)
            .map_err(|e| NerError::Backend(format!("unexpected NER response: {e}")))?;
        Ok(parsed.into_entities())
    }
}

// NER service request/response bodies

#[derive(Serialize)]
struct NerRequest<'a> {
    text: &'a str,
    language: &'a str,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NerResponse {
    Bare(Vec<Entity>),
    Wrapped { entities: Vec<Entity> },
}

impl NerResponse {
    fn into_entities(self) -> Vec<Entity> {
        match self {
            Self::Bare(entities) | Self::Wrapped { entities } => entities,
        }
    }
}
