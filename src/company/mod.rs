//! Company extraction - NER passes over the document text plus a legal-form filter

use crate::ner::{Entity, EntityRecognizer, HeuristicRecognizer, Language, NerError};
use regex::Regex;
use std::cmp::Ordering;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Capitalized word sequence followed by a legal form, e.g. `Acme Solutions GmbH`
const LEGAL_SUFFIX_PATTERN: &str = concat!(
    r"\p{Lu}[\p{L}\p{N}&.'-]*",
    r"(?:\s+(?:(?:&|und|and)\s+)?[\p{Lu}\p{N}][\p{L}\p{N}&.'-]*)*",
    r"\s+(?:GmbH|AG|KGaA|KG|UG|OHG|SE|Inc\.?|Ltd\.?|Corp\.?|LLC|PLC)",
    r"(?:[\s,;:.)]|$)",
);

static LEGAL_SUFFIX: OnceLock<Regex> = OnceLock::new();

fn legal_suffix_re() -> &'static Regex {
    LEGAL_SUFFIX.get_or_init(|| Regex::new(LEGAL_SUFFIX_PATTERN).unwrap())
}

/// Whether an organization name carries a recognized legal form (case-sensitive)
pub fn has_legal_suffix(name: &str) -> bool {
    legal_suffix_re().is_match(name)
}

/// An organization found in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyCandidate {
    pub name: String,
    /// NER passes that reported this name
    pub found_by: Vec<Language>,
    /// Byte offset of the first mention in the document text
    pub position: Option<usize>,
}

impl CompanyCandidate {
    /// Earlier mention first, then the longer name, then alphabetical
    fn rank(&self, other: &Self) -> Ordering {
        let position = |c: &Self| c.position.unwrap_or(usize::MAX);
        position(self)
            .cmp(&position(other))
            .then_with(|| other.name.chars().count().cmp(&self.name.chars().count()))
            .then_with(|| self.name.cmp(&other.name))
    }
}

/// Runs every configured recognizer over a text and keeps legal-entity names
pub struct CompanyExtractor {
    recognizers: Vec<Arc<dyn EntityRecognizer>>,
}

impl CompanyExtractor {
    pub fn new(recognizers: Vec<Arc<dyn EntityRecognizer>>) -> Self {
        Self { recognizers }
    }

    /// German and English heuristic recognizers
    pub fn builtin() -> Self {
        Self::new(vec![
            Arc::new(HeuristicRecognizer::german()),
            Arc::new(HeuristicRecognizer::english()),
        ])
    }

    /// Organization names with a legal form, best candidate first.
    ///
    /// Mentions are merged across passes by their exact trimmed text before the
    /// legal-form filter runs. Recognizer failures are returned as-is.
    pub fn extract(&self, text: &str) -> Result<Vec<CompanyCandidate>, NerError> {
        let mut candidates: Vec<CompanyCandidate> = Vec::new();

        for recognizer in &self.recognizers {
            let language = recognizer.language();
            let entities = recognizer.recognize(text)?;
            debug!(%language, entities = entities.len(), "NER pass finished");

            for entity in entities.iter().filter(|e| e.is_organization()) {
                merge_candidate(&mut candidates, entity, language, text);
            }
        }

        let organizations = candidates.len();
        candidates.retain(|c| has_legal_suffix(&c.name));
        candidates.sort_by(CompanyCandidate::rank);

        debug!(
            organizations,
            with_legal_form = candidates.len(),
            "Company candidates filtered"
        );
        Ok(candidates)
    }

    /// Name of the best candidate, if any
    pub fn extract_company(&self, text: &str) -> Result<Option<String>, NerError> {
        Ok(self.extract(text)?.into_iter().next().map(|c| c.name))
    }
}

fn merge_candidate(
    candidates: &mut Vec<CompanyCandidate>,
    entity: &Entity,
    language: Language,
    text: &str,
) {
    let name = entity.text.trim();
    if name.is_empty() {
        return;
    }

    match candidates.iter_mut().find(|c| c.name == name) {
        Some(existing) => {
            if !existing.found_by.contains(&language) {
                existing.found_by.push(language);
            }
        }
        None => candidates.push(CompanyCandidate {
            name: name.to_string(),
            found_by: vec![language],
            position: text.find(name),
        }),
    }
}
