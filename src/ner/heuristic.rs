//! Model-free recognizer for business letters
//!
//! Tags runs of capitalized words. A run is labelled `ORG` when it contains an
//! organization cue for the configured language (a legal form, or words such as
//! "Bank" / "Gruppe" / "Department"), `MISC` otherwise. Runs break at lowercase
//! words, line ends and sentence punctuation, and close right after a legal form
//! unless another legal form or `&` follows (`GmbH & Co. KG`).

use super::{Entity, EntityRecognizer, Language, NerError, ORG_LABEL};

const MISC_LABEL: &str = "MISC";

/// Legal forms recognized in both languages; letterheads are often in the other one
const LEGAL_FORMS: &[&str] = &[
    "GmbH", "mbH", "AG", "KG", "KGaA", "UG", "OHG", "SE", "GbR", "eG", "e.V.", "Inc.", "Inc",
    "Ltd.", "Ltd", "Corp.", "Corp", "LLC", "PLC", "LLP", "Co.", "Co",
];

/// Punctuation after a word that ends the current run
const CLOSING_PUNCTUATION: &[char] = &[
    ',', ';', ':', '!', '?', '"', '\'', ')', ']', '“', '”', '‘', '»',
];

/// Abbreviations whose trailing dot does not end a sentence
const ABBREVIATIONS: &[&str] = &["Nr.", "St.", "Dr.", "Str.", "u.", "Mr.", "Mrs.", "Ms."];

struct LanguageProfile {
    org_words: &'static [&'static str],
    stopwords: &'static [&'static str],
    connectors: &'static [&'static str],
}

static GERMAN: LanguageProfile = LanguageProfile {
    org_words: &[
        "Gruppe", "Holding", "Bank", "Sparkasse", "Volksbank", "Versicherung", "Stadtwerke",
        "Verlag", "Werke", "Stiftung", "Verein", "Amt", "Finanzamt", "Behörde", "Kanzlei",
        "Krankenkasse", "Genossenschaft",
    ],
    stopwords: &[
        "Der", "Die", "Das", "Dem", "Den", "Des", "Ein", "Eine", "Einer", "Eines", "Sehr",
        "Geehrte", "Geehrter", "Von", "Vom", "Bei", "Beim", "Mit", "Für", "An", "Am", "Im",
        "Herr", "Frau", "Liebe", "Lieber", "Ihre", "Ihr", "Unsere", "Unser",
    ],
    connectors: &["&", "und", "u."],
};

static ENGLISH: LanguageProfile = LanguageProfile {
    org_words: &[
        "Company", "Corporation", "Incorporated", "Limited", "Group", "Holdings", "Bank",
        "Department", "Agency", "University", "Institute", "Association", "Partners",
        "Enterprises", "Industries", "Foundation",
    ],
    stopwords: &[
        "The", "A", "An", "From", "By", "To", "For", "Dear", "At", "In", "On", "Our", "Your",
        "Mr.", "Mrs.", "Ms.", "Dr.",
    ],
    connectors: &["&", "and", "of"],
};

/// Heuristic recognizer for one language
pub struct HeuristicRecognizer {
    language: Language,
    profile: &'static LanguageProfile,
}

/// A whitespace token with surrounding punctuation removed
struct Token<'a> {
    word: &'a str,
    /// Punctuation after the word ends the current run
    closes: bool,
}

impl HeuristicRecognizer {
    pub fn new(language: Language) -> Self {
        let profile = match language {
            Language::German => &GERMAN,
            Language::English => &ENGLISH,
        };
        Self { language, profile }
    }

    pub fn german() -> Self {
        Self::new(Language::German)
    }

    pub fn english() -> Self {
        Self::new(Language::English)
    }

    fn is_cue(&self, word: &str) -> bool {
        is_legal_form(word) || self.profile.org_words.contains(&word)
    }

    fn is_connector(&self, word: &str) -> bool {
        self.profile.connectors.contains(&word)
    }

    fn is_stopword(&self, word: &str) -> bool {
        self.profile.stopwords.contains(&word)
    }

    fn starts_run(&self, word: &str) -> bool {
        is_capitalized(word) || self.is_cue(word)
    }

    fn flush(&self, run: &mut Vec<&str>, entities: &mut Vec<Entity>) {
        // a connector never ends an entity
        while run.last().is_some_and(|w| self.is_connector(w)) {
            run.pop();
        }
        if run.is_empty() {
            return;
        }

        let label = if run.iter().any(|w| self.is_cue(w)) {
            ORG_LABEL
        } else {
            MISC_LABEL
        };
        entities.push(Entity::new(run.join(" "), label));
        run.clear();
    }

    fn tag_line(&self, line: &str, entities: &mut Vec<Entity>) {
        let tokens: Vec<Token<'_>> = line.split_whitespace().map(clean_token).collect();
        let mut run: Vec<&str> = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            let next = tokens.get(i + 1).map(|t| t.word);

            if token.word.is_empty() {
                if token.closes {
                    self.flush(&mut run, entities);
                }
                continue;
            }

            let eligible = if self.is_connector(token.word) {
                !run.is_empty() && !token.closes && next.is_some_and(|n| self.starts_run(n))
            } else {
                self.starts_run(token.word)
            };

            if !eligible {
                self.flush(&mut run, entities);
                continue;
            }

            if run.is_empty() && self.is_stopword(token.word) {
                continue;
            }

            run.push(token.word);

            let legal_form_continues =
                next.is_some_and(|n| n == "&" || is_legal_form(n)) && !token.closes;
            if token.closes || (is_legal_form(token.word) && !legal_form_continues) {
                self.flush(&mut run, entities);
            }
        }

        self.flush(&mut run, entities);
    }
}

impl EntityRecognizer for HeuristicRecognizer {
    fn language(&self) -> Language {
        self.language
    }

    fn recognize(&self, text: &str) -> Result<Vec<Entity>, NerError> {
        let mut entities = Vec::new();
        for line in text.lines() {
            self.tag_line(line, &mut entities);
        }
        Ok(entities)
    }
}

fn is_legal_form(word: &str) -> bool {
    LEGAL_FORMS.contains(&word)
}

/// Starts with an uppercase letter, or with a digit and contains a letter (`1&1`, `3M`)
fn is_capitalized(word: &str) -> bool {
    match word.chars().next() {
        Some(c) if c.is_uppercase() => true,
        Some(c) if c.is_ascii_digit() => word.chars().any(char::is_alphabetic),
        _ => false,
    }
}

fn clean_token(raw: &str) -> Token<'_> {
    let word = raw.trim_start_matches(['"', '\'', '(', '[', '„', '“', '‚', '«']);
    let trimmed = word.trim_end_matches(CLOSING_PUNCTUATION);
    let mut closes = trimmed.len() != word.len();
    let mut word = trimmed;

    if word.ends_with('.') && !is_legal_form(word) && !ABBREVIATIONS.contains(&word) {
        word = word.trim_end_matches('.');
        closes = true;
    }

    Token { word, closes }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orgs(recognizer: &HeuristicRecognizer, text: &str) -> Vec<String> {
        recognizer
            .recognize(text)
            .unwrap()
            .into_iter()
            .filter(Entity::is_organization)
            .map(|e| e.text)
            .collect()
    }

    #[test]
    fn finds_company_inside_sentence() {
        let en = HeuristicRecognizer::english();
        assert_eq!(
            orgs(&en, "Invoiced by Acme Solutions GmbH for services."),
            ["Acme Solutions GmbH"]
        );
    }

    #[test]
    fn department_is_tagged_as_organization() {
        let en = HeuristicRecognizer::english();
        assert_eq!(orgs(&en, "The Sales Department handled this."), ["Sales Department"]);
    }

    #[test]
    fn sentence_end_closes_run() {
        let de = HeuristicRecognizer::german();
        assert_eq!(
            orgs(&de, "Lieferung durch Beispiel Logistik AG. Vielen Dank"),
            ["Beispiel Logistik AG"]
        );
    }

    #[test]
    fn compound_legal_form_stays_together() {
        let de = HeuristicRecognizer::german();
        assert_eq!(
            orgs(&de, "Müller & Söhne GmbH & Co. KG liefert"),
            ["Müller & Söhne GmbH & Co. KG"]
        );
    }

    #[test]
    fn abbreviated_legal_form_closes_before_next_sentence() {
        let en = HeuristicRecognizer::english();
        assert_eq!(orgs(&en, "Sold by Acme Inc. The goods"), ["Acme Inc."]);
    }

    #[test]
    fn comma_splits_runs() {
        let de = HeuristicRecognizer::german();
        assert_eq!(orgs(&de, "Beispiel AG, Berlin"), ["Beispiel AG"]);
    }

    #[test]
    fn lines_are_separate() {
        let de = HeuristicRecognizer::german();
        assert_eq!(orgs(&de, "Rechnung\nBeispiel Logistik AG"), ["Beispiel Logistik AG"]);
    }

    #[test]
    fn connector_joins_names() {
        let en = HeuristicRecognizer::english();
        assert_eq!(orgs(&en, "paid to Bank of Scotland today"), ["Bank of Scotland"]);
    }

    #[test]
    fn plain_capitalized_words_are_misc() {
        let en = HeuristicRecognizer::english();
        let entities = en.recognize("Hello World").unwrap();
        assert_eq!(entities, vec![Entity::new("Hello World", "MISC")]);
    }

    #[test]
    fn empty_text_has_no_entities() {
        assert!(HeuristicRecognizer::german().recognize("").unwrap().is_empty());
    }
}
