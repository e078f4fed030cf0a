//! End-to-end runs of the renamer against a temporary folder

use chrono::NaiveDate;
use doc_renamer::company::CompanyExtractor;
use doc_renamer::naming::NamingMode;
use doc_renamer::ner::{Entity, EntityRecognizer, Language, NerError};
use doc_renamer::pdf::{DecodeError, DecodedDocument, DocumentDecoder, Metadata, PageText};
use doc_renamer::readiness::RetryPolicy;
use doc_renamer::renamer::Stage;
use doc_renamer::watcher::FileEvent;
use doc_renamer::{RenameOutcome, Renamer, RenamerConfig};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Returns the same document for every path
struct StubDecoder {
    title: Option<String>,
    text: String,
}

impl DocumentDecoder for StubDecoder {
    fn decode(&self, _path: &Path) -> Result<DecodedDocument, DecodeError> {
        let mut metadata = Metadata::new();
        if let Some(title) = &self.title {
            metadata.insert("Title".to_string(), title.clone());
        }
        Ok(DecodedDocument {
            metadata,
            pages: vec![PageText::Text(self.text.clone())],
        })
    }
}

struct CorruptDecoder;

impl DocumentDecoder for CorruptDecoder {
    fn decode(&self, _path: &Path) -> Result<DecodedDocument, DecodeError> {
        Err(DecodeError::Parse("invalid file header".to_string()))
    }
}

struct OfflineRecognizer;

impl EntityRecognizer for OfflineRecognizer {
    fn language(&self) -> Language {
        Language::English
    }

    fn recognize(&self, _text: &str) -> Result<Vec<Entity>, NerError> {
        Err(NerError::Status {
            status: 503,
            body: "model loading".to_string(),
        })
    }
}

fn config(dir: &Path) -> RenamerConfig {
    RenamerConfig {
        watch_dir: dir.to_path_buf(),
        retry: RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_millis(10),
        },
        naming: NamingMode::TitleAndCompany,
    }
}

fn stub(title: Option<&str>, text: &str) -> Arc<dyn DocumentDecoder> {
    Arc::new(StubDecoder {
        title: title.map(str::to_string),
        text: text.to_string(),
    })
}

fn builtin_renamer(dir: &Path, decoder: Arc<dyn DocumentDecoder>) -> Renamer {
    Renamer::new(config(dir), decoder, Arc::new(CompanyExtractor::builtin()))
}

fn scan(dir: &TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, b"%PDF-1.4\n%%EOF\n").unwrap();
    path
}

fn june_first() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn renamed_to(outcome: &RenameOutcome) -> &Path {
    match outcome {
        RenameOutcome::Renamed { to, .. } => to,
        other => panic!("expected a rename, got {other:?}"),
    }
}

#[test]
fn filename_title_and_company_from_text() {
    let dir = tempfile::tempdir().unwrap();
    let source = scan(&dir, "report.pdf");
    let renamer = builtin_renamer(dir.path(), stub(None, "Rechnung\nBeispiel Logistik AG\nBerlin"));

    let outcome = renamer.process(&source, june_first());

    assert_eq!(
        renamed_to(&outcome),
        dir.path().join("2024-06-01_report_Beispiel_Logistik_AG.pdf")
    );
    assert!(!source.exists());
}

#[test]
fn metadata_title_is_preferred() {
    let dir = tempfile::tempdir().unwrap();
    let source = scan(&dir, "scan001.pdf");
    let renamer = builtin_renamer(
        dir.path(),
        stub(Some("Invoice Q3"), "Invoiced by Acme Solutions GmbH for services."),
    );

    let outcome = renamer.process(&source, june_first());

    assert_eq!(
        renamed_to(&outcome),
        dir.path().join("2024-06-01_Invoice Q3_Acme_Solutions_GmbH.pdf")
    );
}

#[test]
fn missing_company_uses_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let source = scan(&dir, "report.pdf");
    let renamer = builtin_renamer(dir.path(), stub(None, "The Sales Department handled this."));

    let outcome = renamer.process(&source, june_first());

    assert_eq!(
        renamed_to(&outcome),
        dir.path().join("2024-06-01_report_UnknownCompany.pdf")
    );
}

#[test]
fn unsafe_title_characters_are_removed() {
    let dir = tempfile::tempdir().unwrap();
    let source = scan(&dir, "x.pdf");
    let renamer = builtin_renamer(dir.path(), stub(Some("Q3/Q4: Übersicht?"), ""));

    let outcome = renamer.process(&source, june_first());

    assert_eq!(
        renamed_to(&outcome),
        dir.path().join("2024-06-01_Q3Q4 Uebersicht_UnknownCompany.pdf")
    );
}

#[test]
fn existing_target_gets_numbered() {
    let dir = tempfile::tempdir().unwrap();
    let taken = scan(&dir, "2024-06-01_report_UnknownCompany.pdf");
    let source = scan(&dir, "report.pdf");
    let renamer = builtin_renamer(dir.path(), stub(None, ""));

    let outcome = renamer.process(&source, june_first());

    assert_eq!(
        renamed_to(&outcome),
        dir.path().join("2024-06-01_report_UnknownCompany_1.pdf")
    );
    assert!(taken.exists());
}

#[test]
fn already_named_file_is_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let source = scan(&dir, "2024-06-01_report_UnknownCompany.pdf");
    let renamer = builtin_renamer(dir.path(), stub(Some("report"), ""));

    let outcome = renamer.process(&source, june_first());

    assert!(matches!(outcome, RenameOutcome::Unchanged { ref path } if *path == source));
    assert!(source.exists());
}

#[test]
fn decode_failure_keeps_source() {
    let dir = tempfile::tempdir().unwrap();
    let source = scan(&dir, "broken.pdf");
    let renamer = builtin_renamer(dir.path(), Arc::new(CorruptDecoder));

    let outcome = renamer.process(&source, june_first());

    assert!(matches!(
        outcome,
        RenameOutcome::AbortedUnexpected { stage: Stage::MetadataRead, .. }
    ));
    assert!(source.exists());
}

#[test]
fn recognizer_failure_keeps_source() {
    let dir = tempfile::tempdir().unwrap();
    let source = scan(&dir, "letter.pdf");
    let renamer = Renamer::new(
        config(dir.path()),
        stub(None, "Acme GmbH"),
        Arc::new(CompanyExtractor::new(vec![Arc::new(OfflineRecognizer)])),
    );

    let outcome = renamer.process(&source, june_first());

    match outcome {
        RenameOutcome::AbortedUnexpected { stage, error, .. } => {
            assert_eq!(stage, Stage::EntityExtraction);
            assert!(error.to_string().contains("503"));
        }
        other => panic!("expected an abort, got {other:?}"),
    }
    assert!(source.exists());
}

#[test]
fn vanished_file_is_given_up_after_retries() {
    let dir = tempfile::tempdir().unwrap();
    let renamer = builtin_renamer(dir.path(), stub(None, ""));

    let outcome = renamer.process(&dir.path().join("gone.pdf"), june_first());

    assert!(matches!(outcome, RenameOutcome::AbortedLocked { attempts: 3, .. }));
}

#[test]
fn unusable_path_aborts_while_waiting() {
    let dir = tempfile::tempdir().unwrap();
    let renamer = builtin_renamer(dir.path(), stub(None, ""));

    let outcome = renamer.process(&dir.path().join("bad\0name.pdf"), june_first());

    assert!(matches!(
        outcome,
        RenameOutcome::AbortedUnexpected { stage: Stage::Waiting, .. }
    ));
}

#[test]
fn events_for_other_files_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let notes = scan(&dir, "notes.txt");
    fs::create_dir(dir.path().join("archive.pdf")).unwrap();
    let renamer = builtin_renamer(dir.path(), stub(Some("Invoice"), ""));

    let txt = renamer.handle_event(&FileEvent::new(&notes, false));
    let folder = renamer.handle_event(&FileEvent::new(dir.path().join("archive.pdf"), true));

    assert!(matches!(txt, RenameOutcome::Ignored));
    assert!(matches!(folder, RenameOutcome::Ignored));
    assert!(notes.exists());
}

#[test]
fn upper_case_extension_is_processed() {
    let dir = tempfile::tempdir().unwrap();
    let source = scan(&dir, "SCAN.PDF");
    let renamer = builtin_renamer(dir.path(), stub(Some("Invoice"), "Beispiel AG"));

    let outcome = renamer.handle_event(&FileEvent::new(&source, false));

    assert!(outcome.is_renamed());
    let name = renamed_to(&outcome).file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.ends_with("_Invoice_Beispiel_AG.pdf"), "{name}");
}
