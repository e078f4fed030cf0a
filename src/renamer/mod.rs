//! Rename orchestration - one detected file from readiness probe to final name

use crate::company::CompanyExtractor;
use crate::naming::{
    NamingMode, RenameTarget, TitleSource, UNKNOWN_COMPANY, resolve_title, sanitize,
    unique_target_path,
};
use crate::ner::NerError;
use crate::pdf::{DecodeError, DocumentDecoder};
use crate::readiness::{Readiness, RetryPolicy, wait_until_readable};
use crate::watcher::FileEvent;
use chrono::{Local, NaiveDate};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Processing stages of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Detected,
    Waiting,
    MetadataRead,
    EntityExtraction,
    Sanitizing,
    Renamed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Detected => "detected",
            Self::Waiting => "waiting",
            Self::MetadataRead => "metadata read",
            Self::EntityExtraction => "entity extraction",
            Self::Sanitizing => "sanitizing",
            Self::Renamed => "renamed",
        };
        f.write_str(name)
    }
}

/// Failures after which the source file is left untouched
#[derive(Debug, Error)]
pub enum RenameError {
    #[error("could not open file: {0}")]
    Open(#[source] io::Error),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("entity recognition failed: {0}")]
    Recognition(#[from] NerError),
    #[error("path has no file name: {}", .0.display())]
    NoFileName(PathBuf),
    #[error("rename to {} failed: {source}", to.display())]
    Rename {
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What happened to one file-creation event
#[derive(Debug)]
pub enum RenameOutcome {
    /// A directory or a file that is not a PDF
    Ignored,
    Renamed { from: PathBuf, to: PathBuf },
    /// The file already carries its target name
    Unchanged { path: PathBuf },
    /// The file stayed locked for the whole retry budget
    AbortedLocked { path: PathBuf, attempts: u32 },
    AbortedUnexpected {
        path: PathBuf,
        stage: Stage,
        error: RenameError,
    },
}

impl RenameOutcome {
    /// Whether the source file was moved
    pub fn is_renamed(&self) -> bool {
        matches!(self, Self::Renamed { .. })
    }
}

/// Static configuration of a [`Renamer`]
#[derive(Debug, Clone)]
pub struct RenamerConfig {
    /// Folder the renamed files are placed in
    pub watch_dir: PathBuf,
    pub retry: RetryPolicy,
    pub naming: NamingMode,
}

/// Renames newly created PDFs to `<date>_<title>[_<company>].pdf`.
///
/// Holds no mutable state, so one instance can serve any number of events; the
/// decoder and the NER models are shared read-only.
pub struct Renamer {
    config: RenamerConfig,
    decoder: Arc<dyn DocumentDecoder>,
    companies: Arc<CompanyExtractor>,
}

impl Renamer {
    pub fn new(
        config: RenamerConfig,
        decoder: Arc<dyn DocumentDecoder>,
        companies: Arc<CompanyExtractor>,
    ) -> Self {
        Self {
            config,
            decoder,
            companies,
        }
    }

    /// Handle a watcher notification, dated today
    pub fn handle_event(&self, event: &FileEvent) -> RenameOutcome {
        if !event.is_pdf_candidate() {
            debug!(path = %event.path.display(), "Ignoring event");
            return RenameOutcome::Ignored;
        }

        info!(
            path = %event.path.display(),
            detected_at = %event.detected_at.format("%H:%M:%S%.3f"),
            "New PDF found"
        );
        self.process(&event.path, Local::now().date_naive())
    }

    /// Run the whole pipeline for `path` with `today` as the date stamp
    pub fn process(&self, path: &Path, today: NaiveDate) -> RenameOutcome {
        match wait_until_readable(path, self.config.retry) {
            Readiness::Ready { .. } => {}
            Readiness::RetriesExhausted { attempts, .. } => {
                error!(
                    path = %path.display(),
                    attempts,
                    "Could not process file after {attempts} attempts. \
                     It may be in use by another process."
                );
                return RenameOutcome::AbortedLocked {
                    path: path.to_path_buf(),
                    attempts,
                };
            }
            Readiness::NonRetryable { error, .. } => {
                error!(
                    path = %path.display(),
                    %error,
                    "An unexpected error occurred while trying to open the file"
                );
                return RenameOutcome::AbortedUnexpected {
                    path: path.to_path_buf(),
                    stage: Stage::Waiting,
                    error: RenameError::Open(error),
                };
            }
        }

        let mut stage = Stage::MetadataRead;
        match self.rename_ready_file(path, today, &mut stage) {
            Ok(Some(to)) => {
                info!(from = %path.display(), to = %to.display(), "File was successfully renamed");
                RenameOutcome::Renamed {
                    from: path.to_path_buf(),
                    to,
                }
            }
            Ok(None) => {
                info!(path = %path.display(), "File already has its target name");
                RenameOutcome::Unchanged {
                    path: path.to_path_buf(),
                }
            }
            Err(error) => {
                error!(
                    path = %path.display(),
                    %stage,
                    %error,
                    "An unexpected error occurred while trying to rename the file"
                );
                RenameOutcome::AbortedUnexpected {
                    path: path.to_path_buf(),
                    stage,
                    error,
                }
            }
        }
    }

    /// Decode, resolve title and company, then rename. `stage` tracks progress for error reports.
    fn rename_ready_file(
        &self,
        path: &Path,
        today: NaiveDate,
        stage: &mut Stage,
    ) -> Result<Option<PathBuf>, RenameError> {
        *stage = Stage::MetadataRead;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| RenameError::NoFileName(path.to_path_buf()))?;

        let document = self.decoder.decode(path)?;
        if document.failed_pages() > 0 {
            debug!(
                path = %path.display(),
                failed_pages = document.failed_pages(),
                "Some pages had no extractable text"
            );
        }

        let title = resolve_title(&document.metadata, &file_name);
        if title.source == TitleSource::Filename {
            warn!("Found no title in metadata. Using filename: {}", title.text);
        }

        let company = match self.config.naming {
            NamingMode::TitleOnly => None,
            NamingMode::TitleAndCompany => {
                *stage = Stage::EntityExtraction;
                let candidates = self.companies.extract(&document.full_text())?;
                match candidates.first() {
                    Some(best) => {
                        info!(
                            company = %best.name,
                            candidates = candidates.len(),
                            "Company resolved"
                        );
                        Some(best.name.clone())
                    }
                    None => {
                        warn!("Found no company in document text. Using {}", UNKNOWN_COMPANY);
                        Some(UNKNOWN_COMPANY.to_string())
                    }
                }
            }
        };

        *stage = Stage::Sanitizing;
        if sanitize(&title.text).is_empty() {
            warn!(title = %title.text, "Title is empty after sanitizing");
        }
        let target = RenameTarget::new(today, &title.text, company.as_deref());
        let target_name = target.file_name();

        let Some(new_path) = unique_target_path(&self.config.watch_dir, &target_name, path) else {
            return Ok(None);
        };
        if new_path.file_name().is_some_and(|n| n != target_name.as_str()) {
            warn!(target = %target_name, "Target exists, using {}", new_path.display());
        }

        std::fs::rename(path, &new_path).map_err(|source| RenameError::Rename {
            to: new_path.clone(),
            source,
        })?;
        *stage = Stage::Renamed;

        Ok(Some(new_path))
    }
}
