//! Folder watching - turns filesystem notifications into file-creation events

use chrono::{DateTime, Local};
use notify::event::{CreateKind, ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{DebounceEventResult, Debouncer, RecommendedCache, new_debouncer};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, info, warn};

/// A file that appeared in the watched folder, created there or moved in
#[derive(Debug, Clone)]
pub struct FileEvent {
    pub path: PathBuf,
    pub is_directory: bool,
    pub detected_at: DateTime<Local>,
}

impl FileEvent {
    pub fn new(path: impl Into<PathBuf>, is_directory: bool) -> Self {
        Self {
            path: path.into(),
            is_directory,
            detected_at: Local::now(),
        }
    }

    /// Not a directory and the name ends in `.pdf` (any case)
    pub fn is_pdf_candidate(&self) -> bool {
        !self.is_directory
            && self
                .path
                .file_name()
                .map(|name| name.to_string_lossy().to_lowercase().ends_with(".pdf"))
                .unwrap_or(false)
    }
}

/// Non-recursive watcher on one folder; dropping it stops event delivery
pub struct FolderWatcher {
    _debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
    path: PathBuf,
}

impl FolderWatcher {
    /// Start watching `path`. New files arrive on the returned receiver in order.
    pub fn start(
        path: &Path,
        debounce: Duration,
    ) -> Result<(Self, UnboundedReceiver<FileEvent>), notify::Error> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut debouncer = new_debouncer(debounce, None, move |result: DebounceEventResult| {
            match result {
                Ok(events) => {
                    for event in events {
                        for file_event in creation_events(&event.event) {
                            if tx.send(file_event).is_err() {
                                debug!("Event receiver closed, dropping notification");
                                return;
                            }
                        }
                    }
                }
                Err(errors) => {
                    for error in errors {
                        warn!(%error, "Watcher error");
                    }
                }
            }
        })?;

        debouncer.watch(path, RecursiveMode::NonRecursive)?;
        info!(path = %path.display(), "Starting the observation");

        Ok((
            Self {
                _debouncer: debouncer,
                path: path.to_path_buf(),
            },
            rx,
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// File events for paths that appeared in the folder; everything else is dropped.
///
/// A move into the folder from outside is reported by the debouncer as a bare
/// `Modify(Name(To))` and counts as a new file.
fn creation_events(event: &Event) -> Vec<FileEvent> {
    let folder = match &event.kind {
        EventKind::Create(kind) => *kind == CreateKind::Folder,
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => false,
        _ => return Vec::new(),
    };

    event
        .paths
        .iter()
        .map(|path| FileEvent::new(path.clone(), folder || path.is_dir()))
        .collect()
}
