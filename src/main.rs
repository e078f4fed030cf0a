//! PDF document renamer - entry point

use anyhow::{Context, Result};
use doc_renamer::company::CompanyExtractor;
use doc_renamer::ner::{EntityRecognizer, HttpRecognizer, Language};
use doc_renamer::pdf::LopdfDecoder;
use doc_renamer::watcher::FolderWatcher;
use doc_renamer::{Renamer, RenamerConfig, Settings};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    let settings = Settings::from_env().context("Invalid configuration")?;
    init_logging(settings.log_file.as_deref())?;

    if !settings.scan_folder.is_dir() {
        error!(
            "The configured folder does not exist: {}",
            settings.scan_folder.display()
        );
        anyhow::bail!("folder {} does not exist", settings.scan_folder.display());
    }
    let watch_dir = settings
        .scan_folder
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", settings.scan_folder.display()))?;

    // blocking HTTP clients must be created outside the async context
    let renamer = {
        let settings = settings.clone();
        let watch_dir = watch_dir.clone();
        tokio::task::spawn_blocking(move || build_renamer(&settings, watch_dir)).await??
    };
    let renamer = Arc::new(renamer);

    let (watcher, mut events) = FolderWatcher::start(&watch_dir, settings.debounce)
        .with_context(|| format!("Failed to watch {}", watch_dir.display()))?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Program was stopped by the user!");
                break;
            }
            event = events.recv() => {
                let Some(event) = event else { break };
                let worker = Arc::clone(&renamer);
                // one file at a time; the next event waits until this one is done
                match tokio::task::spawn_blocking(move || worker.handle_event(&event)).await {
                    Ok(outcome) => debug!(?outcome, "Event handled"),
                    Err(e) => error!(error = %e, "Rename task failed"),
                }
            }
        }
    }

    drop(watcher);
    tokio::task::spawn_blocking(move || drop(renamer)).await.ok();
    Ok(())
}

/// Console output plus an optional log file
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();
    Ok(())
}

/// Load the NER models and the decoder once for the whole process
fn build_renamer(settings: &Settings, watch_dir: PathBuf) -> Result<Renamer> {
    let companies = match settings.ner_endpoint {
        Some(ref endpoint) => {
            info!(%endpoint, "Using NER service");
            let recognizers: Vec<Arc<dyn EntityRecognizer>> = vec![
                Arc::new(HttpRecognizer::new(endpoint.clone(), Language::German)?),
                Arc::new(HttpRecognizer::new(endpoint.clone(), Language::English)?),
            ];
            CompanyExtractor::new(recognizers)
        }
        None => {
            info!("Using built-in entity recognizer");
            CompanyExtractor::builtin()
        }
    };

    Ok(Renamer::new(
        RenamerConfig {
            watch_dir,
            retry: settings.retry,
            naming: settings.naming,
        },
        Arc::new(LopdfDecoder),
        Arc::new(companies),
    ))
}
