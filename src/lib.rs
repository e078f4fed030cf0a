//! PDF document renamer - watches a folder and renames new PDFs
//!
//! # Features
//! - Waits for files that are still being written (readiness probe with retries)
//! - Title from the PDF metadata, falling back to the file name
//! - Issuing company from German and English NER passes plus a legal-form filter
//! - Renames to `<date>_<title>_<company>.pdf` (or `<date>_<title>.pdf`)

pub mod company;
pub mod config;
pub mod naming;
pub mod ner;
pub mod pdf;
pub mod readiness;
pub mod renamer;
pub mod watcher;

pub use config::Settings;
pub use renamer::{RenameOutcome, Renamer, RenamerConfig};
