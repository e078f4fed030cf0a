//! File name construction - sanitizing, title resolution and collision handling

mod sanitize;
mod title;

pub use sanitize::{sanitize, sanitize_company};
pub use title::{ResolvedTitle, TITLE_KEY, TitleSource, resolve_title};

use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Company segment used when no organization could be resolved
pub const UNKNOWN_COMPANY: &str = "UnknownCompany";

/// Title segment used when nothing survives sanitizing
pub const UNTITLED: &str = "Untitled";

const MAX_TITLE_CHARS: usize = 120;
const MAX_COMPANY_CHARS: usize = 60;

/// Which segments the new file name carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamingMode {
    /// `<date>_<title>.pdf`
    TitleOnly,
    /// `<date>_<title>_<company>.pdf`
    #[default]
    TitleAndCompany,
}

impl FromStr for NamingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" | "title-only" => Ok(Self::TitleOnly),
            "title-company" | "full" => Ok(Self::TitleAndCompany),
            other => Err(format!("unknown naming mode {other:?}")),
        }
    }
}

/// The new name of a processed file: `<date>_<title>[_<company>].pdf`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameTarget {
    pub date: NaiveDate,
    pub title: String,
    pub company: Option<String>,
}

impl RenameTarget {
    /// Build a target from the raw title and company, sanitizing both
    pub fn new(date: NaiveDate, raw_title: &str, raw_company: Option<&str>) -> Self {
        let mut title = truncate(&sanitize(raw_title), MAX_TITLE_CHARS);
        if title.is_empty() {
            title = UNTITLED.to_string();
        }

        let company = raw_company.map(|raw| {
            let company = truncate(&sanitize_company(raw), MAX_COMPANY_CHARS);
            if company.is_empty() {
                UNKNOWN_COMPANY.to_string()
            } else {
                company
            }
        });

        Self {
            date,
            title,
            company,
        }
    }

    /// Render the file name
    pub fn file_name(&self) -> String {
        let date = self.date.format("%Y-%m-%d");
        match self.company {
            Some(ref company) => format!("{date}_{}_{company}.pdf", self.title),
            None => format!("{date}_{}.pdf", self.title),
        }
    }
}

/// Cut a sanitized segment to `max` characters without leaving a dangling separator
fn truncate(segment: &str, max: usize) -> String {
    if segment.chars().count() <= max {
        return segment.to_string();
    }
    let cut: String = segment.chars().take(max).collect();
    cut.trim_end_matches([' ', '_', '-']).to_string()
}

/// Find a free path for `file_name` in `directory`, appending `_1`, `_2`, ... on collision.
///
/// Returns `None` when the name (or its numbered variant) already belongs to `source`,
/// i.e. the file is already called what it would be renamed to.
pub fn unique_target_path(directory: &Path, file_name: &str, source: &Path) -> Option<PathBuf> {
    let path = Path::new(file_name);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(file_name);
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("pdf");

    let mut candidate = directory.join(file_name);
    let mut counter = 1;

    loop {
        if is_same_file(&candidate, source) {
            return None;
        }
        if !candidate.exists() {
            return Some(candidate);
        }
        candidate = directory.join(format!("{stem}_{counter}.{ext}"));
        counter += 1;
    }
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
