//! Title resolution from document metadata

use crate::pdf::Metadata;

/// Metadata key holding the document title
pub const TITLE_KEY: &str = "Title";

/// Where a resolved title came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleSource {
    Metadata,
    Filename,
}

/// A document title before sanitizing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTitle {
    pub text: String,
    pub source: TitleSource,
}

/// Pick the metadata title, or the file name without its last extension.
///
/// A title consisting only of whitespace counts as missing. Only the part after
/// the final `.` is treated as the extension: `a.b.pdf` resolves to `a.b`.
pub fn resolve_title(metadata: &Metadata, file_name: &str) -> ResolvedTitle {
    if let Some(title) = metadata.get(TITLE_KEY).filter(|t| !t.trim().is_empty()) {
        return ResolvedTitle {
            text: title.clone(),
            source: TitleSource::Metadata,
        };
    }

    let stem = file_name
        .rsplit_once('.')
        .map_or(file_name, |(stem, _)| stem);

    ResolvedTitle {
        text: stem.to_string(),
        source: TitleSource::Filename,
    }
}
