//! PDF decoding - document info dictionary and per-page text

use lopdf::{Document, Object};
use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Document info entries, keyed without the leading slash (`Title`, `Author`, ...)
pub type Metadata = BTreeMap<String, String>;

/// Errors that make a whole document unreadable
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse PDF: {0}")]
    Parse(String),
    #[error("PDF parser panicked - likely a malformed document")]
    Panicked,
}

/// Text of one page, or why it could not be extracted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageText {
    Text(String),
    Failed(String),
}

/// A decoded document
#[derive(Debug, Clone, Default)]
pub struct DecodedDocument {
    pub metadata: Metadata,
    pub pages: Vec<PageText>,
}

impl DecodedDocument {
    /// All page texts joined by newlines; failed pages contribute an empty string
    pub fn full_text(&self) -> String {
        self.pages
            .iter()
            .map(|page| match page {
                PageText::Text(text) => text.as_str(),
                PageText::Failed(_) => "",
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of pages whose text could not be extracted
    pub fn failed_pages(&self) -> usize {
        self.pages
            .iter()
            .filter(|page| matches!(page, PageText::Failed(_)))
            .count()
    }
}

/// Turns a file on disk into metadata and page text
pub trait DocumentDecoder: Send + Sync {
    fn decode(&self, path: &Path) -> Result<DecodedDocument, DecodeError>;
}

/// Pure Rust decoder built on `lopdf`
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfDecoder;

impl DocumentDecoder for LopdfDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedDocument, DecodeError> {
        let bytes = std::fs::read(path).map_err(|source| DecodeError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        decode_bytes(&bytes)
    }
}

/// Decode an in-memory PDF
pub fn decode_bytes(bytes: &[u8]) -> Result<DecodedDocument, DecodeError> {
    let doc = match catch_unwind(AssertUnwindSafe(|| Document::load_mem(bytes))) {
        Ok(Ok(doc)) => doc,
        Ok(Err(e)) => return Err(DecodeError::Parse(e.to_string())),
        Err(_) => return Err(DecodeError::Panicked),
    };

    let metadata = read_info(&doc);

    let pages: Vec<PageText> = doc
        .get_pages()
        .keys()
        .map(|&page_number| {
            // font handling in the text extractor can panic on odd glyph tables
            match catch_unwind(AssertUnwindSafe(|| doc.extract_text(&[page_number]))) {
                Ok(Ok(text)) => PageText::Text(text),
                Ok(Err(e)) => PageText::Failed(e.to_string()),
                Err(_) => PageText::Failed("text extraction panicked".to_string()),
            }
        })
        .collect();

    let decoded = DecodedDocument { metadata, pages };
    debug!(
        pages = decoded.pages.len(),
        failed_pages = decoded.failed_pages(),
        metadata_keys = decoded.metadata.len(),
        "PDF decoded"
    );
    Ok(decoded)
}

/// Collect the string entries of the trailer's `/Info` dictionary
fn read_info(doc: &Document) -> Metadata {
    let mut metadata = Metadata::new();

    let Ok(info) = doc.trailer.get(b"Info") else {
        return metadata;
    };
    let info = match info {
        Object::Reference(id) => match doc.get_object(*id) {
            Ok(object) => object,
            Err(_) => return metadata,
        },
        other => other,
    };
    let Ok(dict) = info.as_dict() else {
        return metadata;
    };

    for (key, value) in dict.iter() {
        let value = match value {
            Object::Reference(id) => match doc.get_object(*id) {
                Ok(object) => object,
                Err(_) => continue,
            },
            other => other,
        };
        if let Object::String(bytes, _) = value {
            metadata.insert(
                String::from_utf8_lossy(key).into_owned(),
                decode_text_string(bytes),
            );
        }
    }

    metadata
}

/// Decode a PDF text string (UTF-16BE with BOM, UTF-8 with BOM, or PDFDocEncoding)
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(rest).into_owned();
    }
    // PDFDocEncoding matches Latin-1 for everything a title realistically holds
    bytes.iter().map(|&b| b as char).collect()
}
