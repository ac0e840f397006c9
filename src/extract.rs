//! Best-effort text extraction for uploaded files.
//!
//! Extraction never aborts an upload. PDFs are read page by page and DOCX files paragraph by
//! paragraph, skipping anything that yields no text or fails on its own; when a file cannot be
//! opened at all, the error description itself becomes the document text.

use crate::config::Config;
use regex::Regex;
use std::fmt::Display;
use std::io::{Cursor, Read};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::OnceLock;
use thiserror::Error;

/// File formats recognized by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Portable Document Format.
    Pdf,
    /// Office Open XML word-processing document.
    Docx,
    /// Anything else; decoded as lossy UTF-8.
    Other,
}

impl DocumentKind {
    /// Classify a file by its (case-insensitive) extension.
    pub fn from_filename(filename: &str) -> Self {
        let lower = filename.trim().to_lowercase();
        if lower.ends_with(".pdf") {
            Self::Pdf
        } else if lower.ends_with(".docx") {
            Self::Docx
        } else {
            Self::Other
        }
    }

    /// Whether the upload endpoint accepts this kind.
    pub fn is_supported_upload(self) -> bool {
        matches!(self, Self::Pdf | Self::Docx)
    }

    /// Text stored in place of a document that could not be read.
    pub fn failure_text(self, detail: impl Display) -> String {
        let label = match self {
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
            Self::Other => "file",
        };
        format!("[Error extracting {label}] {detail}")
    }
}

/// Bounds applied while turning uploads into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractLimits {
    /// Character cap for files that are neither PDF nor DOCX.
    pub fallback_chars: usize,
    /// Largest uncompressed DOCX body that will be read.
    pub max_body_bytes: usize,
}

impl Default for ExtractLimits {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl ExtractLimits {
    /// Limits taken from the runtime configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            fallback_chars: config.extract_fallback_chars,
            max_body_bytes: config.max_document_body_bytes,
        }
    }
}

/// Reasons a whole file could not be read.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// PDF parser rejected the file.
    #[error("{0}")]
    Pdf(String),
    /// DOCX container or body could not be read.
    #[error("{0}")]
    Docx(String),
}

/// Extract text from `bytes`, embedding any wholesale failure into the returned text.
///
/// This is CPU-bound; async callers should run it on a blocking thread.
pub fn extract_text(bytes: &[u8], filename: &str, limits: ExtractLimits) -> String {
    let kind = DocumentKind::from_filename(filename);
    let extracted = match kind {
        DocumentKind::Pdf => extract_pdf(bytes),
        DocumentKind::Docx => extract_docx(bytes, limits.max_body_bytes),
        DocumentKind::Other => return decode_fallback(bytes, limits.fallback_chars),
    };
    extracted.unwrap_or_else(|error| {
        tracing::warn!(filename, %error, "Extraction failed");
        kind.failure_text(error)
    })
}

/// Join the text of every PDF page that has any.
///
/// Each page is extracted on its own; a page that errors or panics inside the parser is
/// logged and skipped.
pub fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractionError> {
    // pdf-extract and lopdf panic on some malformed inputs instead of returning an error.
    let mut document = catch_unwind(|| lopdf::Document::load_mem(bytes))
        .map_err(|_| ExtractionError::Pdf("PDF parser panicked".into()))?
        .map_err(|error| ExtractionError::Pdf(error.to_string()))?;
    if document.is_encrypted() {
        document
            .decrypt("")
            .map_err(|error| ExtractionError::Pdf(format!("encrypted PDF: {error}")))?;
    }

    let mut texts = Vec::new();
    for page_number in document.get_pages().into_keys() {
        match catch_unwind(AssertUnwindSafe(|| page_text(&document, page_number))) {
            Ok(Ok(text)) if !text.trim().is_empty() => texts.push(text.trim_end().to_string()),
            Ok(Ok(_)) => {}
            Ok(Err(error)) => tracing::debug!(page_number, %error, "Skipping unreadable page"),
            Err(_) => tracing::debug!(page_number, "Skipping page that crashed the parser"),
        }
    }
    Ok(texts.join("\n"))
}

fn page_text(
    document: &lopdf::Document,
    page_number: u32,
) -> Result<String, pdf_extract::OutputError> {
    let mut text = String::new();
    {
        let mut output = pdf_extract::PlainTextOutput::new(&mut text);
        pdf_extract::output_doc_page(document, &mut output, page_number)?;
    }
    Ok(text)
}

/// Join the text of every DOCX paragraph, one per line.
///
/// The uncompressed body is read up to `max_body_bytes`; anything larger is rejected.
pub fn extract_docx(bytes: &[u8], max_body_bytes: usize) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|error| ExtractionError::Docx(format!("not a DOCX archive: {error}")))?;
    let entry = archive
        .by_name("word/document.xml")
        .map_err(|error| ExtractionError::Docx(format!("missing word/document.xml: {error}")))?;

    let limit = max_body_bytes as u64;
    if entry.size() > limit {
        return Err(ExtractionError::Docx("document body too large".into()));
    }
    // The declared size can lie, so the read itself is bounded as well.
    let mut body = Vec::new();
    entry
        .take(limit + 1)
        .read_to_end(&mut body)
        .map_err(|error| ExtractionError::Docx(format!("unreadable document body: {error}")))?;
    if body.len() > max_body_bytes {
        return Err(ExtractionError::Docx("document body too large".into()));
    }
    let body = String::from_utf8(body)
        .map_err(|error| ExtractionError::Docx(format!("document body is not UTF-8: {error}")))?;

    Ok(docx_paragraphs(&body).join("\n"))
}

fn docx_paragraphs(xml: &str) -> Vec<String> {
    static PARAGRAPH: OnceLock<Regex> = OnceLock::new();
    static RUN_TEXT: OnceLock<Regex> = OnceLock::new();
    let paragraph = PARAGRAPH.get_or_init(|| {
        Regex::new(r"(?s)<w:p[ >].*?</w:p>|<w:p/>").expect("paragraph pattern is valid")
    });
    let run_text = RUN_TEXT.get_or_init(|| {
        Regex::new(r"(?s)<w:t(?:\s[^>]*)?>(.*?)</w:t>|<w:tab/>|<w:br/>")
            .expect("run text pattern is valid")
    });

    paragraph
        .find_iter(xml)
        .map(|block| {
            run_text
                .captures_iter(block.as_str())
                .map(|capture| match capture.get(1) {
                    Some(text) => unescape_xml(text.as_str()),
                    None if capture[0].starts_with("<w:tab") => "\t".to_string(),
                    None => "\n".to_string(),
                })
                .collect::<String>()
        })
        .collect()
}

fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn decode_fallback(bytes: &[u8], max_chars: usize) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .filter(|ch| *ch != char::REPLACEMENT_CHARACTER)
        .take(max_chars)
        .collect()
}
