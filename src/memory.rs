//! Session-keyed store for the most recently uploaded document.
//!
//! Each session holds at most one document's text; a new upload replaces the previous one
//! (last write wins). Requests that carry no session identifier share [`DEFAULT_SESSION`],
//! which gives the single-slot behavior of a process-wide buffer.
//!
//! Reads and writes are individually atomic, but nothing ties a read to a later use: a chat
//! racing an upload on the same session sees either the old or the new text.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Session key used when the caller does not identify itself.
pub const DEFAULT_SESSION: &str = "default";

/// In-memory document buffer keyed by session.
#[derive(Debug, Default)]
pub struct DocumentMemory {
    documents: RwLock<HashMap<String, String>>,
}

impl DocumentMemory {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the document held for `session`.
    pub fn set(&self, session: &str, text: String) {
        let mut documents = self
            .documents
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        documents.insert(session.to_string(), text);
    }

    /// Return the document held for `session`, treating empty text as absent.
    pub fn get(&self, session: &str) -> Option<String> {
        let documents = self
            .documents
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        documents
            .get(session)
            .filter(|text| !text.is_empty())
            .cloned()
    }
}

/// Normalize a caller-supplied session identifier.
pub fn session_key(raw: Option<&str>) -> String {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_SESSION)
        .to_string()
}
