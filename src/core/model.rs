//! Record Model
//!
//! The walk produces an ordered RecordSet; every renderer consumes it.

use serde::{Deserialize, Serialize};

/// Kind of a traversed entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// An entry seen during the walk, before any ignore decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalEntry {
    /// Path relative to root, using '/' as separator
    pub path: String,
    pub kind: EntryKind,
}

impl TraversalEntry {
    pub fn new(path: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// What reading a file produced. Exactly one of content or error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Full text, invalid UTF-8 replaced with U+FFFD
    Content(String),
    /// Human-readable description of why the file could not be read
    Error(String),
}

/// Metadata for a record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMeta {
    /// File size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// XXH3 hash of the raw bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,

    /// Whether invalid UTF-8 sequences were replaced
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub lossy: bool,
}

/// One unit of collected output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Path relative to root, using '/' as separator
    pub path: String,

    #[serde(flatten)]
    pub outcome: Outcome,

    #[serde(default)]
    pub meta: RecordMeta,
}

impl FileRecord {
    /// Create a record holding file content
    pub fn content(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            outcome: Outcome::Content(content.into()),
            meta: RecordMeta::default(),
        }
    }

    /// Create a record describing a read failure
    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            outcome: Outcome::Error(message.into()),
            meta: RecordMeta::default(),
        }
    }

    /// Set metadata
    pub fn with_meta(mut self, meta: RecordMeta) -> Self {
        self.meta = meta;
        self
    }

    #[allow(dead_code)]
    pub fn content_text(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Content(text) => Some(text),
            Outcome::Error(_) => None,
        }
    }

    pub fn error_text(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Error(message) => Some(message),
            Outcome::Content(_) => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, Outcome::Error(_))
    }
}

/// The ordered output of a walk
#[derive(Debug, Clone)]
pub struct RecordSet {
    pub records: Vec<FileRecord>,

    /// False when the walk was stopped early
    pub complete: bool,
}

impl Default for RecordSet {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordSet {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            complete: true,
        }
    }

    pub fn push(&mut self, record: FileRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records that carry content
    pub fn content_count(&self) -> usize {
        self.records.iter().filter(|r| !r.is_error()).count()
    }

    /// Number of error records
    pub fn error_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_error()).count()
    }

    #[allow(dead_code)]
    pub fn paths(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.path.as_str()).collect()
    }
}
