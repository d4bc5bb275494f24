//! File reading
//!
//! Reads a whole file as text. Decoding never fails: invalid UTF-8 is
//! replaced with U+FFFD. Only I/O failures are reported, and they are
//! turned into error records by the caller.

use std::fs;
use std::io::Read;
use std::path::Path;

use xxhash_rust::xxh3::xxh3_64;

use crate::core::model::{FileRecord, RecordMeta};

/// Text read from a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextContent {
    pub text: String,
    pub size: u64,
    pub hash: String,
    /// Whether invalid sequences were replaced
    pub lossy: bool,
}

/// Decode bytes as UTF-8, replacing invalid sequences
pub fn decode_lossy(bytes: Vec<u8>) -> (String, bool) {
    match String::from_utf8(bytes) {
        Ok(text) => (text, false),
        Err(e) => (String::from_utf8_lossy(e.as_bytes()).into_owned(), true),
    }
}

/// Compute the XXH3 hash of bytes as hex
pub fn hash_bytes(data: &[u8]) -> String {
    format!("{:016x}", xxh3_64(data))
}

/// Read a file as text. The handle is dropped before returning.
pub fn read_text(path: &Path) -> std::io::Result<TextContent> {
    let bytes = {
        let mut file = fs::File::open(path)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        buffer
    };

    let size = bytes.len() as u64;
    let hash = hash_bytes(&bytes);
    let (text, lossy) = decode_lossy(bytes);

    Ok(TextContent {
        text,
        size,
        hash,
        lossy,
    })
}

/// Read `path` into a record labelled `relative`
pub fn read_record(path: &Path, relative: &str) -> FileRecord {
    match read_text(path) {
        Ok(content) => FileRecord::content(relative, content.text).with_meta(RecordMeta {
            size: Some(content.size),
            hash: Some(content.hash),
            lossy: content.lossy,
        }),
        Err(e) => FileRecord::error(relative, e.to_string()),
    }
}
