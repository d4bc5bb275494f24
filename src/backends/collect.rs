//! Tree collection backend
//!
//! Walks the root depth-first with walkdir. Within a directory, files come
//! before subdirectories and each group is sorted by file name, so output
//! is reproducible regardless of filesystem listing order. Ignored
//! directories are pruned before descent.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::core::error::ScanError;
use crate::core::file_reader::read_record;
use crate::core::model::{EntryKind, FileRecord, RecordSet, TraversalEntry};
use crate::core::paths::make_relative;
use crate::core::rules::RuleSet;

/// Files first, then directories, each by name
fn entry_order(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

/// Collects file records under a root
pub struct TreeCollector<'a> {
    root: PathBuf,
    rules: &'a RuleSet,
}

impl<'a> TreeCollector<'a> {
    /// Create a collector. Fails if root is missing or not a directory.
    pub fn new(root: &Path, rules: &'a RuleSet) -> Result<Self, ScanError> {
        let metadata = fs::metadata(root).map_err(|e| ScanError::io(root, e))?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        Ok(Self {
            root: root.to_path_buf(),
            rules,
        })
    }

    fn traversal_entry(&self, entry: &DirEntry) -> Option<TraversalEntry> {
        let path = make_relative(entry.path(), &self.root)?;
        let kind = if entry.file_type().is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        Some(TraversalEntry::new(path, kind))
    }

    fn keep(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return true;
        }
        match self.traversal_entry(entry) {
            Some(te) if self.rules.is_entry_ignored(&te) => {
                debug!(path = %te.path, dir = te.is_dir(), "ignored");
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Walk the whole tree
    pub fn collect(&self) -> Result<RecordSet, ScanError> {
        self.collect_until(|_| false)
    }

    /// Walk the tree, consulting `stop` before entering each directory.
    /// Directories already entered are always emitted whole.
    pub fn collect_until<F>(&self, mut stop: F) -> Result<RecordSet, ScanError>
    where
        F: FnMut(&[FileRecord]) -> bool,
    {
        let mut set = RecordSet::new();

        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by(entry_order)
            .into_iter()
            .filter_entry(|entry| self.keep(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    let source = err.into_io_error().unwrap_or_else(|| {
                        std::io::Error::new(std::io::ErrorKind::Other, "walk error")
                    });
                    return Err(ScanError::RootUnreadable {
                        path: self.root.clone(),
                        source,
                    });
                }
                Err(err) => {
                    let relative = err
                        .path()
                        .and_then(|p| make_relative(p, &self.root))
                        .unwrap_or_default();
                    warn!(path = %relative, error = %err, "cannot list directory");
                    set.push(FileRecord::error(relative, describe_walk_error(&err)));
                    continue;
                }
            };

            if entry.depth() == 0 {
                continue;
            }

            let Some(te) = self.traversal_entry(&entry) else {
                continue;
            };

            if te.is_dir() {
                if stop(&set.records) {
                    debug!(path = %te.path, records = set.len(), "stopping before directory");
                    set.complete = false;
                    break;
                }
                continue;
            }

            if entry.path_is_symlink() && entry.path().is_dir() {
                debug!(path = %te.path, "skipping symlinked directory");
                continue;
            }

            let record = read_record(entry.path(), &te.path);
            if let Some(message) = record.error_text() {
                warn!(path = %te.path, error = %message, "cannot read file");
            }
            set.push(record);
        }

        Ok(set)
    }
}

fn describe_walk_error(err: &walkdir::Error) -> String {
    match err.io_error() {
        Some(io) => io.to_string(),
        None => err.to_string(),
    }
}
