//! Ignore rules
//!
//! Raw pattern lines are parsed once into immutable [`IgnoreRule`] values,
//! then evaluated against candidate paths:
//! - a pattern without '/' matches the final path segment anywhere
//! - a pattern containing '/' (or starting with one) matches relative to root
//! - trailing '/' restricts the rule to directories
//! - leading '!' negates; among matching rules the last one decides
//!
//! Builtin names are checked separately and cannot be negated.

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::core::model::TraversalEntry;
use crate::core::paths::{basename, normalize_str};

/// Names ignored on every run, whatever the ignore file says
pub const DEFAULT_BUILTINS: &[&str] = &[".git", "__pycache__", ".cache", ".pytest_cache"];

/// Default ignore-pattern file, relative to the scan root
pub const DEFAULT_IGNORE_FILE: &str = ".gitignore";

#[derive(Debug, Clone)]
enum Matcher {
    Literal(String),
    Glob(GlobMatcher),
}

impl Matcher {
    fn build(pattern: &str) -> Self {
        if !pattern.contains(['*', '?', '[']) {
            return Matcher::Literal(pattern.to_string());
        }

        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .backslash_escape(true)
            .build();

        match glob {
            Ok(glob) => Matcher::Glob(glob.compile_matcher()),
            Err(e) => {
                warn!(pattern, error = %e, "invalid glob, treating as literal name");
                Matcher::Literal(pattern.to_string())
            }
        }
    }

    fn is_match(&self, candidate: &str) -> bool {
        match self {
            Matcher::Literal(name) => name == candidate,
            Matcher::Glob(glob) => glob.is_match(candidate),
        }
    }
}

/// One parsed pattern line
#[derive(Debug, Clone)]
pub struct IgnoreRule {
    source: String,
    negated: bool,
    dir_only: bool,
    anchored: bool,
    rooted: bool,
    matcher: Matcher,
}

impl IgnoreRule {
    /// Parse a raw line. Blank lines, comments and patterns with nothing
    /// left after stripping markers yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }

        let mut body = trimmed;
        let mut negated = false;
        if let Some(rest) = body.strip_prefix('!') {
            negated = true;
            body = rest;
        } else if body.starts_with("\\!") || body.starts_with("\\#") {
            body = &body[1..];
        }

        let dir_only = body.ends_with('/');
        let body = body.trim_end_matches('/');
        let anchored = body.starts_with('/');
        let body = body.trim_start_matches('/');
        if body.is_empty() {
            return None;
        }

        Some(Self {
            source: trimmed.to_string(),
            negated,
            dir_only,
            anchored,
            rooted: anchored || body.contains('/'),
            matcher: Matcher::build(body),
        })
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn is_dir_only(&self) -> bool {
        self.dir_only
    }

    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    /// Whether this rule matches a normalized relative path.
    /// Negation is not applied here.
    pub fn matches(&self, path: &str, is_dir: bool) -> bool {
        if self.dir_only && !is_dir {
            return false;
        }

        if self.rooted {
            self.matcher.is_match(path)
        } else {
            match &self.matcher {
                Matcher::Literal(_) => self.matcher.is_match(basename(path)),
                Matcher::Glob(_) => {
                    self.matcher.is_match(basename(path)) || self.matcher.is_match(path)
                }
            }
        }
    }
}

impl fmt::Display for IgnoreRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Ordered rules plus the builtin names
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<IgnoreRule>,
    builtins: BTreeSet<String>,
}

impl RuleSet {
    /// Compile raw pattern lines and a set of builtin names
    pub fn compile<I, S, B, T>(lines: I, builtins: B) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        B: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut set = Self {
            rules: Vec::new(),
            builtins: builtins.into_iter().map(Into::into).collect(),
        };
        set.extend(lines);
        set
    }

    /// Compile the ignore file at `path`. A missing file yields no user rules.
    pub fn load<B, T>(path: &Path, builtins: B) -> Result<Self>
    where
        B: IntoIterator<Item = T>,
        T: Into<String>,
    {
        if !path.is_file() {
            debug!(path = %path.display(), "no ignore file");
            return Ok(Self::compile(std::iter::empty::<&str>(), builtins));
        }

        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read ignore file {}", path.display()))?;
        let text = String::from_utf8_lossy(&bytes);
        let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
        let set = Self::compile(text.lines(), builtins);
        debug!(path = %path.display(), rules = set.rules.len(), "loaded ignore file");
        Ok(set)
    }

    /// Append rules after the existing ones, so they take precedence
    pub fn extend<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.rules
            .extend(lines.into_iter().filter_map(|l| IgnoreRule::parse(l.as_ref())));
    }

    pub fn rules(&self) -> &[IgnoreRule] {
        &self.rules
    }

    pub fn builtins(&self) -> impl Iterator<Item = &str> {
        self.builtins.iter().map(String::as_str)
    }

    /// Decide whether a relative path is ignored
    pub fn is_ignored(&self, path: &str, is_dir: bool) -> bool {
        let path = normalize_str(path);
        if self.builtins.contains(basename(&path)) {
            return true;
        }

        self.rules
            .iter()
            .rev()
            .find(|rule| rule.matches(&path, is_dir))
            .is_some_and(|rule| !rule.negated)
    }

    pub fn is_entry_ignored(&self, entry: &TraversalEntry) -> bool {
        self.is_ignored(&entry.path, entry.is_dir())
    }
}
