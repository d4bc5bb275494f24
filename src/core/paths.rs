//! Path normalization utilities
//!
//! Ensures all paths are normalized to use '/' as separator and are relative to root.

use std::path::{Path, PathBuf};

/// Normalize a path to use '/' as separator (for cross-platform consistency)
pub fn normalize_path(path: &Path) -> String {
    normalize_str(&path.to_string_lossy())
}

/// Normalize a relative path string: '/' separators, no leading "./" or '/'
pub fn normalize_str(path: &str) -> String {
    let path = path.replace('\\', "/");
    let mut path = path.as_str();
    while let Some(rest) = path.strip_prefix("./") {
        path = rest;
    }
    path.trim_start_matches('/').trim_end_matches('/').to_string()
}

/// Make a path relative to the root directory
pub fn make_relative(path: &Path, root: &Path) -> Option<String> {
    path.strip_prefix(root).ok().map(normalize_path)
}

/// Final segment of a normalized relative path
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Resolve `path` against `base` unless it is already absolute
pub fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Walk up from `start` to the first directory holding a `.git` entry
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        let path = Path::new("src/main.rs");
        assert_eq!(normalize_path(path), "src/main.rs");
    }

    #[test]
    fn test_normalize_str_separators() {
        assert_eq!(normalize_str("a\\b\\c.txt"), "a/b/c.txt");
        assert_eq!(normalize_str("./a/b/"), "a/b");
        assert_eq!(normalize_str("/a"), "a");
    }

    #[test]
    fn test_make_relative() {
        let root = Path::new("/project");
        let path = Path::new("/project/src/main.rs");
        assert_eq!(make_relative(path, root), Some("src/main.rs".to_string()));
    }

    #[test]
    fn test_make_relative_not_under_root() {
        let root = Path::new("/project");
        let path = Path::new("/other/file.rs");
        assert_eq!(make_relative(path, root), None);
    }

    #[test]
    fn test_basename() {
        assert_eq!(basename("a/b/c.txt"), "c.txt");
        assert_eq!(basename("c.txt"), "c.txt");
    }

    #[test]
    fn test_resolve() {
        let base = Path::new("/project");
        assert_eq!(
            resolve(base, Path::new(".gitignore")),
            PathBuf::from("/project/.gitignore")
        );
        assert_eq!(resolve(base, Path::new("/etc/x")), PathBuf::from("/etc/x"));
    }

    #[test]
    fn test_find_repo_root() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::create_dir(temp.path().join(".git")).unwrap();
        let nested = temp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_repo_root(&nested), Some(temp.path().to_path_buf()));
    }

    #[test]
    fn test_find_repo_root_none() {
        let temp = tempfile::tempdir().unwrap();
        let nested = temp.path().join("x");
        std::fs::create_dir_all(&nested).unwrap();
        // Temp dirs normally live outside any repository
        let found = find_repo_root(&nested);
        assert!(found.map_or(true, |root| !root.starts_with(temp.path())));
    }
}
