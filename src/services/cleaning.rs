use indexmap::IndexSet;
use regex::Regex;

use crate::models::LIST_SEPARATOR;

/// Filesystem existence probe used when deciding whether an entry is stale.
///
/// The only external dependency of the cleaning algorithm. Implementations
/// must tolerate malformed path strings without panicking; anything the host
/// cannot interpret is simply treated as non-existent.
#[cfg_attr(test, mockall::automock)]
pub trait FilesystemChecker {
    fn exists(&self, path: &str) -> bool;
}

/// Checker backed by the real host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFilesystem;

impl FilesystemChecker for RealFilesystem {
    fn exists(&self, path: &str) -> bool {
        // std::fs metadata lookups never panic on odd input; an unparseable
        // path just reports as absent.
        camino::Utf8Path::new(path).exists()
    }
}

/// Service that maps a raw variable value to its cleaned form.
///
/// A value containing the list separator is treated as a semicolon-delimited
/// list: entries are trimmed, deduplicated (first occurrence wins, compared
/// case-sensitively on the trimmed string) and filtered to existing paths.
/// A scalar value is trimmed and, when it looks like a path, checked for
/// existence. `None` means "remove this variable", never "set it to empty".
///
/// No side effects; the filesystem check is injected so the algorithm can be
/// exercised without touching the host disk.
pub struct CleanerService {
    fs: Box<dyn FilesystemChecker>,

    /// Regex for detecting a drive-letter prefix ("C:", "d:stuff")
    drive_pattern: Regex,
}

impl CleanerService {
    /// Create a cleaner backed by the real filesystem
    pub fn new() -> Self {
        Self::with_checker(Box::new(RealFilesystem))
    }

    /// Create a cleaner with an injected existence checker (tests, dry runs)
    pub fn with_checker(fs: Box<dyn FilesystemChecker>) -> Self {
        Self {
            fs,
            drive_pattern: Regex::new(r"^[A-Za-z]:").expect("Invalid drive letter regex"),
        }
    }

    /// Clean a raw value. `None` signals that the variable should be removed.
    pub fn clean(&self, value: &str) -> Option<String> {
        if value.is_empty() {
            return None;
        }

        if value.contains(LIST_SEPARATOR) {
            self.clean_list(value)
        } else {
            self.clean_scalar(value)
        }
    }

    /// Split, trim, dedup and existence-filter a list value.
    fn clean_list(&self, value: &str) -> Option<String> {
        let mut entries: IndexSet<&str> = IndexSet::new();
        for piece in value.split(LIST_SEPARATOR) {
            let trimmed = piece.trim();
            if trimmed.is_empty() {
                continue;
            }
            // First occurrence wins; later duplicates are dropped.
            entries.insert(trimmed);
        }

        let kept: Vec<&str> = entries
            .into_iter()
            .filter(|entry| self.fs.exists(entry))
            .collect();

        if kept.is_empty() {
            None
        } else {
            Some(kept.join(&LIST_SEPARATOR.to_string()))
        }
    }

    /// Trim a scalar value; drop it when it points at a path that is gone.
    fn clean_scalar(&self, value: &str) -> Option<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }

        // Values without path shape (flags, numbers) are never existence-checked.
        if self.looks_path_like(trimmed) && !self.fs.exists(trimmed) {
            return None;
        }

        Some(trimmed.to_string())
    }

    /// A value is path-like when it carries a separator or a drive-letter colon.
    fn looks_path_like(&self, value: &str) -> bool {
        value.contains('\\') || value.contains('/') || self.drive_pattern.is_match(value)
    }
}

impl Default for CleanerService {
    fn default() -> Self {
        Self::new()
    }
}
