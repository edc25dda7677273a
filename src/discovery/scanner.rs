//! Recursive directory scan with skip rules and path deduplication

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::{normalize_extension, Config};

/// Why a file was left out of the upload set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Hidden,
    ExcludedExtension(String),
    TooLarge(u64),
    Unreadable,
}

/// File filters applied before any task is created
#[derive(Debug, Clone, Default)]
pub struct SkipRules {
    /// Lowercase extensions including the leading dot
    pub skip_extensions: HashSet<String>,
    pub max_file_size: Option<u64>,
}

impl SkipRules {
    pub fn new<I, S>(skip_extensions: I, max_file_size: Option<u64>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            skip_extensions: skip_extensions
                .into_iter()
                .map(|e| normalize_extension(e.as_ref()))
                .collect(),
            max_file_size,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            skip_extensions: config.skip_extensions.clone(),
            max_file_size: config.max_file_size,
        }
    }

    /// Check a file against the rules, returning the reason it should be skipped
    pub fn check(&self, path: &Path) -> Option<SkipReason> {
        let hidden = path
            .file_name()
            .is_some_and(|n| n.as_encoded_bytes().first() == Some(&b'.'));
        if hidden {
            return Some(SkipReason::Hidden);
        }

        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            let ext = format!(".{}", ext.to_lowercase());
            if self.skip_extensions.contains(&ext) {
                return Some(SkipReason::ExcludedExtension(ext));
            }
        }

        if let Some(limit) = self.max_file_size {
            match fs::metadata(path) {
                Ok(metadata) if metadata.len() > limit => {
                    return Some(SkipReason::TooLarge(metadata.len()));
                }
                Ok(_) => {}
                Err(_) => return Some(SkipReason::Unreadable),
            }
        }

        None
    }
}

/// Canonicalize source roots, keeping the given path when resolution fails
pub fn resolve_roots(sources: &[PathBuf]) -> Vec<PathBuf> {
    sources
        .iter()
        .map(|p| fs::canonicalize(p).unwrap_or_else(|_| p.clone()))
        .collect()
}

/// Walk every source root and return the canonical paths of upload candidates,
/// in discovery order, each path at most once
pub fn discover_files(sources: &[PathBuf], rules: &SkipRules) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut seen: HashSet<PathBuf> = HashSet::new();

    for source in sources {
        for entry in WalkDir::new(source).follow_links(false) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Failed to access entry during directory walk: {}", e);
                    continue;
                }
            };

            if entry.file_type().is_dir() || !entry.path().is_file() {
                continue;
            }

            let path = match fs::canonicalize(entry.path()) {
                Ok(p) => p,
                Err(e) => {
                    warn!("Failed to resolve {:?}: {}, skipping", entry.path(), e);
                    continue;
                }
            };

            if seen.contains(&path) {
                continue;
            }

            match rules.check(&path) {
                None => {
                    seen.insert(path.clone());
                    files.push(path);
                }
                Some(SkipReason::TooLarge(size)) => {
                    warn!(
                        "Skipping {} (too large: {:.2} MB)",
                        path.display(),
                        size as f64 / 1024.0 / 1024.0
                    );
                }
                Some(SkipReason::Unreadable) => {
                    warn!("Failed to get metadata for {:?}, skipping", path);
                }
                Some(reason) => {
                    debug!("Skipping {} ({:?})", path.display(), reason);
                }
            }
        }
    }

    files
}
