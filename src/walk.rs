//! Source file discovery.
//!
//! The walker yields candidate files under a repository root lazily. Within
//! each directory, files come before subdirectories and both are sorted by
//! name. Excluded directories are pruned before descent, and files larger
//! than the size ceiling are skipped without a trace in the result.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::config::WalkerConfig;
use crate::error::{AnalysisError, ConfigError};

/// A candidate source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Repo-relative path with `/` separators.
    pub path: String,
    /// Location on disk.
    pub absolute_path: PathBuf,
    /// Size in bytes.
    pub size: u64,
}

impl SourceFile {
    /// Extension without the dot, or "" if there is none.
    pub fn extension(&self) -> &str {
        self.absolute_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
    }
}

/// Enumerates source files under a root directory.
#[derive(Debug, Clone)]
pub struct Walker {
    exclude_dirs: HashSet<String>,
    exclude_paths: GlobSet,
    extensions: Vec<String>,
    max_file_size: u64,
}

impl Walker {
    /// Build a walker from configuration. Fails only on a bad exclude glob.
    pub fn new(config: &WalkerConfig) -> Result<Self, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &config.exclude_paths {
            let glob = Glob::new(pattern).map_err(|source| ConfigError::InvalidGlob {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
        }
        let exclude_paths = builder.build().map_err(|source| ConfigError::InvalidGlob {
            pattern: config.exclude_paths.join(", "),
            source,
        })?;

        Ok(Self {
            exclude_dirs: config.exclude_dirs.iter().cloned().collect(),
            exclude_paths,
            extensions: config.normalized_extensions(),
            max_file_size: config.max_file_size,
        })
    }

    /// Start walking `root`.
    ///
    /// Fails if the root itself cannot be read. Errors below the root
    /// (unreadable subdirectories, vanished files) are logged and skipped.
    pub fn walk(&self, root: &Path) -> Result<Walk, AnalysisError> {
        let metadata = std::fs::metadata(root).map_err(|source| AnalysisError::RootUnreadable {
            path: root.to_path_buf(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(AnalysisError::RootNotDirectory {
                path: root.to_path_buf(),
            });
        }
        std::fs::read_dir(root).map_err(|source| AnalysisError::RootUnreadable {
            path: root.to_path_buf(),
            source,
        })?;

        let exclude_dirs = self.exclude_dirs.clone();
        let entries = WalkDir::new(root)
            .follow_links(false)
            .sort_by(|a, b| {
                a.file_type()
                    .is_dir()
                    .cmp(&b.file_type().is_dir())
                    .then_with(|| a.file_name().cmp(b.file_name()))
            })
            .into_iter()
            .filter_entry(move |e| {
                // Never prune the root itself.
                if e.depth() == 0 || !e.file_type().is_dir() {
                    return true;
                }
                !exclude_dirs.contains(&*e.file_name().to_string_lossy())
            });

        Ok(Walk {
            root: root.to_path_buf(),
            entries: Box::new(entries),
            walker: self.clone(),
        })
    }

    /// Whether `name` ends with one of the allowed extensions.
    fn has_allowed_extension(&self, name: &str) -> bool {
        self.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }

    fn accept(&self, root: &Path, entry: &DirEntry) -> Option<SourceFile> {
        if !entry.file_type().is_file() {
            return None;
        }

        let name = entry.file_name().to_string_lossy();
        if !self.has_allowed_extension(&name) {
            return None;
        }

        let rel_path = relative_path(root, entry.path());
        if self.exclude_paths.is_match(&rel_path) {
            debug!(file = %rel_path, "excluded by path pattern");
            return None;
        }

        let size = match entry.metadata() {
            Ok(m) => m.len(),
            Err(e) => {
                debug!(file = %rel_path, error = %e, "skipping unreadable file");
                return None;
            }
        };
        if size > self.max_file_size {
            debug!(file = %rel_path, size, limit = self.max_file_size, "skipping oversize file");
            return None;
        }

        Some(SourceFile {
            path: rel_path,
            absolute_path: entry.path().to_path_buf(),
            size,
        })
    }
}

/// Lazy iterator over the source files of one walk.
pub struct Walk {
    root: PathBuf,
    entries: Box<dyn Iterator<Item = walkdir::Result<DirEntry>> + Send>,
    walker: Walker,
}

impl Iterator for Walk {
    type Item = SourceFile;

    fn next(&mut self) -> Option<SourceFile> {
        loop {
            match self.entries.next()? {
                Ok(entry) => {
                    if let Some(file) = self.walker.accept(&self.root, &entry) {
                        return Some(file);
                    }
                }
                Err(e) => debug!(error = %e, "skipping unreadable entry"),
            }
        }
    }
}

/// Repo-relative path with forward slashes.
fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
