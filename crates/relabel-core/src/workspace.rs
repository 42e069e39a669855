//! Root directory validation and candidate file enumeration.
//!
//! Enumeration is recomputed for every rule, so files created between rules
//! are seen by later ones. Files come back sorted by relative path (forward
//! slashes) for deterministic ordering.
//!
//! Two depths are supported:
//! - [`ScanDepth::Recursive`] (default): the whole subtree under the root
//! - [`ScanDepth::Shallow`]: the root's direct children only

use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use walkdir::WalkDir;

use crate::filter::FileFilterSpec;

// ============================================================================
// Content Hash
// ============================================================================

/// SHA-256 hash of file content, hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl ContentHash {
    /// Compute SHA-256 hash of the given bytes, returning hex-encoded string.
    pub fn compute(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        ContentHash(hex::encode(hasher.finalize()))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Scan Configuration
// ============================================================================

/// How deep enumeration descends below the root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanDepth {
    /// Only the root's direct children.
    Shallow,
    /// The whole subtree.
    #[default]
    Recursive,
}

impl fmt::Display for ScanDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanDepth::Shallow => write!(f, "shallow"),
            ScanDepth::Recursive => write!(f, "recursive"),
        }
    }
}

/// Configuration for candidate file enumeration.
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    pub depth: ScanDepth,
    /// Optional include/exclude globs.
    pub filter: Option<FileFilterSpec>,
    /// Whether to follow symlinks. When false, symlinked files are skipped.
    pub follow_symlinks: bool,
    /// Maximum file size to include (bytes). Files larger are skipped.
    pub max_file_size: Option<u64>,
}

impl ScanConfig {
    pub fn with_depth(mut self, depth: ScanDepth) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_filter(mut self, filter: Option<FileFilterSpec>) -> Self {
        self.filter = filter;
        self
    }
}

// ============================================================================
// Default Exclusion Patterns
// ============================================================================

/// Directories never descended into, at any depth below the root.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "__pycache__",
    ".pytest_cache",
    ".mypy_cache",
    ".ruff_cache",
    "target",
    ".venv",
    "venv",
    ".tox",
    ".nox",
    "*.egg-info",
];

/// Check if a root-relative directory path is, or lies inside, a
/// default-excluded directory.
fn should_exclude(relative: &Path) -> bool {
    relative.components().any(|component| {
        let Component::Normal(name) = component else {
            return false;
        };
        let name = name.to_string_lossy();
        DEFAULT_EXCLUDE_DIRS.iter().any(|pattern| match pattern.strip_prefix('*') {
            Some(suffix) => name.ends_with(suffix),
            None => name == *pattern,
        })
    })
}

// ============================================================================
// Errors
// ============================================================================

/// Error type for root validation and enumeration.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("root directory not found: {path}")]
    RootNotFound { path: String },

    #[error("root is not a directory: {path}")]
    NotADirectory { path: String },

    #[error("cannot read directory {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A directory or entry beneath the root could not be read during the walk.
    #[error("cannot walk {path}: {message}")]
    Walk { path: String, message: String },
}

// ============================================================================
// Enumeration
// ============================================================================

/// A candidate file found under the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the root (always forward slashes).
    pub path: String,
    /// Full path on disk.
    pub full_path: PathBuf,
}

/// Identity of the file behind a path, shared by hard links and symlinks to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileIdentity {
    #[cfg(unix)]
    Inode { dev: u64, ino: u64 },
    #[cfg(not(unix))]
    Canonical(PathBuf),
}

impl FileIdentity {
    /// Resolve the identity of `path`, following symlinks.
    pub fn of(path: &Path) -> io::Result<Self> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;

            let metadata = fs::metadata(path)?;
            Ok(FileIdentity::Inode {
                dev: metadata.dev(),
                ino: metadata.ino(),
            })
        }
        #[cfg(not(unix))]
        {
            Ok(FileIdentity::Canonical(fs::canonicalize(path)?))
        }
    }
}

/// Verify that `root` exists, is a directory, and can be listed.
pub fn check_root(root: &Path) -> Result<(), ScanError> {
    let path = root.display().to_string();
    let metadata = match fs::metadata(root) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ScanError::RootNotFound { path })
        }
        Err(source) => return Err(ScanError::Unreadable { path, source }),
    };
    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory { path });
    }
    fs::read_dir(root).map_err(|source| ScanError::Unreadable {
        path: path.clone(),
        source,
    })?;
    Ok(())
}

/// Enumerate regular files under `root` according to `config`.
pub fn collect_files(root: &Path, config: &ScanConfig) -> Result<Vec<SourceFile>, ScanError> {
    check_root(root)?;

    let mut walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(config.follow_symlinks);
    if config.depth == ScanDepth::Shallow {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    // Only directories are pruned; a regular file named `target` is a candidate.
    let entries = walker.into_iter().filter_entry(|e| {
        !e.file_type().is_dir()
            || e.path()
                .strip_prefix(root)
                .map(|rel| !should_exclude(rel))
                .unwrap_or(true)
    });

    for entry in entries {
        let entry = entry.map_err(|e| ScanError::Walk {
            path: e
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| root.display().to_string()),
            message: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| ScanError::Walk {
                path: entry.path().display().to_string(),
                message: e.to_string(),
            })?;
        let relative_str = relative
            .to_string_lossy()
            .replace(std::path::MAIN_SEPARATOR, "/");

        if let Some(filter) = &config.filter {
            if !filter.matches(Path::new(&relative_str)) {
                continue;
            }
        }

        if let Some(max_size) = config.max_file_size {
            let metadata = entry.metadata().map_err(|e| ScanError::Walk {
                path: entry.path().display().to_string(),
                message: e.to_string(),
            })?;
            if metadata.len() > max_size {
                tracing::debug!(path = %relative_str, size = metadata.len(), "skipping large file");
                continue;
            }
        }

        files.push(SourceFile {
            path: relative_str,
            full_path: entry.path().to_path_buf(),
        });
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

// ============================================================================
// Tests
// ============================================================================
