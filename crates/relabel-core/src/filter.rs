//! File filter specification for restricting which files a run may touch.
//!
//! Patterns are gitignore-style globs, matched against paths relative to the
//! root directory (forward slashes).
//!
//! ## Syntax
//!
//! - Patterns without `!` prefix are inclusions
//! - Patterns with `!` prefix are exclusions
//! - Standard glob syntax: `*`, `**`, `?`, `[abc]`
//!
//! ## Semantics
//!
//! 1. If only exclusions are specified: start from all files, then apply exclusions
//! 2. If inclusions are specified: start with matching files, then apply exclusions
//!
//! Version-control and build directories are pruned separately during the
//! directory walk (see `workspace::DEFAULT_EXCLUDE_DIRS`), whether or not a
//! filter is present.

use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use thiserror::Error;

/// Error type for file filter operations.
#[derive(Debug, Error)]
pub enum FilterError {
    /// Invalid glob pattern syntax.
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Parsed file filter specification.
#[derive(Debug, Clone)]
pub struct FileFilterSpec {
    /// Glob set for inclusion patterns. If `None`, all files are included.
    inclusions: Option<GlobSet>,
    /// Glob set for exclusion patterns.
    exclusions: GlobSet,
}

impl FileFilterSpec {
    /// Parse filter patterns from CLI arguments.
    ///
    /// Returns `None` if no patterns are provided (all files are candidates).
    ///
    /// ```
    /// use relabel_core::filter::FileFilterSpec;
    /// use std::path::Path;
    ///
    /// assert!(FileFilterSpec::parse(&[]).unwrap().is_none());
    ///
    /// let spec = FileFilterSpec::parse(&["**/*.py".to_string(), "!tests/**".to_string()])
    ///     .unwrap()
    ///     .unwrap();
    /// assert!(spec.matches(Path::new("pints/_core.py")));
    /// assert!(!spec.matches(Path::new("tests/test_core.py")));
    /// ```
    pub fn parse(args: &[String]) -> Result<Option<Self>, FilterError> {
        if args.is_empty() {
            return Ok(None);
        }

        let mut inclusion_patterns = Vec::new();
        let mut exclusion_patterns = Vec::new();

        for arg in args {
            match arg.strip_prefix('!') {
                Some(pattern) => exclusion_patterns.push(pattern.to_string()),
                None => inclusion_patterns.push(arg.clone()),
            }
        }

        let inclusions = if inclusion_patterns.is_empty() {
            None
        } else {
            Some(build_glob_set(&inclusion_patterns)?)
        };
        let exclusions = build_glob_set(&exclusion_patterns)?;

        Ok(Some(FileFilterSpec {
            inclusions,
            exclusions,
        }))
    }

    /// Check if a relative path passes the filter.
    ///
    /// A path matches if it is not excluded and, when inclusions are
    /// specified, matches at least one of them.
    pub fn matches(&self, path: &Path) -> bool {
        if self.exclusions.is_match(path) {
            return false;
        }

        match &self.inclusions {
            Some(inclusions) => inclusions.is_match(path),
            None => true,
        }
    }

    /// Check if this filter has any inclusion patterns.
    pub fn has_inclusions(&self) -> bool {
        self.inclusions.is_some()
    }

    /// Check if this filter has any exclusion patterns.
    pub fn has_exclusions(&self) -> bool {
        !self.exclusions.is_empty()
    }
}

/// Build a GlobSet from a list of pattern strings.
fn build_glob_set(patterns: &[String]) -> Result<GlobSet, FilterError> {
    let mut builder = GlobSetBuilder::new();

    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| FilterError::InvalidPattern {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;
        builder.add(glob);
    }

    builder.build().map_err(|e| FilterError::InvalidPattern {
        pattern: "<combined>".to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(patterns: &[&str]) -> FileFilterSpec {
        let args: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        FileFilterSpec::parse(&args).unwrap().unwrap()
    }

    // =========================================================================
    // Parse Tests
    // =========================================================================

    #[test]
    fn test_filter_parse_empty_returns_none() {
        assert!(FileFilterSpec::parse(&[]).unwrap().is_none());
    }

    #[test]
    fn test_filter_parse_mixed() {
        let spec = spec(&["pints/**/*.py", "!pints/tests/**", "docs/**/*.rst"]);
        assert!(spec.has_inclusions());
        assert!(spec.has_exclusions());
    }

    #[test]
    fn test_filter_parse_exclusion_only() {
        let spec = spec(&["!**/*.ipynb"]);
        assert!(!spec.has_inclusions());
        assert!(spec.has_exclusions());
    }

    #[test]
    fn test_filter_parse_invalid_pattern() {
        let err = FileFilterSpec::parse(&["[invalid".to_string()]).unwrap_err();
        assert!(matches!(err, FilterError::InvalidPattern { .. }));
    }

    // =========================================================================
    // Match Tests
    // =========================================================================

    #[test]
    fn test_filter_matches_inclusion() {
        let spec = spec(&["**/*.py"]);

        assert!(spec.matches(Path::new("_log_pdfs.py")));
        assert!(spec.matches(Path::new("toy/_gaussian.py")));
        assert!(!spec.matches(Path::new("README.md")));
    }

    #[test]
    fn test_filter_exclusion_only_includes_all_else() {
        let spec = spec(&["!tests/**"]);

        assert!(spec.matches(Path::new("_core.py")));
        assert!(spec.matches(Path::new("docs/source/log_priors.rst")));
        assert!(!spec.matches(Path::new("tests/test_log_priors.py")));
    }

    #[test]
    fn test_filter_matches_combined() {
        let spec = spec(&["**/*.py", "!**/test_*.py"]);

        assert!(spec.matches(Path::new("_log_priors.py")));
        assert!(!spec.matches(Path::new("tests/test_log_priors.py")));
        assert!(!spec.matches(Path::new("notes.txt")));
    }

    #[test]
    fn test_filter_multiple_exclusions() {
        let spec = spec(&["!tests/**", "!**/conftest.py"]);

        assert!(spec.matches(Path::new("_core.py")));
        assert!(!spec.matches(Path::new("tests/test_core.py")));
        assert!(!spec.matches(Path::new("sub/conftest.py")));
    }
}
