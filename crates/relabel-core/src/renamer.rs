//! Ordered in-place batch renaming.
//!
//! [`apply_rename`] walks the rule set in order. For each rule it enumerates
//! the candidate files under the root, keeps the ones whose raw bytes contain
//! the search text, and rewrites each of those in place with every
//! non-overlapping occurrence replaced. A rule's writes are complete (file
//! closed) before the next rule enumerates, so later rules see earlier output.
//!
//! Failure policy is fail-fast: the first directory or file access error
//! aborts the remaining sequence. Files already rewritten stay rewritten.
//! There is no backup and no dry run.
//!
//! Matching is a plain case-sensitive substring match. A search text that
//! occurs inside a longer identifier is replaced there too; `Normal ->
//! Gaussian` turns `AbNormalLogPrior` into `AbGaussianLogPrior`.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{FileOperation, RelabelError};
use crate::rules::{Rule, RuleSet};
use crate::text::{byte_offset_to_position, looks_binary, LiteralReplacer};
use crate::workspace::{
    check_root, collect_files, ContentHash, FileIdentity, ScanConfig, ScanDepth, SourceFile,
};

// ============================================================================
// Configuration
// ============================================================================

/// Where to rename and how to enumerate files.
#[derive(Debug, Clone)]
pub struct RenameConfig {
    pub root: PathBuf,
    pub scan: ScanConfig,
}

impl RenameConfig {
    /// Recursive scan of `root` with no filter.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        RenameConfig {
            root: root.into(),
            scan: ScanConfig::default(),
        }
    }

    pub fn with_scan(mut self, scan: ScanConfig) -> Self {
        self.scan = scan;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

// ============================================================================
// Report
// ============================================================================

/// One file rewritten by one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// Path relative to the root.
    pub path: String,
    /// Number of occurrences replaced.
    pub occurrences: usize,
    pub before_hash: ContentHash,
    pub after_hash: ContentHash,
}

/// What one rule did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOutcome {
    /// 1-based position in the rule set.
    pub index: usize,
    pub rule: Rule,
    /// Candidate files examined.
    pub files_scanned: usize,
    /// Files rewritten, in path order. Empty when the rule matched nothing.
    pub changes: Vec<FileChange>,
}

impl RuleOutcome {
    pub fn replacements(&self) -> usize {
        self.changes.iter().map(|c| c.occurrences).sum()
    }

    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Result of a complete run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameReport {
    pub root: String,
    pub depth: ScanDepth,
    pub rules: Vec<RuleOutcome>,
}

impl RenameReport {
    /// Distinct files changed by any rule.
    pub fn files_changed(&self) -> BTreeSet<&str> {
        self.rules
            .iter()
            .flat_map(|r| r.changes.iter().map(|c| c.path.as_str()))
            .collect()
    }

    /// Total occurrences replaced across all rules.
    pub fn replacements(&self) -> usize {
        self.rules.iter().map(RuleOutcome::replacements).sum()
    }

    /// True when no rule changed any file.
    pub fn is_noop(&self) -> bool {
        self.rules.iter().all(RuleOutcome::is_noop)
    }
}

// ============================================================================
// Batch Renamer
// ============================================================================

/// Apply `rules` in order to every candidate file under `config.root`.
pub fn apply_rename(config: &RenameConfig, rules: &RuleSet) -> Result<RenameReport, RelabelError> {
    check_root(config.root())?;

    let mut outcomes = Vec::with_capacity(rules.len());
    for (i, rule) in rules.iter().enumerate() {
        let outcome = apply_rule(config, i + 1, rule)?;
        info!(
            rule = %rule,
            files = outcome.changes.len(),
            replacements = outcome.replacements(),
            "applied rule {}/{}",
            i + 1,
            rules.len()
        );
        outcomes.push(outcome);
    }

    Ok(RenameReport {
        root: config.root().display().to_string(),
        depth: config.scan.depth,
        rules: outcomes,
    })
}

/// Apply a single rule to the current file set.
fn apply_rule(config: &RenameConfig, index: usize, rule: &Rule) -> Result<RuleOutcome, RelabelError> {
    let replacer = LiteralReplacer::new(rule).map_err(|e| {
        RelabelError::invalid_args(format!("rule {} cannot be compiled: {}", index, e))
    })?;

    let files = collect_files(config.root(), &config.scan)?;
    let mut seen = HashSet::with_capacity(files.len());
    let mut changes = Vec::new();
    for file in &files {
        // Hard links and followed symlinks reach one file through several
        // paths; it is rewritten once per rule, under the first path in order.
        let identity = FileIdentity::of(&file.full_path)
            .map_err(|e| RelabelError::file_access(&file.path, FileOperation::Read, &e))?;
        if !seen.insert(identity) {
            debug!(path = %file.path, "skipping alias of an already visited file");
            continue;
        }
        if let Some(change) = rewrite_file(file, &replacer)? {
            changes.push(change);
        }
    }

    if changes.is_empty() {
        debug!(rule = %rule, "no files matched");
    }

    Ok(RuleOutcome {
        index,
        rule: rule.clone(),
        files_scanned: files.len(),
        changes,
    })
}

/// Rewrite one file if it contains the search text.
///
/// Returns `Ok(None)` for files without an occurrence and for binary files;
/// neither is touched on disk.
fn rewrite_file(
    file: &SourceFile,
    replacer: &LiteralReplacer,
) -> Result<Option<FileChange>, RelabelError> {
    let content = fs::read(&file.full_path)
        .map_err(|e| RelabelError::file_access(&file.path, FileOperation::Read, &e))?;

    let Some(first) = replacer.find(&content) else {
        return Ok(None);
    };
    if looks_binary(&content) {
        debug!(path = %file.path, "skipping binary file");
        return Ok(None);
    }

    let occurrences = replacer.count(&content);
    let rewritten = replacer.replace_all(&content);
    fs::write(&file.full_path, &rewritten)
        .map_err(|e| RelabelError::file_access(&file.path, FileOperation::Write, &e))?;

    let (line, col) = byte_offset_to_position(&content, first);
    debug!(
        path = %file.path,
        occurrences,
        first_line = line,
        first_col = col,
        "rewrote file"
    );

    Ok(Some(FileChange {
        path: file.path.clone(),
        occurrences,
        before_hash: ContentHash::compute(&content),
        after_hash: ContentHash::compute(&rewritten),
    }))
}

// ============================================================================
// Tests
// ============================================================================
