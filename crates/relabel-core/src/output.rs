//! JSON output types and serialization for CLI responses.
//!
//! ## Design Principles
//!
//! 1. **Status first:** Every response has `status` as first field
//! 2. **Deterministic:** Same input -> same output (field order, array ordering)
//! 3. **Nullable vs absent:** Absent field means "not applicable"
//! 4. **Versioned:** Schema version in response enables forward compatibility

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{OutputErrorCode, RelabelError};
use crate::renamer::{FileChange, RenameReport, RuleOutcome};
use crate::rules::{Rule, RuleSet, RuleSource};
use crate::workspace::ScanDepth;

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Summary
// ============================================================================

/// Totals for a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Rules applied (including those that matched nothing).
    pub rules_applied: usize,
    /// Distinct files modified by any rule.
    pub files_changed: usize,
    /// Total occurrences replaced.
    pub replacements: usize,
}

impl Summary {
    pub fn from_report(report: &RenameReport) -> Self {
        Summary {
            rules_applied: report.rules.len(),
            files_changed: report.files_changed().len(),
            replacements: report.replacements(),
        }
    }
}

// ============================================================================
// Per-rule Reports
// ============================================================================

/// What one rule did, for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleReport {
    /// 1-based position in the rule set.
    pub index: usize,
    pub search: String,
    pub replace: String,
    pub files_scanned: usize,
    pub replacements: usize,
    /// Files rewritten, in path order.
    pub files: Vec<FileChange>,
}

impl From<&RuleOutcome> for RuleReport {
    fn from(outcome: &RuleOutcome) -> Self {
        RuleReport {
            index: outcome.index,
            search: outcome.rule.search.clone(),
            replace: outcome.rule.replace.clone(),
            files_scanned: outcome.files_scanned,
            replacements: outcome.replacements(),
            files: outcome.changes.clone(),
        }
    }
}

// ============================================================================
// Response Structs
// ============================================================================

/// Response for `relabel apply`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    pub root: String,
    pub depth: ScanDepth,
    pub rule_source: RuleSource,
    pub rules: Vec<RuleReport>,
    pub summary: Summary,
}

impl ApplyResponse {
    pub fn new(report: &RenameReport, rule_source: RuleSource) -> Self {
        ApplyResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            root: report.root.clone(),
            depth: report.depth,
            rule_source,
            rules: report.rules.iter().map(RuleReport::from).collect(),
            summary: Summary::from_report(report),
        }
    }
}

/// Response for `relabel rules`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    pub source: RuleSource,
    pub rules: Vec<Rule>,
}

impl RulesResponse {
    pub fn new(rules: &RuleSet, source: RuleSource) -> Self {
        RulesResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            source,
            rules: rules.rules().to_vec(),
        }
    }
}

// ============================================================================
// Error Output
// ============================================================================

/// Error details for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code (also the process exit code).
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Error-specific structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorInfo {
    pub fn from_error(err: &RelabelError) -> Self {
        let details = match err {
            RelabelError::InvalidArguments { details, .. } => details.clone(),
            RelabelError::DirectoryAccess { path, .. } => Some(serde_json::json!({ "path": path })),
            RelabelError::FileAccess {
                path, operation, ..
            } => Some(serde_json::json!({ "path": path, "operation": operation })),
            RelabelError::InternalError { .. } => None,
        };

        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
            details,
        }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn from_error(err: &RelabelError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

// ============================================================================
// Emission
// ============================================================================

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================
