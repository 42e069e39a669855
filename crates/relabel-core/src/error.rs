//! Error types and error code constants for relabel.
//!
//! This module provides a unified error type (`RelabelError`) that bridges
//! domain-specific errors from the subsystems (rule loading, file filters,
//! directory scanning) into a common format suitable for JSON output and
//! process exit codes.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad rule, unreadable rules file, bad glob)
//! - `3`: Directory access errors (root missing, not a directory, unreadable)
//! - `4`: File access errors (a matched file could not be read or written)
//! - `10`: Internal errors (bugs, unexpected state)
//!
//! Any of these aborts the remaining rule sequence. There is no retry.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filter::FilterError;
use crate::rules::RuleError;
use crate::workspace::ScanError;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output and process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad rule, malformed rules file, bad glob).
    InvalidArguments = 2,
    /// Root directory (or a directory beneath it) could not be accessed.
    DirectoryAccess = 3,
    /// A matched file could not be read or written.
    FileAccess = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// File Operation
// ============================================================================

/// Which half of the read-modify-write cycle failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOperation {
    Read,
    Write,
}

impl fmt::Display for FileOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOperation::Read => write!(f, "read"),
            FileOperation::Write => write!(f, "write"),
        }
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for CLI output.
///
/// Every subsystem error is converted to this type before being rendered.
/// Each variant carries the failing path (where there is one) so the
/// diagnostic names it.
#[derive(Debug, Error)]
pub enum RelabelError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments {
        message: String,
        details: Option<serde_json::Value>,
    },

    /// The root directory, or a directory beneath it, is missing or unreadable.
    #[error("cannot access directory {path}: {reason}")]
    DirectoryAccess { path: String, reason: String },

    /// A matched file could not be read or written.
    #[error("cannot {operation} file {path}: {reason}")]
    FileAccess {
        path: String,
        operation: FileOperation,
        reason: String,
    },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&RelabelError> for OutputErrorCode {
    fn from(err: &RelabelError) -> Self {
        match err {
            RelabelError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            RelabelError::DirectoryAccess { .. } => OutputErrorCode::DirectoryAccess,
            RelabelError::FileAccess { .. } => OutputErrorCode::FileAccess,
            RelabelError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<RelabelError> for OutputErrorCode {
    fn from(err: RelabelError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Bridge: RuleError -> RelabelError
// ============================================================================

impl From<RuleError> for RelabelError {
    fn from(err: RuleError) -> Self {
        let details = match &err {
            RuleError::EmptySearchText { index } => Some(serde_json::json!({ "rule": index })),
            RuleError::MalformedPair { input } => Some(serde_json::json!({ "input": input })),
            RuleError::RulesFile { path, .. } => Some(serde_json::json!({ "path": path })),
            RuleError::EmptyRuleSet => None,
        };
        RelabelError::InvalidArguments {
            message: err.to_string(),
            details,
        }
    }
}

// ============================================================================
// Bridge: FilterError -> RelabelError
// ============================================================================

impl From<FilterError> for RelabelError {
    fn from(err: FilterError) -> Self {
        match err {
            FilterError::InvalidPattern { ref pattern, .. } => RelabelError::InvalidArguments {
                details: Some(serde_json::json!({ "pattern": pattern })),
                message: err.to_string(),
            },
        }
    }
}

// ============================================================================
// Bridge: ScanError -> RelabelError
// ============================================================================

impl From<ScanError> for RelabelError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::RootNotFound { path } => RelabelError::DirectoryAccess {
                path,
                reason: "no such directory".to_string(),
            },
            ScanError::NotADirectory { path } => RelabelError::DirectoryAccess {
                path,
                reason: "not a directory".to_string(),
            },
            ScanError::Unreadable { path, source } => RelabelError::DirectoryAccess {
                path,
                reason: source.to_string(),
            },
            ScanError::Walk { path, message } => RelabelError::DirectoryAccess {
                path,
                reason: message,
            },
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl RelabelError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        RelabelError::InvalidArguments {
            message: message.into(),
            details: None,
        }
    }

    /// Create a file access error from an I/O failure.
    pub fn file_access(
        path: impl Into<String>,
        operation: FileOperation,
        source: &std::io::Error,
    ) -> Self {
        RelabelError::FileAccess {
            path: path.into(),
            operation,
            reason: source.to_string(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        RelabelError::InternalError {
            message: message.into(),
        }
    }

    /// Path named by this error, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            RelabelError::DirectoryAccess { path, .. } | RelabelError::FileAccess { path, .. } => {
                Some(path)
            }
            _ => None,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================
