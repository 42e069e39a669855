//! Core infrastructure for relabel.
//!
//! This crate provides the ordered textual renaming engine:
//! - Rename rules and rule sets (built-in, JSON file, inline pairs)
//! - Literal byte-level substitution
//! - Root validation and candidate file enumeration
//! - Include/exclude glob filters
//! - The batch renamer and its report
//! - Error types and error codes
//! - JSON output types for CLI responses

pub mod error;
pub mod filter;
pub mod output;
pub mod renamer;
pub mod rules;
pub mod text;
pub mod workspace;

pub use error::{OutputErrorCode, RelabelError};
pub use renamer::{apply_rename, RenameConfig, RenameReport};
pub use rules::{Rule, RuleSet, RuleSource};
