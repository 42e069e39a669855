//! relabel - ordered bulk identifier renaming.
//!
//! This crate provides the CLI binary for relabel.
//!
//! ## Modules
//!
//! - `cli` - CLI command implementations

pub mod cli;

// Re-export core types for convenience
pub use relabel_core::error::{OutputErrorCode, RelabelError};
pub use relabel_core::output::{
    ApplyResponse, ErrorInfo, ErrorResponse, RulesResponse, SCHEMA_VERSION,
};
pub use relabel_core::renamer::{apply_rename, RenameConfig, RenameReport};
pub use relabel_core::rules::{Rule, RuleSet, RuleSource};
pub use relabel_core::workspace::{ScanConfig, ScanDepth};
