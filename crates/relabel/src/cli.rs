//! CLI front door helpers.
//!
//! Provides the command implementations behind the `relabel` binary:
//! - `apply` - run the rule set over a root directory, rewriting files in place
//! - `rules` - show the effective rule set without touching any file
//!
//! Both return typed responses; `main.rs` decides whether to print them as
//! JSON or as a text summary.
//!
//! ## Rule Set Resolution
//!
//! Inline `--rule OLD=NEW` pairs win, then a `--rules` JSON file, then the
//! built-in set.
//!
//! ## Error Handling
//!
//! All functions return `Result<T, RelabelError>`. The `RelabelError` type
//! provides stable error codes for JSON output and the process exit status.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use relabel_core::error::RelabelError;
use relabel_core::filter::FileFilterSpec;
use relabel_core::output::{ApplyResponse, RulesResponse};
use relabel_core::renamer::{apply_rename, RenameConfig};
use relabel_core::rules::{RuleSet, RuleSource};
use relabel_core::workspace::{ScanConfig, ScanDepth};

/// Root used when none is given: the package directory the built-in rules target.
pub const DEFAULT_ROOT: &str = "pints";

/// Everything `relabel apply` needs.
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    pub root: PathBuf,
    pub rules_file: Option<PathBuf>,
    pub inline_rules: Vec<String>,
    pub depth: ScanDepth,
    /// Glob patterns; `!` prefix excludes.
    pub filter: Vec<String>,
    pub follow_symlinks: bool,
    pub max_file_size: Option<u64>,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        ApplyOptions {
            root: PathBuf::from(DEFAULT_ROOT),
            rules_file: None,
            inline_rules: Vec::new(),
            depth: ScanDepth::default(),
            filter: Vec::new(),
            follow_symlinks: false,
            max_file_size: None,
        }
    }
}

/// Pick the effective rule set.
pub fn resolve_rules(
    rules_file: Option<&Path>,
    inline_rules: &[String],
) -> Result<(RuleSet, RuleSource), RelabelError> {
    if !inline_rules.is_empty() {
        return Ok((RuleSet::from_pairs(inline_rules)?, RuleSource::Inline));
    }
    if let Some(path) = rules_file {
        return Ok((RuleSet::load(path)?, RuleSource::File));
    }
    Ok((RuleSet::builtin(), RuleSource::Builtin))
}

/// Build the enumeration config from CLI options.
pub fn scan_config(options: &ApplyOptions) -> Result<ScanConfig, RelabelError> {
    Ok(ScanConfig {
        depth: options.depth,
        filter: FileFilterSpec::parse(&options.filter)?,
        follow_symlinks: options.follow_symlinks,
        max_file_size: options.max_file_size,
    })
}

/// Execute `relabel apply`.
pub fn run_apply(options: &ApplyOptions) -> Result<ApplyResponse, RelabelError> {
    let (rules, source) = resolve_rules(options.rules_file.as_deref(), &options.inline_rules)?;
    let config = RenameConfig::new(&options.root).with_scan(scan_config(options)?);

    tracing::info!(
        root = %options.root.display(),
        depth = %options.depth,
        rules = rules.len(),
        source = %source,
        "starting rename"
    );
    let report = apply_rename(&config, &rules)?;
    Ok(ApplyResponse::new(&report, source))
}

/// Execute `relabel rules`.
pub fn run_rules(
    rules_file: Option<&Path>,
    inline_rules: &[String],
) -> Result<RulesResponse, RelabelError> {
    let (rules, source) = resolve_rules(rules_file, inline_rules)?;
    Ok(RulesResponse::new(&rules, source))
}

/// Human-readable summary of an apply run.
pub fn render_apply_summary(response: &ApplyResponse) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Applied {} rule(s) to {} ({})",
        response.summary.rules_applied, response.root, response.depth
    );
    for rule in &response.rules {
        if rule.files.is_empty() {
            let _ = writeln!(
                out,
                "  [{}] {} -> {}: no matches",
                rule.index, rule.search, rule.replace
            );
            continue;
        }
        let _ = writeln!(
            out,
            "  [{}] {} -> {}: {} file(s), {} replacement(s)",
            rule.index,
            rule.search,
            rule.replace,
            rule.files.len(),
            rule.replacements
        );
        for file in &rule.files {
            let _ = writeln!(out, "      {} ({})", file.path, file.occurrences);
        }
    }
    let _ = writeln!(
        out,
        "  {} file(s) modified, {} replacement(s)",
        response.summary.files_changed, response.summary.replacements
    );
    out
}

/// Human-readable listing of a rule set.
pub fn render_rules(response: &RulesResponse) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} rule(s) ({}):", response.rules.len(), response.source);
    for (i, rule) in response.rules.iter().enumerate() {
        let _ = writeln!(out, "  {:>2}. {}", i + 1, rule);
    }
    out
}
