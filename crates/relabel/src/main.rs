//! Binary entry point for the relabel CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Apply the built-in rules to ./pints (recursive)
//! relabel apply
//!
//! # Apply to another root, direct children only
//! relabel apply src/ --depth shallow
//!
//! # Custom rules, restricted to Python files outside tests/
//! relabel apply --rule Old=New --rule Older=Newer -- '**/*.py' '!tests/**'
//!
//! # Show the effective rule set
//! relabel rules --rules renames.json --format json
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};

use relabel::cli::{
    render_apply_summary, render_rules, run_apply, run_rules, ApplyOptions, DEFAULT_ROOT,
};
use relabel_core::error::{OutputErrorCode, RelabelError};
use relabel_core::output::{emit_response, ErrorResponse};
use relabel_core::workspace::ScanDepth;

// ============================================================================
// CLI Structure
// ============================================================================

/// Ordered bulk identifier renaming.
///
/// Applies an ordered list of plain-text rename rules to every file under a
/// root directory, rewriting matches in place.
#[derive(Parser, Debug)]
#[command(name = "relabel", version, about = "Ordered bulk identifier renaming")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Args, Debug)]
struct GlobalArgs {
    /// Log level for tracing output (overridden by RUST_LOG).
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Output format for all commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable text summary (default).
    #[default]
    Text,
    /// Full JSON response.
    Json,
}

/// Scan depth below the root.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum DepthArg {
    /// Direct children of the root only.
    Shallow,
    /// The whole subtree (default).
    #[default]
    Recursive,
}

impl From<DepthArg> for ScanDepth {
    fn from(arg: DepthArg) -> Self {
        match arg {
            DepthArg::Shallow => ScanDepth::Shallow,
            DepthArg::Recursive => ScanDepth::Recursive,
        }
    }
}

/// Rule set overrides shared by `apply` and `rules`.
#[derive(Args, Debug)]
struct RuleArgs {
    /// JSON file with an array of {"search": .., "replace": ..} objects
    /// (ignored when any --rule is given).
    #[arg(long, value_name = "FILE")]
    rules: Option<PathBuf>,

    /// Inline rule in OLD=NEW form (repeatable, applied in the given order).
    #[arg(long, value_name = "OLD=NEW")]
    rule: Vec<String>,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Apply the rule set to every file under ROOT, rewriting in place.
    ///
    /// There is no backup and no dry run. The first unreadable directory or
    /// unreadable/unwritable file aborts the remaining rules.
    Apply {
        /// Root directory to rename under.
        #[arg(default_value = DEFAULT_ROOT)]
        root: PathBuf,
        #[command(flatten)]
        rules: RuleArgs,
        /// How deep to look for files below ROOT.
        #[arg(long, value_enum, default_value = "recursive")]
        depth: DepthArg,
        /// Follow symlinks (otherwise symlinked files are skipped).
        #[arg(long)]
        follow_symlinks: bool,
        /// Skip files larger than this many bytes.
        #[arg(long, value_name = "BYTES")]
        max_file_size: Option<u64>,
        /// Glob filters after `--` (prefix with `!` to exclude).
        #[arg(last = true)]
        filter: Vec<String>,
    },
    /// Print the effective rule set without touching any file.
    Rules {
        #[command(flatten)]
        rules: RuleArgs,
    },
}

// ============================================================================
// Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level);

    let format = cli.global.format;
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            match format {
                OutputFormat::Json => {
                    // Errors go to stdout as JSON so callers parse one stream.
                    let _ = emit_response(&ErrorResponse::from_error(&err), &mut io::stdout());
                    let _ = io::stdout().flush();
                }
                OutputFormat::Text => {
                    eprintln!("error: {}", err);
                }
            }
            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber writing to stderr.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), RelabelError> {
    let format = cli.global.format;
    match cli.command {
        Command::Apply {
            root,
            rules,
            depth,
            follow_symlinks,
            max_file_size,
            filter,
        } => {
            let options = ApplyOptions {
                root,
                rules_file: rules.rules,
                inline_rules: rules.rule,
                depth: depth.into(),
                filter,
                follow_symlinks,
                max_file_size,
            };
            execute_apply(&options, format)
        }
        Command::Rules { rules } => execute_rules(&rules, format),
    }
}

/// Execute apply command.
fn execute_apply(options: &ApplyOptions, format: OutputFormat) -> Result<(), RelabelError> {
    let response = run_apply(options)?;
    match format {
        OutputFormat::Json => {
            emit_response(&response, &mut io::stdout())
                .map_err(|e| RelabelError::internal(e.to_string()))?;
        }
        OutputFormat::Text => print!("{}", render_apply_summary(&response)),
    }
    let _ = io::stdout().flush();
    Ok(())
}

/// Execute rules command.
fn execute_rules(rules: &RuleArgs, format: OutputFormat) -> Result<(), RelabelError> {
    let response = run_rules(rules.rules.as_deref(), &rules.rule)?;
    match format {
        OutputFormat::Json => {
            emit_response(&response, &mut io::stdout())
                .map_err(|e| RelabelError::internal(e.to_string()))?;
        }
        OutputFormat::Text => print!("{}", render_rules(&response)),
    }
    let _ = io::stdout().flush();
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
