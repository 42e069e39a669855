//! CLI end-to-end tests.
//!
//! These tests spawn the actual `relabel` binary against temporary trees and
//! validate stdout, file contents and exit codes.
//!
//! Exit code expectations:
//! - 0: Success
//! - 2: Invalid arguments (malformed rule, bad rules file, bad glob)
//! - 3: Directory access error (root missing or not a directory)
//! - 4: File access error (matched file unwritable)

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Run relabel with given arguments in `cwd` and return (stdout, stderr, exit_code).
fn run_relabel(cwd: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_relabel"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute relabel");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn sha256(path: &Path) -> String {
    hex::encode(Sha256::digest(fs::read(path).unwrap()))
}

/// A workspace holding a `pints/` package with three files, two of which
/// contain built-in search texts.
fn pints_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "pints/_log_priors.py",
        "class NormalLogPrior(LogPrior):\n    pass\n",
    );
    write(
        dir.path(),
        "pints/toy/__init__.py",
        "from ._gaussian import MultimodalNormalLogPDF, NormalLogPDF\n",
    );
    write(dir.path(), "pints/_core.py", "import numpy as np\n");
    dir
}

// ============================================================================
// apply
// ============================================================================

#[test]
fn apply_without_arguments_targets_pints() {
    let ws = pints_workspace();
    let untouched = sha256(&ws.path().join("pints/_core.py"));

    let (stdout, _stderr, exit_code) = run_relabel(ws.path(), &["apply"]);

    assert_eq!(exit_code, 0, "stdout: {stdout}");
    assert!(stdout.starts_with("Applied 8 rule(s) to pints (recursive)"));
    assert_eq!(
        fs::read_to_string(ws.path().join("pints/_log_priors.py")).unwrap(),
        "class GaussianLogPrior(LogPrior):\n    pass\n"
    );
    assert_eq!(
        fs::read_to_string(ws.path().join("pints/toy/__init__.py")).unwrap(),
        "from ._gaussian import MultimodalGaussianLogPDF, GaussianLogPDF\n"
    );
    assert_eq!(sha256(&ws.path().join("pints/_core.py")), untouched);
}

#[test]
fn apply_json_reports_changed_files() {
    let ws = pints_workspace();

    let (stdout, _stderr, exit_code) = run_relabel(ws.path(), &["apply", "--format", "json"]);
    assert_eq!(exit_code, 0);

    let json: Value = serde_json::from_str(&stdout).expect("stdout should be valid JSON");
    assert_eq!(json["status"], "ok");
    assert_eq!(json["rule_source"], "builtin");
    assert_eq!(json["summary"]["rules_applied"], 8);
    assert_eq!(json["summary"]["files_changed"], 2);
    assert_eq!(json["rules"][2]["search"], "MultimodalNormalLogPDF");
    assert_eq!(json["rules"][2]["files"][0]["path"], "toy/__init__.py");
}

#[test]
fn apply_twice_is_idempotent() {
    let ws = pints_workspace();

    let (_, _, first) = run_relabel(ws.path(), &["apply"]);
    assert_eq!(first, 0);
    let snapshot = sha256(&ws.path().join("pints/_log_priors.py"));

    let (stdout, _stderr, second) = run_relabel(ws.path(), &["apply", "--format", "json"]);
    assert_eq!(second, 0);
    let json: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["summary"]["files_changed"], 0);
    assert_eq!(sha256(&ws.path().join("pints/_log_priors.py")), snapshot);
}

#[test]
fn apply_shallow_skips_subpackages() {
    let ws = pints_workspace();

    let (_, _, exit_code) = run_relabel(ws.path(), &["apply", "pints", "--depth", "shallow"]);
    assert_eq!(exit_code, 0);
    assert!(fs::read_to_string(ws.path().join("pints/toy/__init__.py"))
        .unwrap()
        .contains("MultimodalNormalLogPDF"));
    assert!(fs::read_to_string(ws.path().join("pints/_log_priors.py"))
        .unwrap()
        .contains("GaussianLogPrior"));
}

#[test]
fn apply_inline_rules_in_order() {
    let ws = TempDir::new().unwrap();
    write(ws.path(), "src/a.txt", "Alpha");

    let (_, _, exit_code) = run_relabel(
        ws.path(),
        &["apply", "src", "--rule", "Alpha=Beta", "--rule", "Beta=Gamma"],
    );
    assert_eq!(exit_code, 0);
    assert_eq!(fs::read_to_string(ws.path().join("src/a.txt")).unwrap(), "Gamma");
}

#[test]
fn apply_rules_file() {
    let ws = TempDir::new().unwrap();
    write(ws.path(), "src/a.txt", "Old");
    write(
        ws.path(),
        "renames.json",
        r#"[{"search": "Old", "replace": "New"}]"#,
    );

    let (_, _, exit_code) = run_relabel(ws.path(), &["apply", "src", "--rules", "renames.json"]);
    assert_eq!(exit_code, 0);
    assert_eq!(fs::read_to_string(ws.path().join("src/a.txt")).unwrap(), "New");
}

#[test]
fn inline_rules_take_precedence_over_rules_file() {
    let ws = TempDir::new().unwrap();
    write(ws.path(), "src/a.txt", "Old");
    write(
        ws.path(),
        "renames.json",
        r#"[{"search": "Old", "replace": "FromFile"}]"#,
    );

    let (stdout, _stderr, exit_code) = run_relabel(
        ws.path(),
        &[
            "apply", "src", "--rules", "renames.json", "--rule", "Old=Inline", "--format",
            "json",
        ],
    );
    assert_eq!(exit_code, 0, "stdout: {stdout}");
    let json: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["rule_source"], "inline");
    assert_eq!(fs::read_to_string(ws.path().join("src/a.txt")).unwrap(), "Inline");
}

#[test]
fn apply_respects_trailing_filters() {
    let ws = pints_workspace();

    let (_, _, exit_code) = run_relabel(ws.path(), &["apply", "pints", "--", "!toy/**"]);
    assert_eq!(exit_code, 0);
    assert!(fs::read_to_string(ws.path().join("pints/toy/__init__.py"))
        .unwrap()
        .contains("NormalLogPDF"));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn missing_root_returns_exit_3() {
    let ws = TempDir::new().unwrap();

    let (stdout, stderr, exit_code) = run_relabel(ws.path(), &["apply"]);
    assert_eq!(exit_code, 3, "stdout: {stdout}");
    assert!(stderr.contains("pints"), "diagnostic should name the root");
}

#[test]
fn missing_root_json_error() {
    let ws = TempDir::new().unwrap();

    let (stdout, _stderr, exit_code) =
        run_relabel(ws.path(), &["apply", "nowhere", "--format", "json"]);
    assert_eq!(exit_code, 3);
    let json: Value = serde_json::from_str(&stdout).expect("stdout should be valid JSON");
    assert_eq!(json["status"], "error");
    assert_eq!(json["error"]["code"], 3);
    assert_eq!(json["error"]["details"]["path"], "nowhere");
}

#[test]
fn root_that_is_a_file_returns_exit_3() {
    let ws = TempDir::new().unwrap();
    write(ws.path(), "pints", "not a directory");

    let (_, _, exit_code) = run_relabel(ws.path(), &["apply"]);
    assert_eq!(exit_code, 3);
}

#[test]
fn malformed_inline_rule_returns_exit_2() {
    let ws = pints_workspace();

    let (_, stderr, exit_code) = run_relabel(ws.path(), &["apply", "--rule", "NoEquals"]);
    assert_eq!(exit_code, 2);
    assert!(stderr.contains("OLD=NEW"));
}

#[test]
fn unparseable_rules_file_returns_exit_2() {
    let ws = pints_workspace();
    write(ws.path(), "bad.json", "{");

    let (_, _, exit_code) = run_relabel(ws.path(), &["apply", "--rules", "bad.json"]);
    assert_eq!(exit_code, 2);
}

#[cfg(unix)]
#[test]
fn unwritable_file_returns_exit_4() {
    use std::os::unix::fs::PermissionsExt;

    let ws = pints_workspace();
    let locked = ws.path().join("pints/_log_priors.py");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o444)).unwrap();
    if fs::OpenOptions::new().write(true).open(&locked).is_ok() {
        // Running with privileges that ignore permission bits.
        return;
    }

    let (_, stderr, exit_code) = run_relabel(ws.path(), &["apply"]);
    assert_eq!(exit_code, 4);
    assert!(stderr.contains("_log_priors.py"));
}

// ============================================================================
// rules
// ============================================================================

#[test]
fn rules_lists_builtin_set() {
    let ws = TempDir::new().unwrap();

    let (stdout, _stderr, exit_code) = run_relabel(ws.path(), &["rules", "--format", "json"]);
    assert_eq!(exit_code, 0);
    let json: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["source"], "builtin");
    assert_eq!(json["rules"].as_array().unwrap().len(), 8);
    assert_eq!(json["rules"][7]["search"], "Normal");
}

#[test]
fn rules_does_not_touch_files() {
    let ws = pints_workspace();
    let before = sha256(&ws.path().join("pints/_log_priors.py"));

    let (_, _, exit_code) = run_relabel(ws.path(), &["rules"]);
    assert_eq!(exit_code, 0);
    assert_eq!(sha256(&ws.path().join("pints/_log_priors.py")), before);
}
