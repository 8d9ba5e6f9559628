//! Integration tests for the `tally` CLI.
//!
//! Each test creates a temp data directory, runs `tally` as a subprocess,
//! and verifies stdout and/or file contents.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Get the path to the built `tally` binary.
fn tally_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("tally");
    path
}

/// Run `tally` against the given data dir, returning (stdout, stderr, success).
fn run_tally(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(tally_bin())
        .arg("-D")
        .arg(dir)
        .args(args)
        .output()
        .expect("failed to run tally");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `tally` expecting success, return stdout.
fn run_tally_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_tally(dir, args);
    if !success {
        panic!(
            "tally {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

/// Register a user and leave them logged in.
fn register(dir: &Path, username: &str) {
    run_tally_ok(
        dir,
        &[
            "register",
            username,
            "--password",
            "secret123",
            "--email",
            &format!("{}@example.com", username),
        ],
    );
}

// ---------------------------------------------------------------------------
// Account tests
// ---------------------------------------------------------------------------

#[test]
fn test_register_creates_account_and_session() {
    let tmp = tempfile::TempDir::new().unwrap();

    let out = run_tally_ok(
        tmp.path(),
        &["register", "ana", "--password", "secret123"],
    );
    assert!(out.contains("account created"));
    assert!(out.contains("ana"));

    assert!(tmp.path().join("users.json").exists());
    assert!(tmp.path().join("session.json").exists());
}

#[test]
fn test_register_json() {
    let tmp = tempfile::TempDir::new().unwrap();

    let out = run_tally_ok(
        tmp.path(),
        &[
            "--json",
            "register",
            "ana",
            "--password",
            "secret123",
            "--email",
            "ana@example.com",
        ],
    );
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["username"], "ana");
    assert_eq!(parsed["email"], "ana@example.com");
}

#[test]
fn test_register_short_password() {
    let tmp = tempfile::TempDir::new().unwrap();

    let (_stdout, stderr, success) =
        run_tally(tmp.path(), &["register", "ana", "--password", "abc"]);
    assert!(!success);
    assert!(stderr.contains("at least 6"));
}

#[test]
fn test_register_mismatched_confirm() {
    let tmp = tempfile::TempDir::new().unwrap();

    let (_stdout, stderr, success) = run_tally(
        tmp.path(),
        &[
            "register",
            "ana",
            "--password",
            "secret123",
            "--confirm",
            "secret124",
        ],
    );
    assert!(!success);
    assert!(stderr.contains("do not match"));
}

#[test]
fn test_register_duplicate_username() {
    let tmp = tempfile::TempDir::new().unwrap();
    register(tmp.path(), "ana");

    let (_stdout, stderr, success) =
        run_tally(tmp.path(), &["register", "ana", "--password", "secret123"]);
    assert!(!success);
    assert!(stderr.contains("already taken"));
}

#[test]
fn test_password_not_stored_in_plaintext() {
    let tmp = tempfile::TempDir::new().unwrap();
    register(tmp.path(), "ana");

    let users = fs::read_to_string(tmp.path().join("users.json")).unwrap();
    assert!(!users.contains("secret123"));
    assert!(users.contains("passwordHash"));
}

#[test]
fn test_login_wrong_password() {
    let tmp = tempfile::TempDir::new().unwrap();
    register(tmp.path(), "ana");
    run_tally_ok(tmp.path(), &["logout"]);

    let (_stdout, stderr, success) =
        run_tally(tmp.path(), &["login", "ana", "--password", "wrongwrong"]);
    assert!(!success);
    assert!(stderr.contains("invalid username or password"));
}

#[test]
fn test_login_unknown_user_same_error() {
    let tmp = tempfile::TempDir::new().unwrap();

    let (_stdout, stderr, success) =
        run_tally(tmp.path(), &["login", "nobody", "--password", "secret123"]);
    assert!(!success);
    // Same message as a wrong password, no username probing
    assert!(stderr.contains("invalid username or password"));
}

#[test]
fn test_session_persists_across_invocations() {
    let tmp = tempfile::TempDir::new().unwrap();
    register(tmp.path(), "ana");

    let out = run_tally_ok(tmp.path(), &["whoami"]);
    assert!(out.contains("ana"));
    assert!(out.contains("ana@example.com"));
}

#[test]
fn test_logout_then_whoami_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    register(tmp.path(), "ana");

    let out = run_tally_ok(tmp.path(), &["logout"]);
    assert!(out.contains("logged out"));

    let (_stdout, stderr, success) = run_tally(tmp.path(), &["whoami"]);
    assert!(!success);
    assert!(stderr.contains("not logged in"));
}

#[test]
fn test_commands_require_login() {
    let tmp = tempfile::TempDir::new().unwrap();

    let (_stdout, stderr, success) = run_tally(tmp.path(), &["add", "Buy milk"]);
    assert!(!success);
    assert!(stderr.contains("not logged in"));
}

// ---------------------------------------------------------------------------
// Task command tests
// ---------------------------------------------------------------------------

#[test]
fn test_add_and_list() {
    let tmp = tempfile::TempDir::new().unwrap();
    register(tmp.path(), "ana");

    let out = run_tally_ok(tmp.path(), &["add", "Buy milk"]);
    assert!(out.contains("added #1"));

    let out = run_tally_ok(tmp.path(), &["list"]);
    assert!(out.contains("== ana's tasks (all) =="));
    assert!(out.contains("Buy milk"));
    assert!(out.contains("#1") || out.contains("  1"));
}

#[test]
fn test_add_empty_text_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    register(tmp.path(), "ana");

    let (_stdout, stderr, success) = run_tally(tmp.path(), &["add", "   "]);
    assert!(!success);
    assert!(stderr.contains("cannot be empty"));
}

#[test]
fn test_add_past_due_is_overdue() {
    let tmp = tempfile::TempDir::new().unwrap();
    register(tmp.path(), "ana");

    let out = run_tally_ok(tmp.path(), &["add", "Late thing", "--due", "2020-01-01"]);
    assert!(out.contains("(overdue)"));
}

#[test]
fn test_add_far_future_due_is_low() {
    let tmp = tempfile::TempDir::new().unwrap();
    register(tmp.path(), "ana");

    let out = run_tally_ok(tmp.path(), &["add", "Someday", "--due", "2099-12-31"]);
    assert!(out.contains("(low)"));
}

#[test]
fn test_add_invalid_due_date() {
    let tmp = tempfile::TempDir::new().unwrap();
    register(tmp.path(), "ana");

    let (_stdout, stderr, success) =
        run_tally(tmp.path(), &["add", "Thing", "--due", "next tuesday"]);
    assert!(!success);
    assert!(stderr.contains("invalid due date"));
}

#[test]
fn test_add_json() {
    let tmp = tempfile::TempDir::new().unwrap();
    register(tmp.path(), "ana");

    let out = run_tally_ok(
        tmp.path(),
        &["--json", "add", "Buy milk", "--due", "2099-12-31"],
    );
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["number"], 1);
    assert_eq!(parsed["text"], "Buy milk");
    assert_eq!(parsed["completed"], false);
    assert_eq!(parsed["priority"], "low");
}

#[test]
fn test_list_json() {
    let tmp = tempfile::TempDir::new().unwrap();
    register(tmp.path(), "ana");
    run_tally_ok(tmp.path(), &["add", "One"]);
    run_tally_ok(tmp.path(), &["add", "Two"]);

    let out = run_tally_ok(tmp.path(), &["--json", "list"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["user"], "ana");
    assert_eq!(parsed["filter"], "all");
    assert_eq!(parsed["tasks"].as_array().unwrap().len(), 2);
}

#[test]
fn test_done_toggles() {
    let tmp = tempfile::TempDir::new().unwrap();
    register(tmp.path(), "ana");
    run_tally_ok(tmp.path(), &["add", "Buy milk"]);

    let out = run_tally_ok(tmp.path(), &["done", "1"]);
    assert!(out.contains("#1 is now done"));

    let out = run_tally_ok(tmp.path(), &["done", "1"]);
    assert!(out.contains("#1 is now active"));
}

#[test]
fn test_star_toggles() {
    let tmp = tempfile::TempDir::new().unwrap();
    register(tmp.path(), "ana");
    run_tally_ok(tmp.path(), &["add", "Buy milk"]);

    let out = run_tally_ok(tmp.path(), &["star", "1"]);
    assert!(out.contains("#1 starred"));

    let out = run_tally_ok(tmp.path(), &["star", "1"]);
    assert!(out.contains("#1 unstarred"));
}

#[test]
fn test_rm_deletes() {
    let tmp = tempfile::TempDir::new().unwrap();
    register(tmp.path(), "ana");
    run_tally_ok(tmp.path(), &["add", "Buy milk"]);

    let out = run_tally_ok(tmp.path(), &["rm", "1"]);
    assert!(out.contains("deleted #1"));

    let out = run_tally_ok(tmp.path(), &["list"]);
    assert!(!out.contains("Buy milk"));
    assert!(out.contains("(no tasks to show)"));
}

#[test]
fn test_unknown_number_is_soft_noop() {
    let tmp = tempfile::TempDir::new().unwrap();
    register(tmp.path(), "ana");
    run_tally_ok(tmp.path(), &["add", "Buy milk"]);

    let (_stdout, stderr, success) = run_tally(tmp.path(), &["done", "99"]);
    assert!(success);
    assert!(stderr.contains("no task #99"));

    // Nothing changed
    let out = run_tally_ok(tmp.path(), &["--json", "stats"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["completed"], 0);
}

#[test]
fn test_list_filters() {
    let tmp = tempfile::TempDir::new().unwrap();
    register(tmp.path(), "ana");
    run_tally_ok(tmp.path(), &["add", "Active task"]);
    run_tally_ok(tmp.path(), &["add", "Done task"]);
    run_tally_ok(tmp.path(), &["add", "Starred task"]);
    run_tally_ok(tmp.path(), &["done", "2"]);
    run_tally_ok(tmp.path(), &["star", "3"]);

    let out = run_tally_ok(tmp.path(), &["list", "--filter", "active"]);
    assert!(out.contains("Active task"));
    assert!(!out.contains("Done task"));

    let out = run_tally_ok(tmp.path(), &["list", "--filter", "completed"]);
    assert!(out.contains("Done task"));
    assert!(!out.contains("Active task"));

    let out = run_tally_ok(tmp.path(), &["list", "--filter", "important"]);
    assert!(out.contains("Starred task"));
    assert!(!out.contains("Active task"));
}

#[test]
fn test_list_unknown_filter() {
    let tmp = tempfile::TempDir::new().unwrap();
    register(tmp.path(), "ana");

    let (_stdout, stderr, success) =
        run_tally(tmp.path(), &["list", "--filter", "urgent"]);
    assert!(!success);
    assert!(stderr.contains("unknown filter"));
}

#[test]
fn test_overdue_sorts_first() {
    let tmp = tempfile::TempDir::new().unwrap();
    register(tmp.path(), "ana");
    run_tally_ok(tmp.path(), &["add", "Someday", "--due", "2099-12-31"]);
    run_tally_ok(tmp.path(), &["add", "Yesterday", "--due", "2020-01-01"]);

    let out = run_tally_ok(tmp.path(), &["list"]);
    let pos_over = out.find("Yesterday").unwrap();
    let pos_low = out.find("Someday").unwrap();
    assert!(pos_over < pos_low);
}

#[test]
fn test_stats() {
    let tmp = tempfile::TempDir::new().unwrap();
    register(tmp.path(), "ana");
    run_tally_ok(tmp.path(), &["add", "One"]);
    run_tally_ok(tmp.path(), &["add", "Two"]);
    run_tally_ok(tmp.path(), &["done", "1"]);

    let out = run_tally_ok(tmp.path(), &["stats"]);
    assert!(out.contains("total:      2"));
    assert!(out.contains("active:     1"));
    assert!(out.contains("completed:  1"));
}

#[test]
fn test_stats_json() {
    let tmp = tempfile::TempDir::new().unwrap();
    register(tmp.path(), "ana");
    run_tally_ok(tmp.path(), &["add", "One"]);
    run_tally_ok(tmp.path(), &["add", "Two", "--due", "2020-01-01"]);
    run_tally_ok(tmp.path(), &["done", "1"]);
    run_tally_ok(tmp.path(), &["star", "2"]);

    let out = run_tally_ok(tmp.path(), &["--json", "stats"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["total"], 2);
    assert_eq!(parsed["active"], 1);
    assert_eq!(parsed["completed"], 1);
    assert_eq!(parsed["important"], 1);
}

// ---------------------------------------------------------------------------
// Multi-user and durability tests
// ---------------------------------------------------------------------------

#[test]
fn test_tasks_are_per_user() {
    let tmp = tempfile::TempDir::new().unwrap();

    register(tmp.path(), "ana");
    run_tally_ok(tmp.path(), &["add", "Ana's task"]);

    register(tmp.path(), "bob");
    run_tally_ok(tmp.path(), &["add", "Bob's task"]);

    let out = run_tally_ok(tmp.path(), &["list"]);
    assert!(out.contains("Bob's task"));
    assert!(!out.contains("Ana's task"));

    run_tally_ok(tmp.path(), &["login", "ana", "--password", "secret123"]);
    let out = run_tally_ok(tmp.path(), &["list"]);
    assert!(out.contains("Ana's task"));
    assert!(!out.contains("Bob's task"));
}

#[test]
fn test_display_numbers_survive_reload() {
    let tmp = tempfile::TempDir::new().unwrap();
    register(tmp.path(), "ana");
    run_tally_ok(tmp.path(), &["add", "One"]);
    run_tally_ok(tmp.path(), &["add", "Two"]);
    run_tally_ok(tmp.path(), &["rm", "1"]);

    // Numbering continues from the highest surviving number
    let out = run_tally_ok(tmp.path(), &["add", "Three"]);
    assert!(out.contains("added #3"));
}

#[test]
fn test_corrupt_users_file_is_tolerated() {
    let tmp = tempfile::TempDir::new().unwrap();
    register(tmp.path(), "ana");
    run_tally_ok(tmp.path(), &["add", "Buy milk"]);

    fs::write(tmp.path().join("users.json"), "{not json at all").unwrap();

    let (stdout, stderr, success) = run_tally(tmp.path(), &["list"]);
    assert!(success);
    assert!(stderr.contains("warning"));
    assert!(stdout.contains("(no tasks to show)"));
}

#[test]
fn test_users_file_uses_stored_layout() {
    let tmp = tempfile::TempDir::new().unwrap();
    register(tmp.path(), "ana");
    run_tally_ok(tmp.path(), &["add", "Buy milk", "--due", "2099-12-31"]);

    let raw = fs::read_to_string(tmp.path().join("users.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let record = &parsed["ana"];
    assert_eq!(record["username"], "ana");
    assert!(record["passwordHash"].is_string());
    let task = &record["todos"][0];
    assert_eq!(task["displayNumber"], 1);
    assert!(task["dueDate"].as_str().unwrap().contains("T"));
    assert!(task["createdAt"].is_string());
}

#[test]
fn test_help() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_tally_ok(tmp.path(), &["--help"]);
    assert!(out.contains("tally"));
    assert!(out.contains("add"));
    assert!(out.contains("list"));
}
