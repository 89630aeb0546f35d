use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command with HOME pointed at a scratch dir so `~/.plan-collab/` is
/// isolated and no real server port is recorded.
fn planq(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("planq").unwrap();
    cmd.env("HOME", home.path());
    cmd
}

#[test]
fn help_lists_subcommands() {
    let home = TempDir::new().unwrap();
    planq(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("push"))
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn push_missing_file_fails_with_json_error() {
    let home = TempDir::new().unwrap();
    planq(&home)
        .args(["push", "/nonexistent/plan.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Plan file not found"));
}

#[test]
fn sync_without_active_plan_fails() {
    let home = TempDir::new().unwrap();
    planq(&home)
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no active plan"));
}

#[test]
fn push_without_server_reports_server_down() {
    let home = TempDir::new().unwrap();
    // Point at a port nothing listens on.
    let data_dir = home.path().join(".plan-collab");
    std::fs::create_dir_all(&data_dir).unwrap();
    std::fs::write(data_dir.join("config.json"), r#"{"port": 1}"#).unwrap();

    let plan = home.path().join("plan.md");
    std::fs::write(&plan, "# Plan\nBody\n").unwrap();

    planq(&home)
        .args(["push", plan.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Server not running"));
}

#[test]
fn status_reports_stopped_server() {
    let home = TempDir::new().unwrap();
    let data_dir = home.path().join(".plan-collab");
    std::fs::create_dir_all(&data_dir).unwrap();
    std::fs::write(data_dir.join("config.json"), r#"{"port": 1}"#).unwrap();

    planq(&home)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"running\": false"));
}

#[test]
fn question_rejects_bad_options_json() {
    let home = TempDir::new().unwrap();
    planq(&home)
        .args([
            "question",
            "/tmp/plan.md",
            "Which database?",
            "--options",
            "not-json",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid --options JSON"));
}
