//! CLI integration tests for taskman
//!
//! Each test runs the binary inside its own temporary directory with an
//! isolated config, so the default `tasks_cli.json` lands in that directory.

use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

/// Get a command instance for the taskman binary, isolated to `dir`
fn taskman(dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("taskman"));
    cmd.current_dir(dir.path())
        .env("TASKMAN_CONFIG", dir.path().join("config.toml"))
        .env_remove("TASKMAN_FILE")
        .env_remove("RUST_LOG")
        .arg("--no-color");
    cmd
}

fn json_stdout(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

/// Adds a task and returns its id
fn add_task(dir: &TempDir, title: &str, priority: &str) -> u64 {
    let output = taskman(dir)
        .args(["--format", "json", "add", title, "--priority", priority])
        .output()
        .unwrap();
    assert!(output.status.success());
    json_stdout(&output)["id"].as_u64().unwrap()
}

fn stored_tasks(dir: &TempDir) -> Vec<Value> {
    let content = fs::read_to_string(dir.path().join("tasks_cli.json")).unwrap();
    let doc: Value = serde_json::from_str(&content).unwrap();
    doc["tasks"].as_array().unwrap().clone()
}

// =============================================================================
// Task Tests
// =============================================================================

#[test]
fn test_add_and_list() {
    let dir = TempDir::new().unwrap();

    taskman(&dir)
        .args(["add", "Write README", "Cover install and usage", "-p", "high"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created task"))
        .stdout(predicate::str::contains("Write README"));

    taskman(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Write README"))
        .stdout(predicate::str::contains("HIGH"));

    let tasks = stored_tasks(&dir);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["priority"], "high");
    assert_eq!(tasks[0]["status"], "todo");
    assert_eq!(tasks[0]["description"], "Cover install and usage");
}

#[test]
fn test_add_rejects_invalid_titles() {
    let dir = TempDir::new().unwrap();

    taskman(&dir)
        .args(["add", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Title cannot be empty"));

    taskman(&dir)
        .args(["add", "<script>"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'<' or '>'"));

    let long = "x".repeat(101);
    taskman(&dir)
        .args(["add", &long])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Title too long"));
}

#[test]
fn test_add_rejects_unknown_priority() {
    let dir = TempDir::new().unwrap();

    taskman(&dir)
        .args(["add", "Task", "--priority", "critical"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid priority"));
}

#[test]
fn test_list_empty() {
    let dir = TempDir::new().unwrap();

    taskman(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks found"));
}

#[test]
fn test_list_filters() {
    let dir = TempDir::new().unwrap();
    let done = add_task(&dir, "Finished thing", "low");
    add_task(&dir, "Open thing", "urgent");
    add_task(&dir, "Another open thing", "urgent");

    taskman(&dir)
        .args(["complete", &done.to_string()])
        .assert()
        .success();

    let output = taskman(&dir)
        .args(["--format", "json", "list", "--status", "done"])
        .output()
        .unwrap();
    let tasks = json_stdout(&output);
    assert_eq!(tasks.as_array().unwrap().len(), 1);
    assert_eq!(tasks[0]["title"], "Finished thing");

    let output = taskman(&dir)
        .args(["--format", "json", "list", "--priority", "urgent", "--limit", "1"])
        .output()
        .unwrap();
    let tasks = json_stdout(&output);
    assert_eq!(tasks.as_array().unwrap().len(), 1);
    assert_eq!(tasks[0]["title"], "Open thing");
}

#[test]
fn test_show_accepts_loose_ids() {
    let dir = TempDir::new().unwrap();
    let id = add_task(&dir, "Find me", "medium");

    taskman(&dir)
        .args(["show", &format!(" {} ", id)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Find me"));

    taskman(&dir)
        .args(["show", &format!("{}.0", id)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Find me"));

    taskman(&dir)
        .args(["show", "not-a-number"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Task not found"));
}

#[test]
fn test_lifecycle() {
    let dir = TempDir::new().unwrap();
    let id = add_task(&dir, "Lifecycle", "medium").to_string();

    taskman(&dir)
        .args(["start", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Started task"));
    assert_eq!(stored_tasks(&dir)[0]["status"], "in_progress");

    taskman(&dir)
        .args(["complete", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Completed task"));

    let task = &stored_tasks(&dir)[0];
    assert_eq!(task["status"], "done");
    assert!(task["completed_at"].is_string());

    // Completing twice only warns
    taskman(&dir)
        .args(["complete", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("already completed"));

    taskman(&dir)
        .args(["priority", &id, "urgent"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("completed task"));

    taskman(&dir)
        .args(["cancel", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already completed"));
}

#[test]
fn test_priority_and_assign() {
    let dir = TempDir::new().unwrap();
    let id = add_task(&dir, "Reprioritize", "low").to_string();

    taskman(&dir)
        .args(["priority", &id, "high"])
        .assert()
        .success();

    taskman(&dir)
        .args(["assign", &id, "12"])
        .assert()
        .success()
        .stdout(predicate::str::contains("project 12"));

    let task = &stored_tasks(&dir)[0];
    assert_eq!(task["priority"], "high");
    assert_eq!(task["project_id"], 12.0);
}

#[test]
fn test_cancel() {
    let dir = TempDir::new().unwrap();
    let id = add_task(&dir, "Not needed", "low").to_string();

    taskman(&dir).args(["cancel", &id]).assert().success();
    assert_eq!(stored_tasks(&dir)[0]["status"], "cancelled");
}

#[test]
fn test_delete() {
    let dir = TempDir::new().unwrap();
    let id = add_task(&dir, "Delete me", "low").to_string();

    taskman(&dir)
        .args(["delete", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted task"));
    assert!(stored_tasks(&dir).is_empty());

    taskman(&dir)
        .args(["delete", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Task not found"));
}

// =============================================================================
// Statistics and Report Tests
// =============================================================================

#[test]
fn test_stats() {
    let dir = TempDir::new().unwrap();
    let first = add_task(&dir, "One", "low");
    for title in ["Two", "Three", "Four"] {
        add_task(&dir, title, "medium");
    }
    taskman(&dir)
        .args(["complete", &first.to_string()])
        .assert()
        .success();

    taskman(&dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 4 tasks completed (25%)"));

    let output = taskman(&dir).args(["--format", "json", "stats"]).output().unwrap();
    let stats = json_stdout(&output);
    assert_eq!(stats["total_tasks"], 4);
    assert_eq!(stats["completed_tasks"], 1);
    assert_eq!(stats["pending_tasks"], 3);
    assert_eq!(stats["completion_rate"], 25.0);
    assert_eq!(stats["priority_distribution"]["medium"], 3);
}

#[test]
fn test_stats_without_tasks() {
    let dir = TempDir::new().unwrap();

    taskman(&dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks found"));
}

#[test]
fn test_daily_report() {
    let dir = TempDir::new().unwrap();
    let id = add_task(&dir, "Today", "high");
    add_task(&dir, "Also today", "low");
    taskman(&dir)
        .args(["complete", &id.to_string()])
        .assert()
        .success();

    let output = taskman(&dir).args(["--format", "json", "report"]).output().unwrap();
    assert!(output.status.success());
    let report = json_stdout(&output);
    assert_eq!(report["total_tasks"], 2);
    assert_eq!(report["tasks_for_date"], 2);
    assert_eq!(report["completed_today"], 1);
    assert_eq!(report["completion_rate_today"], 50.0);

    let output = taskman(&dir)
        .args(["--format", "json", "report", "--date", "2001-02-03"])
        .output()
        .unwrap();
    let report = json_stdout(&output);
    assert_eq!(report["report_date"], "2001-02-03");
    assert_eq!(report["tasks_for_date"], 0);
}

#[test]
fn test_daily_report_requires_tasks() {
    let dir = TempDir::new().unwrap();

    taskman(&dir)
        .arg("report")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No tasks"));
}

// =============================================================================
// Export Tests
// =============================================================================

#[test]
fn test_export_json_with_statistics() {
    let dir = TempDir::new().unwrap();
    add_task(&dir, "Exported", "urgent");

    taskman(&dir)
        .args(["export", "backup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("backup.json"));

    let doc: Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("backup.json")).unwrap()).unwrap();
    assert_eq!(doc["metadata"]["total_tasks"], 1);
    assert_eq!(doc["metadata"]["format"], "json");
    assert_eq!(doc["statistics"]["priority_distribution"]["urgent"], 1);
}

#[test]
fn test_export_extension_wins() {
    let dir = TempDir::new().unwrap();
    add_task(&dir, "Exported", "low");

    taskman(&dir)
        .args(["export", "report.xml", "--type", "json", "--no-stats"])
        .assert()
        .success();

    let xml = fs::read_to_string(dir.path().join("report.xml")).unwrap();
    assert!(xml.contains("<TaskManagerExport>"));
    assert!(xml.contains("<Title>Exported</Title>"));
    assert!(!xml.contains("<Statistics>"));
}

#[test]
fn test_export_rejects_unknown_type() {
    let dir = TempDir::new().unwrap();
    add_task(&dir, "Exported", "low");

    taskman(&dir)
        .args(["export", "out", "--type", "pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported export format"));
}

#[test]
fn test_csv_export() {
    let dir = TempDir::new().unwrap();
    add_task(&dir, "Row one", "low");
    add_task(&dir, "Row, two", "high");

    taskman(&dir)
        .args(["csv", "tasks"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tasks.csv"));

    let content = fs::read_to_string(dir.path().join("tasks.csv")).unwrap();
    assert!(content.starts_with("id,title,description,priority,status,created_at,completed_at,project_id"));
    assert!(content.contains("\"Row, two\""));
    assert_eq!(content.lines().count(), 3);
}

#[test]
fn test_csv_export_requires_tasks() {
    let dir = TempDir::new().unwrap();

    taskman(&dir)
        .args(["csv", "tasks"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No tasks"));
}

// =============================================================================
// Storage Tests
// =============================================================================

#[test]
fn test_save_and_load() {
    let dir = TempDir::new().unwrap();
    add_task(&dir, "Keep me", "medium");
    let doomed = add_task(&dir, "Restore me", "low");

    taskman(&dir)
        .args(["save", "backup.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved 2 task(s)"));

    taskman(&dir)
        .args(["delete", &doomed.to_string()])
        .assert()
        .success();
    assert_eq!(stored_tasks(&dir).len(), 1);

    taskman(&dir)
        .args(["load", "backup.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 task(s) loaded, replacing 1"));
    assert_eq!(stored_tasks(&dir).len(), 2);
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();

    taskman(&dir)
        .args(["load", "nowhere.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_corrupt_storage_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("tasks_cli.json"), "{\"tasks\": 5}").unwrap();

    taskman(&dir)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load tasks"))
        .stderr(predicate::str::contains("'tasks' must be an array"));
}

#[test]
fn test_file_flag_and_env() {
    let dir = TempDir::new().unwrap();

    taskman(&dir)
        .args(["--file", "custom.json", "add", "Flagged"])
        .assert()
        .success();
    assert!(dir.path().join("custom.json").is_file());

    taskman(&dir)
        .env("TASKMAN_FILE", dir.path().join("custom.json"))
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Flagged"));
}

#[test]
fn test_config_file_limit() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("config.toml"), "max_storage_files = 2\n").unwrap();
    fs::write(dir.path().join("a.json"), "{}").unwrap();
    fs::write(dir.path().join("b.json"), "{}").unwrap();

    taskman(&dir)
        .args(["add", "One too many"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Too many json files"));
}

// =============================================================================
// Reminder Tests
// =============================================================================

#[test]
fn test_remind() {
    let dir = TempDir::new().unwrap();
    let id = add_task(&dir, "Call back", "high").to_string();

    taskman(&dir)
        .args(["remind", &id, "dev@example.com", "--due", "2030-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Email sent to dev@example.com"))
        .stdout(predicate::str::contains("2030-01-01"));

    taskman(&dir)
        .args(["remind", &id, "not-an-email"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing '@'"));
}

// =============================================================================
// Interactive Tests
// =============================================================================

#[test]
fn test_interactive_session() {
    let dir = TempDir::new().unwrap();

    taskman(&dir)
        .arg("interactive")
        .write_stdin("add \"Shell task\" \"from the shell\"\nlist\nbogus\nstats\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Shell task"))
        .stdout(predicate::str::contains("Goodbye"))
        .stderr(predicate::str::contains("Unknown command: bogus"));

    let tasks = stored_tasks(&dir);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["description"], "from the shell");
}

#[test]
fn test_interactive_ends_at_eof() {
    let dir = TempDir::new().unwrap();
    let id = add_task(&dir, "Finish in shell", "low");

    taskman(&dir)
        .arg("interactive")
        .write_stdin(format!("complete {}\n", id))
        .assert()
        .success()
        .stdout(predicate::str::contains("Completed task"));

    assert_eq!(stored_tasks(&dir)[0]["status"], "done");
}
