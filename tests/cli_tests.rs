use std::fs;

use predicates::prelude::*;
use test_env::TestEnv;

fn list_json(env: &TestEnv, extra: &[&str]) -> Vec<serde_json::Value> {
    let mut args = vec!["list", "--json"];
    args.extend_from_slice(extra);
    serde_json::from_str(&env.run(&args)).unwrap()
}

#[test]
fn test_add_task() {
    let env = TestEnv::new();

    env.cmd()
        .args(["add", "Write", "docs", "-t", "docs,api", "-d", "user guide"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created task 1: Write docs"));

    let rows = list_json(&env, &[]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], 1);
    assert_eq!(rows[0]["name"], "Write docs");
    assert_eq!(rows[0]["tags"], serde_json::json!(["docs", "api"]));
    assert_eq!(rows[0]["category"], "work");
    assert_eq!(rows[0]["running"], false);
    assert!(env.data_path().exists());
}

#[test]
fn test_add_rejects_blank_name() {
    let env = TestEnv::new();
    env.cmd()
        .args(["add", "  "])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: Task name cannot be empty"));
}

#[test]
fn test_add_with_category() {
    let env = TestEnv::new();
    env.run(&["add", "Someday", "-c", "backlog"]);
    env.run(&["add", "Now"]);

    let backlog = list_json(&env, &["-c", "backlog"]);
    assert_eq!(backlog.len(), 1);
    assert_eq!(backlog[0]["name"], "Someday");
    assert_eq!(backlog[0]["id"], 1);
}

#[test]
fn test_list_empty() {
    let env = TestEnv::new();
    env.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks found."));
}

#[test]
fn test_start_and_stop() {
    let env = TestEnv::new();
    env.run(&["add", "Feature"]);

    env.cmd()
        .args(["start", "1", "first", "pass"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Started task 1: Feature"));
    assert_eq!(list_json(&env, &[])[0]["running"], true);

    env.cmd()
        .args(["start", "1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already has an open segment"));

    env.cmd()
        .args(["stop", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stopped task 1: Feature"));
    assert_eq!(list_json(&env, &[])[0]["running"], false);

    env.cmd()
        .args(["stop", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Task 1 has no open segment."));

    env.cmd()
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Note:     first pass"));
}

#[test]
fn test_start_and_stop_at_explicit_times() {
    let env = TestEnv::new();
    env.run(&["add", "Meeting"]);
    env.run(&["start", "1", "--at", "2024-01-16T10:00"]);

    env.cmd()
        .args(["stop", "1", "--at", "2024-01-16T09:00"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Start time must be before finish time"));

    env.cmd()
        .args(["stop", "1", "--at", "2024-01-16T11:15"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(1h15m)"));

    let rows = list_json(&env, &[]);
    assert_eq!(rows[0]["total_secs"], 4500);
}

#[test]
fn test_log_segment() {
    let env = TestEnv::new();
    env.run(&["add", "Review"]);

    env.cmd()
        .args(["log", "1", "2024-01-16T09:00..2024-01-16T11:30", "code", "review"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged 2h30m on task 1: Review"));

    env.cmd()
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Task 1: Review"))
        .stdout(predicate::str::contains("Duration: 2h30m"))
        .stdout(predicate::str::contains("Note:     code review"));
}

#[test]
fn test_log_rejects_reversed_interval() {
    let env = TestEnv::new();
    env.run(&["add", "Review"]);

    env.cmd()
        .args(["log", "1", "2024-01-16T11:00..2024-01-16T09:00"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Start time must be before finish time"));

    env.cmd()
        .args(["log", "1", "2024-01-16T11:00"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Expected START..END"));
}

#[test]
fn test_modify_task() {
    let env = TestEnv::new();
    env.run(&["add", "Draft", "-t", "docs", "-d", "first cut"]);
    env.run(&["log", "1", "2024-01-16T09:00..2024-01-16T10:00"]);

    env.cmd()
        .args(["modify", "1", "--name", "Final copy", "-t", "docs, review", "-d", "ready"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Modified task 1: Final copy"));

    let rows = list_json(&env, &[]);
    assert_eq!(rows[0]["name"], "Final copy");
    assert_eq!(rows[0]["tags"], serde_json::json!(["docs", "review"]));
    assert_eq!(rows[0]["total_secs"], 3600);

    env.cmd()
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Description: ready"));

    env.run(&["modify", "1", "--clear-tags"]);
    assert_eq!(list_json(&env, &[])[0]["tags"], serde_json::json!([]));
    assert_eq!(list_json(&env, &[])[0]["name"], "Final copy");
}

#[test]
fn test_modify_rejects_bad_input() {
    let env = TestEnv::new();
    env.run(&["add", "Keep"]);

    env.cmd()
        .args(["modify", "1", "--name", "   "])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Task name cannot be empty"));

    env.cmd()
        .args(["modify", "1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Nothing to modify"));

    env.cmd()
        .args(["modify", "4", "--name", "Ghost"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Task 4 not found"));

    assert_eq!(list_json(&env, &[])[0]["name"], "Keep");
}

#[test]
fn test_category_change() {
    let env = TestEnv::new();
    env.run(&["add", "Ship it"]);

    env.cmd()
        .args(["category", "1", "completed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Task 1 moved to completed"));

    assert_eq!(list_json(&env, &["-c", "completed"]).len(), 1);
    env.cmd()
        .args(["list", "-c", "work"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks found."));
}

#[test]
fn test_category_rejects_unknown_value() {
    let env = TestEnv::new();
    env.run(&["add", "Ship it"]);
    env.cmd()
        .args(["category", "1", "someday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid category"));
}

#[test]
fn test_delete_task() {
    let env = TestEnv::new();
    env.run(&["add", "First"]);
    env.run(&["add", "Second"]);

    env.cmd()
        .args(["delete", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted task 1: First"));

    let rows = list_json(&env, &[]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], 1);
    assert_eq!(rows[0]["name"], "Second");

    env.cmd()
        .args(["show", "2"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Task 2 not found"));
}

#[test]
fn test_list_orders_by_activity() {
    let env = TestEnv::new();
    env.run(&["add", "A"]);
    env.run(&["add", "B"]);
    env.run(&["add", "C"]);
    env.run(&["log", "1", "2024-01-10T09:00..2024-01-10T10:00"]);
    env.run(&["log", "2", "2024-01-12T09:00..2024-01-12T10:00"]);

    let names: Vec<String> = list_json(&env, &[])
        .iter()
        .map(|r| r["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["B", "A", "C"]);

    let table = env.run(&["list"]);
    let lines: Vec<&str> = table.lines().collect();
    assert!(lines[0].starts_with("ID"));
    assert!(lines[1].starts_with("2 "));
    assert!(lines[3].starts_with("3 "));
}

#[test]
fn test_invalid_task_id() {
    let env = TestEnv::new();
    env.cmd()
        .args(["show", "abc"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid task ID"));
}

#[test]
fn test_corrupt_task_file_is_internal_error() {
    let env = TestEnv::new();
    fs::write(env.data_path(), "{ not json").unwrap();

    env.cmd()
        .arg("list")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Internal error: Failed to load tasks"))
        .stderr(predicate::str::contains("Caused by:"))
        .stderr(predicate::str::contains("Failed to parse task file"));
}

#[test]
fn test_version_flag() {
    let env = TestEnv::new();
    env.bare_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
