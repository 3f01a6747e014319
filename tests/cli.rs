//! End-to-end tests through the `prog` binary.
//!
//! stdout is piped under `assert_cmd`, so every command answers in JSON.

use assert_cmd::Command;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Env {
    _dir: TempDir,
    db: PathBuf,
}

impl Env {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("prog.db");
        Self { _dir: dir, db }
    }

    fn initialized() -> Self {
        let env = Self::new();
        env.cmd(&["init"]).assert().success();
        env
    }

    fn cmd(&self, args: &[&str]) -> Command {
        cmd_with_db(&self.db, args)
    }

    /// Run a command that must succeed and parse its JSON output.
    fn json(&self, args: &[&str]) -> Value {
        let output = self.cmd(args).output().unwrap();
        assert!(
            output.status.success(),
            "prog {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }

    fn add(&self, args: &[&str]) -> String {
        let mut full = vec!["add"];
        full.extend_from_slice(args);
        self.json(&full)["id"].as_str().unwrap().to_string()
    }

    /// Run a command that must fail; returns the exit code and error JSON.
    fn fail(&self, args: &[&str]) -> (i32, Value) {
        let output = self.cmd(args).output().unwrap();
        assert!(!output.status.success(), "prog {args:?} unexpectedly succeeded");
        let err: Value = serde_json::from_slice(&output.stderr).unwrap();
        (output.status.code().unwrap(), err)
    }
}

fn cmd_with_db(db: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("prog").unwrap();
    cmd.env_remove("PROG_DB")
        .env_remove("PROG_PROJECT")
        .env_remove("PROG_TEST_DB")
        .env("PROG_ACTOR", "cli-test")
        .arg("--db")
        .arg(db)
        .args(args);
    cmd
}

#[test]
fn test_version() {
    let env = Env::new();
    let out = env.json(&["version"]);
    assert_eq!(out["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_commands_require_init() {
    let env = Env::new();
    let (code, err) = env.fail(&["list"]);
    assert_eq!(code, 2);
    assert_eq!(err["error"]["code"], "NOT_INITIALIZED");
}

#[test]
fn test_init_twice_fails_without_force() {
    let env = Env::initialized();
    let (code, err) = env.fail(&["init"]);
    assert_eq!(code, 2);
    assert_eq!(err["error"]["code"], "ALREADY_INITIALIZED");
    env.cmd(&["init", "--force"]).assert().success();
}

#[test]
fn test_add_and_show_json_shape() {
    let env = Env::initialized();
    let id = env.add(&["Write docs", "-p", "web", "--priority", "high"]);
    assert!(id.starts_with("ts-"));

    let shown = env.json(&["show", &id]);
    assert_eq!(shown["title"], "Write docs");
    assert_eq!(shown["type"], "task");
    assert_eq!(shown["status"], "open");
    assert_eq!(shown["priority"], 1);
    assert_eq!(shown["project"], "web");
    assert!(shown["parent"].is_null());
    assert_eq!(shown["labels"], serde_json::json!([]));
    assert_eq!(shown["dependencies"], serde_json::json!([]));
    assert_eq!(shown["logs"], serde_json::json!([]));
}

#[test]
fn test_unknown_id_is_not_found() {
    let env = Env::initialized();
    let (code, err) = env.fail(&["show", "ts-ffffff"]);
    assert_eq!(code, 3);
    assert_eq!(err["error"]["code"], "ITEM_NOT_FOUND");
}

#[test]
fn test_epic_status_follows_children() {
    let env = Env::initialized();
    let epic = env.add(&["Launch", "--epic"]);
    let a = env.add(&["Part A", "--parent", &epic]);
    let b = env.add(&["Part B", "--parent", &epic]);

    assert_eq!(env.json(&["show", &epic])["status"], "open");

    env.json(&["start", &a]);
    assert_eq!(env.json(&["show", &epic])["status"], "in_progress");

    env.json(&["done", &a, &b]);
    assert_eq!(env.json(&["show", &epic])["status"], "done");
}

#[test]
fn test_epic_rejects_manual_progress() {
    let env = Env::initialized();
    let epic = env.add(&["Launch", "--epic"]);
    let (code, err) = env.fail(&["start", &epic]);
    assert_eq!(code, 4);
    assert_eq!(err["error"]["code"], "INVALID_TRANSITION");
    assert_eq!(err["error"]["retryable"], true);
}

#[test]
fn test_task_ready_after_epic_completes() {
    let env = Env::initialized();
    let epic = env.add(&["Foundation", "--epic", "-p", "app"]);
    let child = env.add(&["Schema", "--parent", &epic, "-p", "app"]);
    let follow_up = env.add(&["API", "-p", "app"]);
    env.json(&["dep", "add", &follow_up, &epic]);

    let ready = env.json(&["ready", "-p", "app"]);
    let ids: Vec<&str> = ready
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&child.as_str()));
    assert!(!ids.contains(&follow_up.as_str()));

    env.json(&["done", &child]);

    let ready = env.json(&["ready", "-p", "app"]);
    let ids: Vec<&str> = ready
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![follow_up.as_str()]);
}

#[test]
fn test_dependency_cycle_is_rejected() {
    let env = Env::initialized();
    let a = env.add(&["A"]);
    let b = env.add(&["B"]);
    env.json(&["dep", "add", &a, &b]);

    let (code, err) = env.fail(&["dep", "add", &b, &a]);
    assert_eq!(code, 5);
    assert_eq!(err["error"]["code"], "CYCLE_DETECTED");
}

#[test]
fn test_review_requires_in_progress() {
    let env = Env::initialized();
    let id = env.add(&["Task"]);
    let (code, _) = env.fail(&["review", &id]);
    assert_eq!(code, 4);

    env.json(&["start", &id]);
    let out = env.json(&["review", &id]);
    assert_eq!(out[0]["status"], "reviewing");
}

#[test]
fn test_batch_transition_is_all_or_nothing() {
    let env = Env::initialized();
    let first = env.add(&["First"]);
    let second = env.add(&["Second"]);
    let epic = env.add(&["Epic", "--epic"]);

    let (code, err) = env.fail(&["done", &first, "ts-ffffff"]);
    assert_eq!(code, 3);
    assert_eq!(err["error"]["code"], "ITEM_NOT_FOUND");

    let (code, _) = env.fail(&["start", &first, &epic, &second]);
    assert_eq!(code, 4);

    for id in [first.as_str(), second.as_str()] {
        assert_eq!(env.json(&["show", id])["status"], "open");
    }
}

#[test]
fn test_list_filters_and_labels() {
    let env = Env::initialized();
    let a = env.add(&["A", "-l", "backend"]);
    let b = env.add(&["B"]);
    env.json(&["label", "add", &b, "backend", "urgent"]);
    env.json(&["dep", "add", &a, &b]);

    let labeled = env.json(&["list", "-l", "urgent"]);
    assert_eq!(labeled["count"], 1);
    assert_eq!(labeled["items"][0]["id"], b.as_str());

    let blocked = env.json(&["list", "--has-blockers"]);
    assert_eq!(blocked["count"], 1);
    assert_eq!(blocked["items"][0]["id"], a.as_str());

    let (code, _) = env.fail(&["list", "--has-blockers", "--no-blockers"]);
    assert_eq!(code, 4);
}

#[test]
fn test_status_report_counts() {
    let env = Env::initialized();
    let a = env.add(&["A", "-p", "rep"]);
    env.add(&["B", "-p", "rep"]);
    env.json(&["done", &a]);

    let report = env.json(&["status", "-p", "rep"]);
    assert_eq!(report["open"], 1);
    assert_eq!(report["done"], 1);
    assert_eq!(report["ready"], 1);
    assert_eq!(report["recent_done"][0]["id"], a.as_str());
}

#[test]
fn test_log_edit_and_delete() {
    let env = Env::initialized();
    let id = env.add(&["Draft"]);
    env.json(&["log", &id, "started drafting"]);
    env.json(&["edit", &id, "--title", "Final", "--priority", "3"]);

    let shown = env.json(&["show", &id]);
    assert_eq!(shown["title"], "Final");
    assert_eq!(shown["priority"], 3);
    assert_eq!(shown["logs"][0]["message"], "started drafting");

    env.json(&["delete", &id]);
    let (code, _) = env.fail(&["show", &id]);
    assert_eq!(code, 3);
}

#[test]
fn test_projects_registered_on_add() {
    let env = Env::initialized();
    env.add(&["A", "-p", "zeta"]);
    env.add(&["B", "-p", "alpha"]);

    let out = env.json(&["projects"]);
    let names: Vec<&str> = out["projects"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["alpha", "zeta"]);
}

#[test]
fn test_history_records_actor_and_changes() {
    let env = Env::initialized();
    let id = env.add(&["Audit me"]);
    env.json(&["start", &id]);

    let history = env.json(&["history", &id]);
    assert_eq!(history["count"], 2);
    let latest = &history["events"][0];
    assert_eq!(latest["event_type"], "status_changed");
    assert_eq!(latest["actor"], "cli-test");
    assert_eq!(latest["old_value"], "open");
    assert_eq!(latest["new_value"], "in_progress");
    assert_eq!(history["events"][1]["event_type"], "item_created");

    let (code, _) = env.fail(&["history", "ts-ffffff"]);
    assert_eq!(code, 3);
}

#[test]
fn test_show_full_detail() {
    let env = Env::initialized();
    let blocker = env.add(&["Blocker", "-p", "test"]);
    let id = env.add(&[
        "Show Task",
        "-p",
        "test",
        "-d",
        "A description",
        "--dod",
        "Tests pass",
        "--priority",
        "1",
        "-l",
        "bug",
        "--blocks-on",
        &blocker,
    ]);
    env.json(&["start", &id]);
    env.json(&["log", &id, "Started work"]);

    let shown = env.json(&["show", &id]);
    assert_eq!(shown["title"], "Show Task");
    assert_eq!(shown["type"], "task");
    assert_eq!(shown["status"], "in_progress");
    assert_eq!(shown["priority"], 1);
    assert_eq!(shown["project"], "test");
    assert!(shown["parent"].is_null());
    assert_eq!(shown["description"], "A description");
    assert_eq!(shown["definition_of_done"], "Tests pass");
    assert_eq!(shown["labels"], serde_json::json!(["bug"]));
    assert_eq!(shown["dependencies"], serde_json::json!([blocker]));
    assert_eq!(shown["blockers"], serde_json::json!([blocker]));
    assert_eq!(shown["logs"][0]["message"], "Started work");

    env.json(&["edit", &id, "--dod", "Docs updated"]);
    assert_eq!(env.json(&["show", &id])["definition_of_done"], "Docs updated");

    env.json(&["edit", &id, "--clear-dod"]);
    let shown = env.json(&["show", &id]);
    assert!(shown["definition_of_done"].is_null());
    assert!(shown.as_object().unwrap().contains_key("definition_of_done"));
}
