use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

fn cmd(temp: &TempDir) -> assert_cmd::Command {
    let mut c = assert_cmd::Command::cargo_bin("kbboard").unwrap();
    c.arg("--config")
        .arg(temp.path().join("config.json"))
        .arg("--data-dir")
        .arg(temp.path().join("data"))
        .env("NO_COLOR", "1");
    c
}

fn notes(temp: &TempDir) -> Vec<Value> {
    let out = cmd(temp)
        .args(["list", "-f", "all", "--sort", "title-asc", "-j"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice::<Value>(&out)
        .unwrap()
        .as_array()
        .unwrap()
        .clone()
}

fn id_of(temp: &TempDir, title: &str) -> String {
    notes(temp)
        .iter()
        .find(|n| n["title"] == title)
        .and_then(|n| n["id"].as_str())
        .unwrap_or_else(|| panic!("note '{}' not found", title))
        .to_string()
}

fn add(temp: &TempDir, args: &[&str]) {
    cmd(temp).arg("add").args(args).assert().success();
}

#[test]
fn first_run_seeds_the_board() {
    let temp = TempDir::new().unwrap();
    assert_eq!(notes(&temp).len(), 4);
    assert!(temp.path().join("data").join("notes.json").exists());
}

#[test]
fn add_and_list_with_filters() {
    let temp = TempDir::new().unwrap();
    add(&temp, &["Pay rent", "--date", "2024-01-31", "-p", "high", "-t", "Home, bills"]);
    add(&temp, &["Someday", "--no-date"]);

    let rent = notes(&temp)
        .into_iter()
        .find(|n| n["title"] == "Pay rent")
        .unwrap();
    assert_eq!(rent["date"], "2024-01-31");
    assert_eq!(rent["priority"], "high");
    assert_eq!(rent["tags"], serde_json::json!(["home", "bills"]));

    cmd(&temp)
        .args(["list", "--tag", "bills", "-j"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pay rent"))
        .stdout(predicate::str::contains("Someday").not());

    cmd(&temp)
        .args(["list", "-f", "all", "-s", "SOMEDAY"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Someday"))
        .stdout(predicate::str::contains("Found 1 note"));

    cmd(&temp)
        .args(["tags"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#bills"));
}

#[test]
fn add_rejects_empty_title() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["add", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Title must not be empty"));
}

#[test]
fn undo_with_nothing_recorded_is_not_an_error() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .arg("undo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to undo"));
    cmd(&temp)
        .arg("redo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to redo"));
}

#[test]
fn undo_and_redo_survive_between_runs() {
    let temp = TempDir::new().unwrap();
    add(&temp, &["Temporary"]);
    assert_eq!(notes(&temp).len(), 5);

    cmd(&temp)
        .arg("undo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Undone: Added: \"Temporary\""));
    assert_eq!(notes(&temp).len(), 4);

    cmd(&temp)
        .arg("redo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Redone: Added: \"Temporary\""));
    assert_eq!(notes(&temp).len(), 5);

    cmd(&temp)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("Board loaded"))
        .stdout(predicate::str::contains("add"));
}

#[test]
fn completing_recurring_note_schedules_next() {
    let temp = TempDir::new().unwrap();
    add(&temp, &["Water plants", "--date", "2024-01-10", "-r", "weekly"]);
    let id = id_of(&temp, "Water plants");

    cmd(&temp)
        .args(["toggle", &id[..8]])
        .assert()
        .success()
        .stdout(predicate::str::contains("Completed: \"Water plants\""))
        .stdout(predicate::str::contains("2024-01-17"));

    let plants: Vec<Value> = notes(&temp)
        .into_iter()
        .filter(|n| n["title"] == "Water plants")
        .collect();
    assert_eq!(plants.len(), 2);
    assert!(plants.iter().any(|n| n["completed"] == true && n["column"] == "done"));
    assert!(plants
        .iter()
        .any(|n| n["completed"] == false && n["date"] == "2024-01-17"));
}

#[test]
fn move_and_bulk_operations() {
    let temp = TempDir::new().unwrap();
    add(&temp, &["Alpha"]);
    add(&temp, &["Beta"]);
    let alpha = id_of(&temp, "Alpha");
    let beta = id_of(&temp, "Beta");

    cmd(&temp)
        .args(["move", &alpha, "inprogress"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Moved \"Alpha\" to In Progress"));

    cmd(&temp)
        .args(["bulk-color", "coral", &alpha, &beta])
        .assert()
        .success()
        .stdout(predicate::str::contains("Changed color of 2 notes"));

    cmd(&temp)
        .args(["bulk-delete", &alpha, "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Note not found"));
    assert_eq!(notes(&temp).len(), 6);

    cmd(&temp)
        .args(["bulk-delete", &alpha, &beta])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 2 notes"));
    assert_eq!(notes(&temp).len(), 4);
}

#[test]
fn export_csv_to_stdout() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["export", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            r#""Title","Description","Status","Priority","Due Date","Tags","Color""#,
        ))
        .stdout(predicate::str::contains("\"Welcome to kbboard\""));
}

#[test]
fn export_then_import_replaces_board() {
    let temp = TempDir::new().unwrap();
    let export_path = temp.path().join("backup.json");
    cmd(&temp)
        .args(["export", "-o"])
        .arg(&export_path)
        .assert()
        .success();

    cmd(&temp).args(["clear", "--force"]).assert().success();
    assert!(notes(&temp).is_empty());

    cmd(&temp)
        .arg("import")
        .arg(&export_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 4 notes"));
    assert_eq!(notes(&temp).len(), 4);
}

#[test]
fn import_rejects_malformed_payloads() {
    let temp = TempDir::new().unwrap();
    let bad = temp.path().join("bad.json");
    fs::write(&bad, r#"{"title": "not an array"}"#).unwrap();

    cmd(&temp)
        .arg("import")
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid format"));
    assert_eq!(notes(&temp).len(), 4);
}

#[test]
fn clear_can_be_undone() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["clear", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared all notes"));
    cmd(&temp).arg("undo").assert().success();
    assert_eq!(notes(&temp).len(), 4);
}

#[test]
fn config_set_validates_and_persists() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["config", "--set", "max_history=0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_history"));

    cmd(&temp)
        .args(["config", "--set", "default_sort=title-asc"])
        .assert()
        .success();

    let saved = fs::read_to_string(temp.path().join("config.json")).unwrap();
    assert!(saved.contains("title-asc"));
}

#[test]
fn config_reset_recovers_invalid_file() {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("config.json");
    fs::write(&config_path, r#"{"max_history":0}"#).unwrap();

    cmd(&temp)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_history must be at least 1"));

    cmd(&temp)
        .args(["config", "--reset"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration reset to defaults"));

    let saved: Value = serde_json::from_str(&fs::read_to_string(&config_path).unwrap()).unwrap();
    assert_eq!(saved["max_history"], 50);
    assert_eq!(notes(&temp).len(), 4);
}

#[test]
fn config_set_repairs_invalid_file() {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("config.json");
    fs::write(&config_path, r#"{"max_history":0}"#).unwrap();

    cmd(&temp)
        .args(["config", "--set", "max_history=10"])
        .assert()
        .success();

    let saved: Value = serde_json::from_str(&fs::read_to_string(&config_path).unwrap()).unwrap();
    assert_eq!(saved["max_history"], 10);
}

#[test]
fn config_show_does_not_open_the_board() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("max_history"));
    assert!(!temp.path().join("data").join("notes.json").exists());

    fs::write(temp.path().join("config.json"), r#"{"max_history":0}"#).unwrap();
    cmd(&temp)
        .args(["config", "--show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_history must be at least 1"));
    assert!(!temp.path().join("data").join("notes.json").exists());
}

#[test]
fn remind_requires_reminders_enabled() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .arg("remind")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Reminders are disabled"));
}

#[test]
fn stats_reports_counts_as_json() {
    let temp = TempDir::new().unwrap();
    let out = cmd(&temp)
        .args(["stats", "-j"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stats: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(stats["total"], 4);
    assert_eq!(stats["columns"]["inprogress"], 1);
    assert_eq!(stats["smart_filters"]["high_priority"], 1);
    assert_eq!(stats["can_undo"], false);
}

#[test]
fn calendar_rejects_bad_month() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["calendar", "-m", "2024-13"])
        .assert()
        .failure();
    cmd(&temp)
        .args(["calendar", "-m", "2024-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("February 2024"));
}
