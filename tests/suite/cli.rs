//! The `autocoder` binary against a temporary home.

use serde_json::json;

use crate::common::{PROJECT, Workspace};

#[test]
fn show_json_reports_defaults_on_a_fresh_home() {
    let ws = Workspace::new();
    let shown = ws.show_json(None);

    assert_eq!(shown["project"], serde_json::Value::Null);
    assert_eq!(shown["settings"]["maxConcurrency"]["value"], json!(3));
    assert_eq!(shown["settings"]["maxConcurrency"]["source"], json!("default"));
    assert_eq!(shown["settings"]["theme"]["value"], json!("twitter"));
    assert!(shown["settings"].get("testingDirectory").is_some());
}

#[test]
fn set_then_show_reports_layer_sources() {
    let ws = Workspace::new();
    let out = ws.run_ok(&[
        "set",
        "--project",
        PROJECT,
        "--app",
        "maxConcurrency=5",
        "--override",
        "yolo_mode=on",
    ]);
    assert!(out.contains("Saved 1 app and 1 project setting(s)."), "{out}");

    let shown = ws.show_json(Some(PROJECT));
    assert_eq!(shown["project"], json!(PROJECT));
    assert_eq!(shown["settings"]["yoloMode"]["value"], json!(true));
    assert_eq!(shown["settings"]["yoloMode"]["source"], json!("project"));
    assert_eq!(shown["settings"]["maxConcurrency"]["value"], json!(5));
    assert_eq!(shown["settings"]["maxConcurrency"]["source"], json!("app"));

    let app_only = ws.show_json(None);
    assert_eq!(app_only["settings"]["yoloMode"]["source"], json!("default"));
}

#[test]
fn dry_run_writes_nothing() {
    let ws = Workspace::new();
    let out = ws.run_ok(&[
        "set",
        "--project",
        PROJECT,
        "--app",
        "theme=dracula",
        "--override",
        "autoCommit=true",
        "--dry-run",
    ]);

    assert!(out.contains("theme: skipped in dry run"), "{out}");
    assert!(out.contains("autoCommit"), "{out}");
    assert!(out.contains("discarded 1 pending change(s)"), "{out}");
    assert!(Workspace::read(&ws.app_settings_path()).is_none());
    assert!(Workspace::read(&ws.project_settings_path()).is_none());
}

#[test]
fn override_without_project_is_rejected() {
    let ws = Workspace::new();
    let output = ws.run(&["set", "--override", "yoloMode=true"]);
    assert!(!output.status.success());
    assert!(Workspace::read(&ws.app_settings_path()).is_none());
}

#[test]
fn ui_key_cannot_be_overridden_per_project() {
    let ws = Workspace::new();
    let output = ws.run(&["set", "--project", PROJECT, "--override", "darkMode=true"]);
    assert!(!output.status.success());
    assert!(Workspace::read(&ws.project_settings_path()).is_none());
}

#[test]
fn unknown_key_and_bad_value_fail() {
    let ws = Workspace::new();
    assert!(!ws.run(&["explain", "warpDrive"]).status.success());
    assert!(!ws.run(&["set", "--app", "maxConcurrency=many"]).status.success());
}

#[test]
fn unregistered_project_fails() {
    let ws = Workspace::new();
    let output = ws.run(&["show", "--project", "nowhere"]);
    assert!(!output.status.success());
}

#[test]
fn explain_marks_the_winning_layer() {
    let ws = Workspace::new();
    ws.write_app_settings("yoloMode = false\n");
    ws.write_project_settings("yoloMode = true\n");

    let out = ws.run_ok(&["explain", "yoloMode", "--project", PROJECT]);
    let winner = out
        .lines()
        .find(|line| line.contains("<- effective"))
        .unwrap_or_else(|| panic!("no winner in {out}"));
    assert!(winner.contains("true"), "{out}");
    assert!(winner.trim_start().starts_with("Project"), "{out}");
}

#[test]
fn reset_and_reset_all() {
    let ws = Workspace::new();
    ws.write_app_settings("maxConcurrency = 7\n");
    ws.write_project_settings("yoloMode = true\nautoCommit = true\n");

    let out = ws.run_ok(&["reset", "yoloMode", "--project", PROJECT]);
    assert!(out.contains("Removed project override for yoloMode."), "{out}");
    let out = ws.run_ok(&["reset", "yoloMode", "--project", PROJECT]);
    assert!(out.contains("nothing to reset"), "{out}");

    let out = ws.run_ok(&["reset-all", "--scope", "project", "--project", PROJECT]);
    assert!(out.contains("Cleared 1 project setting(s)."), "{out}");
    let out = ws.run_ok(&["reset-all", "--scope", "app"]);
    assert!(out.contains("Cleared 1 app setting(s)."), "{out}");

    let shown = ws.show_json(Some(PROJECT));
    for (key, entry) in shown["settings"].as_object().unwrap() {
        assert_eq!(entry["source"], json!("default"), "{key}");
    }
}

#[test]
fn register_adds_project_to_config() {
    let ws = Workspace::new();
    let other = ws.home.parent().unwrap().join("garden");
    std::fs::create_dir_all(&other).unwrap();

    let out = ws.run_ok(&["register", "garden", other.to_str().unwrap()]);
    assert!(out.contains("Registered 'garden'"), "{out}");

    let config = Workspace::read(&ws.home.join("config.toml")).unwrap();
    assert!(config.contains(PROJECT), "{config}");
    assert!(config.contains("garden"), "{config}");

    ws.run_ok(&["set", "--project", "garden", "--override", "maxConcurrency=2"]);
    assert!(other.join(".autocoder").join("settings.toml").exists());
}

#[test]
fn categories_lists_every_group() {
    let ws = Workspace::new();
    let out = ws.run_ok(&["categories"]);
    for name in ["models", "agents", "ui", "git"] {
        assert!(out.lines().any(|line| line.starts_with(name)), "{out}");
    }
    assert!(out.contains("commitMessagePrefix"), "{out}");
}
