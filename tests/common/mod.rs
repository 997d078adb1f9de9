//! Shared test utilities and fixtures
//!
//! A throwaway Autocoder home with one registered project, plus a runner for
//! the compiled binary pointed at that home.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::Arc;

use autocoder_config::{FileSettingsStore, HOME_ENV, ProjectRegistry};
use autocoder_types::ProjectId;
use tempfile::TempDir;

pub const PROJECT: &str = "shop";

pub struct Workspace {
    _dir: TempDir,
    pub home: PathBuf,
    pub project_root: PathBuf,
}

impl Workspace {
    /// Home plus a `shop` project registered in `config.toml`.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let home = dir.path().join("home");
        let project_root = dir.path().join("shop");
        fs::create_dir_all(&home).expect("create home");
        fs::create_dir_all(&project_root).expect("create project");
        fs::write(
            home.join("config.toml"),
            format!(
                "[projects]\n{PROJECT} = {:?}\n",
                project_root.display().to_string()
            ),
        )
        .expect("write config");
        Self {
            _dir: dir,
            home,
            project_root,
        }
    }

    pub fn project_id() -> ProjectId {
        ProjectId::new(PROJECT).expect("project id")
    }

    pub fn store(&self) -> Arc<FileSettingsStore> {
        let mut registry = ProjectRegistry::default();
        registry.insert(Self::project_id(), self.project_root.clone());
        Arc::new(FileSettingsStore::new(&self.home, registry))
    }

    pub fn app_settings_path(&self) -> PathBuf {
        self.home.join("settings.toml")
    }

    pub fn project_settings_path(&self) -> PathBuf {
        self.project_root.join(".autocoder").join("settings.toml")
    }

    pub fn write_app_settings(&self, toml: &str) {
        fs::write(self.app_settings_path(), toml).expect("write app settings");
    }

    pub fn write_project_settings(&self, toml: &str) {
        let path = self.project_settings_path();
        fs::create_dir_all(path.parent().expect("parent")).expect("create project dir");
        fs::write(path, toml).expect("write project settings");
    }

    pub fn read(path: &Path) -> Option<String> {
        fs::read_to_string(path).ok()
    }

    /// Run the `autocoder` binary against this home.
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_autocoder"))
            .args(args)
            .env(HOME_ENV, &self.home)
            .env_remove("RUST_LOG")
            .env_remove("AUTOCODER_PROJECT")
            .output()
            .expect("run autocoder")
    }

    /// Run and require success, returning stdout.
    pub fn run_ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "autocoder {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).expect("utf-8 stdout")
    }

    pub fn show_json(&self, project: Option<&str>) -> serde_json::Value {
        let mut args = vec!["show", "--json"];
        if let Some(project) = project {
            args.extend(["--project", project]);
        }
        serde_json::from_str(&self.run_ok(&args)).expect("show --json output")
    }
}
