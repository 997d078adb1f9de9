//! TOML-backed settings store.
//!
//! App settings live in `<home>/settings.toml`; each project's overrides in
//! `<project root>/.autocoder/settings.toml`. Both files are flat tables keyed
//! by wire name:
//!
//! ```toml
//! yoloMode = true
//! coderModel = "claude-sonnet-4-6"
//! ```
//!
//! Writes edit the existing document in place with `toml_edit`, so comments
//! and unrelated keys survive, and land atomically. Unknown keys in a file are
//! skipped with a warning; a recognized key with a value of the wrong type
//! fails the whole fetch.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use autocoder_types::{
    AppSettings, ProjectId, ProjectSettings, Scope, ScopeMarker, ScopedSettings, Setting,
    SettingKey, SettingValue, SettingsPatch,
};
use autocoder_utils::{
    FilePrivacy, PersistOptions, ensure_private_dir, persist_atomically, recover_interrupted_write,
};

use crate::registry::ProjectRegistry;
use crate::store::{SettingsStore, StoreFetchError, StoreFut, StoreWriteError, WriteCause};

const SETTINGS_FILE: &str = "settings.toml";
const PROJECT_DIR: &str = ".autocoder";

#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    home: PathBuf,
    registry: ProjectRegistry,
}

impl FileSettingsStore {
    #[must_use]
    pub fn new(home: impl Into<PathBuf>, registry: ProjectRegistry) -> Self {
        Self {
            home: home.into(),
            registry,
        }
    }

    #[must_use]
    pub fn app_settings_path(&self) -> PathBuf {
        self.home.join(SETTINGS_FILE)
    }

    #[must_use]
    pub fn project_settings_path(&self, project: &ProjectId) -> Option<PathBuf> {
        self.registry
            .project_path(project)
            .map(|root| root.join(PROJECT_DIR).join(SETTINGS_FILE))
    }

    #[must_use]
    pub fn registry(&self) -> &ProjectRegistry {
        &self.registry
    }

    fn app_target(&self) -> Target {
        Target {
            path: self.app_settings_path(),
            privacy: FilePrivacy::OwnerOnly,
        }
    }

    fn project_target(&self, project: &ProjectId) -> Option<Target> {
        self.project_settings_path(project).map(|path| Target {
            path,
            privacy: FilePrivacy::Inherit,
        })
    }
}

#[derive(Debug, Clone)]
struct Target {
    path: PathBuf,
    privacy: FilePrivacy,
}

impl Target {
    fn options(&self) -> PersistOptions {
        PersistOptions {
            sync: true,
            privacy: self.privacy,
        }
    }

    fn prepare_parent(&self) -> io::Result<()> {
        let Some(parent) = self.path.parent() else {
            return Ok(());
        };
        match self.privacy {
            FilePrivacy::OwnerOnly => ensure_private_dir(parent),
            FilePrivacy::Inherit => fs::create_dir_all(parent),
        }
    }
}

fn read_layer<S: ScopeMarker>(path: &Path) -> Result<ScopedSettings<S>, StoreFetchError> {
    recover_interrupted_write(path);

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ScopedSettings::new()),
        Err(e) => {
            return Err(StoreFetchError::Read {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    let table: toml::Table = toml::from_str(&content).map_err(|e| StoreFetchError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut layer = ScopedSettings::new();
    for (raw_key, raw_value) in table {
        let Ok(key) = SettingKey::parse(&raw_key) else {
            tracing::warn!(path = %path.display(), "Ignoring unknown setting '{raw_key}'");
            continue;
        };
        if !key.accepts(S::SCOPE) {
            tracing::warn!(
                path = %path.display(),
                "Ignoring {key}: not stored at {} scope",
                S::SCOPE
            );
            continue;
        }

        let invalid = |reason: String| StoreFetchError::Invalid {
            origin: path.display().to_string(),
            reason,
        };
        let value = match raw_value {
            toml::Value::Boolean(b) => SettingValue::Bool(b),
            toml::Value::Integer(i) => SettingValue::Integer(i),
            toml::Value::String(s) => SettingValue::Text(s),
            other => {
                return Err(invalid(format!(
                    "{key} has unsupported type {}",
                    other.type_str()
                )));
            }
        };
        let setting = Setting::new(key, value).map_err(|e| invalid(e.to_string()))?;
        if layer.contains(key) {
            return Err(invalid(format!("{key} is set more than once ('{raw_key}')")));
        }
        layer
            .insert(setting)
            .map_err(|e| invalid(e.to_string()))?;
    }
    Ok(layer)
}

fn load_document(path: &Path) -> Result<Option<toml_edit::DocumentMut>, WriteCause> {
    recover_interrupted_write(path);

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(WriteCause::Io {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    content
        .parse::<toml_edit::DocumentMut>()
        .map(Some)
        .map_err(|e| WriteCause::Corrupt {
            path: path.to_path_buf(),
            source: e,
        })
}

fn save_document(target: &Target, doc: &toml_edit::DocumentMut) -> Result<(), WriteCause> {
    let io_err = |source| WriteCause::Io {
        path: target.path.clone(),
        source,
    };
    target.prepare_parent().map_err(io_err)?;
    persist_atomically(&target.path, doc.to_string().as_bytes(), target.options()).map_err(io_err)
}

fn toml_value(setting: &Setting) -> toml_edit::Item {
    match setting.value() {
        SettingValue::Bool(b) => toml_edit::value(b),
        SettingValue::Integer(i) => toml_edit::value(i),
        SettingValue::Text(s) => toml_edit::value(s),
    }
}

fn apply_patch(target: &Target, scope: Scope, patch: &SettingsPatch) -> Result<(), WriteCause> {
    for key in patch.keys() {
        key.check_scope(scope)?;
    }
    let mut doc = load_document(&target.path)?.unwrap_or_default();
    for (key, setting) in patch {
        for stale in matching_entries(&doc, *key) {
            if stale != key.as_str() {
                doc.as_table_mut().remove(&stale);
            }
        }
        doc[key.as_str()] = toml_value(setting);
    }
    save_document(target, &doc)?;
    tracing::debug!(
        path = %target.path.display(),
        keys = patch.len(),
        "Wrote {scope} settings"
    );
    Ok(())
}

/// Remove `key` from the document. A missing file is left missing.
fn remove_key(target: &Target, key: SettingKey) -> Result<bool, WriteCause> {
    let Some(mut doc) = load_document(&target.path)? else {
        return Ok(false);
    };
    let spellings = matching_entries(&doc, key);
    if spellings.is_empty() {
        return Ok(false);
    }
    for raw in &spellings {
        doc.as_table_mut().remove(raw);
    }
    save_document(target, &doc)?;
    Ok(true)
}

/// Remove every recognized key accepted at `scope`, leaving anything else.
fn remove_all(target: &Target, scope: Scope) -> Result<usize, WriteCause> {
    let Some(mut doc) = load_document(&target.path)? else {
        return Ok(0);
    };
    let doomed: Vec<String> = doc
        .as_table()
        .iter()
        .filter_map(|(raw, _)| {
            SettingKey::parse(raw)
                .ok()
                .filter(|key| key.accepts(scope))
                .map(|_| raw.to_string())
        })
        .collect();
    if doomed.is_empty() {
        return Ok(0);
    }
    for raw in &doomed {
        doc.as_table_mut().remove(raw);
    }
    save_document(target, &doc)?;
    Ok(doomed.len())
}

/// Files may spell a key in snake_case; every entry naming `key`, as written.
fn matching_entries(doc: &toml_edit::DocumentMut, key: SettingKey) -> Vec<String> {
    doc.as_table()
        .iter()
        .map(|(raw, _)| raw)
        .filter(|raw| SettingKey::parse(raw).is_ok_and(|parsed| parsed == key))
        .map(str::to_string)
        .collect()
}

async fn run_fetch<T, F>(f: F) -> Result<T, StoreFetchError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, StoreFetchError> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result,
        Err(e) => Err(StoreFetchError::Unavailable(e.to_string())),
    }
}

async fn run_write<T, F>(scope: Scope, keys: Vec<SettingKey>, f: F) -> Result<T, StoreWriteError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, WriteCause> + Send + 'static,
{
    let cause = match tokio::task::spawn_blocking(f).await {
        Ok(Ok(value)) => return Ok(value),
        Ok(Err(cause)) => cause,
        Err(e) => WriteCause::Join(e.to_string()),
    };
    Err(StoreWriteError::new(scope, keys, cause))
}

impl SettingsStore for FileSettingsStore {
    fn fetch_app_settings(&self) -> StoreFut<'_, Result<AppSettings, StoreFetchError>> {
        let path = self.app_settings_path();
        Box::pin(run_fetch(move || read_layer(&path)))
    }

    fn fetch_project_settings<'a>(
        &'a self,
        project: &'a ProjectId,
    ) -> StoreFut<'a, Result<ProjectSettings, StoreFetchError>> {
        let path = self.project_settings_path(project);
        Box::pin(async move {
            let path = path.ok_or_else(|| StoreFetchError::ProjectNotFound(project.clone()))?;
            run_fetch(move || read_layer(&path)).await
        })
    }

    fn write_app_settings<'a>(
        &'a self,
        patch: &'a SettingsPatch,
    ) -> StoreFut<'a, Result<(), StoreWriteError>> {
        let target = self.app_target();
        let owned = patch.clone();
        Box::pin(run_write(Scope::App, patch.keys().copied().collect(), move || {
            apply_patch(&target, Scope::App, &owned)
        }))
    }

    fn write_project_settings<'a>(
        &'a self,
        project: &'a ProjectId,
        patch: &'a SettingsPatch,
    ) -> StoreFut<'a, Result<(), StoreWriteError>> {
        let target = self.project_target(project);
        Box::pin(async move {
            let keys: Vec<SettingKey> = patch.keys().copied().collect();
            let Some(target) = target else {
                return Err(StoreWriteError::new(
                    Scope::Project,
                    keys,
                    WriteCause::ProjectNotFound(project.clone()),
                ));
            };
            let owned = patch.clone();
            run_write(Scope::Project, keys, move || {
                apply_patch(&target, Scope::Project, &owned)
            })
            .await
        })
    }

    fn delete_project_setting<'a>(
        &'a self,
        project: &'a ProjectId,
        key: SettingKey,
    ) -> StoreFut<'a, Result<bool, StoreWriteError>> {
        let target = self.project_target(project);
        Box::pin(async move {
            let Some(target) = target else {
                return Err(StoreWriteError::new(
                    Scope::Project,
                    [key],
                    WriteCause::ProjectNotFound(project.clone()),
                ));
            };
            run_write(Scope::Project, vec![key], move || remove_key(&target, key)).await
        })
    }

    fn reset_app_settings(&self) -> StoreFut<'_, Result<usize, StoreWriteError>> {
        let target = self.app_target();
        Box::pin(run_write(Scope::App, Vec::new(), move || {
            remove_all(&target, Scope::App)
        }))
    }

    fn reset_project_settings<'a>(
        &'a self,
        project: &'a ProjectId,
    ) -> StoreFut<'a, Result<usize, StoreWriteError>> {
        let target = self.project_target(project);
        Box::pin(async move {
            let Some(target) = target else {
                return Err(StoreWriteError::new(
                    Scope::Project,
                    Vec::new(),
                    WriteCause::ProjectNotFound(project.clone()),
                ));
            };
            run_write(Scope::Project, Vec::new(), move || {
                remove_all(&target, Scope::Project)
            })
            .await
        })
    }
}
