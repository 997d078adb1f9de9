use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use autocoder_types::{
    AppSettings, ProjectId, ProjectSettings, Scope, SettingKey, SettingsPatch,
};

use crate::store::{SettingsStore, StoreFetchError, StoreFut, StoreWriteError, WriteCause};

/// In-process store. Projects must be registered before they can be read or
/// written.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    app: AppSettings,
    projects: BTreeMap<ProjectId, ProjectSettings>,
}

impl MemorySettingsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_app(self, app: AppSettings) -> Self {
        self.lock().app = app;
        self
    }

    pub fn with_project(self, id: ProjectId, settings: ProjectSettings) -> Self {
        self.lock().projects.insert(id, settings);
        self
    }

    pub fn register_project(&self, id: ProjectId) {
        self.lock().projects.entry(id).or_default();
    }

    #[must_use]
    pub fn app(&self) -> AppSettings {
        self.lock().app.clone()
    }

    #[must_use]
    pub fn project(&self, id: &ProjectId) -> Option<ProjectSettings> {
        self.lock().projects.get(id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn not_found(project: &ProjectId, keys: Vec<SettingKey>) -> StoreWriteError {
    StoreWriteError::new(
        Scope::Project,
        keys,
        WriteCause::ProjectNotFound(project.clone()),
    )
}

impl SettingsStore for MemorySettingsStore {
    fn fetch_app_settings(&self) -> StoreFut<'_, Result<AppSettings, StoreFetchError>> {
        Box::pin(async move { Ok(self.app()) })
    }

    fn fetch_project_settings<'a>(
        &'a self,
        project: &'a ProjectId,
    ) -> StoreFut<'a, Result<ProjectSettings, StoreFetchError>> {
        Box::pin(async move {
            self.project(project)
                .ok_or_else(|| StoreFetchError::ProjectNotFound(project.clone()))
        })
    }

    fn write_app_settings<'a>(
        &'a self,
        patch: &'a SettingsPatch,
    ) -> StoreFut<'a, Result<(), StoreWriteError>> {
        Box::pin(async move {
            self.lock().app.merge(patch).map_err(|e| {
                StoreWriteError::new(Scope::App, patch.keys().copied(), e.into())
            })
        })
    }

    fn write_project_settings<'a>(
        &'a self,
        project: &'a ProjectId,
        patch: &'a SettingsPatch,
    ) -> StoreFut<'a, Result<(), StoreWriteError>> {
        Box::pin(async move {
            let keys = || patch.keys().copied().collect::<Vec<_>>();
            let mut state = self.lock();
            let layer = state
                .projects
                .get_mut(project)
                .ok_or_else(|| not_found(project, keys()))?;
            layer
                .merge(patch)
                .map_err(|e| StoreWriteError::new(Scope::Project, keys(), e.into()))
        })
    }

    fn delete_project_setting<'a>(
        &'a self,
        project: &'a ProjectId,
        key: SettingKey,
    ) -> StoreFut<'a, Result<bool, StoreWriteError>> {
        Box::pin(async move {
            let mut state = self.lock();
            let layer = state
                .projects
                .get_mut(project)
                .ok_or_else(|| not_found(project, vec![key]))?;
            Ok(layer.remove(key).is_some())
        })
    }

    fn reset_app_settings(&self) -> StoreFut<'_, Result<usize, StoreWriteError>> {
        Box::pin(async move { Ok(self.lock().app.clear()) })
    }

    fn reset_project_settings<'a>(
        &'a self,
        project: &'a ProjectId,
    ) -> StoreFut<'a, Result<usize, StoreWriteError>> {
        Box::pin(async move {
            let mut state = self.lock();
            let layer = state
                .projects
                .get_mut(project)
                .ok_or_else(|| not_found(project, Vec::new()))?;
            Ok(layer.clear())
        })
    }
}
