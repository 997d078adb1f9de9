//! Per-scope settings snapshots.
//!
//! `AppSettings` and `ProjectSettings` share one representation but are
//! distinct types, so a project map can never be passed where the app layer is
//! expected. Insertion checks the key against the scope; a project map never
//! holds a UI-only key.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::{Scope, ScopeError, Setting, SettingKey};

/// A partial update: the keys to write and their new values.
pub type SettingsPatch = BTreeMap<SettingKey, Setting>;

/// Compile-time tag naming the scope a [`ScopedSettings`] belongs to.
pub trait ScopeMarker: fmt::Debug + Clone + Copy + PartialEq + Eq + Default {
    const SCOPE: Scope;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppScope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProjectScope;

impl ScopeMarker for AppScope {
    const SCOPE: Scope = Scope::App;
}

impl ScopeMarker for ProjectScope {
    const SCOPE: Scope = Scope::Project;
}

/// Raw values stored at one scope. Absence of a key means "not set here".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScopedSettings<S: ScopeMarker> {
    values: BTreeMap<SettingKey, Setting>,
    _scope: PhantomData<S>,
}

pub type AppSettings = ScopedSettings<AppScope>;
pub type ProjectSettings = ScopedSettings<ProjectScope>;

impl<S: ScopeMarker> ScopedSettings<S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: BTreeMap::new(),
            _scope: PhantomData,
        }
    }

    pub fn from_settings(settings: impl IntoIterator<Item = Setting>) -> Result<Self, ScopeError> {
        let mut out = Self::new();
        for setting in settings {
            out.insert(setting)?;
        }
        Ok(out)
    }

    #[must_use]
    pub const fn scope(&self) -> Scope {
        S::SCOPE
    }

    #[must_use]
    pub fn get(&self, key: SettingKey) -> Option<&Setting> {
        self.values.get(&key)
    }

    #[must_use]
    pub fn contains(&self, key: SettingKey) -> bool {
        self.values.contains_key(&key)
    }

    /// Insert or overwrite, returning the previous value.
    pub fn insert(&mut self, setting: Setting) -> Result<Option<Setting>, ScopeError> {
        let key = setting.key();
        key.check_scope(S::SCOPE)?;
        Ok(self.values.insert(key, setting))
    }

    pub fn remove(&mut self, key: SettingKey) -> Option<Setting> {
        self.values.remove(&key)
    }

    /// Apply a partial update; keys not in `patch` are left untouched.
    ///
    /// All keys are checked before anything is written.
    pub fn merge(&mut self, patch: &SettingsPatch) -> Result<(), ScopeError> {
        for key in patch.keys() {
            key.check_scope(S::SCOPE)?;
        }
        for (key, setting) in patch {
            self.values.insert(*key, setting.clone());
        }
        Ok(())
    }

    /// Remove every value, returning how many were cleared.
    pub fn clear(&mut self) -> usize {
        let cleared = self.values.len();
        self.values.clear();
        cleared
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = SettingKey> + '_ {
        self.values.keys().copied()
    }

    pub fn iter(&self) -> btree_map::Values<'_, SettingKey, Setting> {
        self.values.values()
    }
}

impl<'a, S: ScopeMarker> IntoIterator for &'a ScopedSettings<S> {
    type Item = &'a Setting;
    type IntoIter = btree_map::Values<'a, SettingKey, Setting>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.values()
    }
}

/// Name of a registered project.
///
/// Invariant: non-empty after trimming, stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectId(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("project name must not be empty")]
pub struct EmptyProjectIdError;

impl ProjectId {
    pub fn new(raw: impl Into<String>) -> Result<Self, EmptyProjectIdError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Err(EmptyProjectIdError)
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProjectId {
    type Error = EmptyProjectIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ProjectId {
    type Error = EmptyProjectIdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProjectId> for String {
    fn from(value: ProjectId) -> Self {
        value.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Last-fetched state of both layers for one editing session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshots {
    pub app: AppSettings,
    /// `None` when the session is not bound to a project.
    pub project: Option<ProjectSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSnapshot {
    pub id: ProjectId,
    pub settings: ProjectSettings,
}

impl Snapshots {
    /// The project layer, if the session is bound to a project.
    #[must_use]
    pub fn project_settings(&self) -> Option<&ProjectSettings> {
        self.project.as_ref().map(|p| &p.settings)
    }

    #[must_use]
    pub fn project_id(&self) -> Option<&ProjectId> {
        self.project.as_ref().map(|p| &p.id)
    }
}
