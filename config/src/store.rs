//! The persistence seam between an editing session and wherever settings live.

use std::fmt;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::pin::Pin;

use thiserror::Error;

use autocoder_types::{
    AppSettings, ProjectId, ProjectSettings, Scope, ScopeError, SettingKey, SettingsPatch,
};

/// Boxed future returned by [`SettingsStore`] methods.
pub type StoreFut<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Read and write access to the app layer and per-project layers.
///
/// Writes are partial: only the keys present in a patch change. Store
/// failures are reported, never retried here.
pub trait SettingsStore: Send + Sync {
    fn fetch_app_settings(&self) -> StoreFut<'_, Result<AppSettings, StoreFetchError>>;

    fn fetch_project_settings<'a>(
        &'a self,
        project: &'a ProjectId,
    ) -> StoreFut<'a, Result<ProjectSettings, StoreFetchError>>;

    fn write_app_settings<'a>(
        &'a self,
        patch: &'a SettingsPatch,
    ) -> StoreFut<'a, Result<(), StoreWriteError>>;

    fn write_project_settings<'a>(
        &'a self,
        project: &'a ProjectId,
        patch: &'a SettingsPatch,
    ) -> StoreFut<'a, Result<(), StoreWriteError>>;

    /// Remove one project override. `Ok(false)` if the key was not set.
    fn delete_project_setting<'a>(
        &'a self,
        project: &'a ProjectId,
        key: SettingKey,
    ) -> StoreFut<'a, Result<bool, StoreWriteError>>;

    /// Remove every app-level value, returning how many keys were cleared.
    fn reset_app_settings(&self) -> StoreFut<'_, Result<usize, StoreWriteError>>;

    /// Remove every override for `project`, returning how many were cleared.
    fn reset_project_settings<'a>(
        &'a self,
        project: &'a ProjectId,
    ) -> StoreFut<'a, Result<usize, StoreWriteError>>;
}

#[derive(Debug, Error)]
pub enum StoreFetchError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid settings in {origin}: {reason}")]
    Invalid { origin: String, reason: String },
    #[error("project '{0}' is not registered")]
    ProjectNotFound(ProjectId),
    #[error("settings store unavailable: {0}")]
    Unavailable(String),
}

/// A failed write, naming the scope and keys that were not persisted.
#[derive(Debug, Error)]
#[error("failed to write {scope} settings [{}]: {cause}", join_keys(.keys))]
pub struct StoreWriteError {
    pub scope: Scope,
    pub keys: Vec<SettingKey>,
    #[source]
    pub cause: WriteCause,
}

#[derive(Debug, Error)]
pub enum WriteCause {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} is not valid TOML: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: toml_edit::TomlError,
    },
    #[error("project '{0}' is not registered")]
    ProjectNotFound(ProjectId),
    #[error(transparent)]
    Scope(#[from] ScopeError),
    #[error("rejected: {0}")]
    Rejected(String),
    #[error("store task failed: {0}")]
    Join(String),
}

impl StoreWriteError {
    pub fn new(scope: Scope, keys: impl IntoIterator<Item = SettingKey>, cause: WriteCause) -> Self {
        Self {
            scope,
            keys: keys.into_iter().collect(),
            cause,
        }
    }
}

fn join_keys(keys: &[SettingKey]) -> impl fmt::Display + '_ {
    struct Joined<'a>(&'a [SettingKey]);

    impl fmt::Display for Joined<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            for (i, key) in self.0.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                f.write_str(key.as_str())?;
            }
            Ok(())
        }
    }

    Joined(keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_error_names_scope_and_keys() {
        let err = StoreWriteError::new(
            Scope::Project,
            [SettingKey::YoloMode, SettingKey::MaxConcurrency],
            WriteCause::Rejected("disk full".into()),
        );
        assert_eq!(
            err.to_string(),
            "failed to write project settings [yoloMode, maxConcurrency]: rejected: disk full"
        );
    }

    #[test]
    fn scope_cause_is_transparent() {
        let cause: WriteCause = ScopeError {
            key: SettingKey::Theme,
            scope: Scope::Project,
        }
        .into();
        assert_eq!(cause.to_string(), "theme cannot be stored at project scope");
    }
}
