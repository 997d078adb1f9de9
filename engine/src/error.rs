use std::fmt;

use thiserror::Error;

use autocoder_config::{StoreFetchError, StoreWriteError};
use autocoder_types::{Scope, ScopeError, SettingKey, UnknownKeyError, ValueShapeError};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    UnknownKey(#[from] UnknownKeyError),
    #[error(transparent)]
    Shape(#[from] ValueShapeError),
    #[error(transparent)]
    Scope(#[from] ScopeError),
    #[error("{0} applies immediately and cannot be buffered")]
    NotBuffered(SettingKey),
    #[error("no project selected")]
    NoProject,
    #[error("settings unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Fetch(#[from] StoreFetchError),
    #[error(transparent)]
    Write(#[from] StoreWriteError),
    #[error(transparent)]
    FlushFailed(#[from] FlushFailure),
    #[error("a save is still in flight")]
    InFlight,
}

/// The scopes whose flush failed during one save. Their pending entries are
/// retained; scopes that are not listed were written and cleared.
#[derive(Debug, Error)]
#[error("save failed: {}", describe(.failures))]
pub struct FlushFailure {
    pub failures: Vec<StoreWriteError>,
}

impl FlushFailure {
    #[must_use]
    pub fn failed_scopes(&self) -> Vec<Scope> {
        self.failures.iter().map(|f| f.scope).collect()
    }

    /// Keys that were attempted and not persisted for `scope`.
    #[must_use]
    pub fn retained_keys(&self, scope: Scope) -> Vec<SettingKey> {
        self.failures
            .iter()
            .filter(|f| f.scope == scope)
            .flat_map(|f| f.keys.iter().copied())
            .collect()
    }
}

fn describe(failures: &[StoreWriteError]) -> impl fmt::Display + '_ {
    struct Describe<'a>(&'a [StoreWriteError]);

    impl fmt::Display for Describe<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            for (i, failure) in self.0.iter().enumerate() {
                if i > 0 {
                    f.write_str("; ")?;
                }
                write!(f, "{failure}")?;
            }
            Ok(())
        }
    }

    Describe(failures)
}
