//! Settings domain types for Autocoder.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies:
//! the closed setting schema, the app/project scopes, value provenance, and the
//! per-scope snapshots the engine resolves against.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod settings;
mod snapshot;

pub use settings::{
    Category, DEFAULT_MODEL, EmptyModelIdError, ModelId, PROJECT_KEYS, Partition, Scope,
    ScopeError, Setting, SettingKey, SettingValue, Source, UI_ONLY_KEYS, UnknownKeyError,
    ValueKind, ValueShapeError,
};
pub use snapshot::{
    AppScope, AppSettings, EmptyProjectIdError, ProjectId, ProjectScope, ProjectSettings,
    ProjectSnapshot, ScopeMarker, ScopedSettings, SettingsPatch, Snapshots,
};
