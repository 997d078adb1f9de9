//! Settings engine for Autocoder.
//!
//! Resolves the effective configuration from the app and project layers,
//! routes edits to immediate apply or to per-scope pending buffers, and
//! commits or discards those buffers through a [`SettingsStore`].

mod buffer;
mod classify;
mod error;
mod resolver;
mod session;
mod view;

pub use autocoder_config::SettingsStore;
pub use buffer::PendingBuffer;
pub use classify::{ChangeKind, classify};
pub use error::{FlushFailure, SettingsError};
pub use resolver::{Resolved, resolve, resolve_all, resolve_named};
pub use session::{CommitState, EditOutcome, SaveReport, SettingsSession};
pub use view::{CascadeLayer, EffectiveEntry, Layer, ResolveCascade};
