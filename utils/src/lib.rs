//! Shared infrastructure utilities for Autocoder.
//!
//! - **`persist`**: Crash-safe file persistence (temp + rename) and owner-only
//!   directories for settings files

pub mod persist;

pub use persist::{
    FilePrivacy, PersistOptions, ensure_private_dir, persist_atomically, recover_interrupted_write,
};
