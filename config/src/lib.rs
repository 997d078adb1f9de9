//! Settings persistence and tool configuration for Autocoder.

mod config;
mod file_store;
mod memory_store;
mod registry;
mod store;

pub use config::{
    AutocoderConfig, ConfigError, HOME_ENV, LoggingConfig, config_path, expand_env_vars, home_dir,
};
pub use file_store::FileSettingsStore;
pub use memory_store::MemorySettingsStore;
pub use registry::ProjectRegistry;
pub use store::{SettingsStore, StoreFetchError, StoreFut, StoreWriteError, WriteCause};
