use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;
use thiserror::Error;

use autocoder_types::ProjectId;
use autocoder_utils::{PersistOptions, ensure_private_dir, persist_atomically};

use crate::registry::ProjectRegistry;

/// Overrides the Autocoder home directory (default `~/.autocoder`).
pub const HOME_ENV: &str = "AUTOCODER_HOME";

/// Tool configuration, read from `<home>/config.toml`.
///
/// ```toml
/// [logging]
/// level = "debug"
///
/// [projects]
/// my-app = "${HOME}/code/my-app"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct AutocoderConfig {
    pub logging: Option<LoggingConfig>,
    /// Registered projects: name -> project root.
    #[serde(default)]
    pub projects: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    pub level: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

/// Expand `${VAR}` references. Missing variables expand to nothing; an
/// unclosed `${` is kept literally.
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let var = &after[..end];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

impl AutocoderConfig {
    /// Load `<home>/config.toml`. A missing file is `Ok(None)`.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {}: {}", path.display(), err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn log_level(&self) -> Option<&str> {
        self.logging
            .as_ref()
            .and_then(|logging| logging.level.as_deref())
            .map(str::trim)
            .filter(|level| !level.is_empty())
    }

    /// Build the project registry, expanding `${VAR}` and a leading `~/`.
    #[must_use]
    pub fn registry(&self) -> ProjectRegistry {
        let mut registry = ProjectRegistry::default();
        for (name, raw_path) in &self.projects {
            let Ok(id) = ProjectId::new(name.as_str()) else {
                tracing::warn!("Ignoring project with empty name in config");
                continue;
            };
            registry.insert(id, expand_project_path(raw_path));
        }
        registry
    }

    /// Register `project` at `root` in the config file at `path`.
    ///
    /// Uses `toml_edit` to preserve comments and formatting. Creates the file
    /// and an owner-only parent directory if they don't exist.
    pub fn persist_project(path: &Path, project: &ProjectId, root: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            ensure_private_dir(parent)?;
        }

        let content = if path.exists() {
            fs::read_to_string(path)?
        } else {
            String::new()
        };

        let mut doc = content
            .parse::<toml_edit::DocumentMut>()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        if !doc.contains_key("projects") {
            doc["projects"] = toml_edit::Item::Table(toml_edit::Table::new());
        }
        let Some(projects) = doc["projects"].as_table_like_mut() else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("`projects` in {} is not a table", path.display()),
            ));
        };
        projects.insert(
            project.as_str(),
            toml_edit::value(root.display().to_string()),
        );

        persist_atomically(path, doc.to_string().as_bytes(), PersistOptions::default())
    }
}

fn expand_project_path(raw: &str) -> PathBuf {
    let expanded = expand_env_vars(raw.trim());
    if let Some(rest) = expanded.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(expanded)
}

/// `$AUTOCODER_HOME`, else `~/.autocoder`.
#[must_use]
pub fn home_dir() -> Option<PathBuf> {
    if let Some(explicit) = env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(explicit));
    }
    dirs::home_dir().map(|home| home.join(".autocoder"))
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    home_dir().map(|home| home.join("config.toml"))
}
