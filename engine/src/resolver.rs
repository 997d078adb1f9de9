//! Layer precedence: project override, then app value, then built-in default.

use autocoder_types::{
    AppSettings, ProjectSettings, Setting, SettingKey, Source, UnknownKeyError,
};

/// An effective value together with the layer that supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub value: Setting,
    pub source: Source,
}

/// Resolve `key` against the fetched layers. Total over the schema.
#[must_use]
pub fn resolve(app: &AppSettings, project: Option<&ProjectSettings>, key: SettingKey) -> Resolved {
    if let Some(value) = project.and_then(|layer| layer.get(key)) {
        return Resolved {
            value: value.clone(),
            source: Source::Project,
        };
    }
    if let Some(value) = app.get(key) {
        return Resolved {
            value: value.clone(),
            source: Source::App,
        };
    }
    Resolved {
        value: Setting::default_for(key),
        source: Source::Default,
    }
}

/// Resolve a key given by wire name.
pub fn resolve_named(
    app: &AppSettings,
    project: Option<&ProjectSettings>,
    raw_key: &str,
) -> Result<Resolved, UnknownKeyError> {
    let key = SettingKey::parse(raw_key)?;
    Ok(resolve(app, project, key))
}

/// Resolve every key, in schema order.
#[must_use]
pub fn resolve_all(app: &AppSettings, project: Option<&ProjectSettings>) -> Vec<(SettingKey, Resolved)> {
    SettingKey::ALL
        .iter()
        .map(|&key| (key, resolve(app, project, key)))
        .collect()
}
