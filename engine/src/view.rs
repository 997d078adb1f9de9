//! What the operator currently sees: fetched layers with pending edits laid
//! on top.

use std::fmt;

use autocoder_types::{AppScope, ProjectScope, Scope, Setting, SettingKey, Snapshots, Source};

use crate::buffer::PendingBuffer;
use crate::resolver::resolve;

/// The displayed value of one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveEntry {
    pub key: SettingKey,
    pub value: Setting,
    pub source: Source,
    /// True while the value comes from an unsaved edit.
    pub is_dirty: bool,
}

/// A pending project edit previews as the new project override; a pending app
/// edit as the new app value.
pub(crate) fn effective(
    snapshots: &Snapshots,
    app_pending: &PendingBuffer<AppScope>,
    project_pending: &PendingBuffer<ProjectScope>,
    key: SettingKey,
) -> EffectiveEntry {
    if let Some(value) = project_pending.get(key) {
        return EffectiveEntry {
            key,
            value: value.clone(),
            source: Source::Project,
            is_dirty: true,
        };
    }
    if let Some(value) = app_pending.get(key) {
        return EffectiveEntry {
            key,
            value: value.clone(),
            source: Source::App,
            is_dirty: true,
        };
    }
    let resolved = resolve(&snapshots.app, snapshots.project_settings(), key);
    EffectiveEntry {
        key,
        value: resolved.value,
        source: resolved.source,
        is_dirty: false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Default,
    App,
    Project,
    Pending(Scope),
}

impl Layer {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Layer::Default => "Default",
            Layer::App => "App",
            Layer::Project => "Project",
            Layer::Pending(Scope::App) => "Pending (app)",
            Layer::Pending(Scope::Project) => "Pending (project)",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeLayer {
    pub layer: Layer,
    /// `None` when the layer does not set the key.
    pub value: Option<Setting>,
    pub is_winner: bool,
}

/// Every layer's opinion about one key, lowest precedence first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveCascade {
    pub key: SettingKey,
    pub layers: Vec<CascadeLayer>,
    pub effective: EffectiveEntry,
}

impl ResolveCascade {
    #[must_use]
    pub fn winner(&self) -> Option<&CascadeLayer> {
        self.layers.iter().find(|layer| layer.is_winner)
    }
}

pub(crate) fn cascade(
    snapshots: &Snapshots,
    app_pending: &PendingBuffer<AppScope>,
    project_pending: &PendingBuffer<ProjectScope>,
    key: SettingKey,
) -> ResolveCascade {
    let effective = effective(snapshots, app_pending, project_pending, key);
    let winning_layer = match (effective.is_dirty, effective.source) {
        (true, source) => Layer::Pending(scope_of(source)),
        (false, Source::Project) => Layer::Project,
        (false, Source::App) => Layer::App,
        (false, Source::Default) => Layer::Default,
    };

    let mut candidates = vec![
        (Layer::Default, Some(Setting::default_for(key))),
        (Layer::App, snapshots.app.get(key).cloned()),
    ];
    if let Some(project) = snapshots.project_settings() {
        candidates.push((Layer::Project, project.get(key).cloned()));
    }
    if let Some(value) = project_pending.get(key) {
        candidates.push((Layer::Pending(Scope::Project), Some(value.clone())));
    } else if let Some(value) = app_pending.get(key) {
        candidates.push((Layer::Pending(Scope::App), Some(value.clone())));
    }

    let layers = candidates
        .into_iter()
        .map(|(layer, value)| CascadeLayer {
            is_winner: layer == winning_layer,
            layer,
            value,
        })
        .collect();

    ResolveCascade {
        key,
        layers,
        effective,
    }
}

fn scope_of(source: Source) -> Scope {
    match source {
        Source::Project => Scope::Project,
        Source::App | Source::Default => Scope::App,
    }
}
