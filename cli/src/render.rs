//! Plain-text and JSON rendering of settings views.

use std::io::{self, Write};

use serde_json::{Map, Value, json};

use autocoder_engine::{EffectiveEntry, ResolveCascade};
use autocoder_types::{Category, ProjectId, SettingKey};

const KEY_WIDTH: usize = 22;
const VALUE_WIDTH: usize = 24;

fn header(out: &mut impl Write, project: Option<&ProjectId>) -> io::Result<()> {
    match project {
        Some(project) => writeln!(out, "Settings for project '{project}'"),
        None => writeln!(out, "App settings (no project)"),
    }
}

fn entry_line(out: &mut impl Write, entry: &EffectiveEntry) -> io::Result<()> {
    let pending = if entry.is_dirty { " (pending)" } else { "" };
    writeln!(
        out,
        "  {:<KEY_WIDTH$} {:<VALUE_WIDTH$} {}{pending}",
        entry.key.as_str(),
        entry.value.to_string(),
        entry.source,
    )
}

/// Effective settings grouped by category.
pub fn show(
    out: &mut impl Write,
    project: Option<&ProjectId>,
    entries: &[EffectiveEntry],
) -> io::Result<()> {
    header(out, project)?;
    for category in Category::ALL {
        let rows: Vec<&EffectiveEntry> = entries
            .iter()
            .filter(|entry| entry.key.category() == category)
            .collect();
        if rows.is_empty() {
            continue;
        }
        writeln!(out)?;
        writeln!(out, "{}", category.display_name())?;
        for entry in rows {
            entry_line(out, entry)?;
        }
    }
    Ok(())
}

#[must_use]
pub fn show_json(project: Option<&ProjectId>, entries: &[EffectiveEntry]) -> Value {
    let settings: Map<String, Value> = entries
        .iter()
        .map(|entry| {
            (
                entry.key.as_str().to_string(),
                json!({
                    "value": entry.value.to_json(),
                    "source": entry.source.as_str(),
                    "category": entry.key.category().as_str(),
                    "dirty": entry.is_dirty,
                }),
            )
        })
        .collect();
    json!({
        "project": project.map(ProjectId::as_str),
        "settings": settings,
    })
}

/// Only the entries carrying an unsaved edit.
pub fn pending(out: &mut impl Write, entries: &[EffectiveEntry]) -> io::Result<()> {
    let dirty: Vec<&EffectiveEntry> = entries.iter().filter(|entry| entry.is_dirty).collect();
    if dirty.is_empty() {
        return writeln!(out, "No pending changes.");
    }
    writeln!(out, "Pending changes:")?;
    for entry in dirty {
        entry_line(out, entry)?;
    }
    Ok(())
}

pub fn cascade(out: &mut impl Write, cascade: &ResolveCascade) -> io::Result<()> {
    writeln!(
        out,
        "{} ({})",
        cascade.key,
        cascade.key.category().display_name()
    )?;
    for layer in &cascade.layers {
        let value = layer
            .value
            .as_ref()
            .map_or_else(|| "(unset)".to_string(), ToString::to_string);
        let marker = if layer.is_winner { "  <- effective" } else { "" };
        writeln!(out, "  {:<18} {value}{marker}", layer.layer.label())?;
    }
    Ok(())
}

pub fn categories(out: &mut impl Write) -> io::Result<()> {
    for category in Category::ALL {
        let keys: Vec<&str> = category.keys().into_iter().map(SettingKey::as_str).collect();
        writeln!(
            out,
            "{:<8} {:<10} {}",
            category.as_str(),
            category.display_name(),
            keys.join(", ")
        )?;
    }
    Ok(())
}
