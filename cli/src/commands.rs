use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};

use autocoder_config::{AutocoderConfig, FileSettingsStore, config_path, home_dir};
use autocoder_engine::{ChangeKind, EditOutcome, SettingsSession, classify};
use autocoder_types::{ProjectId, Scope, Setting, SettingKey};

use crate::render;

#[derive(Parser)]
#[command(name = "autocoder", version)]
#[command(about = "Inspect and edit layered Autocoder settings")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show effective settings and where each value comes from
    Show {
        #[arg(long, short, env = "AUTOCODER_PROJECT")]
        project: Option<String>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show every layer's value for one setting
    Explain {
        key: String,
        #[arg(long, short, env = "AUTOCODER_PROJECT")]
        project: Option<String>,
    },
    /// Edit app settings and project overrides, then save
    Set {
        #[arg(long, short, env = "AUTOCODER_PROJECT")]
        project: Option<String>,
        /// App-level value
        #[arg(long = "app", value_name = "KEY=VALUE")]
        app: Vec<String>,
        /// Project override (requires --project)
        #[arg(long = "override", value_name = "KEY=VALUE")]
        overrides: Vec<String>,
        /// Preview the pending changes and discard them
        #[arg(long)]
        dry_run: bool,
    },
    /// Remove one project override
    Reset {
        key: String,
        #[arg(long, short, env = "AUTOCODER_PROJECT")]
        project: String,
    },
    /// Clear every setting at one scope
    ResetAll {
        #[arg(long, value_enum)]
        scope: ScopeArg,
        #[arg(long, short, env = "AUTOCODER_PROJECT")]
        project: Option<String>,
    },
    /// Register a project directory under a name
    Register { name: String, path: PathBuf },
    /// List setting categories and their keys
    Categories,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ScopeArg {
    App,
    Project,
}

impl From<ScopeArg> for Scope {
    fn from(value: ScopeArg) -> Self {
        match value {
            ScopeArg::App => Scope::App,
            ScopeArg::Project => Scope::Project,
        }
    }
}

fn project_id(raw: Option<&str>) -> Result<Option<ProjectId>> {
    raw.map(|name| ProjectId::new(name).context("invalid --project"))
        .transpose()
}

/// Split `KEY=VALUE` and parse the value for that key.
fn parse_assignment(raw: &str) -> Result<Setting> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("expected KEY=VALUE, got '{raw}'");
    };
    let key = SettingKey::parse(key)?;
    Ok(Setting::parse(key, value)?)
}

fn open_store(config: &AutocoderConfig) -> Result<Arc<FileSettingsStore>> {
    let home = home_dir().context("could not determine the Autocoder home directory")?;
    Ok(Arc::new(FileSettingsStore::new(home, config.registry())))
}

async fn open_session(
    config: &AutocoderConfig,
    project: Option<ProjectId>,
) -> Result<SettingsSession<FileSettingsStore>> {
    let store = open_store(config)?;
    let session = SettingsSession::open(store, project).await;
    session.snapshots()?;
    Ok(session)
}

pub async fn run(cli: Cli, config: AutocoderConfig, out: &mut impl Write) -> Result<()> {
    match cli.command {
        Command::Show { project, json } => {
            let session = open_session(&config, project_id(project.as_deref())?).await?;
            let entries = session.view_all()?;
            if json {
                let value = render::show_json(session.project(), &entries);
                writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
            } else {
                render::show(out, session.project(), &entries)?;
            }
        }
        Command::Explain { key, project } => {
            let key = SettingKey::parse(&key)?;
            let session = open_session(&config, project_id(project.as_deref())?).await?;
            render::cascade(out, &session.cascade(key)?)?;
        }
        Command::Set {
            project,
            app,
            overrides,
            dry_run,
        } => {
            let project = project_id(project.as_deref())?;
            if !overrides.is_empty() && project.is_none() {
                bail!("--override requires --project");
            }
            let edits = app
                .iter()
                .map(|raw| parse_assignment(raw).map(|s| (Scope::App, s)))
                .chain(
                    overrides
                        .iter()
                        .map(|raw| parse_assignment(raw).map(|s| (Scope::Project, s))),
                )
                .collect::<Result<Vec<_>>>()?;
            if edits.is_empty() {
                bail!("nothing to set; pass --app or --override");
            }

            let mut session = open_session(&config, project).await?;
            set(&mut session, edits, dry_run, out).await?;
        }
        Command::Reset { key, project } => {
            let key = SettingKey::parse(&key)?;
            let mut session = open_session(&config, project_id(Some(&project))?).await?;
            if session.reset(key).await? {
                writeln!(out, "Removed project override for {key}.")?;
            } else {
                writeln!(out, "No project override for {key}; nothing to reset.")?;
            }
        }
        Command::ResetAll { scope, project } => {
            let scope = Scope::from(scope);
            let project = project_id(project.as_deref())?;
            if scope == Scope::Project && project.is_none() {
                bail!("--scope project requires --project");
            }
            let mut session = open_session(&config, project).await?;
            let cleared = session.reset_all(scope).await?;
            writeln!(out, "Cleared {cleared} {scope} setting(s).")?;
        }
        Command::Register { name, path } => {
            let id = ProjectId::new(name).context("invalid project name")?;
            let root = path
                .canonicalize()
                .with_context(|| format!("project path {} does not exist", path.display()))?;
            let config_file =
                config_path().context("could not determine the Autocoder home directory")?;
            AutocoderConfig::persist_project(&config_file, &id, &root)
                .with_context(|| format!("failed to update {}", config_file.display()))?;
            tracing::info!(project = %id, root = %root.display(), "Registered project");
            writeln!(out, "Registered '{id}' at {}.", root.display())?;
        }
        Command::Categories => render::categories(out)?,
    }
    Ok(())
}

async fn set(
    session: &mut SettingsSession<FileSettingsStore>,
    edits: Vec<(Scope, Setting)>,
    dry_run: bool,
    out: &mut impl Write,
) -> Result<()> {
    for (scope, setting) in edits {
        let key = setting.key();
        if dry_run && classify(key) == ChangeKind::Immediate {
            writeln!(out, "{key}: skipped in dry run (applies immediately)")?;
            continue;
        }
        let shown = setting.to_string();
        match session.edit(scope, setting).await? {
            EditOutcome::AppliedImmediately => writeln!(out, "{key} = {shown} (applied)")?,
            EditOutcome::Buffered => writeln!(out, "{key} = {shown} (pending, {scope})")?,
            EditOutcome::Reverted => writeln!(out, "{key} = {shown} (unchanged)")?,
        }
    }

    render::pending(out, &session.view_all()?)?;

    if dry_run {
        let discarded = session.cancel()?;
        writeln!(out, "Dry run: discarded {discarded} pending change(s).")?;
        return Ok(());
    }

    let report = session.save().await?;
    if report.is_empty() {
        writeln!(out, "Nothing to save.")?;
    } else {
        writeln!(
            out,
            "Saved {} app and {} project setting(s).",
            report.app.len(),
            report.project.len()
        )?;
    }
    Ok(())
}
