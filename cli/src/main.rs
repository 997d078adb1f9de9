//! Autocoder settings CLI.

mod commands;
mod render;

use std::{
    fs::{self, OpenOptions},
    io,
    path::PathBuf,
    sync::Mutex,
};

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use autocoder_config::{AutocoderConfig, home_dir};

use crate::commands::Cli;

const DEFAULT_LOG_LEVEL: &str = "warn";

fn init_tracing(configured: Option<&str>) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured.unwrap_or(DEFAULT_LOG_LEVEL)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::debug!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // Stdout carries command output, so diagnostics go to stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();
    for warning in init_warnings {
        tracing::warn!("{warning}");
    }
}

fn open_log_file() -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new().create(true).append(true).open(&candidate) {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.autocoder/logs/autocoder.log
    if let Some(home) = home_dir() {
        candidates.push(home.join("logs").join("autocoder.log"));
    }

    candidates.push(PathBuf::from(".autocoder").join("logs").join("autocoder.log"));

    candidates
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, load_error) = match AutocoderConfig::load() {
        Ok(config) => (config.unwrap_or_default(), None),
        Err(e) => (AutocoderConfig::default(), Some(e)),
    };
    init_tracing(config.log_level());
    if let Some(e) = load_error {
        tracing::warn!("Using default config: {e}");
    }

    let mut stdout = io::stdout().lock();
    commands::run(cli, config, &mut stdout).await
}
