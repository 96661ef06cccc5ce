// `pulse config`: show the effective configuration or write a default one.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand};
use pulse_runner::config::{global_config_path, PulseConfig};
use serde::{Deserialize, Serialize};

use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show(ShowArgs),
    /// Write a configuration file with default values
    Init(InitArgs),
}

#[derive(Debug, Args)]
struct ShowArgs {
    /// Config file (defaults to ~/.pulse/config.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct InitArgs {
    /// Config file (defaults to ~/.pulse/config.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overwrite an existing file.
    #[arg(long)]
    force: bool,

    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowResult {
    pub path: PathBuf,
    pub exists: bool,
    pub config: PulseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitResult {
    pub path: PathBuf,
    pub overwritten: bool,
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.action {
        ConfigAction::Show(args) => {
            let format = OutputFormat::detect(args.json);
            report(format, show(args.config), format_show_human)
        }
        ConfigAction::Init(args) => {
            let format = OutputFormat::detect(args.json);
            report(format, init(args.config, args.force), format_init_human)
        }
    }
}

fn report<T: Serialize>(
    format: OutputFormat,
    result: anyhow::Result<T>,
    human_fn: fn(&T) -> String,
) -> anyhow::Result<()> {
    match result {
        Ok(value) => {
            output::print_output(format, &value, human_fn)?;
            Ok(())
        }
        Err(error) => {
            output::print_anyhow_error(format, &error);
            Err(error)
        }
    }
}

/// Explicit `--config` path, else `~/.pulse/config.toml`.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => global_config_path()
            .context("could not determine home directory; pass --config <path>"),
    }
}

/// Load the config at `path`, falling back to defaults when it does not exist.
pub fn load_config(path: &Path) -> anyhow::Result<PulseConfig> {
    PulseConfig::load_or_default(path)
        .with_context(|| format!("failed to load config {}", path.display()))
}

fn show(explicit: Option<PathBuf>) -> anyhow::Result<ShowResult> {
    let path = resolve_config_path(explicit)?;
    let config = load_config(&path)?;
    Ok(ShowResult { exists: path.exists(), path, config })
}

fn init(explicit: Option<PathBuf>, force: bool) -> anyhow::Result<InitResult> {
    let path = resolve_config_path(explicit)?;
    let overwritten = path.exists();
    if overwritten && !force {
        anyhow::bail!("{} already exists; pass --force to overwrite", path.display());
    }

    PulseConfig::default()
        .save_to(&path)
        .with_context(|| format!("failed to write config {}", path.display()))?;
    Ok(InitResult { path, overwritten })
}

fn format_show_human(result: &ShowResult) -> String {
    let origin = if result.exists { "" } else { " (not found, showing defaults)" };
    let body = toml::to_string_pretty(&result.config)
        .unwrap_or_else(|error| format!("# failed to render config: {error}\n"));
    format!("# {}{origin}\n{body}", result.path.display())
}

fn format_init_human(result: &InitResult) -> String {
    let verb = if result.overwritten { "Overwrote" } else { "Wrote" };
    format!("{verb} default config to {}", result.path.display())
}
