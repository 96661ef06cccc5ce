// `pulse run`: run the commit simulation against a repository.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use pulse_common::Bounds;
use pulse_runner::config::PulseConfig;
use pulse_runner::git::{DryRunVcs, GitWorker};
use pulse_runner::journal::{DryRunJournal, FileJournal};
use pulse_runner::sleeper::{NoopSleeper, ThreadSleeper};
use pulse_runner::{ActivitySimulator, RunReport};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::config::{load_config, resolve_config_path};
use crate::output::{self, OutputFormat};

#[derive(Debug, Default, Args)]
pub struct RunArgs {
    /// Config file (defaults to ~/.pulse/config.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Repository to commit into (overrides `repo_path`).
    #[arg(long)]
    repo: Option<PathBuf>,

    /// Journal file (overrides `log_file`).
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Run exactly this many iterations.
    #[arg(long)]
    iterations: Option<u64>,

    /// Seed the random generator for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,

    /// Log the planned commits instead of making them.
    #[arg(long)]
    dry_run: bool,

    /// Commit locally but never push.
    #[arg(long)]
    no_push: bool,

    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub dry_run: bool,
    pub repo: PathBuf,
    pub log_file: PathBuf,
    pub report: RunReport,
}

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    let cwd = std::env::current_dir().context("failed to read current directory")?;

    match execute(&args, &cwd) {
        Ok(summary) => {
            if summary.dry_run {
                output::print_warning(format, "DRY_RUN", "dry run: no commits were made");
            }
            output::print_output(format, &summary, format_human)?;
            Ok(())
        }
        Err(error) => {
            output::print_anyhow_error(format, &error);
            Err(error)
        }
    }
}

/// Layer command-line flags over the loaded config.
fn apply_overrides(mut config: PulseConfig, args: &RunArgs) -> PulseConfig {
    if let Some(repo) = &args.repo {
        config.repo_path = Some(repo.clone());
    }
    if let Some(log_file) = &args.log_file {
        config.log_file = log_file.clone();
    }
    if let Some(iterations) = args.iterations {
        config.iterations = Bounds::exactly(iterations);
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.no_push {
        config.git.push = false;
    }
    config
}

fn execute(args: &RunArgs, cwd: &Path) -> anyhow::Result<RunSummary> {
    let config_path = resolve_config_path(args.config.clone())?;
    let config = apply_overrides(load_config(&config_path)?, args);
    config.validate().context("invalid run options")?;

    let repo = config.repo_root(cwd);
    let log_file = config.resolved_log_path(cwd);
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    info!(
        repo = %repo.display(),
        log_file = %log_file.display(),
        dry_run = args.dry_run,
        "starting run"
    );

    let result = if args.dry_run {
        ActivitySimulator::new(
            config.settings(),
            DryRunVcs,
            DryRunJournal::new(&log_file),
            NoopSleeper,
        )
        .run(&mut rng)
    } else {
        let worker = GitWorker::new(&repo)
            .with_program(config.git.program.clone())
            .with_push_target(config.git.push_target());
        let journal = FileJournal::new(&log_file);
        ActivitySimulator::new(config.settings(), worker, journal, ThreadSleeper).run(&mut rng)
    };
    let report = result.context("activity simulation aborted")?;

    Ok(RunSummary { dry_run: args.dry_run, repo, log_file, report })
}

fn format_human(summary: &RunSummary) -> String {
    let report = &summary.report;
    let mode = if summary.dry_run { " (dry run)" } else { "" };
    let mut out = format!(
        "Ran {} commit(s) in {}{mode}\nJournal: {}",
        report.commits.len(),
        summary.repo.display(),
        summary.log_file.display()
    );
    for commit in &report.commits {
        let pushed = if commit.pushed { "pushed" } else { "local" };
        out.push_str(&format!(
            "\n  #{:<3} +{:>4}s  {:<6}  {}",
            commit.iteration, commit.delay_secs, pushed, commit.payload
        ));
    }
    out
}
