// pulse CLI entry point.

use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod exit_code;
mod output;

use exit_code::ExitCode;

#[derive(Parser)]
#[command(name = "pulse", about = "Simulate commit activity on a git repository")]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: commands::Command,
}

fn main() -> process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match commands::run(cli.command) {
        Ok(()) => ExitCode::Success.into(),
        Err(error) => ExitCode::from_error(&error).into(),
    }
}

/// Logs go to stderr so JSON on stdout stays parseable.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
