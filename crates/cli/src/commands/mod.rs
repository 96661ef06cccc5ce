// CLI subcommand dispatch.

use clap::Subcommand;

pub mod config;
pub mod payload;
pub mod run;

#[derive(Subcommand)]
pub enum Command {
    /// Run the commit simulation against a repository
    Run(run::RunArgs),
    /// Inspect or create the configuration file
    Config(config::ConfigArgs),
    /// Print one random payload
    Payload(payload::PayloadArgs),
}

pub fn run(cmd: Command) -> anyhow::Result<()> {
    match cmd {
        Command::Run(args) => run::run(args),
        Command::Config(args) => config::run(args),
        Command::Payload(args) => payload::run(args),
    }
}
