// `pulse payload`: print one random payload, e.g. to preview commit messages.

use anyhow::Context;
use clap::Args;
use pulse_common::{Bounds, Payload};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct PayloadArgs {
    /// Minimum length.
    #[arg(long, default_value_t = 20)]
    min: u64,

    /// Maximum length.
    #[arg(long, default_value_t = 60)]
    max: u64,

    /// Seed the random generator.
    #[arg(long)]
    seed: Option<u64>,

    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadResult {
    pub payload: Payload,
    pub length: usize,
}

pub fn run(args: PayloadArgs) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    match generate(args.min, args.max, args.seed) {
        Ok(result) => {
            output::print_output(format, &result, |r| r.payload.to_string())?;
            Ok(())
        }
        Err(error) => {
            output::print_anyhow_error(format, &error);
            Err(error)
        }
    }
}

fn generate(min: u64, max: u64, seed: Option<u64>) -> anyhow::Result<PayloadResult> {
    let length = Bounds::new(min, max).context("invalid --min/--max")?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let payload = Payload::generate(&mut rng, length).context("invalid --min/--max")?;
    Ok(PayloadResult { length: payload.len(), payload })
}
