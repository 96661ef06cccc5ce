// Output format auto-detection for the CLI.
//
// TTY → human-readable text. Piped/redirected → structured JSON.
// `--json` flag forces JSON output regardless of terminal.

use pulse_common::BoundsError;
use pulse_runner::config::ConfigError;
use pulse_runner::git::{GitWorkerError, VcsStep};
use pulse_runner::SimulatorError;
use serde::Serialize;
use std::io::{self, IsTerminal, Write};

const ANSI_RED: &str = "\x1b[31m";
const ANSI_YELLOW: &str = "\x1b[33m";
const ANSI_RESET: &str = "\x1b[0m";

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text.
    Human,
    /// Machine-readable JSON (one object per response).
    Json,
}

impl OutputFormat {
    /// Auto-detect format: JSON if `--json` was passed or stdout is not a TTY.
    pub fn detect(json_flag: bool) -> Self {
        if json_flag {
            return Self::Json;
        }
        Self::detect_from_terminal(io::stdout().is_terminal())
    }

    /// Testable variant that takes an explicit `is_tty` flag.
    pub fn detect_from_terminal(is_tty: bool) -> Self {
        if is_tty {
            Self::Human
        } else {
            Self::Json
        }
    }
}

/// Write a value to stdout in the selected format.
pub fn print_output<T, F>(format: OutputFormat, value: &T, human_fn: F) -> io::Result<()>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    write_output(&mut io::stdout().lock(), format, value, human_fn)
}

/// Write a value to a provided writer (useful for testing).
pub fn write_output<W, T, F>(
    writer: &mut W,
    format: OutputFormat,
    value: &T,
    human_fn: F,
) -> io::Result<()>
where
    W: Write,
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    match format {
        OutputFormat::Human => {
            writeln!(writer, "{}", human_fn(value))
        }
        OutputFormat::Json => {
            serde_json::to_writer(&mut *writer, value).map_err(io::Error::other)?;
            writeln!(writer)
        }
    }
}

/// Write an error to stderr in the selected format.
pub fn print_error(format: OutputFormat, code: &str, message: &str) {
    let mut err = io::stderr().lock();
    match format {
        OutputFormat::Human => {
            let line =
                render_human_stderr_line("error", message, io::stderr().is_terminal(), ANSI_RED);
            let _ = writeln!(err, "{line}");
        }
        OutputFormat::Json => {
            let obj = serde_json::json!({
                "error": {
                    "code": code,
                    "message": message,
                }
            });
            let _ = serde_json::to_writer(&mut err, &obj);
            let _ = writeln!(err);
        }
    }
}

/// Write a warning to stderr in the selected format.
pub fn print_warning(format: OutputFormat, code: &str, message: &str) {
    let mut err = io::stderr().lock();
    match format {
        OutputFormat::Human => {
            let line = render_human_stderr_line(
                "warning",
                message,
                io::stderr().is_terminal(),
                ANSI_YELLOW,
            );
            let _ = writeln!(err, "{line}");
        }
        OutputFormat::Json => {
            let obj = serde_json::json!({
                "warning": {
                    "code": code,
                    "message": message,
                }
            });
            let _ = serde_json::to_writer(&mut err, &obj);
            let _ = writeln!(err);
        }
    }
}

/// Print a mapped, actionable error for a command failure.
pub fn print_anyhow_error(format: OutputFormat, error: &anyhow::Error) {
    let (code, message) = actionable_error(error);
    print_error(format, code, &message);
}

fn actionable_error(error: &anyhow::Error) -> (&'static str, String) {
    let message = format!("{error:#}");

    for cause in error.chain() {
        if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
            return match config_err {
                ConfigError::Io(_) => (
                    "CONFIG_IO",
                    format!("{message}. Check that the path and its directory are accessible"),
                ),
                _ => (
                    "CONFIG_INVALID",
                    format!(
                        "{message}. Fix the file or regenerate it with: pulse config init --force"
                    ),
                ),
            };
        }
        if cause.downcast_ref::<BoundsError>().is_some() {
            return ("INVALID_BOUNDS", message);
        }
        if let Some(sim_err) = cause.downcast_ref::<SimulatorError>() {
            return match sim_err {
                SimulatorError::Settings(_) => ("INVALID_BOUNDS", message),
                SimulatorError::Journal { .. } => ("JOURNAL_IO", message),
                SimulatorError::Vcs { source: GitWorkerError::SpawnFailed { .. }, .. } => (
                    "GIT_NOT_FOUND",
                    format!("{message}. Is git installed? Set `program` under [git] in the config"),
                ),
                SimulatorError::Vcs { step: VcsStep::Push, .. } => (
                    "PUSH_FAILED",
                    format!("{message}. Check the remote with: git remote -v"),
                ),
                SimulatorError::Vcs { .. } => ("GIT_FAILED", message),
            };
        }
    }

    ("RUN_FAILED", message)
}

fn render_human_stderr_line(label: &str, message: &str, is_tty: bool, color: &str) -> String {
    if is_tty {
        format!("{color}{label}:{ANSI_RESET} {message}")
    } else {
        format!("{label}: {message}")
    }
}
