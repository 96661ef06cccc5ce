// Consistent exit codes for the pulse CLI.
//
//   0  = success
//   1  = general error
//   2  = usage/configuration error
//   20 = journal (log file) I/O error
//   21 = version-control command failed

use pulse_common::BoundsError;
use pulse_runner::config::ConfigError;
use pulse_runner::git::GitWorkerError;
use pulse_runner::journal::JournalError;
use pulse_runner::SimulatorError;
use std::process;

/// Named exit codes for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    Error = 1,
    Usage = 2,
    Journal = 20,
    Vcs = 21,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Map an anyhow error to an exit code by inspecting the error chain.
    pub fn from_error(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if let Some(sim_err) = cause.downcast_ref::<SimulatorError>() {
                return match sim_err {
                    SimulatorError::Settings(_) => Self::Usage,
                    SimulatorError::Journal { .. } => Self::Journal,
                    SimulatorError::Vcs { .. } => Self::Vcs,
                };
            }
            if cause.is::<ConfigError>() || cause.is::<BoundsError>() {
                return Self::Usage;
            }
            if cause.is::<JournalError>() {
                return Self::Journal;
            }
            if cause.is::<GitWorkerError>() {
                return Self::Vcs;
            }
        }

        Self::Error
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code.code() as u8)
    }
}
