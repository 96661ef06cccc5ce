// pulse-runner: the activity simulator and its collaborators.

pub mod config;
pub mod git;
pub mod journal;
pub mod simulator;
pub mod sleeper;

pub use simulator::{
    ActivitySimulator, RunReport, SettingsError, SimulatorError, SimulatorSettings, MAX_ITERATIONS,
};
