// Local configuration for the activity simulator.
//
// Default location: `~/.pulse/config.toml`. Every field is optional; missing
// fields fall back to the defaults below.

use pulse_common::{Bounds, BoundsError, PayloadMode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::git::worker::DEFAULT_GIT_PROGRAM;
use crate::git::PushTarget;
use crate::simulator::{SettingsError, SimulatorSettings};

pub const DEFAULT_LOG_FILE: &str = "daily_log.txt";

/// Root directory for pulse state: `~/.pulse/`.
pub fn global_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".pulse"))
}

/// Path to the default config file: `~/.pulse/config.toml`.
pub fn global_config_path() -> Option<PathBuf> {
    global_dir().map(|d| d.join("config.toml"))
}

// ── Simulator config ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PulseConfig {
    /// Repository the commits land in. Unset means the current directory.
    pub repo_path: Option<PathBuf>,
    /// Journal file. Relative paths resolve against the repository.
    pub log_file: PathBuf,
    /// Fresh payload per iteration, or one payload for the whole run.
    pub payload_mode: PayloadMode,
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
    /// Number of commit cycles per run.
    pub iterations: Bounds,
    /// Payload length in characters.
    pub payload_length: Bounds,
    /// Delay before each iteration, in seconds.
    pub delay_secs: Bounds,
    pub git: GitConfig,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            repo_path: None,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            payload_mode: PayloadMode::PerIteration,
            seed: None,
            iterations: Bounds { min: 1, max: 20 },
            payload_length: Bounds { min: 20, max: 60 },
            delay_secs: Bounds { min: 0, max: 3600 },
            git: GitConfig::default(),
        }
    }
}

impl PulseConfig {
    /// Load from `path`, returning defaults when the file does not exist.
    /// Any other read or parse failure is an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load_from(path) {
            Err(ConfigError::Io(error)) if error.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Load and validate from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        let config: Self = toml::from_str(&contents).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a specific path (creates parent directories).
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        let contents = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, contents).map_err(ConfigError::Io)
    }

    /// Same limits the simulator enforces before a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.settings()
            .validate()
            .map_err(|SettingsError { field, source }| ConfigError::Invalid { field, source })
    }

    /// Repository root, falling back to `cwd`.
    pub fn repo_root(&self, cwd: &Path) -> PathBuf {
        match &self.repo_path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => cwd.join(path),
            None => cwd.to_path_buf(),
        }
    }

    /// Absolute journal path for a run started in `cwd`.
    pub fn resolved_log_path(&self, cwd: &Path) -> PathBuf {
        if self.log_file.is_absolute() {
            self.log_file.clone()
        } else {
            self.repo_root(cwd).join(&self.log_file)
        }
    }

    pub fn settings(&self) -> SimulatorSettings {
        SimulatorSettings {
            iterations: self.iterations,
            payload_length: self.payload_length,
            delay_secs: self.delay_secs,
            payload_mode: self.payload_mode,
            push: self.git.push,
        }
    }
}

/// Git invocation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GitConfig {
    /// Git executable (defaults to `"git"` on `PATH`).
    pub program: String,
    /// Push after every commit.
    pub push: bool,
    /// Remote for `git push <remote>`; unset pushes to the upstream.
    pub remote: Option<String>,
    /// Branch for `git push <remote> <branch>`; ignored without a remote.
    pub branch: Option<String>,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self { program: DEFAULT_GIT_PROGRAM.into(), push: true, remote: None, branch: None }
    }
}

impl GitConfig {
    pub fn push_target(&self) -> PushTarget {
        PushTarget { remote: self.remote.clone(), branch: self.branch.clone() }
    }
}

// ── Errors ─────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
    Invalid { field: &'static str, source: BoundsError },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "config I/O error: {e}"),
            Self::Parse(e) => write!(f, "config parse error: {e}"),
            Self::Serialize(e) => write!(f, "config serialize error: {e}"),
            Self::Invalid { field, source } => write!(f, "config field `{field}`: {source}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Serialize(e) => Some(e),
            Self::Invalid { source, .. } => Some(source),
        }
    }
}
