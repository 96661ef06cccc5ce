use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

pub const DEFAULT_GIT_PROGRAM: &str = "git";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCommandOutput {
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitWorkerError {
    EmptyAddPaths,
    SpawnFailed { command: String, message: String },
    CommandFailed { command: String, code: Option<i32>, stderr: String },
}

impl Display for GitWorkerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GitWorkerError::EmptyAddPaths => write!(f, "git add requires at least one path"),
            GitWorkerError::SpawnFailed { command, message } => {
                write!(f, "failed to run `{command}`: {message}")
            }
            GitWorkerError::CommandFailed { command, code, stderr } => {
                write!(f, "`{command}` failed with code {:?}: {}", code, stderr.trim())
            }
        }
    }
}

impl Error for GitWorkerError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

pub trait CommandExecutor {
    fn execute(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<CommandResult, std::io::Error>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessCommandExecutor;

impl CommandExecutor for ProcessCommandExecutor {
    fn execute(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<CommandResult, std::io::Error> {
        let output = Command::new(program).args(args).current_dir(cwd).output()?;
        Ok(CommandResult {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Where `git push` sends commits. Both unset means plain `git push`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushTarget {
    pub remote: Option<String>,
    pub branch: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GitWorker<E = ProcessCommandExecutor> {
    repo_path: PathBuf,
    program: String,
    push_target: PushTarget,
    executor: E,
}

impl GitWorker<ProcessCommandExecutor> {
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self::with_executor(repo_path, ProcessCommandExecutor)
    }
}

impl<E: CommandExecutor> GitWorker<E> {
    pub fn with_executor(repo_path: impl Into<PathBuf>, executor: E) -> Self {
        Self {
            repo_path: repo_path.into(),
            program: DEFAULT_GIT_PROGRAM.to_string(),
            push_target: PushTarget::default(),
            executor,
        }
    }

    /// Use a different git binary (e.g. an absolute path).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_push_target(mut self, push_target: PushTarget) -> Self {
        self.push_target = push_target;
        self
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    pub fn status(&self) -> Result<GitCommandOutput, GitWorkerError> {
        self.run(vec!["status".to_string(), "--short".to_string()])
    }

    pub fn add<S: AsRef<str>>(&self, paths: &[S]) -> Result<GitCommandOutput, GitWorkerError> {
        if paths.is_empty() {
            return Err(GitWorkerError::EmptyAddPaths);
        }

        let mut args = vec!["add".to_string()];
        args.extend(paths.iter().map(|path| path.as_ref().to_string()));
        self.run(args)
    }

    pub fn commit(&self, message: &str) -> Result<GitCommandOutput, GitWorkerError> {
        self.run(vec!["commit".to_string(), "-m".to_string(), message.to_string()])
    }

    pub fn push(&self) -> Result<GitCommandOutput, GitWorkerError> {
        let mut args = vec!["push".to_string()];
        // A branch without a remote is meaningless to git; fall back to plain push.
        if let Some(remote) = &self.push_target.remote {
            args.push(remote.clone());
            if let Some(branch) = &self.push_target.branch {
                args.push(branch.clone());
            }
        }
        self.run(args)
    }

    fn run(&self, args: Vec<String>) -> Result<GitCommandOutput, GitWorkerError> {
        let command = format!("{} {}", self.program, args.join(" "));
        debug!(%command, repo = %self.repo_path.display(), "running git command");

        let result =
            self.executor.execute(&self.program, &args, &self.repo_path).map_err(|error| {
                GitWorkerError::SpawnFailed { command: command.clone(), message: error.to_string() }
            })?;

        if result.success {
            return Ok(GitCommandOutput { stdout: result.stdout, stderr: result.stderr });
        }

        let stderr = if result.stderr.trim().is_empty() { result.stdout } else { result.stderr };

        Err(GitWorkerError::CommandFailed { command, code: result.code, stderr })
    }
}
