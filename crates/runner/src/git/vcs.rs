// The three version-control steps of one iteration, behind a trait so the
// simulator can run against git, a dry-run stand-in, or a test double.

use std::fmt::{Display, Formatter};
use std::path::Path;

use tracing::info;

use super::worker::{CommandExecutor, GitWorker, GitWorkerError};

/// One step of the stage/commit/push sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcsStep {
    Stage,
    Commit,
    Push,
}

impl Display for VcsStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            VcsStep::Stage => "stage",
            VcsStep::Commit => "commit",
            VcsStep::Push => "push",
        };
        f.write_str(name)
    }
}

pub trait VersionControl {
    fn stage(&self, path: &Path) -> Result<(), GitWorkerError>;
    fn commit(&self, message: &str) -> Result<(), GitWorkerError>;
    fn push(&self) -> Result<(), GitWorkerError>;
}

impl<E: CommandExecutor> VersionControl for GitWorker<E> {
    fn stage(&self, path: &Path) -> Result<(), GitWorkerError> {
        let path = path.to_string_lossy().into_owned();
        self.add(&[path]).map(|_| ())
    }

    fn commit(&self, message: &str) -> Result<(), GitWorkerError> {
        GitWorker::commit(self, message).map(|_| ())
    }

    fn push(&self) -> Result<(), GitWorkerError> {
        GitWorker::push(self).map(|_| ())
    }
}

/// Logs what would run and touches nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunVcs;

impl VersionControl for DryRunVcs {
    fn stage(&self, path: &Path) -> Result<(), GitWorkerError> {
        info!(path = %path.display(), "dry run: git add");
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<(), GitWorkerError> {
        info!(message, "dry run: git commit");
        Ok(())
    }

    fn push(&self) -> Result<(), GitWorkerError> {
        info!("dry run: git push");
        Ok(())
    }
}
