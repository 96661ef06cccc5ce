// Git plumbing: process-backed worker and the stage/commit/push seam.

pub mod vcs;
pub mod worker;

pub use vcs::{DryRunVcs, VcsStep, VersionControl};
pub use worker::{GitWorker, GitWorkerError, PushTarget};
