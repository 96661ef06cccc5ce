// ActivitySimulator: draw an iteration count, then for each iteration sleep,
// append a journal entry, and stage/commit/push it.
//
// `run` draws each iteration just before carrying it out, in the same order
// `plan` draws them up front. The first failure aborts the run. Nothing is
// retried or rolled back.

use std::time::Duration;

use chrono::{DateTime, Local};
use pulse_common::{Bounds, BoundsError, LogEntry, Payload, PayloadMode};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::git::{GitWorkerError, VcsStep, VersionControl};
use crate::journal::{Journal, JournalError};
use crate::sleeper::Sleeper;

/// Most iterations a single run may draw.
pub const MAX_ITERATIONS: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatorSettings {
    pub iterations: Bounds,
    pub payload_length: Bounds,
    pub delay_secs: Bounds,
    pub payload_mode: PayloadMode,
    pub push: bool,
}

impl SimulatorSettings {
    /// Iterations within `0..=MAX_ITERATIONS`, payload length within
    /// `1..=MAX_PAYLOAD_LEN`, every range ordered.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let checks = [
            ("iterations", self.iterations.validate_within(0, MAX_ITERATIONS)),
            ("payload_length", Payload::check_length(&self.payload_length)),
            ("delay_secs", self.delay_secs.validate()),
        ];
        for (field, result) in checks {
            result.map_err(|source| SettingsError { field, source })?;
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("`{field}`: {source}")]
pub struct SettingsError {
    pub field: &'static str,
    #[source]
    pub source: BoundsError,
}

#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("invalid settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("iteration {iteration}: {source}")]
    Journal {
        iteration: u64,
        #[source]
        source: JournalError,
    },

    #[error("iteration {iteration}: {step} failed: {source}")]
    Vcs {
        iteration: u64,
        step: VcsStep,
        #[source]
        source: GitWorkerError,
    },
}

/// One iteration's random draws.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedIteration {
    /// 1-based.
    pub index: u64,
    pub delay_secs: u64,
    pub payload: Payload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunPlan {
    pub iterations: Vec<PlannedIteration>,
}

impl RunPlan {
    pub fn len(&self) -> u64 {
        self.iterations.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.iterations.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub iteration: u64,
    pub delay_secs: u64,
    pub payload: Payload,
    /// Journal size in bytes right after this iteration's append.
    pub journal_len: u64,
    pub pushed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Local>,
    pub planned_iterations: u64,
    pub commits: Vec<CommitRecord>,
}

pub struct ActivitySimulator<V, J, S> {
    settings: SimulatorSettings,
    vcs: V,
    journal: J,
    sleeper: S,
}

impl<V: VersionControl, J: Journal, S: Sleeper> ActivitySimulator<V, J, S> {
    pub fn new(settings: SimulatorSettings, vcs: V, journal: J, sleeper: S) -> Self {
        Self { settings, vcs, journal, sleeper }
    }

    pub fn settings(&self) -> &SimulatorSettings {
        &self.settings
    }

    pub fn journal(&self) -> &J {
        &self.journal
    }

    /// Draw the iteration count, payloads and delays without side effects.
    pub fn plan<R: Rng>(&self, rng: &mut R) -> Result<RunPlan, SimulatorError> {
        self.settings.validate()?;
        let count = self.settings.iterations.sample(rng);
        let shared = self.draw_shared_payload(rng)?;

        let iterations = (1..=count)
            .map(|index| self.draw_iteration(rng, index, shared.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RunPlan { iterations })
    }

    /// Draw and carry out each iteration in turn. Consumes `rng` exactly as
    /// `plan` does, so a seed gives the same commits either way.
    pub fn run<R: Rng>(&mut self, rng: &mut R) -> Result<RunReport, SimulatorError> {
        let started_at = Local::now();
        info!(started_at = %started_at, "running activity simulation");

        self.settings.validate()?;
        let planned_iterations = self.settings.iterations.sample(rng);
        let shared = self.draw_shared_payload(rng)?;
        self.announce(planned_iterations);

        let mut commits = Vec::new();
        for index in 1..=planned_iterations {
            let step = self.draw_iteration(rng, index, shared.as_ref())?;
            commits.push(self.run_iteration(step)?);
        }

        info!(commits = commits.len(), "activity simulation finished");
        Ok(RunReport { started_at, planned_iterations, commits })
    }

    /// Carry out a plan. Stops at the first failing step.
    pub fn execute(
        &mut self,
        started_at: DateTime<Local>,
        plan: RunPlan,
    ) -> Result<RunReport, SimulatorError> {
        let planned_iterations = plan.len();
        self.announce(planned_iterations);

        let mut commits = Vec::with_capacity(plan.iterations.len());
        for step in plan.iterations {
            commits.push(self.run_iteration(step)?);
        }

        info!(commits = commits.len(), "activity simulation finished");
        Ok(RunReport { started_at, planned_iterations, commits })
    }

    fn announce(&self, planned_iterations: u64) {
        info!(iterations = planned_iterations, "commit and push {planned_iterations} times");
        if !self.settings.push {
            warn!("push disabled; commits stay local");
        }
    }

    fn draw_payload<R: Rng>(&self, rng: &mut R) -> Result<Payload, SimulatorError> {
        Payload::generate(rng, self.settings.payload_length)
            .map_err(|source| SettingsError { field: "payload_length", source }.into())
    }

    fn draw_shared_payload<R: Rng>(&self, rng: &mut R) -> Result<Option<Payload>, SimulatorError> {
        match self.settings.payload_mode {
            PayloadMode::PerRun => self.draw_payload(rng).map(Some),
            PayloadMode::PerIteration => Ok(None),
        }
    }

    fn draw_iteration<R: Rng>(
        &self,
        rng: &mut R,
        index: u64,
        shared: Option<&Payload>,
    ) -> Result<PlannedIteration, SimulatorError> {
        let payload = match shared {
            Some(payload) => payload.clone(),
            None => self.draw_payload(rng)?,
        };
        let delay_secs = self.settings.delay_secs.sample(rng);
        Ok(PlannedIteration { index, delay_secs, payload })
    }

    fn run_iteration(&mut self, step: PlannedIteration) -> Result<CommitRecord, SimulatorError> {
        let iteration = step.index;
        info!(iteration, delay_secs = step.delay_secs, "sleeping before commit");
        self.sleeper.sleep(Duration::from_secs(step.delay_secs));

        let entry = LogEntry::now(step.payload);
        let journal_len = self
            .journal
            .append(&entry)
            .map_err(|source| SimulatorError::Journal { iteration, source })?;

        let vcs_err = |failed: VcsStep| {
            move |source: GitWorkerError| SimulatorError::Vcs { iteration, step: failed, source }
        };
        self.vcs.stage(self.journal.path()).map_err(vcs_err(VcsStep::Stage))?;
        self.vcs.commit(entry.payload.as_str()).map_err(vcs_err(VcsStep::Commit))?;
        if self.settings.push {
            self.vcs.push().map_err(vcs_err(VcsStep::Push))?;
        }

        info!(iteration, payload = %entry.payload, journal_len, "commit recorded");
        Ok(CommitRecord {
            iteration,
            delay_secs: step.delay_secs,
            payload: entry.payload,
            journal_len,
            pushed: self.settings.push,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::DryRunJournal;
    use crate::sleeper::NoopSleeper;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Stage(PathBuf),
        Commit(String),
        Push,
    }

    #[derive(Default)]
    struct RecordingVcs {
        calls: RefCell<Vec<Call>>,
        fail_on: Option<(usize, VcsStep)>,
    }

    impl RecordingVcs {
        fn failing_at(call_index: usize, step: VcsStep) -> Self {
            Self { calls: RefCell::new(Vec::new()), fail_on: Some((call_index, step)) }
        }

        fn record(&self, call: Call, step: VcsStep) -> Result<(), GitWorkerError> {
            let index = self.calls.borrow().len();
            self.calls.borrow_mut().push(call);
            match self.fail_on {
                Some((at, failing)) if at == index && failing == step => {
                    Err(GitWorkerError::CommandFailed {
                        command: format!("git {step}"),
                        code: Some(1),
                        stderr: "fatal: boom".to_string(),
                    })
                }
                _ => Ok(()),
            }
        }
    }

    impl VersionControl for &RecordingVcs {
        fn stage(&self, path: &Path) -> Result<(), GitWorkerError> {
            self.record(Call::Stage(path.to_path_buf()), VcsStep::Stage)
        }

        fn commit(&self, message: &str) -> Result<(), GitWorkerError> {
            self.record(Call::Commit(message.to_string()), VcsStep::Commit)
        }

        fn push(&self) -> Result<(), GitWorkerError> {
            self.record(Call::Push, VcsStep::Push)
        }
    }

    #[derive(Default)]
    struct RecordingSleeper {
        naps: RefCell<Vec<Duration>>,
    }

    impl Sleeper for &RecordingSleeper {
        fn sleep(&self, duration: Duration) {
            self.naps.borrow_mut().push(duration);
        }
    }

    fn settings(iterations: Bounds) -> SimulatorSettings {
        SimulatorSettings {
            iterations,
            payload_length: Bounds { min: 20, max: 60 },
            delay_secs: Bounds { min: 0, max: 3600 },
            payload_mode: PayloadMode::PerIteration,
            push: true,
        }
    }

    fn journal() -> DryRunJournal {
        DryRunJournal::new("/repo/daily_log.txt")
    }

    #[test]
    fn zero_iterations_invokes_nothing() {
        let vcs = RecordingVcs::default();
        let sleeper = RecordingSleeper::default();
        let mut sim =
            ActivitySimulator::new(settings(Bounds::exactly(0)), &vcs, journal(), &sleeper);

        let report = sim.run(&mut StdRng::seed_from_u64(1)).unwrap();

        assert_eq!(report.planned_iterations, 0);
        assert!(report.commits.is_empty());
        assert!(vcs.calls.borrow().is_empty());
        assert!(sleeper.naps.borrow().is_empty());
    }

    #[test]
    fn each_iteration_sleeps_then_stages_commits_and_pushes() {
        let vcs = RecordingVcs::default();
        let sleeper = RecordingSleeper::default();
        let mut sim =
            ActivitySimulator::new(settings(Bounds::exactly(3)), &vcs, journal(), &sleeper);

        let report = sim.run(&mut StdRng::seed_from_u64(2)).unwrap();

        assert_eq!(report.commits.len(), 3);
        let calls = vcs.calls.borrow();
        assert_eq!(calls.len(), 9);
        for (record, chunk) in report.commits.iter().zip(calls.chunks(3)) {
            assert_eq!(chunk[0], Call::Stage(PathBuf::from("/repo/daily_log.txt")));
            assert_eq!(chunk[1], Call::Commit(record.payload.to_string()));
            assert_eq!(chunk[2], Call::Push);
            assert!(record.pushed);
        }

        let naps: Vec<u64> = sleeper.naps.borrow().iter().map(Duration::as_secs).collect();
        let delays: Vec<u64> = report.commits.iter().map(|c| c.delay_secs).collect();
        assert_eq!(naps, delays);
    }

    #[test]
    fn push_disabled_skips_push_step() {
        let vcs = RecordingVcs::default();
        let mut cfg = settings(Bounds::exactly(2));
        cfg.push = false;
        let mut sim = ActivitySimulator::new(cfg, &vcs, journal(), NoopSleeper);

        let report = sim.run(&mut StdRng::seed_from_u64(3)).unwrap();

        assert!(vcs.calls.borrow().iter().all(|call| *call != Call::Push));
        assert!(report.commits.iter().all(|c| !c.pushed));
    }

    #[test]
    fn commit_failure_aborts_before_push_and_later_iterations() {
        // Calls: 0 stage, 1 commit -> fails.
        let vcs = RecordingVcs::failing_at(1, VcsStep::Commit);
        let mut sim =
            ActivitySimulator::new(settings(Bounds::exactly(5)), &vcs, journal(), NoopSleeper);

        let error = sim.run(&mut StdRng::seed_from_u64(4)).expect_err("commit should fail");

        assert!(matches!(error, SimulatorError::Vcs { iteration: 1, step: VcsStep::Commit, .. }));
        assert_eq!(vcs.calls.borrow().len(), 2);
        assert!(error.to_string().contains("iteration 1: commit failed"));
    }

    #[test]
    fn push_failure_in_second_iteration_keeps_first_commit() {
        // Iteration 1 uses calls 0..3, iteration 2 fails on its push (call 5).
        let vcs = RecordingVcs::failing_at(5, VcsStep::Push);
        let mut sim =
            ActivitySimulator::new(settings(Bounds::exactly(4)), &vcs, journal(), NoopSleeper);

        let error = sim.run(&mut StdRng::seed_from_u64(5)).expect_err("push should fail");

        assert!(matches!(error, SimulatorError::Vcs { iteration: 2, step: VcsStep::Push, .. }));
        assert_eq!(vcs.calls.borrow().len(), 6);
        assert_eq!(sim.journal().path(), Path::new("/repo/daily_log.txt"));
    }

    #[test]
    fn per_run_mode_reuses_one_payload() {
        let vcs = RecordingVcs::default();
        let mut cfg = settings(Bounds::exactly(4));
        cfg.payload_mode = PayloadMode::PerRun;
        let sim = ActivitySimulator::new(cfg, &vcs, journal(), NoopSleeper);

        let plan = sim.plan(&mut StdRng::seed_from_u64(6)).unwrap();

        assert_eq!(plan.len(), 4);
        let first = &plan.iterations[0].payload;
        assert!(plan.iterations.iter().all(|step| &step.payload == first));
    }

    #[test]
    fn plan_is_deterministic_for_a_seed_and_indexed_from_one() {
        let vcs = RecordingVcs::default();
        let cfg = settings(Bounds { min: 1, max: 20 });
        let sim = ActivitySimulator::new(cfg, &vcs, journal(), NoopSleeper);

        let a = sim.plan(&mut StdRng::seed_from_u64(7)).unwrap();
        let b = sim.plan(&mut StdRng::seed_from_u64(7)).unwrap();

        assert_eq!(a, b);
        let indexes: Vec<u64> = a.iterations.iter().map(|step| step.index).collect();
        assert_eq!(indexes, (1..=a.len()).collect::<Vec<_>>());
        assert!(vcs.calls.borrow().is_empty());
    }

    #[test]
    fn journal_length_grows_across_commits() {
        let vcs = RecordingVcs::default();
        let mut sim =
            ActivitySimulator::new(settings(Bounds::exactly(5)), &vcs, journal(), NoopSleeper);

        let report = sim.run(&mut StdRng::seed_from_u64(8)).unwrap();

        let lens: Vec<u64> = report.commits.iter().map(|c| c.journal_len).collect();
        assert!(lens.windows(2).all(|pair| pair[0] < pair[1]), "lens: {lens:?}");
    }

    #[test]
    fn zero_payload_length_is_rejected_before_any_side_effect() {
        let vcs = RecordingVcs::default();
        let sleeper = RecordingSleeper::default();
        let mut cfg = settings(Bounds::exactly(3));
        cfg.payload_length = Bounds { min: 0, max: 0 };
        let mut sim = ActivitySimulator::new(cfg, &vcs, journal(), &sleeper);

        let error = sim.run(&mut StdRng::seed_from_u64(9)).expect_err("empty payloads");

        assert!(matches!(
            error,
            SimulatorError::Settings(SettingsError { field: "payload_length", .. })
        ));
        assert!(sim.plan(&mut StdRng::seed_from_u64(9)).is_err());
        assert!(vcs.calls.borrow().is_empty());
        assert!(sleeper.naps.borrow().is_empty());
    }

    #[test]
    fn oversized_bounds_are_rejected() {
        let mut cfg = settings(Bounds { min: 1, max: MAX_ITERATIONS + 1 });
        assert_eq!(cfg.validate().unwrap_err().field, "iterations");

        cfg = settings(Bounds::exactly(1));
        cfg.payload_length = Bounds::exactly(u64::MAX);
        assert_eq!(cfg.validate().unwrap_err().field, "payload_length");

        cfg.payload_length = Bounds { min: 1, max: pulse_common::MAX_PAYLOAD_LEN };
        cfg.iterations = Bounds::exactly(MAX_ITERATIONS);
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn run_draws_lazily_and_stops_at_the_first_failure() {
        // Calls: 0 stage, 1 commit -> fails, long before the last iteration.
        let vcs = RecordingVcs::failing_at(1, VcsStep::Commit);
        let sleeper = RecordingSleeper::default();
        let mut sim = ActivitySimulator::new(
            settings(Bounds::exactly(MAX_ITERATIONS)),
            &vcs,
            journal(),
            &sleeper,
        );

        let error = sim.run(&mut StdRng::seed_from_u64(10)).expect_err("commit should fail");

        assert!(matches!(error, SimulatorError::Vcs { iteration: 1, .. }));
        assert_eq!(sleeper.naps.borrow().len(), 1);
    }

    #[test]
    fn run_matches_plan_for_the_same_seed() {
        let vcs = RecordingVcs::default();
        let mut cfg = settings(Bounds { min: 1, max: 20 });
        cfg.payload_mode = PayloadMode::PerRun;
        let mut sim = ActivitySimulator::new(cfg, &vcs, journal(), NoopSleeper);

        let plan = sim.plan(&mut StdRng::seed_from_u64(12)).unwrap();
        let report = sim.run(&mut StdRng::seed_from_u64(12)).unwrap();

        assert_eq!(plan.len(), report.planned_iterations);
        for (step, commit) in plan.iterations.iter().zip(&report.commits) {
            assert_eq!(step.payload, commit.payload);
            assert_eq!(step.delay_secs, commit.delay_secs);
        }
    }
}
