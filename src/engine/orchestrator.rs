// src/engine/orchestrator.rs

//! Run lifecycle orchestration.
//!
//! One lifecycle is
//! `create_run -> snapshot -> execute -> collect_artifacts -> write_attestation`.
//! Every phase checks the run's [`RunState`] before doing anything and fails
//! with [`RunError::OutOfOrder`] when called at the wrong point, so a
//! snapshot can never be taken after execution and an attestation can never
//! describe a run that has not finished.

use std::io;
use std::path::PathBuf;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::attest::AttestationWriter;
use crate::errors::{AttestationError, Phase, RunError};
use crate::exec::CommandRunner;
use crate::run::{CommandSpec, ExecutionEnvironment, ExecutionOutcome, Run, RunState, Step};
use crate::types::OutputMode;
use crate::watch::WatcherSet;

use super::options::RunOptions;

const TEMP_PREFIX: &str = "provenance-";
const TEMP_SUFFIX: &str = ".json";

/// A run that went through the whole lifecycle.
#[derive(Debug)]
pub struct Recorded {
    pub run: Run,
    pub attestation_path: PathBuf,
}

/// Drives runs through their lifecycle.
///
/// Holds no per-run state; each [`Run`] is an independent value owned by the
/// caller and passed in by `&mut`.
pub struct Orchestrator<R, W> {
    runner: R,
    writer: W,
    current_dir: fn() -> io::Result<PathBuf>,
    temp_dir: Option<PathBuf>,
}

impl<R, W> Orchestrator<R, W>
where
    R: CommandRunner,
    W: AttestationWriter,
{
    pub fn new(runner: R, writer: W) -> Self {
        Self {
            runner,
            writer,
            current_dir: std::env::current_dir,
            temp_dir: None,
        }
    }

    /// Replace how the ambient working directory is looked up.
    pub fn with_current_dir(mut self, current_dir: fn() -> io::Result<PathBuf>) -> Self {
        self.current_dir = current_dir;
        self
    }

    /// Directory for attestations written without an explicit path. Defaults
    /// to the system temp directory.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Build a run from `step`. Nothing is executed.
    pub fn create_run(&self, options: &RunOptions, step: &impl Step) -> Result<Run, RunError> {
        let cwd = match &options.cwd {
            Some(dir) => dir.clone(),
            None => (self.current_dir)().map_err(RunError::WorkingDirectory)?,
        };

        let command = step.command();
        if command.trim().is_empty() {
            return Err(RunError::InvalidCommand(
                "step has an empty command name".to_string(),
            ));
        }
        let params = step.params();

        info!("Executing command: {} {}", command, params.join(" "));

        Ok(Run::new(
            CommandSpec::new(command, params),
            ExecutionEnvironment::new(cwd, options.env.clone()),
        ))
    }

    /// Record the pre-run baseline of every watcher, in order.
    ///
    /// Stops at the first failing watcher. Watchers before it keep their
    /// baseline; watchers after it are not touched; the run stays `Created`.
    pub fn snapshot(&self, run: &mut Run, watchers: &mut WatcherSet) -> Result<(), RunError> {
        ensure_state(
            run,
            Phase::Snapshot,
            run.state() == RunState::Created,
            "snapshots must be taken before execution",
        )?;

        for watcher in watchers.iter_mut() {
            debug!(watcher = watcher.name(), "taking pre-run snapshot");
            watcher.snap().map_err(|source| RunError::Observation {
                phase: Phase::Snapshot,
                watcher: watcher.name().to_string(),
                source,
            })?;
        }

        run.mark_snapshotted(watchers.len());
        Ok(())
    }

    /// Run the command to completion.
    ///
    /// Start and end times are recorded whether or not the command
    /// succeeds; output is only stored on success.
    pub async fn execute(&self, options: &RunOptions, run: &mut Run) -> Result<(), RunError> {
        ensure_state(
            run,
            Phase::Execute,
            run.state() == RunState::Snapshotted,
            "a run executes exactly once, after its snapshot",
        )?;

        let mode = OutputMode::from_verbose(options.verbose);

        let started = Utc::now();
        run.mark_started(started);
        let result = self
            .runner
            .run(run.command_spec(), run.environment(), mode)
            .await;
        let finished = Utc::now().max(started);

        match result {
            Ok(output) => {
                if options.verbose {
                    info!("{}", output.stdout);
                }
                run.mark_succeeded(finished, output);
                Ok(())
            }
            Err(err) => {
                warn!(
                    cmd = %run.command_spec().display_line(),
                    error = %err,
                    "command failed"
                );
                run.mark_failed(finished, err.exit_code());
                Err(RunError::Execution(err))
            }
        }
    }

    /// Ask every snapshotted watcher for the artifacts the run produced.
    ///
    /// `watchers` must be the same set passed to [`snapshot`](Self::snapshot).
    /// Artifacts are only added to the run if every watcher succeeds.
    pub fn collect_artifacts(
        &self,
        run: &mut Run,
        watchers: &mut WatcherSet,
    ) -> Result<(), RunError> {
        ensure_state(
            run,
            Phase::CollectArtifacts,
            run.state() == RunState::Executed(ExecutionOutcome::Succeeded),
            "artifacts are collected once, after a successful execution",
        )?;
        if watchers.len() != run.snapshotted_watchers() {
            return Err(RunError::OutOfOrder {
                phase: Phase::CollectArtifacts,
                state: run.state(),
                reason: format!(
                    "{} watchers given but {} were snapshotted",
                    watchers.len(),
                    run.snapshotted_watchers()
                ),
            });
        }

        let mut collected = Vec::new();
        for watcher in watchers.iter_mut() {
            let artifacts = watcher.artifacts().map_err(|source| RunError::Observation {
                phase: Phase::CollectArtifacts,
                watcher: watcher.name().to_string(),
                source,
            })?;
            debug!(watcher = watcher.name(), count = artifacts.len(), "collected artifacts");
            collected.extend(artifacts);
        }

        run.push_artifacts(collected);
        run.set_state(RunState::Collected);
        Ok(())
    }

    /// Persist the attestation for a finished run and return its path.
    ///
    /// Writing again to the same explicit path overwrites it; without an
    /// explicit path every call creates a new temp file.
    pub fn write_attestation(
        &self,
        options: &RunOptions,
        run: &mut Run,
    ) -> Result<PathBuf, RunError> {
        let ready = match run.state() {
            RunState::Collected | RunState::Attested => true,
            RunState::Executed(ExecutionOutcome::Succeeded) => run.snapshotted_watchers() == 0,
            _ => false,
        };
        ensure_state(
            run,
            Phase::WriteAttestation,
            ready,
            "attestations describe successful runs whose artifacts were collected",
        )?;

        let (path, is_temp) = match &options.attestation_path {
            Some(path) => (path.clone(), false),
            None => {
                let path = self.create_temp_file()?;
                debug!("Writing attestation to temp file: {}", path.display());
                (path, true)
            }
        };

        if let Err(source) = self.writer.write(run, &path) {
            if is_temp {
                if let Err(e) = std::fs::remove_file(&path) {
                    debug!(path = %path.display(), error = %e, "removing unused temp file");
                }
            }
            return Err(AttestationError::Write { path, source }.into());
        }

        info!("Wrote provenance attestation to {}", path.display());
        run.set_state(RunState::Attested);
        Ok(path)
    }

    fn create_temp_file(&self) -> Result<PathBuf, AttestationError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(TEMP_PREFIX).suffix(TEMP_SUFFIX);
        let file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(AttestationError::TempFile)?;

        file.into_temp_path()
            .keep()
            .map_err(|e| AttestationError::TempFile(e.error))
    }

    /// Drive `step` through the whole lifecycle.
    pub async fn record(
        &self,
        options: &RunOptions,
        step: &impl Step,
        watchers: &mut WatcherSet,
    ) -> Result<Recorded, RunError> {
        let mut run = self.create_run(options, step)?;
        self.snapshot(&mut run, watchers)?;
        self.execute(options, &mut run).await?;
        self.collect_artifacts(&mut run, watchers)?;
        let attestation_path = self.write_attestation(options, &mut run)?;
        Ok(Recorded {
            run,
            attestation_path,
        })
    }
}

fn ensure_state(run: &Run, phase: Phase, ok: bool, reason: &str) -> Result<(), RunError> {
    if ok {
        Ok(())
    } else {
        Err(RunError::OutOfOrder {
            phase,
            state: run.state(),
            reason: reason.to_string(),
        })
    }
}
