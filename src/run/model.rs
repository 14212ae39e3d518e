// src/run/model.rs

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::exec::CommandOutput;
use crate::watch::Artifact;

/// What to run: executable name plus ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    name: String,
    arguments: Vec<String>,
}

impl CommandSpec {
    pub fn new(name: impl Into<String>, arguments: Vec<String>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// `name arg1 arg2 ...`, for logs and error messages.
    pub fn display_line(&self) -> String {
        if self.arguments.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, self.arguments.join(" "))
        }
    }
}

/// Where and with which extra variables a run executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionEnvironment {
    working_directory: PathBuf,
    variables: BTreeMap<String, String>,
}

impl ExecutionEnvironment {
    pub fn new(working_directory: PathBuf, variables: BTreeMap<String, String>) -> Self {
        Self {
            working_directory,
            variables,
        }
    }

    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    pub fn variables(&self) -> &BTreeMap<String, String> {
        &self.variables
    }
}

/// Result of the execute phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Succeeded,
    Failed,
}

/// Lifecycle position of a [`Run`].
///
/// `Created -> Snapshotted -> Executed -> Collected -> Attested`.
/// `Executed(Failed)` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Created,
    Snapshotted,
    Executed(ExecutionOutcome),
    Collected,
    Attested,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Created => f.write_str("created"),
            RunState::Snapshotted => f.write_str("snapshotted"),
            RunState::Executed(ExecutionOutcome::Succeeded) => f.write_str("executed (succeeded)"),
            RunState::Executed(ExecutionOutcome::Failed) => f.write_str("executed (failed)"),
            RunState::Collected => f.write_str("collected"),
            RunState::Attested => f.write_str("attested"),
        }
    }
}

/// The record of one execution of a step.
///
/// Only the orchestrator mutates a run; everything outside the crate reads
/// it through accessors.
#[derive(Debug, Clone)]
pub struct Run {
    command_spec: CommandSpec,
    environment: ExecutionEnvironment,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    exit_status: i32,
    output: Option<CommandOutput>,
    artifacts: Vec<Artifact>,
    state: RunState,
    snapshotted_watchers: usize,
}

impl Run {
    pub(crate) fn new(command_spec: CommandSpec, environment: ExecutionEnvironment) -> Self {
        Self {
            command_spec,
            environment,
            start_time: None,
            end_time: None,
            exit_status: 0,
            output: None,
            artifacts: Vec::new(),
            state: RunState::Created,
            snapshotted_watchers: 0,
        }
    }

    pub fn command_spec(&self) -> &CommandSpec {
        &self.command_spec
    }

    pub fn environment(&self) -> &ExecutionEnvironment {
        &self.environment
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    pub fn exit_status(&self) -> i32 {
        self.exit_status
    }

    pub fn output(&self) -> Option<&CommandOutput> {
        self.output.as_ref()
    }

    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Number of watchers covered by the pre-run snapshot.
    pub fn snapshotted_watchers(&self) -> usize {
        self.snapshotted_watchers
    }

    pub(crate) fn mark_snapshotted(&mut self, watchers: usize) {
        self.snapshotted_watchers = watchers;
        self.state = RunState::Snapshotted;
    }

    pub(crate) fn mark_started(&mut self, at: DateTime<Utc>) {
        self.start_time = Some(at);
    }

    pub(crate) fn mark_succeeded(&mut self, at: DateTime<Utc>, output: CommandOutput) {
        self.end_time = Some(at);
        self.exit_status = output.exit_code;
        self.output = Some(output);
        self.state = RunState::Executed(ExecutionOutcome::Succeeded);
    }

    pub(crate) fn mark_failed(&mut self, at: DateTime<Utc>, exit_status: i32) {
        self.end_time = Some(at);
        self.exit_status = exit_status;
        self.state = RunState::Executed(ExecutionOutcome::Failed);
    }

    pub(crate) fn push_artifacts(&mut self, artifacts: Vec<Artifact>) {
        self.artifacts.extend(artifacts);
    }

    pub(crate) fn set_state(&mut self, state: RunState) {
        self.state = state;
    }
}
