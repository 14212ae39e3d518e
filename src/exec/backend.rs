// src/exec/backend.rs

//! Pluggable command runner abstraction.
//!
//! The orchestrator talks to a `CommandRunner` instead of spawning processes
//! itself. Production code uses [`ProcessRunner`]; tests provide their own
//! implementation that records invocations and returns canned output.

use std::future::Future;
use std::pin::Pin;

use crate::errors::ExecutionError;
use crate::run::{CommandSpec, ExecutionEnvironment};
use crate::types::OutputMode;

use super::process::run_process;

/// Captured output of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

pub type RunFuture<'a> =
    Pin<Box<dyn Future<Output = Result<CommandOutput, ExecutionError>> + Send + 'a>>;

/// Trait abstracting how a command actually runs.
///
/// Implementations run the command to completion. A command that starts but
/// exits unsuccessfully is an error (`ExecutionError::Failed`), not an
/// `Ok` with a non-zero code.
pub trait CommandRunner: Send + Sync {
    fn run<'a>(
        &'a self,
        spec: &'a CommandSpec,
        env: &'a ExecutionEnvironment,
        mode: OutputMode,
    ) -> RunFuture<'a>;
}

/// Runner that spawns a real child process via `tokio::process`.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ProcessRunner {
    fn run<'a>(
        &'a self,
        spec: &'a CommandSpec,
        env: &'a ExecutionEnvironment,
        mode: OutputMode,
    ) -> RunFuture<'a> {
        Box::pin(run_process(spec, env, mode))
    }
}
