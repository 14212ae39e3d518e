// src/errors.rs

//! Crate-wide error types.
//!
//! - [`RunError`] is what the orchestrator phases return. Each variant wraps
//!   the failure of one collaborator (working directory lookup, a watcher,
//!   the command runner, the attestation writer) and [`RunError::kind`]
//!   classifies it.
//! - [`ProvrunError`] is the application-level error used by config loading
//!   and the CLI entry point.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::run::RunState;

/// Broad classification of a [`RunError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Observation,
    Execution,
    Attestation,
}

/// Orchestrator phase names, used in ordering errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Snapshot,
    Execute,
    CollectArtifacts,
    WriteAttestation,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Snapshot => "snapshot",
            Phase::Execute => "execute",
            Phase::CollectArtifacts => "collect_artifacts",
            Phase::WriteAttestation => "write_attestation",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error("getting current directory: {0}")]
    WorkingDirectory(#[source] io::Error),

    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error("{phase} called on a run in state {state}: {reason}")]
    OutOfOrder {
        phase: Phase,
        state: RunState,
        reason: String,
    },

    #[error("{phase} failed for watcher '{watcher}': {source}")]
    Observation {
        phase: Phase,
        watcher: String,
        #[source]
        source: ObservationError,
    },

    #[error("executing run: {0}")]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Attestation(#[from] AttestationError),
}

impl RunError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RunError::WorkingDirectory(_)
            | RunError::InvalidCommand(_)
            | RunError::OutOfOrder { .. } => ErrorKind::Configuration,
            RunError::Observation { .. } => ErrorKind::Observation,
            RunError::Execution(_) => ErrorKind::Execution,
            RunError::Attestation(_) => ErrorKind::Attestation,
        }
    }
}

/// Failure of a watcher to snapshot or diff its environment.
#[derive(Error, Debug)]
pub enum ObservationError {
    #[error("reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid pattern: {0}")]
    Pattern(String),

    #[error("no baseline snapshot; snap() must run before artifacts()")]
    NoBaseline,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure of the command runner.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("spawning '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("waiting for '{command}': {source}")]
    Wait {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("command '{command}' failed with {}", describe_code(.code))]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

impl ExecutionError {
    /// Exit code to record on the run, `-1` when the child never reported one.
    pub fn exit_code(&self) -> i32 {
        match self {
            ExecutionError::Failed { code, .. } => code.unwrap_or(-1),
            _ => -1,
        }
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit status {c}"),
        None => "no exit status (terminated by signal)".to_string(),
    }
}

/// Failure to choose a destination for, or write, the attestation.
#[derive(Error, Debug)]
pub enum AttestationError {
    #[error("creating temp file to write attestation: {0}")]
    TempFile(#[source] io::Error),

    #[error("writing attestation to {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ProvrunError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ProvrunError>;
