// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`backend`] provides the `CommandRunner` trait the orchestrator depends
//!   on, and the concrete `ProcessRunner` used in production. Tests replace
//!   it with a fake implementation.
//! - [`process`] spawns the child with `tokio::process::Command`, drains its
//!   output and maps the exit status to a result.

pub mod backend;
pub mod process;

pub use backend::{CommandOutput, CommandRunner, ProcessRunner, RunFuture};
