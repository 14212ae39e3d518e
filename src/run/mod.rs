// src/run/mod.rs

//! Run data model.
//!
//! - [`model`] holds the [`Run`] record and its parts ([`CommandSpec`],
//!   [`ExecutionEnvironment`], [`RunState`]).
//! - [`step`] defines the [`Step`] input a run is created from.

pub mod model;
pub mod step;

pub use model::{CommandSpec, ExecutionEnvironment, ExecutionOutcome, Run, RunState};
pub use step::{CommandStep, Step};
