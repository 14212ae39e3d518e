// src/engine/mod.rs

//! The run lifecycle engine.
//!
//! - [`options`] holds the per-lifecycle [`RunOptions`].
//! - [`orchestrator`] sequences create, snapshot, execute, collect and
//!   attest, enforcing their order on each [`Run`](crate::run::Run).

pub mod options;
pub mod orchestrator;

pub use options::RunOptions;
pub use orchestrator::{Orchestrator, Recorded};
