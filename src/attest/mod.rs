// src/attest/mod.rs

//! Attestation documents.
//!
//! [`writer::AttestationWriter`] is the seam the orchestrator writes
//! through; [`writer::StatementWriter`] renders a [`statement::Statement`]
//! to JSON. Signing is left to external tooling.

pub mod statement;
pub mod writer;

pub use statement::Statement;
pub use writer::{AttestationWriter, StatementWriter};
