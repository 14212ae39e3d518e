// src/engine/options.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Caller-supplied settings for one run lifecycle.
///
/// Diagnostics go to the global `tracing` subscriber rather than a logger
/// handle carried here.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Working directory override. `None` means the process's current
    /// directory at `create_run` time.
    pub cwd: Option<PathBuf>,

    /// Echo child output while it runs (and log the captured stdout).
    pub verbose: bool,

    /// Where to write the attestation. `None` means a fresh
    /// `provenance-*.json` file in the system temp directory.
    pub attestation_path: Option<PathBuf>,

    /// Extra variables passed to the child and recorded in the attestation.
    pub env: BTreeMap<String, String>,
}
