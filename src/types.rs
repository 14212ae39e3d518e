// src/types.rs

use std::fmt;

/// How the command runner treats child output.
///
/// - `Verbose`: echo stdout/stderr lines as they are produced, and capture
///   them.
/// - `Silent`: capture only (default).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Verbose,
    Silent,
}

impl OutputMode {
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            OutputMode::Verbose
        } else {
            OutputMode::Silent
        }
    }

    pub fn is_verbose(self) -> bool {
        matches!(self, OutputMode::Verbose)
    }
}

impl Default for OutputMode {
    fn default() -> Self {
        OutputMode::Silent
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Verbose => f.write_str("verbose"),
            OutputMode::Silent => f.write_str("silent"),
        }
    }
}

/// Default builder identity recorded in attestations when none is configured.
pub const DEFAULT_BUILDER_ID: &str = "urn:provrun:builder:local";
