// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Configuration exactly as read from TOML, before validation.
///
/// ```toml
/// [run]
/// cwd = "."
/// verbose = false
/// attestation_path = "provenance.json"
/// builder_id = "urn:provrun:builder:ci"
///
/// [env]
/// SOURCE_DATE_EPOCH = "0"
///
/// [[watch]]
/// name = "dist"
/// path = "dist"
/// include = ["**/*.tar.gz"]
/// exclude = ["**/*.tmp"]
/// ```
///
/// All sections are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub run: RunSection,

    /// Variables passed to the command and recorded in the attestation.
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Watched directories, in the order they are snapshotted.
    #[serde(default)]
    pub watch: Vec<WatchConfig>,
}

/// `[run]` section. Every field can be overridden on the command line.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSection {
    /// Working directory of the command. When loaded from a file, a relative
    /// path is joined to the file's directory.
    #[serde(default)]
    pub cwd: Option<PathBuf>,

    #[serde(default)]
    pub verbose: Option<bool>,

    #[serde(default)]
    pub attestation_path: Option<PathBuf>,

    /// Identity recorded as `runDetails.builder.id`.
    #[serde(default)]
    pub builder_id: Option<String>,
}

/// `[[watch]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchConfig {
    /// Defaults to `path` when omitted.
    #[serde(default)]
    pub name: Option<String>,

    /// Directory to watch. Relative paths are taken from the run's working
    /// directory.
    pub path: PathBuf,

    #[serde(default)]
    pub include: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,
}

impl WatchConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            name: None,
            path: path.into(),
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }

    pub fn effective_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Validated configuration. Only obtainable through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    run: RunSection,
    env: BTreeMap<String, String>,
    watch: Vec<WatchConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        run: RunSection,
        env: BTreeMap<String, String>,
        watch: Vec<WatchConfig>,
    ) -> Self {
        Self { run, env, watch }
    }

    pub fn run_section(&self) -> &RunSection {
        &self.run
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    pub fn watchers(&self) -> &[WatchConfig] {
        &self.watch
    }
}
