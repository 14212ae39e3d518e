#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use provrun::engine::RunOptions;
use provrun::watch::{Artifact, ArtifactChange};

/// Builder for `RunOptions` to simplify test setup.
#[derive(Debug, Default)]
pub struct RunOptionsBuilder {
    options: RunOptions,
}

impl RunOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.cwd = Some(dir.into());
        self
    }

    pub fn verbose(mut self, val: bool) -> Self {
        self.options.verbose = val;
        self
    }

    pub fn attestation_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.attestation_path = Some(path.into());
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.options.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn build(self) -> RunOptions {
        self.options
    }
}

/// A created artifact with a single blake3 digest.
pub fn artifact(name: &str, hash: &str) -> Artifact {
    let mut digest = BTreeMap::new();
    digest.insert("blake3".to_string(), hash.to_string());
    Artifact {
        name: name.to_string(),
        location: PathBuf::from("/out").join(name),
        change: ArtifactChange::Created,
        digest,
    }
}
