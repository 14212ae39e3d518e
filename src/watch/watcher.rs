// src/watch/watcher.rs

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::errors::ObservationError;

/// How an artifact differs from the pre-run baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactChange {
    Created,
    Modified,
}

impl fmt::Display for ArtifactChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactChange::Created => f.write_str("created"),
            ArtifactChange::Modified => f.write_str("modified"),
        }
    }
}

/// Something a run produced, as reported by a watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Name relative to the watcher's scope, e.g. `"dist/app.tar.gz"`.
    pub name: String,
    /// Full location of the artifact.
    pub location: PathBuf,
    pub change: ArtifactChange,
    /// Digest algorithm name -> lowercase hex digest.
    pub digest: BTreeMap<String, String>,
}

/// An observer of some part of the execution environment.
///
/// `snap` records a baseline before the run; `artifacts` compares the
/// current state against that baseline after the run.
pub trait Watcher: Send + fmt::Debug {
    /// Identifier used in logs and errors.
    fn name(&self) -> &str;

    fn snap(&mut self) -> Result<(), ObservationError>;

    fn artifacts(&mut self) -> Result<Vec<Artifact>, ObservationError>;
}

/// Ordered set of watchers. Iteration follows registration order.
#[derive(Debug, Default)]
pub struct WatcherSet {
    watchers: Vec<Box<dyn Watcher>>,
}

impl WatcherSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, watcher: impl Watcher + 'static) {
        self.watchers.push(Box::new(watcher));
    }

    pub fn len(&self) -> usize {
        self.watchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watchers.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.watchers.iter().map(|w| w.name())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Watcher>> {
        self.watchers.iter_mut()
    }
}
