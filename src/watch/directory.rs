// src/watch/directory.rs

//! Filesystem-backed watcher.
//!
//! A [`DirectoryWatcher`] fingerprints every file under its root (content
//! hash, filtered by [`PathFilter`]) before the run and again after it. Files
//! that are new, or whose hash changed, are the run's artifacts. Deleted and
//! unchanged files are not reported.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::ObservationError;
use crate::fs::{FileSystem, RealFileSystem};

use super::hash::{DIGEST_ALGORITHM, compute_file_hash};
use super::patterns::{PathFilter, collect_matching_files};
use super::watcher::{Artifact, ArtifactChange, Watcher};

/// Relative path -> (full path, content hash).
type DirSnapshot = BTreeMap<String, (PathBuf, String)>;

#[derive(Debug)]
pub struct DirectoryWatcher {
    name: String,
    root: PathBuf,
    filter: PathFilter,
    fs: Arc<dyn FileSystem>,
    baseline: Option<DirSnapshot>,
}

impl DirectoryWatcher {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>, filter: PathFilter) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            filter,
            fs: Arc::new(RealFileSystem),
            baseline: None,
        }
    }

    /// Swap the filesystem implementation (used with `MockFileSystem` in tests).
    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    fn take_snapshot(&self) -> Result<DirSnapshot, ObservationError> {
        // The step may be the one that creates the directory.
        if !self.fs.is_dir(&self.root) {
            debug!(watcher = %self.name, root = ?self.root, "watched directory absent; empty snapshot");
            return Ok(DirSnapshot::new());
        }

        let mut snapshot = DirSnapshot::new();
        for (rel, path) in collect_matching_files(self.fs.as_ref(), &self.root, &self.filter)? {
            let hash = compute_file_hash(self.fs.as_ref(), &path)?;
            snapshot.insert(rel, (path, hash));
        }
        Ok(snapshot)
    }
}

impl Watcher for DirectoryWatcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn snap(&mut self) -> Result<(), ObservationError> {
        let snapshot = self.take_snapshot()?;
        debug!(watcher = %self.name, files = snapshot.len(), "recorded baseline snapshot");
        self.baseline = Some(snapshot);
        Ok(())
    }

    fn artifacts(&mut self) -> Result<Vec<Artifact>, ObservationError> {
        let baseline = self.baseline.as_ref().ok_or(ObservationError::NoBaseline)?;
        let current = self.take_snapshot()?;

        let artifacts: Vec<Artifact> = current
            .into_iter()
            .filter_map(|(name, (location, hash))| {
                let change = match baseline.get(&name) {
                    None => ArtifactChange::Created,
                    Some((_, old)) if *old != hash => ArtifactChange::Modified,
                    Some(_) => return None,
                };
                let mut digest = BTreeMap::new();
                digest.insert(DIGEST_ALGORITHM.to_string(), hash);
                Some(Artifact {
                    name,
                    location,
                    change,
                    digest,
                })
            })
            .collect();

        info!(watcher = %self.name, artifacts = artifacts.len(), "computed artifact diff");
        Ok(artifacts)
    }
}
