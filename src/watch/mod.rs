// src/watch/mod.rs

//! Environment watchers.
//!
//! - [`watcher`] defines the `Watcher` contract, the ordered `WatcherSet` and
//!   the `Artifact` values watchers report.
//! - [`directory`] is the filesystem-backed watcher.
//! - [`patterns`] compiles include/exclude globs and walks directories.
//! - [`hash`] fingerprints file contents with blake3.

pub mod directory;
pub mod hash;
pub mod patterns;
pub mod watcher;

pub use directory::DirectoryWatcher;
pub use patterns::PathFilter;
pub use watcher::{Artifact, ArtifactChange, Watcher, WatcherSet};
