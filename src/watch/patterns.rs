// src/watch/patterns.rs

use std::fmt;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::debug;

use crate::errors::ObservationError;
use crate::fs::FileSystem;

/// Compiled include/exclude glob patterns for a watched directory.
///
/// Patterns are matched against paths relative to the watched root, with
/// forward slashes (e.g. `"dist/app.tar.gz"`). An empty include list means
/// every file is included; an exclude match always wins.
#[derive(Clone)]
pub struct PathFilter {
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

impl fmt::Debug for PathFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathFilter")
            .field("include", &self.include.as_ref().map(GlobSet::len))
            .field("exclude", &self.exclude.as_ref().map(GlobSet::len))
            .finish()
    }
}

impl Default for PathFilter {
    fn default() -> Self {
        Self::all()
    }
}

impl PathFilter {
    /// Filter that accepts every path.
    pub fn all() -> Self {
        Self {
            include: None,
            exclude: None,
        }
    }

    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, ObservationError> {
        Ok(Self {
            include: build_globset(include)?,
            exclude: build_globset(exclude)?,
        })
    }

    pub fn matches(&self, rel_path: &str) -> bool {
        if let Some(include) = &self.include {
            if !include.is_match(rel_path) {
                return false;
            }
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }
}

/// Build a GlobSet, or `None` for an empty pattern list.
fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>, ObservationError> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat)
            .map_err(|e| ObservationError::Pattern(format!("{pat}: {e}")))?;
        builder.add(glob);
    }
    let set = builder
        .build()
        .map_err(|e| ObservationError::Pattern(e.to_string()))?;
    Ok(Some(set))
}

/// Walk `root` and return `(relative path, full path)` for every file the
/// filter accepts, sorted by relative path.
///
/// Symlinked directories below `root` are not descended into, so a link back
/// to an ancestor cannot make the walk revisit files. Symlinked files are
/// reported like regular files.
pub fn collect_matching_files(
    fs: &dyn FileSystem,
    root: &Path,
    filter: &PathFilter,
) -> Result<Vec<(String, PathBuf)>, ObservationError> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let entries = fs.read_dir(&dir).map_err(|source| ObservationError::Io {
            path: dir.clone(),
            source,
        })?;
        for path in entries {
            if fs.is_dir(&path) {
                if fs.is_symlink(&path) {
                    debug!(path = %path.display(), "not following symlinked directory");
                    continue;
                }
                stack.push(path);
            } else if fs.is_file(&path) {
                if let Ok(rel) = path.strip_prefix(root) {
                    let rel_str = rel.to_string_lossy().replace('\\', "/");
                    if filter.matches(&rel_str) {
                        files.push((rel_str, path));
                    }
                }
            }
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_include_matches_everything() {
        let filter = PathFilter::new(&[], &strings(&["**/*.tmp"])).unwrap();
        assert!(filter.matches("bin/app"));
        assert!(!filter.matches("bin/app.tmp"));
    }

    #[test]
    fn exclude_wins_over_include() {
        let filter =
            PathFilter::new(&strings(&["**/*.tar.gz"]), &strings(&["debug/**"])).unwrap();
        assert!(filter.matches("release/app.tar.gz"));
        assert!(!filter.matches("debug/app.tar.gz"));
        assert!(!filter.matches("release/app.zip"));
    }

    #[test]
    fn invalid_glob_is_pattern_error() {
        let err = PathFilter::new(&strings(&["a[b"]), &[]).unwrap_err();
        assert!(matches!(err, ObservationError::Pattern(_)));
    }

    #[test]
    fn collects_sorted_relative_paths() {
        let fs = MockFileSystem::new();
        fs.add_file("/w/src/main.rs", b"fn main() {}".to_vec());
        fs.add_file("/w/src/lib.rs", b"pub fn lib() {}".to_vec());
        fs.add_file("/w/README.md", b"# Readme".to_vec());

        let filter = PathFilter::new(&strings(&["src/**/*.rs"]), &[]).unwrap();
        let files = collect_matching_files(&fs, Path::new("/w"), &filter).unwrap();

        let rels: Vec<&str> = files.iter().map(|(r, _)| r.as_str()).collect();
        assert_eq!(rels, vec!["src/lib.rs", "src/main.rs"]);
        assert_eq!(files[0].1, PathBuf::from("/w/src/lib.rs"));
    }

    #[test]
    fn symlinked_directories_are_not_descended() {
        let fs = MockFileSystem::new();
        fs.add_file("/w/a.txt", b"a".to_vec());
        fs.add_file("/w/sub/b.txt", b"b".to_vec());
        fs.add_symlink("/w/loop", ".");
        fs.add_symlink("/w/sub/up", "..");
        fs.add_symlink("/w/b-link.txt", "sub/b.txt");

        let files = collect_matching_files(&fs, Path::new("/w"), &PathFilter::all()).unwrap();

        let rels: Vec<&str> = files.iter().map(|(r, _)| r.as_str()).collect();
        assert_eq!(rels, vec!["a.txt", "b-link.txt", "sub/b.txt"]);
    }
}
