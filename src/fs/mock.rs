// src/fs/mock.rs

use std::collections::BTreeMap;
use std::io::{self, Cursor, Read};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use super::FileSystem;

#[derive(Debug, Clone)]
enum MockEntry {
    File(Vec<u8>),
    Dir,
    Symlink(PathBuf),
}

/// Same limit Linux applies when resolving nested links.
const MAX_LINK_HOPS: usize = 40;

/// In-memory filesystem for watcher tests.
///
/// Paths are stored as given; parent directories are created implicitly when
/// a file or link is added. Links are only resolved when they are the last
/// component of a path. Clones share the same underlying tree, so a test can keep
/// one handle to mutate files while a watcher holds another.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<BTreeMap<PathBuf, MockEntry>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<PathBuf, MockEntry>> {
        // Poisoning is ignored.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut entries = self.entries();
        for dir in path.as_ref().ancestors() {
            if dir.as_os_str().is_empty() {
                continue;
            }
            entries.entry(dir.to_path_buf()).or_insert(MockEntry::Dir);
        }
    }

    /// Create or overwrite a file.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.entries()
            .insert(path.to_path_buf(), MockEntry::File(content.into()));
    }

    /// Create a symbolic link at `link`. A relative `target` is taken from the
    /// link's parent directory.
    pub fn add_symlink(&self, link: impl AsRef<Path>, target: impl AsRef<Path>) {
        let link = link.as_ref();
        if let Some(parent) = link.parent() {
            self.add_dir(parent);
        }
        self.entries().insert(
            link.to_path_buf(),
            MockEntry::Symlink(target.as_ref().to_path_buf()),
        );
    }

    pub fn remove_file(&self, path: impl AsRef<Path>) {
        self.entries().remove(path.as_ref());
    }

    /// Follow links starting at `path` and return the entry they end on.
    fn resolve(&self, path: &Path) -> Option<MockEntry> {
        let entries = self.entries();
        let mut current = path.to_path_buf();
        for _ in 0..MAX_LINK_HOPS {
            match entries.get(&current)? {
                MockEntry::Symlink(target) => {
                    current = match current.parent() {
                        Some(parent) => normalize(&parent.join(target)),
                        None => target.clone(),
                    };
                }
                entry => return Some(entry.clone()),
            }
        }
        None
    }
}

/// Lexically drop `.` and resolve `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

impl FileSystem for MockFileSystem {
    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        match self.resolve(path) {
            Some(MockEntry::File(content)) => Ok(Box::new(Cursor::new(content))),
            Some(_) => Err(io::Error::other(format!("is a directory: {path:?}"))),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {path:?}"),
            )),
        }
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.resolve(path), Some(MockEntry::File(_)))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.resolve(path), Some(MockEntry::Dir))
    }

    fn is_symlink(&self, path: &Path) -> bool {
        matches!(self.entries().get(path), Some(MockEntry::Symlink(_)))
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let entries = self.entries();
        match entries.get(path) {
            Some(MockEntry::Dir) => Ok(entries
                .keys()
                .filter(|p| p.parent() == Some(path))
                .cloned()
                .collect()),
            _ => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("not a directory: {path:?}"),
            )),
        }
    }
}
