// src/fs/mock.rs

use super::{FileStat, FileSystem};
use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File { len: u64, modified: SystemTime },
    Dir,
}

/// In-memory filesystem for exercising the debounce logic without touching
/// the disk. Every write bumps a synthetic mtime so successive writes are
/// always distinguishable, even when the length stays the same.
#[derive(Debug, Clone)]
pub struct MockFileSystem {
    entries: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
    clock: Arc<Mutex<SystemTime>>,
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            clock: Arc::new(Mutex::new(SystemTime::UNIX_EPOCH)),
        }
    }

    /// Create or overwrite a file, creating its parent directories.
    pub fn write_file(&self, path: impl AsRef<Path>, contents: impl AsRef<[u8]>) {
        let path = path.as_ref();
        let modified = self.tick();
        let mut entries = self.entries.lock().unwrap();
        if let Some(parent) = path.parent() {
            Self::ensure_dirs(&mut entries, parent);
        }
        entries.insert(
            path.to_path_buf(),
            MockEntry::File {
                len: contents.as_ref().len() as u64,
                modified,
            },
        );
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut entries = self.entries.lock().unwrap();
        Self::ensure_dirs(&mut entries, path.as_ref());
    }

    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut entries = self.entries.lock().unwrap();
        entries.retain(|p, _| !p.starts_with(path));
    }

    fn tick(&self) -> SystemTime {
        let mut clock = self.clock.lock().unwrap();
        *clock += Duration::from_millis(1);
        *clock
    }

    fn ensure_dirs(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            entries
                .entry(ancestor.to_path_buf())
                .or_insert(MockEntry::Dir);
        }
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.entries.lock().unwrap().contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.entries.lock().unwrap().get(path), Some(MockEntry::Dir))
    }

    fn stat(&self, path: &Path) -> Result<FileStat> {
        match self.entries.lock().unwrap().get(path) {
            Some(MockEntry::File { len, modified }) => Ok(FileStat {
                len: *len,
                modified: Some(*modified),
                is_dir: false,
            }),
            Some(MockEntry::Dir) => Ok(FileStat {
                len: 0,
                modified: None,
                is_dir: true,
            }),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let entries = self.entries.lock().unwrap();
        if !matches!(entries.get(path), Some(MockEntry::Dir)) {
            return Err(anyhow!("Not a directory: {:?}", path));
        }
        let mut children: Vec<PathBuf> = entries
            .keys()
            .filter(|p| p.parent() == Some(path))
            .cloned()
            .collect();
        children.sort();
        Ok(children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_create_parents_and_bump_mtime() {
        let fs = MockFileSystem::new();
        fs.write_file("/proj/_data/a.json", b"{}");
        let first = fs.stat(Path::new("/proj/_data/a.json")).unwrap();

        assert!(fs.is_dir(Path::new("/proj/_data")));
        assert!(fs.is_dir(Path::new("/proj")));

        fs.write_file("/proj/_data/a.json", b"{}");
        let second = fs.stat(Path::new("/proj/_data/a.json")).unwrap();
        assert_eq!(first.len, second.len);
        assert_ne!(first.modified, second.modified);
    }

    #[test]
    fn remove_drops_subtree() {
        let fs = MockFileSystem::new();
        fs.write_file("/proj/_patterns/a/b.hbs", b"x");
        fs.remove("/proj/_patterns/a");
        assert!(!fs.exists(Path::new("/proj/_patterns/a/b.hbs")));
        assert!(fs.exists(Path::new("/proj/_patterns")));
    }

    #[test]
    fn read_dir_lists_direct_children_only() {
        let fs = MockFileSystem::new();
        fs.write_file("/proj/_patterns/b.hbs", b"x");
        fs.write_file("/proj/_patterns/a/deep.hbs", b"x");

        assert_eq!(
            fs.read_dir(Path::new("/proj/_patterns")).unwrap(),
            vec![
                PathBuf::from("/proj/_patterns/a"),
                PathBuf::from("/proj/_patterns/b.hbs"),
            ]
        );
        assert!(fs.read_dir(Path::new("/proj/_patterns/b.hbs")).is_err());
    }
}
