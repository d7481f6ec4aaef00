// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};

pub mod mock;

/// The bits of file metadata the write-stability check compares between polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub len: u64,
    pub modified: Option<SystemTime>,
    pub is_dir: bool,
}

/// Abstract filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn stat(&self, path: &Path) -> Result<FileStat>;

    /// Return a list of entries in a directory.
    /// Returns full paths.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn stat(&self, path: &Path) -> Result<FileStat> {
        let meta = fs::metadata(path).with_context(|| format!("reading metadata of {:?}", path))?;
        Ok(FileStat {
            len: meta.len(),
            modified: meta.modified().ok(),
            is_dir: meta.is_dir(),
        })
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path).with_context(|| format!("reading dir {:?}", path))? {
            let entry = entry?;
            entries.push(entry.path());
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn real_stat_reports_length_and_kind() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("a.json");
        let mut file = fs::File::create(&file_path).unwrap();
        file.write_all(b"{}").unwrap();

        let fs = RealFileSystem;
        let stat = fs.stat(&file_path).unwrap();
        assert_eq!(stat.len, 2);
        assert!(!stat.is_dir);
        assert!(fs.stat(dir.path()).unwrap().is_dir);
        assert!(fs.stat(&dir.path().join("missing")).is_err());
        assert_eq!(fs.read_dir(dir.path()).unwrap(), vec![file_path]);
    }
}
