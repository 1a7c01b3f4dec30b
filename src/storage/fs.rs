use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use super::{naming::natural_cmp, FileEntry, Storage};

/// Storage rooted at a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl Storage for FsStorage {
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let target = self.resolve(path);
        fs::write(&target, bytes)
            .with_context(|| format!("failed to write {}", target.display()))
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let target = self.resolve(path);
        fs::read(&target).with_context(|| format!("failed to read {}", target.display()))
    }

    fn list(&self, folder: &Path) -> Result<Vec<FileEntry>> {
        let dir = self.resolve(folder);
        let mut entries = Vec::new();
        for entry in fs::read_dir(&dir)
            .with_context(|| format!("failed to list {}", dir.display()))?
        {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            entries.push(FileEntry {
                path: folder.join(&name),
                name,
            });
        }
        entries.sort_by(|a, b| natural_cmp(&a.name, &b.name));
        Ok(entries)
    }

    fn create_dir(&self, folder: &Path) -> Result<()> {
        let dir = self.resolve(folder);
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create directory {}", dir.display()))
    }

    fn remove(&self, path: &Path) -> Result<()> {
        let target = self.resolve(path);
        fs::remove_file(&target)
            .with_context(|| format!("failed to remove {}", target.display()))
    }
}
