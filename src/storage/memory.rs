use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    sync::RwLock,
};

use anyhow::{anyhow, Result};

use super::{naming::natural_cmp, FileEntry, Storage};

/// In-process storage for scratch sessions that never touch disk.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: RwLock<BTreeMap<PathBuf, Vec<u8>>>,
    dirs: RwLock<BTreeSet<PathBuf>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_count(&self) -> usize {
        self.files.read().unwrap_or_else(|p| p.into_inner()).len()
    }

    fn has_dir(&self, folder: &Path) -> bool {
        folder.as_os_str().is_empty()
            || self
                .dirs
                .read()
                .unwrap_or_else(|p| p.into_inner())
                .contains(folder)
    }
}

impl Storage for MemoryStorage {
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let parent = path.parent().unwrap_or_else(|| Path::new(""));
        if !self.has_dir(parent) {
            return Err(anyhow!("no such directory {}", parent.display()));
        }
        self.files
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.files
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("no such file {}", path.display()))
    }

    fn list(&self, folder: &Path) -> Result<Vec<FileEntry>> {
        if !self.has_dir(folder) {
            return Err(anyhow!("no such directory {}", folder.display()));
        }
        let files = self.files.read().unwrap_or_else(|p| p.into_inner());
        let mut entries: Vec<FileEntry> = files
            .keys()
            .filter(|path| path.parent() == Some(folder))
            .filter_map(|path| {
                let name = path.file_name()?.to_string_lossy().into_owned();
                Some(FileEntry {
                    name,
                    path: path.clone(),
                })
            })
            .collect();
        entries.sort_by(|a, b| natural_cmp(&a.name, &b.name));
        Ok(entries)
    }

    fn create_dir(&self, folder: &Path) -> Result<()> {
        let mut dirs = self.dirs.write().unwrap_or_else(|p| p.into_inner());
        for ancestor in folder.ancestors() {
            if !ancestor.as_os_str().is_empty() {
                dirs.insert(ancestor.to_path_buf());
            }
        }
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<()> {
        self.files
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| anyhow!("no such file {}", path.display()))
    }
}
