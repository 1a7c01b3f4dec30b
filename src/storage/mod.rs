pub mod fs;
pub mod memory;
pub mod naming;

pub use self::fs::FsStorage;
pub use memory::MemoryStorage;

use std::path::{Path, PathBuf};

use anyhow::Result;

const PROBE_FILE: &str = ".scopecapture_probe";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
}

/// Folder-scoped file store the capture core reads and writes through.
///
/// Paths are relative to the store's root and case-sensitive. `list` returns
/// plain files only, in natural name order.
pub trait Storage: Send + Sync {
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()>;

    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    fn list(&self, folder: &Path) -> Result<Vec<FileEntry>>;

    fn create_dir(&self, folder: &Path) -> Result<()>;

    fn remove(&self, path: &Path) -> Result<()>;

    /// Creates `folder` and proves a file can be written into it.
    fn ensure_writable(&self, folder: &Path) -> Result<()> {
        self.create_dir(folder)?;
        let probe = folder.join(PROBE_FILE);
        self.write(&probe, b"ok")?;
        self.remove(&probe)
    }
}
