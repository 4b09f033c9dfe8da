// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

pub mod mock;

/// Abstract filesystem interface.
///
/// Discovery, collection and the runner only touch the disk through this
/// trait so they can be exercised against [`mock::MockFileSystem`].
pub trait FileSystem: Send + Sync + Debug {
    fn read(&self, path: &Path) -> Result<Vec<u8>>;
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;
    fn exists(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;

    /// Return a list of entries in a directory.
    /// Returns full paths.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// Create `path` and any missing parents. Succeeds if it already exists.
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Copy a file, keeping permissions and timestamps where the platform
    /// allows it. The source is left untouched.
    fn copy_preserving(&self, from: &Path, to: &Path) -> Result<()>;

    /// Move a file, replacing `to` if it is an existing file.
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    fn remove_file(&self, path: &Path) -> Result<()>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).with_context(|| format!("reading file {:?}", path))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating dir {:?}", parent))?;
            }
        }
        fs::write(path, contents).with_context(|| format!("writing to file {:?}", path))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path).with_context(|| format!("reading dir {:?}", path))? {
            let entry = entry?;
            entries.push(entry.path());
        }
        Ok(entries)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).with_context(|| format!("creating dir {:?}", path))
    }

    fn copy_preserving(&self, from: &Path, to: &Path) -> Result<()> {
        // `fs::copy` carries permission bits over; timestamps are set below.
        fs::copy(from, to).with_context(|| format!("copying {:?} to {:?}", from, to))?;

        let meta = fs::metadata(from).with_context(|| format!("reading metadata of {:?}", from))?;
        let mut times = fs::FileTimes::new();
        if let Ok(modified) = meta.modified() {
            times = times.set_modified(modified);
        }
        if let Ok(accessed) = meta.accessed() {
            times = times.set_accessed(accessed);
        }

        let applied = fs::OpenOptions::new()
            .write(true)
            .open(to)
            .and_then(|dest| dest.set_times(times));
        if let Err(e) = applied {
            warn!(path = %to.display(), error = %e, "could not preserve timestamps on copy");
        }
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(e) => {
                // Typically a cross-device move; fall back to copy + delete.
                debug!(
                    from = %from.display(),
                    to = %to.display(),
                    error = %e,
                    "rename failed; falling back to copy and remove"
                );
                fs::copy(from, to)
                    .with_context(|| format!("copying {:?} to {:?}", from, to))?;
                fs::remove_file(from).with_context(|| format!("removing {:?}", from))
            }
        }
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).with_context(|| format!("removing {:?}", path))
    }
}
