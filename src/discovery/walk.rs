// src/discovery/walk.rs

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::fs::FileSystem;
use crate::types::DiscoveryMode;

pub const NIFTI_SUFFIX: &str = ".nii";

/// Whether `path` names a NIfTI volume (`*.nii`).
pub fn is_nifti(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(NIFTI_SUFFIX))
}

fn has_prefix(path: &Path, prefix: &str) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(prefix))
}

/// Collect every entry under `root` whose basename starts with `prefix`.
///
/// - `NiftiOnly`: regular files ending in `.nii`.
/// - `AllFiles`: prefixed files and directories alike; directories are
///   typically DICOM series.
///
/// Directories are always descended into, whether or not they match. The
/// result is sorted and every path is absolute, since the tools that
/// receive them run in other directories. A root that does not exist
/// yields no entries.
pub fn discover(
    fs: &dyn FileSystem,
    root: &Path,
    prefix: &str,
    mode: DiscoveryMode,
) -> Result<Vec<PathBuf>> {
    let root = std::path::absolute(root)
        .with_context(|| format!("resolving input root {:?}", root))?;
    let root = root.as_path();
    if !fs.exists(root) {
        debug!(root = %root.display(), "input root does not exist; nothing to discover");
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let entries = fs
            .read_dir(&dir)
            .with_context(|| format!("scanning {:?} for candidates", dir))?;

        for path in entries {
            let is_dir = fs.is_dir(&path);
            if is_dir {
                stack.push(path.clone());
            }
            if !has_prefix(&path, prefix) {
                continue;
            }

            let selected = match mode {
                DiscoveryMode::NiftiOnly => !is_dir && fs.is_file(&path) && is_nifti(&path),
                DiscoveryMode::AllFiles => is_dir || fs.is_file(&path),
            };
            if selected {
                found.push(path);
            }
        }
    }

    found.sort();
    debug!(root = %root.display(), prefix, ?mode, count = found.len(), "discovery finished");
    Ok(found)
}
