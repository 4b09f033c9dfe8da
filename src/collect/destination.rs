// src/collect/destination.rs

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::errors::{KaibaError, Result};
use crate::fs::FileSystem;

/// File name without its NIfTI extension.
///
/// `.nii.gz` and `.nii` are removed as a whole; any other name loses only its
/// last extension.
pub fn nifti_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    for suffix in [".nii.gz", ".nii"] {
        if let Some(stem) = name.strip_suffix(suffix) {
            if !stem.is_empty() {
                return stem.to_string();
            }
        }
    }

    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or(name)
}

/// Output directory for `candidate`.
///
/// `<output_root>/<dir of candidate relative to input_root>/<stem><suffix>`
///
/// The relative part is computed component-wise, so a root such as `data`
/// never matches inside `data2/...` or further down the path.
pub fn destination_dir(
    candidate: &Path,
    input_root: &Path,
    output_root: &Path,
    suffix: &str,
) -> Result<PathBuf> {
    let rel = candidate
        .strip_prefix(input_root)
        .map_err(|_| KaibaError::OutsideInputRoot {
            path: candidate.to_path_buf(),
            root: input_root.to_path_buf(),
        })?;

    let rel_dir = rel.parent().unwrap_or_else(|| Path::new(""));
    let dir_name = format!("{}{}", nifti_stem(candidate), suffix);

    Ok(output_root.join(rel_dir).join(dir_name))
}

/// Create `dir` (and parents) unless it already exists.
pub fn ensure_dir(fs: &dyn FileSystem, dir: &Path) -> Result<()> {
    if fs.is_dir(dir) {
        return Ok(());
    }
    fs.create_dir_all(dir)
        .with_context(|| format!("creating output directory {:?}", dir))?;
    Ok(())
}
