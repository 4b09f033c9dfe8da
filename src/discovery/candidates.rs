// src/discovery/candidates.rs

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::exec::SeriesConverter;
use crate::fs::FileSystem;

use super::walk::is_nifti;

/// A file selected for processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Entry found by discovery.
    pub source: PathBuf,
    /// NIfTI file handed to kaiba. Same as `source` unless it was converted.
    pub nifti: PathBuf,
}

impl Candidate {
    pub fn nifti(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            source: path.clone(),
            nifti: path,
        }
    }

    pub fn was_converted(&self) -> bool {
        self.source != self.nifti
    }
}

/// Where the converted volume for a non-NIfTI entry is written.
///
/// - series directory `d` -> `d/<prefix>_transformed.nii`
/// - other file `x.dat` -> `x_transformed.nii` next to it
pub fn conversion_output(fs: &dyn FileSystem, entry: &Path, prefix: &str) -> PathBuf {
    if fs.is_dir(entry) {
        return entry.join(format!("{prefix}_transformed.nii"));
    }
    let stem = entry
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    entry.with_file_name(format!("{stem}_transformed.nii"))
}

/// Turn discovered entries into candidates.
///
/// NIfTI files pass straight through. Everything else is converted first
/// and dropped when conversion fails.
pub async fn prepare_candidates(
    fs: &dyn FileSystem,
    found: Vec<PathBuf>,
    converter: &mut dyn SeriesConverter,
    prefix: &str,
) -> Vec<Candidate> {
    let mut candidates = Vec::with_capacity(found.len());

    for entry in found {
        if fs.is_file(&entry) && is_nifti(&entry) {
            candidates.push(Candidate::nifti(entry));
            continue;
        }

        let output = conversion_output(fs, &entry, prefix);
        match converter.convert(&entry, &output).await {
            Ok(true) => {
                info!(
                    series = %entry.display(),
                    output = %output.display(),
                    "converted series to NIfTI"
                );
                candidates.push(Candidate {
                    source: entry,
                    nifti: output,
                });
            }
            Ok(false) => {
                warn!(series = %entry.display(), "conversion failed; skipping entry");
            }
            Err(e) => {
                warn!(series = %entry.display(), error = %e, "conversion error; skipping entry");
            }
        }
    }

    candidates
}
