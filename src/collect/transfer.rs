// src/collect/transfer.rs

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::{debug, error, warn};

use crate::fs::FileSystem;
use crate::types::CollisionPolicy;

/// What happened to the artifacts of one candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferReport {
    /// Copy of the input inside the destination.
    pub input_copy: Option<PathBuf>,
    /// Destination paths of moved artifacts.
    pub moved: Vec<PathBuf>,
    /// Artifacts left in place because the destination already had a file
    /// of that name (`no_replace` only).
    pub collisions: Vec<PathBuf>,
    /// Artifacts that could not be moved, with the error, still in the
    /// working directory.
    pub failed: Vec<(PathBuf, String)>,
}

impl TransferReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Copy the input file into `dest_dir`. The original is kept.
pub fn copy_input(fs: &dyn FileSystem, input: &Path, dest_dir: &Path) -> Result<PathBuf> {
    let name = input
        .file_name()
        .ok_or_else(|| anyhow!("input {:?} has no file name", input))?;
    let target = dest_dir.join(name);
    fs.copy_preserving(input, &target)
        .with_context(|| format!("copying input {:?} into {:?}", input, dest_dir))?;
    debug!(input = %input.display(), target = %target.display(), "copied input");
    Ok(target)
}

/// Move `artifacts` into `dest_dir` according to `policy`.
///
/// A failed move is recorded in [`TransferReport::failed`] and the remaining
/// artifacts are still moved, so the report always says where every file
/// ended up.
pub fn move_artifacts(
    fs: &dyn FileSystem,
    artifacts: &[PathBuf],
    dest_dir: &Path,
    policy: CollisionPolicy,
) -> TransferReport {
    let mut report = TransferReport::default();

    for artifact in artifacts {
        let Some(name) = artifact.file_name() else {
            report
                .failed
                .push((artifact.clone(), "artifact has no file name".to_string()));
            continue;
        };
        let target = dest_dir.join(name);

        if policy == CollisionPolicy::NoReplace && fs.exists(&target) {
            warn!(
                artifact = %artifact.display(),
                target = %target.display(),
                "file already exists in destination; leaving artifact in place"
            );
            report.collisions.push(artifact.clone());
            continue;
        }

        match fs.rename(artifact, &target) {
            Ok(()) => {
                debug!(artifact = %artifact.display(), target = %target.display(), "moved artifact");
                report.moved.push(target);
            }
            Err(e) => {
                error!(
                    artifact = %artifact.display(),
                    target = %target.display(),
                    error = %e,
                    "moving artifact failed; leaving it in place"
                );
                report.failed.push((artifact.clone(), format!("{e:#}")));
            }
        }
    }

    report
}
