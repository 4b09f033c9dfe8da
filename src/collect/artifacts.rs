// src/collect/artifacts.rs

//! Recognising the files kaiba left in its working directory.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobMatcher};

use crate::fs::FileSystem;

/// Top-level files of `dir`, sorted.
fn list_files(fs: &dyn FileSystem, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs
        .read_dir(dir)
        .with_context(|| format!("listing working directory {:?}", dir))?
        .into_iter()
        .filter(|p| fs.is_file(p))
        .collect();
    files.sort();
    Ok(files)
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

/// Matcher for `<stem>*`, with glob metacharacters in the stem escaped.
pub fn stem_matcher(stem: &str) -> Result<GlobMatcher> {
    let pattern = format!("{}*", globset::escape(stem));
    let glob = Glob::new(&pattern).with_context(|| format!("invalid glob pattern: {pattern}"))?;
    Ok(glob.compile_matcher())
}

/// Files in `work_dir` named `<stem>*`, plus each name in `extra` that
/// exists there.
///
/// A file named exactly `exclude_name` (the input itself) is never an
/// artifact.
pub fn stem_artifacts(
    fs: &dyn FileSystem,
    work_dir: &Path,
    stem: &str,
    extra: &[String],
    exclude_name: &str,
) -> Result<Vec<PathBuf>> {
    let matcher = stem_matcher(stem)?;

    let artifacts = list_files(fs, work_dir)?
        .into_iter()
        .filter(|p| match file_name(p) {
            Some(name) if name == exclude_name => false,
            Some(name) => matcher.is_match(name) || extra.iter().any(|e| e == name),
            None => false,
        })
        .collect();

    Ok(artifacts)
}

/// The set of files in a directory at one point in time.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    files: BTreeSet<PathBuf>,
}

impl Snapshot {
    pub fn take(fs: &dyn FileSystem, dir: &Path) -> Result<Self> {
        Ok(Self {
            files: list_files(fs, dir)?.into_iter().collect(),
        })
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    /// Files in `dir` now that were not there when the snapshot was taken.
    pub fn new_files(
        &self,
        fs: &dyn FileSystem,
        dir: &Path,
        exclude_name: &str,
    ) -> Result<Vec<PathBuf>> {
        Ok(list_files(fs, dir)?
            .into_iter()
            .filter(|p| !self.files.contains(p))
            .filter(|p| file_name(p) != Some(exclude_name))
            .collect())
    }
}
