// src/types.rs

use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// Which entries under the input root become candidates.
///
/// - `NiftiOnly`: only files ending in `.nii` (default).
/// - `AllFiles`: every prefixed file or directory; non-NIfTI entries go
///   through the DICOM-to-NIfTI converter first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMode {
    #[default]
    NiftiOnly,
    AllFiles,
}

impl FromStr for DiscoveryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "nifti_only" => Ok(DiscoveryMode::NiftiOnly),
            "all_files" => Ok(DiscoveryMode::AllFiles),
            other => Err(format!(
                "invalid discovery mode: {other} (expected \"nifti_only\" or \"all_files\")"
            )),
        }
    }
}

/// What to do when an artifact with the same name already sits in the
/// destination directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Overwrite the destination file.
    #[default]
    Replace,
    /// Leave both files where they are and report the collision.
    NoReplace,
}

impl FromStr for CollisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "replace" => Ok(CollisionPolicy::Replace),
            "no_replace" => Ok(CollisionPolicy::NoReplace),
            other => Err(format!(
                "invalid collision policy: {other} (expected \"replace\" or \"no_replace\")"
            )),
        }
    }
}

/// How output artifacts are recognised in the working directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactSelection {
    /// Files named `<stem>*` plus the configured fixed names.
    #[default]
    Stem,
    /// Files that appeared in the working directory during the invocation.
    Snapshot,
}

/// Behaviour after a kaiba invocation that did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Record the failure and move on to the next candidate.
    #[default]
    Skip,
    /// Collect whatever the tool left behind anyway.
    Collect,
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let split_at = s
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;
    let (num_part, unit) = s.split_at(split_at);

    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => Ok(Duration::from_secs(value * 60)),
        "h" => Ok(Duration::from_secs(value * 60 * 60)),
        other => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            other
        )),
    }
}
