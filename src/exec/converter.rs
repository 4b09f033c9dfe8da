// src/exec/converter.rs

//! DICOM-to-NIfTI conversion through an external program.
//!
//! The conversion itself is opaque to us: a series (directory or file) goes
//! in, one `.nii` file is expected to come out.

use std::ffi::OsString;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tracing::warn;

use crate::config::ConfigFile;
use crate::errors::Result;

use super::process::run_process;
use super::template::expand;

/// Converts one DICOM series into a NIfTI file.
pub trait SeriesConverter: Send {
    /// Returns `Ok(true)` when `output` was produced.
    fn convert<'a>(
        &'a mut self,
        series: &'a Path,
        output: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>>;
}

/// Runs a configured converter command, e.g. `dcm2niix`.
#[derive(Debug, Clone)]
pub struct CommandConverter {
    program: String,
    args: Vec<String>,
}

impl CommandConverter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self::new(cfg.convert().program.clone(), cfg.convert().args.clone())
    }

    /// Argument list with placeholders filled in for this conversion.
    pub fn args_for(&self, series: &Path, output: &Path) -> Vec<OsString> {
        let input = series.to_string_lossy();
        let output_str = output.to_string_lossy();
        let output_dir = output
            .parent()
            .map(|p| p.to_string_lossy())
            .unwrap_or_default();
        let output_stem = output
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default();

        let vars = [
            ("input", input.as_ref()),
            ("output", output_str.as_ref()),
            ("output_dir", output_dir.as_ref()),
            ("output_stem", output_stem.as_ref()),
        ];

        self.args
            .iter()
            .map(|a| OsString::from(expand(a, &vars)))
            .collect()
    }
}

impl SeriesConverter for CommandConverter {
    fn convert<'a>(
        &'a mut self,
        series: &'a Path,
        output: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>> {
        Box::pin(async move {
            // The converter runs next to its output, so relative paths would
            // no longer point where the caller meant.
            let series = std::path::absolute(series)?;
            let output = std::path::absolute(output)?;
            let (series, output) = (series.as_path(), output.as_path());

            let label = series.display().to_string();
            let cwd = output
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));

            let outcome = run_process(
                &label,
                &self.program,
                &self.args_for(series, output),
                &cwd,
                None,
            )
            .await;

            if !outcome.is_success() {
                warn!(series = %label, ?outcome, "converter did not succeed");
                return Ok(false);
            }
            if !output.is_file() {
                warn!(
                    series = %label,
                    output = %output.display(),
                    "converter exited successfully but produced no output file"
                );
                return Ok(false);
            }
            Ok(true)
        })
    }
}
