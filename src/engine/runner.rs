// src/engine/runner.rs

//! Sequential per-candidate processing loop.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context};
use tracing::{debug, error, info, warn};

use crate::collect::{
    copy_input, destination_dir, ensure_dir, move_artifacts, nifti_stem, stem_artifacts,
    Snapshot, TransferReport,
};
use crate::config::ConfigFile;
use crate::discovery::{conversion_output, discover, is_nifti, prepare_candidates, Candidate};
use crate::errors::Result;
use crate::exec::{Invocation, InvocationOutcome, KaibaBackend, KaibaCommand, SeriesConverter};
use crate::fs::FileSystem;
use crate::types::{ArtifactSelection, FailurePolicy};

use super::report::{CandidateReport, CandidateStatus, RunSummary};

/// One entry of a dry-run plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCandidate {
    /// Entry found by discovery.
    pub entry: PathBuf,
    /// File kaiba would receive.
    pub nifti: PathBuf,
    pub needs_conversion: bool,
    pub destination: PathBuf,
    pub command_line: String,
}

/// Drives discovery, invocation and collection for one configuration.
///
/// Candidates are processed strictly one after another: the working
/// directory is shared scratch space, so a candidate's artifacts are moved
/// out before the next invocation starts.
pub struct Runner<B, C> {
    config: ConfigFile,
    fs: Arc<dyn FileSystem>,
    backend: B,
    converter: C,
    command: KaibaCommand,
}

impl<B, C> Runner<B, C>
where
    B: KaibaBackend,
    C: SeriesConverter,
{
    pub fn new(config: ConfigFile, fs: Arc<dyn FileSystem>, backend: B, converter: C) -> Self {
        let command = KaibaCommand::from_config(&config);
        Self {
            config,
            fs,
            backend,
            converter,
            command,
        }
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Candidates and destinations, without running or converting anything.
    pub fn plan(&self) -> Result<Vec<PlannedCandidate>> {
        let run = self.config.run();
        let input_root = self.input_root()?;
        let found = discover(self.fs.as_ref(), &input_root, &run.prefix, run.discovery)?;

        let mut plan = Vec::with_capacity(found.len());
        for entry in found {
            let needs_conversion = !(self.fs.is_file(&entry) && is_nifti(&entry));
            let nifti = if needs_conversion {
                conversion_output(self.fs.as_ref(), &entry, &run.prefix)
            } else {
                entry.clone()
            };
            let destination = self.destination_for(&input_root, &nifti)?;
            let command_line = Invocation::new(&self.command, &nifti, &run.work_dir).command_line();
            plan.push(PlannedCandidate {
                entry,
                nifti,
                needs_conversion,
                destination,
                command_line,
            });
        }
        Ok(plan)
    }

    /// Discover every candidate, then process them one by one.
    ///
    /// Only discovery errors abort the run. Per-candidate failures are
    /// recorded in the returned summary and the loop moves on.
    pub async fn run(&mut self) -> Result<RunSummary> {
        let input_root = self.input_root()?;
        let candidates = self.candidates(&input_root).await?;
        info!(count = candidates.len(), "candidates ready for processing");

        let mut summary = RunSummary::default();
        for candidate in candidates {
            let report = self.process_candidate(&input_root, candidate).await;
            summary.candidates.push(report);
        }

        Ok(summary)
    }

    async fn candidates(&mut self, input_root: &Path) -> Result<Vec<Candidate>> {
        let run = self.config.run();
        let found = discover(self.fs.as_ref(), input_root, &run.prefix, run.discovery)?;
        let prefix = run.prefix.clone();
        Ok(prepare_candidates(self.fs.as_ref(), found, &mut self.converter, &prefix).await)
    }

    async fn process_candidate(
        &mut self,
        input_root: &Path,
        candidate: Candidate,
    ) -> CandidateReport {
        let run = self.config.run().clone();
        let input = candidate.nifti.clone();

        let snapshot = match self.config.collect().selection {
            ArtifactSelection::Stem => None,
            ArtifactSelection::Snapshot => match Snapshot::take(self.fs.as_ref(), &run.work_dir) {
                Ok(s) => Some(s),
                Err(e) => {
                    error!(candidate = %input.display(), error = %e, "cannot snapshot working directory");
                    return CandidateReport {
                        candidate,
                        outcome: InvocationOutcome::SpawnFailed(format!("{e:#}")),
                        status: CandidateStatus::Skipped,
                    };
                }
            },
        };

        let invocation = Invocation::new(&self.command, &input, &run.work_dir);
        info!(candidate = %input.display(), cmd = %invocation.command_line(), "processing candidate");

        let outcome = match self.backend.invoke(invocation).await {
            Ok(outcome) => outcome,
            Err(e) => InvocationOutcome::SpawnFailed(e.to_string()),
        };

        if !outcome.is_success() {
            warn!(candidate = %input.display(), ?outcome, "kaiba invocation did not succeed");
            if run.on_failure == FailurePolicy::Skip {
                return CandidateReport {
                    candidate,
                    outcome,
                    status: CandidateStatus::Skipped,
                };
            }
        }

        let status = self.collect(input_root, &input, snapshot.as_ref());
        match &status {
            CandidateStatus::Collected {
                destination,
                transfer,
            } => info!(
                candidate = %input.display(),
                destination = %destination.display(),
                moved = transfer.moved.len(),
                collisions = transfer.collisions.len(),
                "moved files to destination"
            ),
            CandidateStatus::CollectionFailed {
                destination,
                transfer,
                error,
            } => error!(
                candidate = %input.display(),
                destination = ?destination,
                moved = transfer.moved.len(),
                failed = transfer.failed.len(),
                error = %error,
                "collecting artifacts failed"
            ),
            CandidateStatus::Skipped => {}
        }

        CandidateReport {
            candidate,
            outcome,
            status,
        }
    }

    /// The configured input root as an absolute path.
    ///
    /// kaiba and the converter run in other directories, so every path
    /// handed to them is rooted here.
    fn input_root(&self) -> Result<PathBuf> {
        let root = &self.config.run().input_path;
        let absolute = std::path::absolute(root)
            .with_context(|| format!("resolving input root {:?}", root))?;
        Ok(absolute)
    }

    fn destination_for(&self, input_root: &Path, input: &Path) -> Result<PathBuf> {
        destination_dir(
            input,
            input_root,
            &self.config.run().output_path,
            &self.config.collect().dest_suffix,
        )
    }

    /// Copy the input and move its artifacts into the destination.
    ///
    /// Never fails outright: any error becomes `CollectionFailed`, carrying
    /// whatever was already transferred.
    fn collect(
        &self,
        input_root: &Path,
        input: &Path,
        snapshot: Option<&Snapshot>,
    ) -> CandidateStatus {
        let destination = match self.destination_for(input_root, input) {
            Ok(d) => d,
            Err(e) => {
                return CandidateStatus::CollectionFailed {
                    destination: None,
                    transfer: TransferReport::default(),
                    error: e.to_string(),
                };
            }
        };

        let mut transfer = TransferReport::default();
        if let Err(e) = self.transfer_into(input, &destination, snapshot, &mut transfer) {
            return CandidateStatus::CollectionFailed {
                destination: Some(destination),
                transfer,
                error: format!("{e:#}"),
            };
        }

        if !transfer.is_complete() {
            let error = format!("{} artifact(s) could not be moved", transfer.failed.len());
            return CandidateStatus::CollectionFailed {
                destination: Some(destination),
                transfer,
                error,
            };
        }

        CandidateStatus::Collected {
            destination,
            transfer,
        }
    }

    fn transfer_into(
        &self,
        input: &Path,
        destination: &Path,
        snapshot: Option<&Snapshot>,
        transfer: &mut TransferReport,
    ) -> anyhow::Result<()> {
        let fs = self.fs.as_ref();
        let work_dir = &self.config.run().work_dir;
        let input_name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow!("input {:?} has no file name", input))?;

        ensure_dir(fs, destination)?;
        transfer.input_copy = Some(copy_input(fs, input, destination)?);

        let artifacts = match snapshot {
            Some(before) => before.new_files(fs, work_dir, &input_name)?,
            None => stem_artifacts(
                fs,
                work_dir,
                &nifti_stem(input),
                &self.config.extra_artifacts(),
                &input_name,
            )?,
        };
        debug!(input = %input.display(), ?artifacts, "artifacts selected");

        let moved = move_artifacts(fs, &artifacts, destination, self.config.collect().policy);
        transfer.moved = moved.moved;
        transfer.collisions = moved.collisions;
        transfer.failed = moved.failed;
        Ok(())
    }
}
