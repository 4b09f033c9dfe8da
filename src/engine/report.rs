// src/engine/report.rs

use std::path::PathBuf;

use crate::collect::TransferReport;
use crate::discovery::Candidate;
use crate::exec::InvocationOutcome;

/// What the collector did for one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateStatus {
    /// Output directory created and artifacts gathered.
    Collected {
        destination: PathBuf,
        transfer: TransferReport,
    },
    /// Collection was not attempted because the invocation failed.
    Skipped,
    /// Collection started but did not finish cleanly.
    ///
    /// `destination` is `None` when it could not be computed or created;
    /// `transfer` holds whatever was copied or moved before the failure.
    CollectionFailed {
        destination: Option<PathBuf>,
        transfer: TransferReport,
        error: String,
    },
}

/// Result of processing one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateReport {
    pub candidate: Candidate,
    pub outcome: InvocationOutcome,
    pub status: CandidateStatus,
}

impl CandidateReport {
    pub fn is_success(&self) -> bool {
        self.outcome.is_success() && matches!(self.status, CandidateStatus::Collected { .. })
    }

    pub fn destination(&self) -> Option<&PathBuf> {
        match &self.status {
            CandidateStatus::Collected { destination, .. } => Some(destination),
            CandidateStatus::CollectionFailed { destination, .. } => destination.as_ref(),
            CandidateStatus::Skipped => None,
        }
    }

    pub fn transfer(&self) -> Option<&TransferReport> {
        match &self.status {
            CandidateStatus::Collected { transfer, .. }
            | CandidateStatus::CollectionFailed { transfer, .. } => Some(transfer),
            CandidateStatus::Skipped => None,
        }
    }

    pub fn collisions(&self) -> &[PathBuf] {
        self.transfer()
            .map(|t| t.collisions.as_slice())
            .unwrap_or_default()
    }
}

/// Per-candidate results of a whole run, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub candidates: Vec<CandidateReport>,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.candidates.len()
    }

    pub fn succeeded(&self) -> usize {
        self.candidates.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    /// Artifacts left behind in the working directory due to collisions.
    pub fn collisions(&self) -> usize {
        self.candidates.iter().map(|r| r.collisions().len()).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &CandidateReport> {
        self.candidates.iter().filter(|r| !r.is_success())
    }
}
