// src/engine/mod.rs

//! Orchestration for kaiba-batch.
//!
//! [`runner`] owns the loop: discover candidates once, then for each one
//! invoke kaiba, compute its destination and collect its artifacts.
//! [`report`] holds the per-candidate outcomes and the run summary.

pub mod report;
pub mod runner;

pub use report::{CandidateReport, CandidateStatus, RunSummary};
pub use runner::{PlannedCandidate, Runner};
