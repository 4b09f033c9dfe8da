// src/collect/mod.rs

//! Gathering kaiba's output for one candidate.
//!
//! - [`destination`] computes and creates the per-candidate output directory.
//! - [`artifacts`] picks the files to collect from the working directory,
//!   either by stem pattern or by before/after snapshot.
//! - [`transfer`] copies the input and moves the artifacts.

pub mod artifacts;
pub mod destination;
pub mod transfer;

pub use artifacts::{stem_artifacts, stem_matcher, Snapshot};
pub use destination::{destination_dir, ensure_dir, nifti_stem};
pub use transfer::{copy_input, move_artifacts, TransferReport};
