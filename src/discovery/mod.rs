// src/discovery/mod.rs

//! Finding the files to process.
//!
//! - [`walk`] scans the input root for prefixed entries.
//! - [`candidates`] turns those entries into [`Candidate`]s, converting
//!   DICOM series to NIfTI where needed.

pub mod candidates;
pub mod walk;

pub use candidates::{conversion_output, prepare_candidates, Candidate};
pub use walk::{discover, is_nifti, NIFTI_SUFFIX};
