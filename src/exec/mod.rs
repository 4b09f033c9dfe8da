// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`process`] runs one external program to completion and folds the
//!   result into an [`InvocationOutcome`].
//! - [`backend`] provides the `KaibaBackend` trait and the production
//!   `RealKaibaBackend`, which tests replace with a fake.
//! - [`converter`] wraps the DICOM-to-NIfTI converter command.
//! - [`template`] expands `{placeholder}`s in converter arguments.

pub mod backend;
pub mod converter;
pub mod process;
pub mod template;

pub use backend::{Invocation, KaibaBackend, KaibaCommand, RealKaibaBackend};
pub use converter::{CommandConverter, SeriesConverter};
pub use process::{run_process, InvocationOutcome};
