//! Deterministic six-stage pipeline that turns Brazilian legal-case PDFs
//! into classified, segmented Markdown with provenance metadata.
//!
//! The stages run strictly in order for a single source PDF:
//! intake ([`intake`]) -> extraction ([`extract`]) -> profiling
//! ([`profiler`]) and classification ([`classifier`]) -> routing ([`router`])
//! -> hybrid re-extraction ([`extract`]) -> segmentation ([`segmenter`]) and
//! reclassification ([`reclassify`]) -> export ([`export`]) -> QC
//! ([`qc`]). [`orchestrate`] sequences all of the above, checkpointing after
//! each stage.

pub mod classifier;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod intake;
pub mod orchestrate;
pub mod profiler;
pub mod qc;
pub mod reclassify;
pub mod router;
pub mod segmenter;
pub mod types;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};

/// Crate version, embedded in every checkpoint and report for provenance.
pub const PIPELINE_VERSION: &str = env!("CARGO_PKG_VERSION");
