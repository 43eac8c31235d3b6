//! Error taxonomy for the pipeline.
//!
//! Capability and per-page failures are absorbed at the point they occur (a
//! degraded [`crate::types::Page`] or a `limitations[]` entry, never a
//! `PipelineError`). Only a broken invariant, an unreadable checkpoint, an
//! unrecoverable output-directory I/O failure, or a QC-internal bug construct
//! one of these and unwind a stage.

use std::path::PathBuf;

/// Errors that cross a stage boundary.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("I/O error at {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("required capability unavailable: {capability} ({message})")]
    Capability { capability: String, message: String },

    #[error("{invocation} timed out after {timeout_ms}ms")]
    Timeout { invocation: String, timeout_ms: u64 },

    #[error("checkpoint at {path} is invalid: {message}")]
    InvalidCheckpoint { path: PathBuf, message: String },

    #[error("page coverage violation for {source}: {message}")]
    CoverageViolation { source: PathBuf, message: String },

    #[error("invariant violated: {message}")]
    InvariantViolation { message: String },

    #[error("QC validator failed: {message}")]
    Qc { message: String },

    #[error("invalid configuration: {message}")]
    Config { message: String },
}

pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    /// The process exit code for this error. 130 (graceful SIGINT) is handled
    /// directly by the orchestrator's interrupt check and never flows through
    /// this type.
    pub fn exit_code(&self) -> i32 {
        1
    }
}
