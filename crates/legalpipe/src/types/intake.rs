use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A single PDF registered by intake, with enough provenance to detect
/// duplicates and to re-verify integrity on resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    pub name: String,
    pub source_path: PathBuf,
    pub size: u64,
    pub modified: DateTime<Utc>,
    pub sha256: String,
    pub sha256_prefix_4k: String,
    pub timestamp: DateTime<Utc>,
}

/// A file that was skipped because its full hash matched an already
/// registered [`SourceFile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateEntry {
    pub name: String,
    pub sha256: String,
    pub original_path: PathBuf,
}

/// A file that could not be read or hashed during enumeration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestError {
    pub name: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ManifestSummary {
    pub total_scanned: usize,
    pub registered: usize,
    pub duplicates: usize,
    pub errors: usize,
}

/// Output of intake, persisted as `intake/manifest-YYYY-MM-DD.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub generated_at: DateTime<Utc>,
    pub source_path: PathBuf,
    pub files: Vec<SourceFile>,
    pub duplicates: Vec<DuplicateEntry>,
    pub errors: Vec<ManifestError>,
    pub summary: ManifestSummary,
}

impl Manifest {
    /// Deterministic output filename: one manifest per calendar day of
    /// generation, per the storage convention.
    pub fn filename(generated_at: DateTime<Utc>) -> String {
        format!("manifest-{}.json", generated_at.format("%Y-%m-%d"))
    }
}

// Re-exported at the module root for call sites that want the error entry
// without reaching past `types::intake`.
pub type IntakeError = ManifestError;
