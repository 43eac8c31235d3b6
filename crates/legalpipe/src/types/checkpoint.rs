use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Pending,
    Running,
    Completed,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    pub status: StageStatus,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
}

/// Resumable pipeline state, atomically written after every stage. The
/// checksum covers the JSON serialization of every field *except* itself, so
/// a stored checkpoint is self-verifying without an external manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub pipeline_version: String,
    pub source: PathBuf,
    pub started_at: DateTime<Utc>,
    pub current_stage: u8,
    pub completed_stages: Vec<u8>,
    pub stage_results: BTreeMap<String, StageResult>,
    pub checksum: String,
}

/// Mirrors [`Checkpoint`] but without the checksum field, so its JSON
/// serialization is exactly what the checksum is computed over.
#[derive(Serialize)]
struct CheckpointPayload<'a> {
    pipeline_version: &'a str,
    source: &'a PathBuf,
    started_at: &'a DateTime<Utc>,
    current_stage: u8,
    completed_stages: &'a [u8],
    stage_results: &'a BTreeMap<String, StageResult>,
}

impl Checkpoint {
    pub fn new(
        pipeline_version: impl Into<String>,
        source: PathBuf,
        started_at: DateTime<Utc>,
    ) -> Self {
        let mut checkpoint = Self {
            pipeline_version: pipeline_version.into(),
            source,
            started_at,
            current_stage: 0,
            completed_stages: Vec::new(),
            stage_results: BTreeMap::new(),
            checksum: String::new(),
        };
        checkpoint.checksum = checkpoint.compute_checksum();
        checkpoint
    }

    fn payload(&self) -> CheckpointPayload<'_> {
        CheckpointPayload {
            pipeline_version: &self.pipeline_version,
            source: &self.source,
            started_at: &self.started_at,
            current_stage: self.current_stage,
            completed_stages: &self.completed_stages,
            stage_results: &self.stage_results,
        }
    }

    /// SHA-256 of the canonical JSON serialization of every field but
    /// `checksum` itself.
    pub fn compute_checksum(&self) -> String {
        let json = serde_json::to_vec(&self.payload()).expect("checkpoint payload is always serializable");
        let mut hasher = Sha256::new();
        hasher.update(&json);
        format!("{:x}", hasher.finalize())
    }

    /// Recomputes the checksum and stores it, to be called after any mutation.
    pub fn reseal(&mut self) {
        self.checksum = self.compute_checksum();
    }

    /// A checkpoint is valid iff its stored checksum matches a fresh
    /// recomputation over its own fields.
    pub fn is_valid(&self) -> bool {
        self.checksum == self.compute_checksum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_checkpoint_is_valid() {
        let checkpoint = Checkpoint::new("0.1.0", PathBuf::from("/tmp/a.pdf"), Utc::now());
        assert!(checkpoint.is_valid());
    }

    #[test]
    fn tampering_with_current_stage_invalidates_checksum() {
        let mut checkpoint = Checkpoint::new("0.1.0", PathBuf::from("/tmp/a.pdf"), Utc::now());
        checkpoint.current_stage = 5;
        assert!(!checkpoint.is_valid());
    }

    #[test]
    fn reseal_restores_validity_after_a_legitimate_mutation() {
        let mut checkpoint = Checkpoint::new("0.1.0", PathBuf::from("/tmp/a.pdf"), Utc::now());
        checkpoint.current_stage = 3;
        checkpoint.completed_stages = vec![1, 2, 3];
        checkpoint.reseal();
        assert!(checkpoint.is_valid());
    }
}
