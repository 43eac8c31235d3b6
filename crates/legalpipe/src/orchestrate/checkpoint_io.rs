//! Atomic JSON persistence for checkpoints and per-stage artifacts: every
//! write lands in a sibling temp file first, then is renamed into place, so a
//! process killed mid-write never leaves a half-written file behind.

use crate::error::{PipelineError, Result};
use crate::types::Checkpoint;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

pub fn atomic_write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| PipelineError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, json).map_err(|e| PipelineError::Io {
        path: tmp.clone(),
        message: e.to_string(),
    })?;
    std::fs::rename(&tmp, path).map_err(|e| PipelineError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path).map_err(|e| PipelineError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&raw).map_err(|e| PipelineError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn checkpoint_path(subfolder: &Path) -> std::path::PathBuf {
    subfolder.join(".checkpoint.json")
}

/// Loads a checkpoint for `pipeline_version`/`source` from `subfolder`. A
/// missing file, an unparseable file, a checksum mismatch, a version
/// mismatch, or a source mismatch are all treated the same way: no usable
/// prior progress, so the caller starts fresh from stage 1. A corrupt file is
/// never an error — the run degrades to a clean start instead.
pub fn load_resumable_checkpoint(subfolder: &Path, pipeline_version: &str, source: &Path) -> Option<Checkpoint> {
    let path = checkpoint_path(subfolder);
    let raw = std::fs::read_to_string(&path).ok()?;
    let checkpoint: Checkpoint = serde_json::from_str(&raw).ok()?;
    if !checkpoint.is_valid() {
        return None;
    }
    if checkpoint.pipeline_version != pipeline_version || checkpoint.source != source {
        return None;
    }
    Some(checkpoint)
}

pub fn persist_checkpoint(subfolder: &Path, checkpoint: &Checkpoint) -> Result<()> {
    atomic_write_json(&checkpoint_path(subfolder), checkpoint)
}

/// Parses whatever checkpoint sits at an arbitrary path (used by `--resume
/// <checkpoint>`) without requiring the checksum to be valid: a tampered or
/// stale checkpoint still names a `source` worth restarting from stage 1,
/// so only a missing file or malformed JSON is a hard error there.
pub fn parse_checkpoint_at(path: &Path) -> Result<Checkpoint> {
    let raw = std::fs::read_to_string(path).map_err(|e| PipelineError::InvalidCheckpoint {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&raw).map_err(|e| PipelineError::InvalidCheckpoint {
        path: path.to_path_buf(),
        message: format!("malformed checkpoint JSON: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn round_trips_a_valid_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let checkpoint = Checkpoint::new("0.1.0", std::path::PathBuf::from("/in/a.pdf"), Utc::now());
        persist_checkpoint(dir.path(), &checkpoint).unwrap();
        let loaded = load_resumable_checkpoint(dir.path(), "0.1.0", Path::new("/in/a.pdf")).unwrap();
        assert_eq!(loaded.pipeline_version, "0.1.0");
    }

    #[test]
    fn corrupt_checkpoint_file_yields_none_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".checkpoint.json"), "{ not json").unwrap();
        assert!(load_resumable_checkpoint(dir.path(), "0.1.0", Path::new("/in/a.pdf")).is_none());
    }

    #[test]
    fn version_mismatch_is_treated_as_unusable() {
        let dir = tempfile::tempdir().unwrap();
        let checkpoint = Checkpoint::new("0.1.0", std::path::PathBuf::from("/in/a.pdf"), Utc::now());
        persist_checkpoint(dir.path(), &checkpoint).unwrap();
        assert!(load_resumable_checkpoint(dir.path(), "0.2.0", Path::new("/in/a.pdf")).is_none());
    }
}
