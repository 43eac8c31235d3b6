//! A plain-text, append-only trail of the routing/extraction/segmentation
//! decisions made for one PDF, written alongside its `pipeline-report.json`
//! for a human reviewing why a file ended up the way it did.

use crate::error::{PipelineError, Result};
use chrono::{DateTime, Utc};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct DecisionsLog {
    path: PathBuf,
}

impl DecisionsLog {
    pub fn open(subfolder: &Path) -> Result<Self> {
        let path = subfolder.join("pipeline-decisions.log");
        Ok(Self { path })
    }

    pub fn record(&self, at: DateTime<Utc>, message: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| PipelineError::Io {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
        writeln!(file, "{} {}", at.to_rfc3339(), message).map_err(|e| PipelineError::Io {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_appends_lines_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let log = DecisionsLog::open(dir.path()).unwrap();
        log.record(Utc::now(), "stage 1: intake registered 1 file").unwrap();
        log.record(Utc::now(), "stage 3: routed fast-parse").unwrap();
        let contents = std::fs::read_to_string(dir.path().join("pipeline-decisions.log")).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("stage 1"));
        assert!(lines[1].contains("stage 3"));
    }
}
