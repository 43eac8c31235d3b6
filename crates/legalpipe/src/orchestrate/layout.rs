//! The on-disk skeleton created inside every per-PDF subfolder.

use crate::error::{PipelineError, Result};
use std::path::{Path, PathBuf};

pub const SUBDIRS: &[&str] = &["intake", "profiles", "routes", "extracted", "segments", "markdown", "review"];

/// Creates the seven-directory skeleton under `base`, if not already present.
pub fn ensure_skeleton(base: &Path) -> Result<()> {
    for dir in SUBDIRS {
        let path = base.join(dir);
        std::fs::create_dir_all(&path).map_err(|e| PipelineError::Io {
            path,
            message: e.to_string(),
        })?;
    }
    Ok(())
}

pub fn intake_dir(base: &Path) -> PathBuf {
    base.join("intake")
}
pub fn profiles_dir(base: &Path) -> PathBuf {
    base.join("profiles")
}
pub fn routes_dir(base: &Path) -> PathBuf {
    base.join("routes")
}
pub fn extracted_dir(base: &Path) -> PathBuf {
    base.join("extracted")
}
pub fn segments_dir(base: &Path) -> PathBuf {
    base.join("segments")
}
pub fn markdown_dir(base: &Path) -> PathBuf {
    base.join("markdown")
}
pub fn review_dir(base: &Path) -> PathBuf {
    base.join("review")
}

/// The basename used for every per-stage artifact filename: the source
/// file's name with its extension stripped.
pub fn base_name(source_file_name: &str) -> String {
    Path::new(source_file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| source_file_name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_name_strips_the_pdf_extension() {
        assert_eq!(base_name("Inicial_EF.pdf"), "Inicial_EF");
    }

    #[test]
    fn ensure_skeleton_creates_every_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        ensure_skeleton(dir.path()).unwrap();
        for sub in SUBDIRS {
            assert!(dir.path().join(sub).is_dir());
        }
    }
}
