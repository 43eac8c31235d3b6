//! Intake: enumerate, hash, deduplicate, and produce a deterministic manifest.

use crate::error::{PipelineError, Result};
use crate::types::{DuplicateEntry, Manifest, ManifestError, ManifestSummary, SourceFile};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

const PREFIX_BYTES: usize = 4096;

fn sha256_stream(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

fn sha256_prefix(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    let mut buf = vec![0u8; PREFIX_BYTES];
    let mut total = 0;
    loop {
        let n = file.read(&mut buf[total..])?;
        if n == 0 {
            break;
        }
        total += n;
        if total == buf.len() {
            break;
        }
    }
    buf.truncate(total);
    let mut hasher = Sha256::new();
    hasher.update(&buf);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Enumerates `*.pdf` files under `source` (or just `source` itself if it is
/// a single PDF), sorted lexicographically, hashes each, and deduplicates by
/// full SHA-256. I/O failures go to `errors[]`, non-fatal.
pub fn ingest(source: &Path, dedup: bool) -> Result<Manifest> {
    let mut candidates: Vec<PathBuf> = if source.is_dir() {
        enumerate_pdfs(source)?
    } else {
        vec![source.to_path_buf()]
    };
    candidates.sort();

    let mut files = Vec::new();
    let mut duplicates = Vec::new();
    let mut errors = Vec::new();
    let mut seen_hashes: HashSet<String> = HashSet::new();
    let mut first_seen_path: std::collections::HashMap<String, PathBuf> = std::collections::HashMap::new();
    let total_scanned = candidates.len();

    for path in candidates {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let metadata = match std::fs::metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                errors.push(ManifestError { name, message: e.to_string() });
                continue;
            }
        };

        let full_hash = match sha256_stream(&path) {
            Ok(h) => h,
            Err(e) => {
                errors.push(ManifestError { name, message: e.to_string() });
                continue;
            }
        };

        let prefix_hash = match sha256_prefix(&path) {
            Ok(h) => h,
            Err(e) => {
                errors.push(ManifestError { name, message: e.to_string() });
                continue;
            }
        };

        if dedup && seen_hashes.contains(&full_hash) {
            let original_path = first_seen_path.get(&full_hash).cloned().unwrap_or_default();
            duplicates.push(DuplicateEntry { name, sha256: full_hash, original_path });
            continue;
        }

        let modified = metadata
            .modified()
            .map(chrono::DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        seen_hashes.insert(full_hash.clone());
        first_seen_path.insert(full_hash.clone(), path.clone());

        files.push(SourceFile {
            name,
            source_path: path,
            size: metadata.len(),
            modified,
            sha256: full_hash,
            sha256_prefix_4k: prefix_hash,
            timestamp: Utc::now(),
        });
    }

    let summary = ManifestSummary {
        total_scanned,
        registered: files.len(),
        duplicates: duplicates.len(),
        errors: errors.len(),
    };

    Ok(Manifest {
        generated_at: Utc::now(),
        source_path: source.to_path_buf(),
        files,
        duplicates,
        errors,
        summary,
    })
}

fn enumerate_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let entries = std::fs::read_dir(dir).map_err(|e| PipelineError::Io {
        path: dir.to_path_buf(),
        message: e.to_string(),
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| PipelineError::Io {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?;
        let path = entry.path();
        if path.is_dir() {
            found.extend(enumerate_pdfs(&path)?);
        } else if path.extension().and_then(|e| e.to_str()).map(|e| e.eq_ignore_ascii_case("pdf")).unwrap_or(false) {
            found.push(path);
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_pdf(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content).unwrap();
        path
    }

    #[test]
    fn enumeration_is_sorted_lexicographically() {
        let dir = tempfile::tempdir().unwrap();
        write_pdf(dir.path(), "b.pdf", b"b content");
        write_pdf(dir.path(), "a.pdf", b"a content");
        let manifest = ingest(dir.path(), true).unwrap();
        assert_eq!(manifest.files[0].name, "a.pdf");
        assert_eq!(manifest.files[1].name, "b.pdf");
    }

    #[test]
    fn duplicate_content_is_deduplicated_by_full_hash() {
        let dir = tempfile::tempdir().unwrap();
        write_pdf(dir.path(), "a.pdf", b"identical content");
        write_pdf(dir.path(), "b.pdf", b"identical content");
        let manifest = ingest(dir.path(), true).unwrap();
        assert_eq!(manifest.files.len(), 1);
        assert_eq!(manifest.duplicates.len(), 1);
    }

    #[test]
    fn dedup_disabled_keeps_every_file() {
        let dir = tempfile::tempdir().unwrap();
        write_pdf(dir.path(), "a.pdf", b"identical content");
        write_pdf(dir.path(), "b.pdf", b"identical content");
        let manifest = ingest(dir.path(), false).unwrap();
        assert_eq!(manifest.files.len(), 2);
        assert_eq!(manifest.duplicates.len(), 0);
    }

    #[test]
    fn running_ingest_twice_yields_the_same_hashes() {
        let dir = tempfile::tempdir().unwrap();
        write_pdf(dir.path(), "a.pdf", b"stable content");
        let first = ingest(dir.path(), true).unwrap();
        let second = ingest(dir.path(), true).unwrap();
        assert_eq!(first.files[0].sha256, second.files[0].sha256);
        assert_eq!(first.files[0].sha256_prefix_4k, second.files[0].sha256_prefix_4k);
    }
}
